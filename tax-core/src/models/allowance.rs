use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Itemized allowance categories a taxpayer may claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AllowanceType {
    #[serde(rename = "donation")]
    Donation,
    #[serde(rename = "k-receipt")]
    KReceipt,
}

impl AllowanceType {
    pub const ALL: [AllowanceType; 2] = [Self::Donation, Self::KReceipt];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Donation => "donation",
            Self::KReceipt => "k-receipt",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "donation" => Some(Self::Donation),
            "k-receipt" => Some(Self::KReceipt),
            _ => None,
        }
    }
}

/// A single itemized allowance as submitted by the caller.
///
/// The type is kept as the raw string so that unknown values survive
/// deserialization and are reported by validation alongside every other
/// violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allowance {
    #[serde(rename = "allowanceType")]
    pub allowance_type: String,
    pub amount: Decimal,
}

impl Allowance {
    pub fn new(
        kind: AllowanceType,
        amount: Decimal,
    ) -> Self {
        Self {
            allowance_type: kind.as_str().to_string(),
            amount,
        }
    }

    /// The recognised allowance type, or `None` for anything else.
    pub fn kind(&self) -> Option<AllowanceType> {
        AllowanceType::parse(&self.allowance_type)
    }
}
