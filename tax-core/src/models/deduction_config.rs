use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Keys of the externally stored deduction configuration rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DeductionId {
    #[serde(rename = "personal")]
    Personal,
    #[serde(rename = "k-receipt")]
    KReceipt,
}

impl DeductionId {
    pub const ALL: [DeductionId; 2] = [Self::Personal, Self::KReceipt];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Personal => "personal",
            Self::KReceipt => "k-receipt",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "personal" => Some(Self::Personal),
            "k-receipt" => Some(Self::KReceipt),
            _ => None,
        }
    }

    /// Human-facing name used in validation messages.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Personal => "Personal allowance",
            Self::KReceipt => "k-receipt allowance",
        }
    }
}

impl fmt::Display for DeductionId {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeductionConfig {
    pub id: DeductionId,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub description: String,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateDeductionRequest {
    pub amount: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateDeductionResponse {
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn parse_round_trips_every_id() {
        for id in DeductionId::ALL {
            assert_eq!(DeductionId::parse(id.as_str()), Some(id));
        }
    }

    #[test]
    fn parse_rejects_donation() {
        // Donation is capped by a fixed limit, not a stored row.
        assert_eq!(DeductionId::parse("donation"), None);
    }

    #[test]
    fn display_uses_storage_key() {
        assert_eq!(DeductionId::KReceipt.to_string(), "k-receipt");
    }

    #[test]
    fn config_serializes_amount_as_number() {
        let config = DeductionConfig {
            id: DeductionId::Personal,
            amount: rust_decimal_macros::dec!(60000),
            description: "Personal allowance".to_string(),
            updated_at: DateTime::<Utc>::UNIX_EPOCH,
        };

        let json = serde_json::to_value(&config).unwrap();

        assert_eq!(json["id"], serde_json::json!("personal"));
        assert_eq!(json["amount"], serde_json::json!(60000.0));
        assert!(json.get("updatedAt").is_some());
    }
}
