use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::TaxBracket;

/// Tax contributed by one bracket, as reported to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxLevel {
    pub level: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub tax: Decimal,
}

impl From<&TaxBracket> for TaxLevel {
    fn from(bracket: &TaxBracket) -> Self {
        Self {
            level: bracket.level.clone(),
            tax: bracket.tax,
        }
    }
}

/// Outcome of a single calculation. At most one of `tax` and `tax_refund`
/// is non-zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxResponse {
    #[serde(with = "rust_decimal::serde::float")]
    pub tax: Decimal,
    #[serde(rename = "taxRefund", with = "rust_decimal::serde::float")]
    pub tax_refund: Decimal,
    #[serde(rename = "taxLevel")]
    pub tax_level: Vec<TaxLevel>,
}

/// One row of a batch upload result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxUpload {
    #[serde(rename = "totalIncome", with = "rust_decimal::serde::float")]
    pub total_income: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub tax: Decimal,
    #[serde(rename = "taxRefund", with = "rust_decimal::serde::float")]
    pub tax_refund: Decimal,
}

impl TaxUpload {
    pub fn new(
        total_income: Decimal,
        response: &TaxResponse,
    ) -> Self {
        Self {
            total_income,
            tax: response.tax,
            tax_refund: response.tax_refund,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxUploadResponse {
    pub taxes: Vec<TaxUpload>,
}
