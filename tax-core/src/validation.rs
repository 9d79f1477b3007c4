//! Input rules for calculation requests, administrative updates and CSV
//! records.
//!
//! Every rule is checked independently and all violations are reported
//! together as one [`ValidationError`], so a caller can fix a request in a
//! single round trip.

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;

use crate::error::ValidationError;
use crate::models::{AllowanceType, DeductionId, DeductionLimits, TaxRequest};

/// Number of columns in an upload record: total income, WHT, donation.
pub const CSV_RECORD_COLUMNS: usize = 3;

pub const MSG_TOTAL_INCOME_NOT_POSITIVE: &str = "totalIncome must be greater than 0";
pub const MSG_WHT_NEGATIVE: &str = "wht must not be less than 0";
pub const MSG_WHT_ABOVE_INCOME: &str = "wht must not be greater than totalIncome";

static NON_NEGATIVE_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+(\.[0-9]+)?$").expect("number pattern compiles"));

fn allowed_types() -> String {
    AllowanceType::ALL
        .iter()
        .map(AllowanceType::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Checks a calculation request.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use tax_core::TaxRequest;
/// use tax_core::validation::validate_tax_request;
///
/// let err = validate_tax_request(&TaxRequest::new(dec!(0), dec!(-1))).unwrap_err();
///
/// assert_eq!(
///     err.to_string(),
///     "totalIncome must be greater than 0; wht must not be less than 0; \
///      wht must not be greater than totalIncome"
/// );
/// ```
pub fn validate_tax_request(request: &TaxRequest) -> Result<(), ValidationError> {
    let mut messages = Vec::new();

    if request.total_income <= Decimal::ZERO {
        messages.push(MSG_TOTAL_INCOME_NOT_POSITIVE.to_string());
    }
    if request.wht < Decimal::ZERO {
        messages.push(MSG_WHT_NEGATIVE.to_string());
    }
    if request.wht > request.total_income {
        messages.push(MSG_WHT_ABOVE_INCOME.to_string());
    }
    for (index, allowance) in request.allowances.iter().enumerate() {
        if allowance.kind().is_none() {
            messages.push(format!(
                "allowanceType '{}' must be one of: {}",
                allowance.allowance_type,
                allowed_types()
            ));
        }
        if allowance.amount < Decimal::ZERO {
            messages.push(format!("allowances[{index}].amount must not be less than 0"));
        }
    }

    ValidationError::check(messages)
}

/// Checks an administrative update of a stored deduction amount against the
/// injected bounds for that deduction.
pub fn validate_allowance_amount(
    id: DeductionId,
    amount: Decimal,
    limits: &DeductionLimits,
) -> Result<(), ValidationError> {
    let (min, max) = limits.bounds(id);
    let label = id.label();
    let mut messages = Vec::new();

    if amount < Decimal::ZERO {
        messages.push(format!("{label} must not be less than 0"));
    }
    if amount < min {
        messages.push(format!("{label} must be at least {min}"));
    }
    if amount > max {
        messages.push(format!("{label} must not exceed {max}"));
    }

    ValidationError::check(messages)
}

/// Checks one CSV data record: exactly three columns, each a non-negative
/// decimal without sign or exponent.
pub fn validate_csv_record<S: AsRef<str>>(fields: &[S]) -> Result<(), ValidationError> {
    if fields.len() != CSV_RECORD_COLUMNS {
        return Err(ValidationError::single(format!(
            "record must have exactly {CSV_RECORD_COLUMNS} columns, found {}",
            fields.len()
        )));
    }

    let messages = fields
        .iter()
        .enumerate()
        .filter(|(_, field)| parse_non_negative(field.as_ref()).is_none())
        .map(|(index, field)| {
            format!(
                "column {} ('{}') must be a non-negative number",
                index + 1,
                field.as_ref()
            )
        })
        .collect();

    ValidationError::check(messages)
}

/// Parses a plain non-negative decimal such as `500000` or `1234.50`.
///
/// Signs, exponents, thousands separators and empty strings are rejected.
pub fn parse_non_negative(field: &str) -> Option<Decimal> {
    let field = field.trim();
    if !NON_NEGATIVE_NUMBER.is_match(field) {
        return None;
    }
    Decimal::from_str(field).ok()
}
