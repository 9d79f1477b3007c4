//! Progressive bracket table and the per-bracket tax calculation.
//!
//! # Standard Table
//!
//! | Level | Lower bound | Upper bound | Rate |
//! |-------|-------------|-------------|------|
//! | 0-150,000 | 0 | 150,000 | 0% |
//! | 150,001-500,000 | 150,001 | 500,000 | 10% |
//! | 500,001-1,000,000 | 500,001 | 1,000,000 | 15% |
//! | 1,000,001-2,000,000 | 1,000,001 | 2,000,000 | 20% |
//! | 2,000,001 ขึ้นไป | 2,000,001 | unbounded | 35% |
//!
//! Bounds are inclusive whole-unit edges: a bracket starts one unit above
//! the previous bracket's upper bound. The amount taxed in a bracket is
//! `min(income, upper) - lower + 1`, so income between two integer edges
//! (for example `150000.5`) is still taxed continuously.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use tax_core::calculations::BracketTable;
//!
//! let table = BracketTable::standard();
//! let breakdown = table.apply(dec!(440000));
//!
//! assert_eq!(breakdown.total_tax, dec!(29000));
//! assert_eq!(breakdown.brackets[1].tax, dec!(29000));
//! assert_eq!(breakdown.brackets.len(), 5);
//! ```

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::models::TaxBracket;

/// Reasons a custom bracket table is rejected.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BracketTableError {
    #[error("no tax brackets provided")]
    NoTaxBrackets,

    #[error("first bracket must start at 0, got {0}")]
    FirstLowerBoundNotZero(Decimal),

    #[error("bracket '{level}' must start at {expected}, got {actual}")]
    NotContiguous {
        level: String,
        expected: Decimal,
        actual: Decimal,
    },

    #[error("bracket '{0}' is unbounded but is not the last bracket")]
    UnboundedBeforeLast(String),

    #[error("bracket '{0}' has an upper bound below its lower bound")]
    InvertedBounds(String),

    #[error("bracket '{level}' has rate {rate} outside 0..=1")]
    InvalidRate { level: String, rate: Decimal },
}

/// Result of applying the table to a taxable income.
///
/// Every bracket of the table is present, in order; brackets above the
/// income's own bracket carry zero tax.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracketBreakdown {
    pub total_tax: Decimal,
    pub brackets: Vec<TaxBracket>,
}

/// An ordered, contiguous partition of `[0, ∞)` into taxed ranges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BracketTable {
    brackets: Vec<TaxBracket>,
}

impl Default for BracketTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl BracketTable {
    /// The personal income tax schedule.
    pub fn standard() -> Self {
        Self {
            brackets: vec![
                TaxBracket::new("0-150,000", dec!(0), Some(dec!(150000)), dec!(0.00)),
                TaxBracket::new("150,001-500,000", dec!(150001), Some(dec!(500000)), dec!(0.10)),
                TaxBracket::new(
                    "500,001-1,000,000",
                    dec!(500001),
                    Some(dec!(1000000)),
                    dec!(0.15),
                ),
                TaxBracket::new(
                    "1,000,001-2,000,000",
                    dec!(1000001),
                    Some(dec!(2000000)),
                    dec!(0.20),
                ),
                TaxBracket::new("2,000,001 ขึ้นไป", dec!(2000001), None, dec!(0.35)),
            ],
        }
    }

    /// Builds a table from custom brackets, checking that they are sorted,
    /// contiguous, start at zero and end with the only unbounded bracket.
    ///
    /// Any `tax` already present on the input is reset to zero.
    pub fn new(brackets: Vec<TaxBracket>) -> Result<Self, BracketTableError> {
        let first = brackets.first().ok_or(BracketTableError::NoTaxBrackets)?;
        if first.lower_bound != Decimal::ZERO {
            return Err(BracketTableError::FirstLowerBoundNotZero(first.lower_bound));
        }

        let last_index = brackets.len() - 1;
        for (index, bracket) in brackets.iter().enumerate() {
            if bracket.rate < Decimal::ZERO || bracket.rate > Decimal::ONE {
                return Err(BracketTableError::InvalidRate {
                    level: bracket.level.clone(),
                    rate: bracket.rate,
                });
            }

            match bracket.upper_bound {
                None if index != last_index => {
                    return Err(BracketTableError::UnboundedBeforeLast(bracket.level.clone()));
                }
                Some(upper) if upper < bracket.lower_bound => {
                    return Err(BracketTableError::InvertedBounds(bracket.level.clone()));
                }
                _ => {}
            }

            if index > 0 {
                // The previous bracket is bounded, otherwise it would have
                // been rejected above.
                let expected = brackets[index - 1].upper_bound.unwrap_or_default() + Decimal::ONE;
                if bracket.lower_bound != expected {
                    return Err(BracketTableError::NotContiguous {
                        level: bracket.level.clone(),
                        expected,
                        actual: bracket.lower_bound,
                    });
                }
            }
        }

        let brackets = brackets
            .into_iter()
            .map(|bracket| TaxBracket {
                tax: Decimal::ZERO,
                ..bracket
            })
            .collect();
        Ok(Self { brackets })
    }

    pub fn brackets(&self) -> &[TaxBracket] {
        &self.brackets
    }

    /// Applies the table to `taxable_income`.
    ///
    /// Brackets are walked in ascending order and the walk stops at the
    /// bracket containing the income. Income at or below zero yields zero
    /// tax in every bracket.
    pub fn apply(
        &self,
        taxable_income: Decimal,
    ) -> BracketBreakdown {
        let mut brackets = self.brackets.clone();
        let mut total_tax = Decimal::ZERO;

        if taxable_income <= Decimal::ZERO {
            debug!(taxable_income = %taxable_income, "no taxable income; skipping brackets");
            return BracketBreakdown { total_tax, brackets };
        }

        for bracket in brackets.iter_mut() {
            let taxable_amount = self.taxable_amount(taxable_income, bracket);

            if taxable_amount > Decimal::ZERO {
                bracket.tax = taxable_amount * bracket.rate;
                total_tax += bracket.tax;
                debug!(
                    level = %bracket.level,
                    taxable_amount = %taxable_amount,
                    tax = %bracket.tax,
                    total_tax = %total_tax,
                    "bracket applied"
                );
            }

            if bracket.contains_top_of(taxable_income) {
                break;
            }
        }

        BracketBreakdown { total_tax, brackets }
    }

    /// Portion of `income` that falls inside `bracket`, clamped at zero.
    fn taxable_amount(
        &self,
        income: Decimal,
        bracket: &TaxBracket,
    ) -> Decimal {
        let top = match bracket.upper_bound {
            Some(upper) if upper < income => upper,
            _ => income,
        };
        let amount = top - bracket.lower_bound + Decimal::ONE;
        if amount > Decimal::ZERO { amount } else { Decimal::ZERO }
    }
}
