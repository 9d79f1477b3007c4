//! Fixed deduction limits injected into the tax service at construction.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::DeductionId;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DeductionLimitsError {
    #[error("{name} must not be negative, got {value}")]
    Negative { name: &'static str, value: Decimal },

    #[error("{id} minimum {min} exceeds maximum {max}")]
    InvertedBounds {
        id: DeductionId,
        min: Decimal,
        max: Decimal,
    },
}

/// Caps and administrative bounds for every deduction kind.
///
/// The donation cap is applied to each donation allowance at calculation
/// time. The personal and k-receipt bounds only constrain administrative
/// updates of the stored amounts; the k-receipt cap used during calculation
/// is the stored amount itself.
///
/// Missing keys fall back to [`DeductionLimits::default`] when deserialized,
/// so a partial TOML file is enough to override a single bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeductionLimits {
    pub donation_cap: Decimal,
    pub personal_min: Decimal,
    pub personal_max: Decimal,
    pub k_receipt_min: Decimal,
    pub k_receipt_max: Decimal,
}

impl Default for DeductionLimits {
    fn default() -> Self {
        Self {
            donation_cap: dec!(100000),
            personal_min: dec!(10000),
            personal_max: dec!(100000),
            k_receipt_min: dec!(0),
            k_receipt_max: dec!(100000),
        }
    }
}

impl DeductionLimits {
    /// Inclusive `(min, max)` bounds accepted for an update of `id`.
    pub fn bounds(
        &self,
        id: DeductionId,
    ) -> (Decimal, Decimal) {
        match id {
            DeductionId::Personal => (self.personal_min, self.personal_max),
            DeductionId::KReceipt => (self.k_receipt_min, self.k_receipt_max),
        }
    }

    pub fn validate(&self) -> Result<(), DeductionLimitsError> {
        let named = [
            ("donation_cap", self.donation_cap),
            ("personal_min", self.personal_min),
            ("personal_max", self.personal_max),
            ("k_receipt_min", self.k_receipt_min),
            ("k_receipt_max", self.k_receipt_max),
        ];
        if let Some((name, value)) = named.into_iter().find(|(_, v)| *v < Decimal::ZERO) {
            return Err(DeductionLimitsError::Negative { name, value });
        }

        for id in DeductionId::ALL {
            let (min, max) = self.bounds(id);
            if min > max {
                return Err(DeductionLimitsError::InvertedBounds { id, min, max });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(DeductionLimits::default().validate(), Ok(()));
    }

    #[test]
    fn bounds_per_deduction() {
        let limits = DeductionLimits::default();

        assert_eq!(limits.bounds(DeductionId::Personal), (dec!(10000), dec!(100000)));
        assert_eq!(limits.bounds(DeductionId::KReceipt), (dec!(0), dec!(100000)));
    }

    #[test]
    fn validate_rejects_negative_cap() {
        let limits = DeductionLimits {
            donation_cap: dec!(-1),
            ..DeductionLimits::default()
        };

        assert_eq!(
            limits.validate(),
            Err(DeductionLimitsError::Negative {
                name: "donation_cap",
                value: dec!(-1),
            })
        );
    }

    #[test]
    fn validate_rejects_inverted_bounds() {
        let limits = DeductionLimits {
            personal_min: dec!(90000),
            personal_max: dec!(50000),
            ..DeductionLimits::default()
        };

        assert_eq!(
            limits.validate(),
            Err(DeductionLimitsError::InvertedBounds {
                id: DeductionId::Personal,
                min: dec!(90000),
                max: dec!(50000),
            })
        );
    }
}
