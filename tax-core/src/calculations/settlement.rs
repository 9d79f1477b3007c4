//! Nets computed tax against withheld tax.

use rust_decimal::Decimal;

/// Net outcome of a calculation: at most one of the two fields is non-zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Settlement {
    pub tax: Decimal,
    pub tax_refund: Decimal,
}

/// Settles `total_tax` against `wht`.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use tax_core::calculations::settle;
///
/// let due = settle(dec!(29000), dec!(25000));
/// assert_eq!((due.tax, due.tax_refund), (dec!(4000), dec!(0)));
///
/// let refund = settle(dec!(29000), dec!(30000));
/// assert_eq!((refund.tax, refund.tax_refund), (dec!(0), dec!(1000)));
/// ```
pub fn settle(
    total_tax: Decimal,
    wht: Decimal,
) -> Settlement {
    let diff = total_tax - wht;
    if diff < Decimal::ZERO {
        Settlement {
            tax: Decimal::ZERO,
            tax_refund: -diff,
        }
    } else {
        Settlement {
            tax: diff,
            tax_refund: Decimal::ZERO,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn tax_due_when_wht_is_short() {
        assert_eq!(
            settle(dec!(29000), dec!(25000)),
            Settlement {
                tax: dec!(4000),
                tax_refund: dec!(0),
            }
        );
    }

    #[test]
    fn refund_when_wht_exceeds_tax() {
        assert_eq!(
            settle(dec!(0), dec!(1500.25)),
            Settlement {
                tax: dec!(0),
                tax_refund: dec!(1500.25),
            }
        );
    }

    #[test]
    fn exact_wht_leaves_both_zero() {
        assert_eq!(settle(dec!(29000), dec!(29000)), Settlement::default());
    }

    #[test]
    fn never_both_non_zero() {
        for (tax, wht) in [
            (dec!(0), dec!(0)),
            (dec!(100), dec!(0)),
            (dec!(0), dec!(100)),
            (dec!(35000.15), dec!(35000.16)),
            (dec!(485000), dec!(1)),
        ] {
            let s = settle(tax, wht);
            assert!(s.tax >= Decimal::ZERO && s.tax_refund >= Decimal::ZERO);
            assert!(s.tax.is_zero() || s.tax_refund.is_zero(), "{tax} / {wht}");
        }
    }
}
