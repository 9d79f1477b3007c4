//! Small decimal helpers shared by the calculation stages and by
//! presentation code.

use rust_decimal::Decimal;

/// Rounds a decimal value to exactly two decimal places using half-up rounding.
///
/// The calculation stages never round; this is for display only.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use tax_core::calculations::common::round_half_up;
///
/// assert_eq!(round_half_up(dec!(123.454)), dec!(123.45));
/// assert_eq!(round_half_up(dec!(123.455)), dec!(123.46));
/// assert_eq!(round_half_up(dec!(-123.455)), dec!(-123.46)); // Away from zero
/// ```
pub fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, rust_decimal::RoundingStrategy::MidpointAwayFromZero)
}

/// Limits a claimed amount to `0..=cap`.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use tax_core::calculations::common::capped;
///
/// assert_eq!(capped(dec!(200000), dec!(100000)), dec!(100000));
/// assert_eq!(capped(dec!(50), dec!(100000)), dec!(50));
/// assert_eq!(capped(dec!(-50), dec!(100000)), dec!(0));
/// ```
pub fn capped(
    amount: Decimal,
    cap: Decimal,
) -> Decimal {
    if amount > cap {
        cap
    } else if amount < Decimal::ZERO {
        Decimal::ZERO
    } else {
        amount
    }
}
