//! Rounding helpers shared by the calculators.
//!
//! Money is kept at full precision while computing and rounded to cents only
//! when a value leaves the engine. Rates are rounded to [`RATE_DECIMAL_PLACES`].

use rust_decimal::{Decimal, RoundingStrategy};

/// Decimal places kept for percentage rates on output.
pub const RATE_DECIMAL_PLACES: u32 = 4;

/// Rounds a decimal value to exactly two decimal places using half-up rounding.
///
/// Values at exactly 0.005 are rounded away from zero.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use simples_core::calculations::common::round_half_up;
///
/// assert_eq!(round_half_up(dec!(1744.495)), dec!(1744.50));
/// assert_eq!(round_half_up(dec!(1744.494)), dec!(1744.49));
/// assert_eq!(round_half_up(dec!(-0.005)), dec!(-0.01));
/// ```
pub fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Rounds a percentage rate to [`RATE_DECIMAL_PLACES`], half-up.
///
/// ```
/// use rust_decimal_macros::dec;
/// use simples_core::calculations::common::round_rate;
///
/// assert_eq!(round_rate(dec!(6.03456)), dec!(6.0346));
/// ```
pub fn round_rate(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(RATE_DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Drops everything below the cent, toward zero.
pub fn truncate_cents(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::ToZero)
}

/// Returns the maximum of two decimal values.
pub fn max(
    a: Decimal,
    b: Decimal,
) -> Decimal {
    if a > b { a } else { b }
}
