//! Currency rounding.
//!
//! The currency has no sub-unit, so every monetary figure is finalised to a
//! whole number with round-half-up. Rounding happens at each finalisation point
//! (base, each tax component, tax total, net) so that displayed components
//! always add up to the displayed totals.

use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds a monetary amount to whole currency units, half away from zero.
///
/// # Examples
///
/// ```
/// use instructor_payroll::calculation::round_currency;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// assert_eq!(round_currency(Decimal::from_str("16516.5").unwrap()), Decimal::from(16517));
/// assert_eq!(round_currency(Decimal::from_str("16516.49").unwrap()), Decimal::from(16516));
/// ```
pub fn round_currency(amount: Decimal) -> Decimal {
    amount
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .normalize()
}

/// Rounds hours to two decimal places, half away from zero.
pub fn round_hours(hours: Decimal) -> Decimal {
    hours
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
        .normalize()
}
