use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::types::{Money, Percent};

/// Year-over-year change in percent.
///
/// `None` when there is no prior value or the prior value is zero. The
/// denominator is `|prev|`, so an improvement from a loss reads as positive.
pub fn yoy_change(current: Money, prev: Option<Money>) -> Option<Percent> {
    let prev = prev?;
    if prev.is_zero() {
        return None;
    }
    Some((current - prev) / prev.abs() * dec!(100))
}

/// Signed change between two values, for display next to a YoY percentage.
pub fn absolute_change(current: Money, prev: Option<Money>) -> Option<Money> {
    prev.map(|p| current - p)
}

/// Whether a YoY value should read as an improvement. Cost lines improve when
/// they shrink.
pub fn is_favourable(yoy: Percent, cost_line: bool) -> bool {
    if cost_line {
        yoy < Decimal::ZERO
    } else {
        yoy > Decimal::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_year_has_no_yoy() {
        assert_eq!(yoy_change(dec!(100), None), None);
    }

    #[test]
    fn test_zero_base_has_no_yoy() {
        assert_eq!(yoy_change(dec!(100), Some(Decimal::ZERO)), None);
    }

    #[test]
    fn test_growth_and_decline() {
        assert_eq!(yoy_change(dec!(120), Some(dec!(100))), Some(dec!(20)));
        assert_eq!(yoy_change(dec!(75), Some(dec!(100))), Some(dec!(-25)));
    }

    #[test]
    fn test_negative_base_uses_magnitude() {
        // loss of 100 shrinking to a loss of 50 is a +50% move
        assert_eq!(yoy_change(dec!(-50), Some(dec!(-100))), Some(dec!(50)));
    }

    #[test]
    fn test_favourable_direction() {
        assert!(is_favourable(dec!(5), false));
        assert!(is_favourable(dec!(-5), true));
        assert!(!is_favourable(dec!(5), true));
        assert_eq!(absolute_change(dec!(5), Some(dec!(8))), Some(dec!(-3)));
    }
}
