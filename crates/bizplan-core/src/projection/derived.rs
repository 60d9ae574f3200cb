use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::types::{MetricSeries, Money, Percent, SeriesPoint};

/// `profit / revenue * 100`, or `0` when revenue is not positive.
pub fn profitability(revenue: Money, profit: Money) -> Percent {
    if revenue > Decimal::ZERO {
        profit / revenue * dec!(100)
    } else {
        Decimal::ZERO
    }
}

/// Period-wise `revenue - cost`. Series are paired by position; the shorter
/// series bounds the output.
pub fn profit_series(revenue: &MetricSeries, cost: &MetricSeries) -> MetricSeries {
    revenue
        .iter()
        .zip(cost.iter())
        .map(|(r, c)| SeriesPoint {
            period: r.period.clone(),
            value: r.value - c.value,
        })
        .collect()
}

/// Period-wise profitability in percent. Left unrounded.
pub fn profitability_series(revenue: &MetricSeries, profit: &MetricSeries) -> MetricSeries {
    revenue
        .iter()
        .zip(profit.iter())
        .map(|(r, p)| SeriesPoint {
            period: r.period.clone(),
            value: profitability(r.value, p.value),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(period: &str, value: Decimal) -> SeriesPoint {
        SeriesPoint {
            period: period.into(),
            value,
        }
    }

    #[test]
    fn test_profitability_guards_zero_revenue() {
        assert_eq!(profitability(Decimal::ZERO, dec!(-50)), Decimal::ZERO);
        assert_eq!(profitability(dec!(-10), dec!(5)), Decimal::ZERO);
        assert_eq!(profitability(dec!(200), dec!(50)), dec!(25));
    }

    #[test]
    fn test_profit_and_profitability_series() {
        let revenue = vec![point("2026-01", dec!(1000)), point("2026-02", dec!(0))];
        let cost = vec![point("2026-01", dec!(600)), point("2026-02", dec!(100))];
        let profit = profit_series(&revenue, &cost);
        assert_eq!(profit[0].value, dec!(400));
        assert_eq!(profit[1].value, dec!(-100));

        let pct = profitability_series(&revenue, &profit);
        assert_eq!(pct[0].value, dec!(40));
        assert_eq!(pct[1].value, Decimal::ZERO);
        assert_eq!(pct[1].period, "2026-02");
    }
}
