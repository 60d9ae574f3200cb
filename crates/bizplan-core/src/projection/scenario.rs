use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::BizPlanError;
use crate::types::{MetricSeries, Money, Percent, Rate, SeriesPoint};
use crate::BizPlanResult;

const MONTHS_PER_YEAR: Decimal = dec!(12);
const HUNDRED: Decimal = dec!(100);
const HALF: Decimal = dec!(0.5);

/// Named multiplier applied to a baseline before growth is compounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScenarioTag {
    Conservative,
    #[default]
    Neutral,
    Aggressive,
}

impl ScenarioTag {
    pub const ALL: [ScenarioTag; 3] = [
        ScenarioTag::Conservative,
        ScenarioTag::Neutral,
        ScenarioTag::Aggressive,
    ];

    pub fn multiplier(self) -> Rate {
        match self {
            ScenarioTag::Conservative => dec!(0.9),
            ScenarioTag::Neutral => dec!(1.0),
            ScenarioTag::Aggressive => dec!(1.1),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ScenarioTag::Conservative => "conservative",
            ScenarioTag::Neutral => "neutral",
            ScenarioTag::Aggressive => "aggressive",
        }
    }
}

impl fmt::Display for ScenarioTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScenarioTag {
    type Err = BizPlanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "conservative" => Ok(ScenarioTag::Conservative),
            "neutral" => Ok(ScenarioTag::Neutral),
            "aggressive" => Ok(ScenarioTag::Aggressive),
            other => Err(BizPlanError::InvalidInput {
                field: "scenario".into(),
                reason: format!(
                    "Unknown scenario '{other}'. Expected conservative, neutral or aggressive"
                ),
            }),
        }
    }
}

fn monthly_factor(annual_growth_pct: Percent) -> Rate {
    Decimal::ONE + annual_growth_pct / MONTHS_PER_YEAR / HUNDRED
}

/// One rounded value per period, or `None` from the first period whose value
/// no longer fits in a `Decimal`.
fn compounded<I, P>(
    base_value: Money,
    annual_growth_pct: Percent,
    scenario: ScenarioTag,
    periods: I,
) -> Vec<(String, Option<Money>)>
where
    I: IntoIterator<Item = P>,
    P: ToString,
{
    let adjusted_base = base_value.checked_mul(scenario.multiplier());
    let factor = monthly_factor(annual_growth_pct);

    let mut growth = Some(Decimal::ONE);
    periods
        .into_iter()
        .enumerate()
        .map(|(i, period)| {
            if i > 0 {
                growth = growth.and_then(|g| g.checked_mul(factor));
            }
            let value = match (adjusted_base, growth) {
                (Some(base), _) if base.is_zero() => Some(Decimal::ZERO),
                (Some(base), Some(g)) => base
                    .checked_mul(g)
                    .and_then(|v| v.checked_add(HALF))
                    .map(|v| v.floor()),
                _ => None,
            };
            (period.to_string(), value)
        })
        .collect()
}

/// Expand a baseline into one value per period.
///
/// `value[i] = round(base * multiplier * (1 + g/12/100)^i)`. The growth factor
/// compounds unrounded; rounding (half up) happens only on the emitted value.
/// Values beyond the `Decimal` range saturate at `Decimal::MAX` / `Decimal::MIN`.
pub fn compute_series<I, P>(
    base_value: Money,
    annual_growth_pct: Percent,
    scenario: ScenarioTag,
    periods: I,
) -> MetricSeries
where
    I: IntoIterator<Item = P>,
    P: ToString,
{
    let factor = monthly_factor(annual_growth_pct);
    compounded(base_value, annual_growth_pct, scenario, periods)
        .into_iter()
        .enumerate()
        .map(|(i, (period, value))| SeriesPoint {
            period,
            value: value.unwrap_or_else(|| {
                // sign flips every period when the factor itself is negative
                let negative = base_value.is_sign_negative() != (factor.is_sign_negative() && i % 2 == 1);
                if negative {
                    Decimal::MIN
                } else {
                    Decimal::MAX
                }
            }),
        })
        .collect()
}

/// Like [`compute_series`], but rejects inputs whose projection leaves the
/// `Decimal` range instead of saturating.
pub fn try_compute_series<I, P>(
    base_value: Money,
    annual_growth_pct: Percent,
    scenario: ScenarioTag,
    periods: I,
) -> BizPlanResult<MetricSeries>
where
    I: IntoIterator<Item = P>,
    P: ToString,
{
    compounded(base_value, annual_growth_pct, scenario, periods)
        .into_iter()
        .map(|(period, value)| match value {
            Some(value) => Ok(SeriesPoint { period, value }),
            None => Err(BizPlanError::InvalidInput {
                field: "growthRate".into(),
                reason: format!(
                    "Projected value overflows at {period}; reduce the base value, growth rate or horizon"
                ),
            }),
        })
        .collect()
}
