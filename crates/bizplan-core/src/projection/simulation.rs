use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::BizPlanError;
use crate::periods::months_after;
use crate::projection::derived::{profit_series, profitability_series};
use crate::projection::scenario::{try_compute_series, ScenarioTag};
use crate::types::{with_metadata, ComputationOutput, MetricSeries, Money, Percent};
use crate::BizPlanResult;

/// Longest horizon accepted by [`run_projection`].
pub const MAX_PROJECTION_YEARS: u32 = 50;

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// Baseline and growth assumptions for one metric.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricSpec {
    /// Monthly baseline before the scenario multiplier
    #[serde(default)]
    pub base_value: Money,
    /// Annual growth in percent (12 = 12% per year, compounded monthly)
    #[serde(default)]
    pub growth_rate: Option<Percent>,
    /// Scenario multiplier applied to the baseline
    #[serde(default)]
    pub scenario: Option<ScenarioTag>,
}

/// Free-form simulator input. Omitted metrics project as zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectionInput {
    #[serde(default)]
    pub revenue: Option<MetricSpec>,
    #[serde(default)]
    pub cost: Option<MetricSpec>,
    #[serde(default)]
    pub inventory: Option<MetricSpec>,
    /// Horizon in years; 12 monthly periods per year
    pub years: u32,
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectionOutput {
    pub revenue: MetricSeries,
    pub cost: MetricSeries,
    pub inventory: MetricSeries,
    pub profit: MetricSeries,
    pub profitability: MetricSeries,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Project revenue, cost and inventory month by month, starting the month after
/// `today`, and derive profit and profitability from them.
pub fn run_projection(
    input: &ProjectionInput,
    today: NaiveDate,
) -> BizPlanResult<ComputationOutput<ProjectionOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_input(input)?;

    let periods = months_after(today, input.years);

    let revenue = project_metric("revenue", input.revenue.as_ref(), periods.clone(), &mut warnings)?;
    let cost = project_metric("cost", input.cost.as_ref(), periods.clone(), &mut warnings)?;
    let inventory = project_metric("inventory", input.inventory.as_ref(), periods, &mut warnings)?;

    let profit = profit_series(&revenue, &cost);
    let profitability = profitability_series(&revenue, &profit);

    if revenue.iter().any(|p| p.value <= Decimal::ZERO) {
        warnings.push("Revenue is zero or negative in at least one period; profitability reported as 0 there".into());
    }

    log::debug!(
        "projected {} periods ({} years) starting {}",
        revenue.len(),
        input.years,
        revenue.first().map(|p| p.period.as_str()).unwrap_or("-")
    );

    let output = ProjectionOutput {
        revenue,
        cost,
        inventory,
        profit,
        profitability,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Monthly compounding of annual growth (g/12) on scenario-adjusted baselines, rounded half up per period",
        input,
        warnings,
        elapsed,
        output,
    ))
}

fn project_metric(
    name: &str,
    spec: Option<&MetricSpec>,
    periods: impl Iterator<Item = crate::periods::MonthPeriod>,
    warnings: &mut Vec<String>,
) -> BizPlanResult<MetricSeries> {
    let spec = match spec {
        Some(s) => s.clone(),
        None => {
            warnings.push(format!("No {name} assumptions supplied; projected as zero"));
            MetricSpec::default()
        }
    };
    try_compute_series(
        spec.base_value,
        spec.growth_rate.unwrap_or(Decimal::ZERO),
        spec.scenario.unwrap_or_default(),
        periods,
    )
    .map_err(|e| match e {
        BizPlanError::InvalidInput { field, reason } => BizPlanError::InvalidInput {
            field: format!("{name}.{field}"),
            reason,
        },
        other => other,
    })
}

fn validate_input(input: &ProjectionInput) -> BizPlanResult<()> {
    if input.years == 0 {
        return Err(BizPlanError::InvalidInput {
            field: "years".into(),
            reason: "Horizon must be at least one year".into(),
        });
    }
    if input.years > MAX_PROJECTION_YEARS {
        return Err(BizPlanError::InvalidInput {
            field: "years".into(),
            reason: format!("Horizon must not exceed {MAX_PROJECTION_YEARS} years"),
        });
    }
    Ok(())
}
