//! Planning-page inputs turned into projected period records.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Instant;

use crate::channels::allocate;
use crate::error::BizPlanError;
use crate::periods::planning_horizon;
use crate::statement::{derive_summaries, PeriodRecord, StatementAssumptions, SummaryPeriodRecord};
use crate::types::{with_metadata, ComputationOutput, Money, Percent, Rate};
use crate::BizPlanResult;

const DEFAULT_PLAN_YEAR: i32 = 2025;

fn default_plan_year() -> i32 {
    DEFAULT_PLAN_YEAR
}

/// Defaults applied when a planning entry leaves something unspecified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanAssumptions {
    /// Cost as a share of revenue when no markup is entered
    pub default_cost_ratio: Rate,
    /// Ending inventory as a share of the purchase order
    pub inventory_from_purchase_order: Rate,
}

impl Default for PlanAssumptions {
    fn default() -> Self {
        Self {
            default_cost_ratio: dec!(0.7),
            inventory_from_purchase_order: dec!(0.8),
        }
    }
}

/// Per-period user entries over the planning horizon, keyed by `YYYY-MM`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanInput {
    #[serde(default = "default_plan_year")]
    pub plan_year: i32,
    #[serde(default)]
    pub revenue: BTreeMap<String, Money>,
    #[serde(default)]
    pub purchase_order: BTreeMap<String, Money>,
    /// Markup over cost in percent
    #[serde(default)]
    pub markup: BTreeMap<String, Percent>,
    #[serde(default)]
    pub advertising: BTreeMap<String, Money>,
    #[serde(default)]
    pub personnel: BTreeMap<String, Money>,
    #[serde(default)]
    pub assumptions: Option<PlanAssumptions>,
    #[serde(default)]
    pub statement_assumptions: Option<StatementAssumptions>,
}

/// Entered operating expenses, kept next to the ratio-derived ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnteredExpenses {
    pub period: String,
    pub advertising: Money,
    pub personnel: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanOutput {
    pub records: Vec<PeriodRecord>,
    pub statement: Vec<SummaryPeriodRecord>,
    pub entered_expenses: Vec<EnteredExpenses>,
}

fn entry(map: &BTreeMap<String, Money>, period: &str) -> Money {
    map.get(period).copied().unwrap_or(Decimal::ZERO)
}

/// Cost implied by a markup over cost, or the default cost ratio without one.
pub fn plan_cost(revenue: Money, markup: Percent, a: &PlanAssumptions) -> Money {
    if markup > Decimal::ZERO {
        revenue / (Decimal::ONE + markup / dec!(100))
    } else {
        revenue * a.default_cost_ratio
    }
}

/// One record per horizon month. Missing entries count as 0.
pub fn build_plan_records(input: &PlanInput, a: &PlanAssumptions) -> Vec<PeriodRecord> {
    planning_horizon(input.plan_year)
        .map(|p| {
            let period = p.to_string();
            let revenue = entry(&input.revenue, &period);
            let cost = plan_cost(revenue, entry(&input.markup, &period), a);
            let inventory = entry(&input.purchase_order, &period) * a.inventory_from_purchase_order;
            PeriodRecord::new(period, revenue, cost, Some(inventory), Some(allocate(revenue)))
        })
        .collect()
}

fn validate_input(input: &PlanInput) -> BizPlanResult<()> {
    let maps = [
        ("revenue", &input.revenue),
        ("purchaseOrder", &input.purchase_order),
        ("markup", &input.markup),
        ("advertising", &input.advertising),
        ("personnel", &input.personnel),
    ];
    for (field, map) in maps {
        if let Some((period, value)) = map.iter().find(|(_, v)| **v < Decimal::ZERO) {
            return Err(BizPlanError::InvalidInput {
                field: format!("{field}[{period}]"),
                reason: format!("Must be non-negative, got {value}"),
            });
        }
    }
    Ok(())
}

/// Build planned records and their summary statements.
pub fn run_plan(input: &PlanInput) -> BizPlanResult<ComputationOutput<PlanOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_input(input)?;
    let assumptions = input.assumptions.clone().unwrap_or_default();
    let statement_assumptions = input.statement_assumptions.clone().unwrap_or_default();
    statement_assumptions.validate()?;

    let horizon: Vec<String> = planning_horizon(input.plan_year).map(|p| p.to_string()).collect();
    for key in input.revenue.keys().chain(input.purchase_order.keys()).chain(input.markup.keys()) {
        if !horizon.contains(key) {
            warnings.push(format!("Entry for {key} is outside the planning horizon and was ignored"));
        }
    }
    if input.revenue.is_empty() {
        warnings.push("No revenue entered; every planned period is zero".into());
    }

    let records = build_plan_records(input, &assumptions);
    let statement = derive_summaries(&records, &statement_assumptions);
    let entered_expenses = horizon
        .iter()
        .map(|period| EnteredExpenses {
            period: period.clone(),
            advertising: entry(&input.advertising, period),
            personnel: entry(&input.personnel, period),
        })
        .collect();

    log::info!("planned {} periods from {}", records.len(), input.plan_year);

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Markup-implied cost, purchase-order-implied inventory, ratio channel split over the planning horizon",
        &assumptions,
        warnings,
        elapsed,
        PlanOutput {
            records,
            statement,
            entered_expenses,
        },
    ))
}
