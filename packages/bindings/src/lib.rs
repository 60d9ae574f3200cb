use chrono::{NaiveDate, Utc};
use napi::Result as NapiResult;
use napi_derive::napi;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rust_decimal::Decimal;
use serde::Deserialize;

use bizplan_core::aggregate::{aggregate_by_year_with, YearlyInput};
use bizplan_core::drilldown::{visible_details, DrillKind, DrilldownState};
use bizplan_core::history::{normalize_history, resolve_history, LoaderConfig, RawHistoryRecord};
use bizplan_core::plan::PlanInput;
use bizplan_core::projection::ProjectionInput;
use bizplan_core::statement::{PeriodRecord, StatementAssumptions, StatementInput, SummaryPeriodRecord};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

fn rng_from(seed: Option<i64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s as u64),
        None => StdRng::from_entropy(),
    }
}

// ---------------------------------------------------------------------------
// Projection
// ---------------------------------------------------------------------------

/// `today` is `YYYY-MM-DD`; the current UTC date when omitted.
#[napi]
pub fn run_projection(input_json: String, today: Option<String>) -> NapiResult<String> {
    let input: ProjectionInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let today = match today {
        Some(s) => NaiveDate::parse_from_str(&s, "%Y-%m-%d").map_err(to_napi_error)?,
        None => Utc::now().date_naive(),
    };
    let output = bizplan_core::projection::run_projection(&input, today).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Statements
// ---------------------------------------------------------------------------

#[napi]
pub fn build_statement(input_json: String) -> NapiResult<String> {
    let input: StatementInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = bizplan_core::statement::build_statement(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn build_yearly_report(input_json: String) -> NapiResult<String> {
    let input: YearlyInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = bizplan_core::aggregate::build_yearly_report(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ActualSalesEdit {
    records: Vec<PeriodRecord>,
    period: String,
    channel: String,
    actual_sales: Decimal,
}

/// Override one channel's actual sales; returns the updated record array.
#[napi]
pub fn apply_actual_sales(input_json: String) -> NapiResult<String> {
    let edit: ActualSalesEdit = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let records = bizplan_core::channels::apply_actual_sales(
        &edit.records,
        &edit.period,
        &edit.channel,
        edit.actual_sales,
    )
    .map_err(to_napi_error)?;
    serde_json::to_string(&records).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Planning
// ---------------------------------------------------------------------------

#[napi]
pub fn run_plan(input_json: String) -> NapiResult<String> {
    let input: PlanInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = bizplan_core::plan::run_plan(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// History
// ---------------------------------------------------------------------------

#[napi]
pub fn generate_sample_history(seed: Option<i64>) -> NapiResult<String> {
    let records = bizplan_core::history::generate_sample_history(&mut rng_from(seed));
    serde_json::to_string(&records).map_err(to_napi_error)
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct HistoryInput {
    #[serde(default)]
    records: Vec<RawHistoryRecord>,
    #[serde(default)]
    config: LoaderConfig,
    seed: Option<i64>,
}

/// Normalize fetched rows without any fallback.
#[napi]
pub fn normalize_history_records(input_json: String) -> NapiResult<String> {
    let input: HistoryInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let (records, warnings) = normalize_history(&input.records, input.config.through.as_deref());
    serde_json::to_string(&serde_json::json!({ "records": records, "warnings": warnings }))
        .map_err(to_napi_error)
}

/// Fetched rows resolved against the loader policy, falling back to sample data.
#[napi]
pub fn resolve_history_records(input_json: String) -> NapiResult<String> {
    let input: HistoryInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let loaded = resolve_history(Ok(input.records), &input.config, &mut rng_from(input.seed));
    serde_json::to_string(&loaded).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Drill-down
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct OpenCell {
    year: String,
    kind: DrillKind,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DrilldownInput {
    records: Vec<SummaryPeriodRecord>,
    #[serde(default)]
    assumptions: Option<StatementAssumptions>,
    #[serde(default)]
    expanded: Vec<OpenCell>,
    #[serde(default)]
    expand_all: bool,
}

/// Detail rows for the requested open cells of the yearly table.
#[napi]
pub fn drilldown_details(input_json: String) -> NapiResult<String> {
    let input: DrilldownInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let assumptions = input.assumptions.unwrap_or_default();
    assumptions.validate().map_err(to_napi_error)?;
    let table = aggregate_by_year_with(&input.records, &assumptions);

    let mut state = DrilldownState::new();
    if input.expand_all {
        state.expand_all(&table);
    }
    for cell in &input.expanded {
        if !state.is_expanded(&cell.year, cell.kind) {
            state.toggle(&cell.year, cell.kind);
        }
    }
    serde_json::to_string(&visible_details(&state, &table, &assumptions)).map_err(to_napi_error)
}
