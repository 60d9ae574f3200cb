use clap::Args;
use serde::Serialize;
use serde_json::Value;

use bizplan_core::aggregate::{build_yearly_report, YearlyInput};
use bizplan_core::drilldown::{visible_details, DrillKind, DrilldownState, ExpandedCell};
use bizplan_core::statement::{build_statement, StatementInput};

use crate::commands::read_assumptions;
use crate::input;

/// Arguments for per-period summary income statements
#[derive(Args)]
pub struct StatementArgs {
    /// Path to JSON input file ({ "records": [...] } or a bare record array)
    #[arg(long)]
    pub input: Option<String>,

    /// Path to a JSON ratio policy overriding the defaults
    #[arg(long)]
    pub assumptions: Option<String>,
}

/// Arguments for the yearly statement with YoY and drill-down
#[derive(Args)]
pub struct YearlyArgs {
    /// Path to JSON input file ({ "records": [...], "planned": [...] })
    #[arg(long)]
    pub input: Option<String>,

    /// Path to a JSON ratio policy overriding the defaults
    #[arg(long)]
    pub assumptions: Option<String>,

    /// Expand every eligible drill-down cell
    #[arg(long)]
    pub expand_all: bool,

    /// Expand one cell, as YEAR:KIND (e.g. 2026:cogs); repeatable
    #[arg(long = "expand", value_name = "YEAR:KIND")]
    pub expand: Vec<String>,
}

fn parse_cell(spec: &str) -> Result<(String, DrillKind), Box<dyn std::error::Error>> {
    let (year, kind) = spec
        .split_once(':')
        .ok_or_else(|| format!("Expected YEAR:KIND, got '{spec}'"))?;
    let kind = DrillKind::ALL
        .into_iter()
        .find(|k| k.as_str().eq_ignore_ascii_case(kind.trim()))
        .ok_or_else(|| format!("Unknown drill-down kind '{kind}'"))?;
    Ok((year.trim().to_string(), kind))
}

pub fn run_statement(args: StatementArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let data: Value = if let Some(ref path) = args.input {
        input::file::read_json_value(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        data
    } else {
        return Err("--input <file.json> or stdin required for statement".into());
    };

    let mut statement_input: StatementInput = if data.is_array() {
        StatementInput {
            records: serde_json::from_value(data)?,
            assumptions: None,
        }
    } else {
        serde_json::from_value(data)?
    };
    if let Some(a) = read_assumptions(args.assumptions.as_deref())? {
        statement_input.assumptions = Some(a);
    }

    let result = build_statement(&statement_input)?;
    Ok(serde_json::to_value(result)?)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DrilldownView {
    expanded: Vec<ExpandedCell>,
}

pub fn run_yearly(args: YearlyArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut yearly_input: YearlyInput = input::read_input(args.input.as_deref(), "yearly")?;
    if let Some(a) = read_assumptions(args.assumptions.as_deref())? {
        yearly_input.assumptions = Some(a);
    }

    let output = build_yearly_report(&yearly_input)?;

    let mut state = DrilldownState::new();
    if args.expand_all {
        state.expand_all(&output.result.table);
    }
    for spec in &args.expand {
        let (year, kind) = parse_cell(spec)?;
        if !state.is_expanded(&year, kind) {
            state.toggle(&year, kind);
        }
    }

    let mut value = serde_json::to_value(&output)?;
    if !state.is_empty() {
        let assumptions = yearly_input.assumptions.unwrap_or_default();
        let view = DrilldownView {
            expanded: visible_details(&state, &output.result.table, &assumptions),
        };
        if let Some(result) = value.get_mut("result").and_then(Value::as_object_mut) {
            result.insert("drilldown".into(), serde_json::to_value(view)?);
        }
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cell() {
        let (year, kind) = parse_cell("2026:directCosts").unwrap();
        assert_eq!(year, "2026");
        assert_eq!(kind, DrillKind::DirectCosts);
        assert!(parse_cell("2026").is_err());
        assert!(parse_cell("2026:bogus").is_err());
    }
}
