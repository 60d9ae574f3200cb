use chrono::NaiveDate;
use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use bizplan_core::projection::{run_projection, MetricSpec, ProjectionInput, ScenarioTag};

use crate::input;

/// Arguments for a free-form revenue / cost / inventory projection
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct ProjectArgs {
    /// Monthly revenue baseline
    #[arg(long)]
    pub revenue: Option<Decimal>,

    /// Annual revenue growth in percent (12 = 12%)
    #[arg(long)]
    pub revenue_growth: Option<Decimal>,

    /// Monthly cost baseline
    #[arg(long)]
    pub cost: Option<Decimal>,

    /// Annual cost growth in percent
    #[arg(long)]
    pub cost_growth: Option<Decimal>,

    /// Monthly inventory baseline
    #[arg(long)]
    pub inventory: Option<Decimal>,

    /// Annual inventory growth in percent
    #[arg(long)]
    pub inventory_growth: Option<Decimal>,

    /// Scenario applied to every metric (conservative, neutral, aggressive)
    #[arg(long)]
    pub scenario: Option<ScenarioTag>,

    /// Projection horizon in years
    #[arg(long, default_value = "1")]
    pub years: u32,

    /// Reference date; the projection starts the following month (default: today)
    #[arg(long)]
    pub today: Option<NaiveDate>,

    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

fn metric(base: Option<Decimal>, growth: Option<Decimal>, scenario: Option<ScenarioTag>) -> Option<MetricSpec> {
    base.map(|base_value| MetricSpec {
        base_value,
        growth_rate: growth,
        scenario,
    })
}

pub fn run_project(args: ProjectArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let projection_input: ProjectionInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        if args.revenue.is_none() && args.cost.is_none() && args.inventory.is_none() {
            return Err("--revenue, --cost or --inventory is required (or provide --input)".into());
        }
        ProjectionInput {
            revenue: metric(args.revenue, args.revenue_growth, args.scenario),
            cost: metric(args.cost, args.cost_growth, args.scenario),
            inventory: metric(args.inventory, args.inventory_growth, args.scenario),
            years: args.years,
        }
    };

    let today = args.today.unwrap_or_else(|| chrono::Local::now().date_naive());
    let result = run_projection(&projection_input, today)?;
    Ok(serde_json::to_value(result)?)
}
