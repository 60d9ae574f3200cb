use clap::Args;
use serde_json::Value;

use bizplan_core::persistence::{JsonFileStore, SimulationStore};
use bizplan_core::plan::{run_plan, PlanInput};

use crate::commands::{read_assumptions, DEFAULT_STORE};
use crate::input;

/// Arguments for building planned records over the planning horizon
#[derive(Args)]
pub struct PlanArgs {
    /// Path to JSON input file with per-period entries
    #[arg(long)]
    pub input: Option<String>,

    /// Path to a JSON ratio policy overriding the defaults
    #[arg(long)]
    pub assumptions: Option<String>,

    /// Save the resulting statement under this name
    #[arg(long)]
    pub save: Option<String>,

    /// Saved-simulation document
    #[arg(long, default_value = DEFAULT_STORE)]
    pub store: String,
}

pub fn run_plan_cmd(args: PlanArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut plan_input: PlanInput = input::read_input(args.input.as_deref(), "plan")?;
    if let Some(a) = read_assumptions(args.assumptions.as_deref())? {
        plan_input.statement_assumptions = Some(a);
    }

    let output = run_plan(&plan_input)?;
    let mut value = serde_json::to_value(&output)?;

    if let Some(ref name) = args.save {
        let mut store = JsonFileStore::new(&args.store);
        let saved = store.save(name, output.result.statement.clone())?;
        log::info!("saved simulation {} as '{}'", saved.id, saved.name);
        if let Some(result) = value.get_mut("result").and_then(Value::as_object_mut) {
            result.insert("savedId".into(), Value::String(saved.id));
        }
    }
    Ok(value)
}
