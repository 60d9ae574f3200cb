use clap::{Args, Subcommand};
use serde::Serialize;
use serde_json::{json, Value};
use std::time::Duration;

use bizplan_core::analysis::{comparison_prompt, run_analysis, simulation_year_totals, AnalysisConfig, OpenAiSummarizer};
use bizplan_core::persistence::{JsonFileStore, SavedSimulation, SimulationStore};
use bizplan_core::plan::{run_plan, PlanInput};
use bizplan_core::statement::SummaryPeriodRecord;

use crate::commands::{block_on, DEFAULT_STORE};
use crate::input;

/// Arguments for managing saved simulations
#[derive(Args)]
pub struct SimulationsArgs {
    /// Saved-simulation document
    #[arg(long, default_value = DEFAULT_STORE)]
    pub store: String,

    #[command(subcommand)]
    pub action: SimulationAction,
}

#[derive(Subcommand)]
pub enum SimulationAction {
    /// List saved simulations
    List {
        /// Include the full statement data
        #[arg(long)]
        full: bool,
    },
    /// Save a statement (record array) or a plan input under a name
    Save {
        /// Simulation name
        #[arg(long)]
        name: String,

        /// Path to JSON input file
        #[arg(long)]
        input: Option<String>,
    },
    /// Delete a saved simulation by id
    Delete {
        /// Simulation id (sim-<millis>)
        id: String,
    },
}

/// Arguments for comparing saved simulations
#[derive(Args)]
pub struct CompareArgs {
    /// Saved-simulation document
    #[arg(long, default_value = DEFAULT_STORE)]
    pub store: String,

    /// Simulation id to include; repeat for each (at least two)
    #[arg(long = "id", required = true)]
    pub ids: Vec<String>,

    /// Years to compare
    #[arg(long, value_delimiter = ',', default_value = "2026,2027")]
    pub years: Vec<String>,

    /// Model name
    #[arg(long)]
    pub model: Option<String>,

    /// Print the prompt instead of calling the service
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SimulationListing {
    id: String,
    name: String,
    created_at: String,
    periods: usize,
}

impl From<&SavedSimulation> for SimulationListing {
    fn from(sim: &SavedSimulation) -> Self {
        Self {
            id: sim.id.clone(),
            name: sim.name.clone(),
            created_at: sim.created_at.to_rfc3339(),
            periods: sim.data.len(),
        }
    }
}

fn read_statement(path: Option<&str>) -> Result<Vec<SummaryPeriodRecord>, Box<dyn std::error::Error>> {
    let data: Value = input::read_input(path, "simulations save")?;
    if data.is_array() {
        return Ok(serde_json::from_value(data)?);
    }
    let plan: PlanInput = serde_json::from_value(data)?;
    Ok(run_plan(&plan)?.result.statement)
}

pub fn run_simulations(args: SimulationsArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut store = JsonFileStore::new(&args.store);
    match args.action {
        SimulationAction::List { full } => {
            let sims = store.list()?;
            if full {
                Ok(serde_json::to_value(sims)?)
            } else {
                let listing: Vec<SimulationListing> = sims.iter().map(SimulationListing::from).collect();
                Ok(serde_json::to_value(listing)?)
            }
        }
        SimulationAction::Save { name, input } => {
            let data = read_statement(input.as_deref())?;
            let saved = store.save(&name, data)?;
            Ok(serde_json::to_value(SimulationListing::from(&saved))?)
        }
        SimulationAction::Delete { id } => {
            store.delete(&id)?;
            Ok(json!({ "deleted": id }))
        }
    }
}

pub fn run_compare(args: CompareArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let store = JsonFileStore::new(&args.store);
    let sims = store.select(&args.ids)?;
    let prompt = comparison_prompt(&sims, &args.years)?;

    let totals: Vec<Value> = sims
        .iter()
        .map(|sim| {
            let years: Vec<_> = args.years.iter().map(|y| simulation_year_totals(sim, y)).collect();
            json!({ "name": sim.name, "years": years })
        })
        .collect();

    if args.dry_run {
        return Ok(json!({ "totals": totals, "prompt": prompt }));
    }

    let mut config = AnalysisConfig::from_env();
    if let Some(model) = args.model {
        config.model = model;
    }
    let timeout = Duration::from_secs(config.timeout_secs);
    let retries = config.retries;
    let summarizer = OpenAiSummarizer::new(config)?;

    let outcome = block_on(async move { run_analysis(&summarizer, &prompt, timeout, retries).await })?;
    Ok(json!({ "totals": totals, "result": outcome }))
}
