use clap::Args;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::Value;

use bizplan_core::history::{load_history, InlineSource, JsonFileSource, LoadedHistory, LoaderConfig};

use crate::commands::block_on;

/// Arguments shared by commands that read historical actuals
#[derive(Args, Clone)]
pub struct HistorySourceArgs {
    /// JSON array of historical records; sample data is used when missing or stale
    #[arg(long)]
    pub file: Option<String>,

    /// Keep only periods up to and including this one (YYYY-MM)
    #[arg(long)]
    pub through: Option<String>,

    /// Seed for the sample dataset
    #[arg(long)]
    pub seed: Option<u64>,

    /// Per-attempt fetch timeout in milliseconds
    #[arg(long, default_value = "10000")]
    pub timeout_ms: u64,
}

impl HistorySourceArgs {
    pub fn config(&self) -> LoaderConfig {
        LoaderConfig {
            timeout_ms: self.timeout_ms,
            through: self.through.clone(),
            ..Default::default()
        }
    }

    pub async fn load(&self) -> LoadedHistory {
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let config = self.config();
        match &self.file {
            Some(path) => load_history(&JsonFileSource::new(path), &config, &mut rng).await,
            None => load_history(&InlineSource::default(), &config, &mut rng).await,
        }
    }
}

/// Arguments for loading historical actuals
#[derive(Args)]
pub struct HistoryArgs {
    #[command(flatten)]
    pub source: HistorySourceArgs,
}

pub fn run_history(args: HistoryArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let loaded = block_on(args.source.load())?;
    if loaded.origin.is_fallback() {
        log::warn!("historical source unusable; showing generated sample data");
    }
    Ok(serde_json::to_value(loaded)?)
}
