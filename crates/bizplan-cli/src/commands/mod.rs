pub mod analysis;
pub mod history;
pub mod plan;
pub mod projection;
pub mod simulations;
pub mod statement;

use bizplan_core::statement::StatementAssumptions;
use std::future::Future;

use crate::input;

/// Default location of the saved-simulation document.
pub const DEFAULT_STORE: &str = "bizplan-simulations.json";

/// Run an async command body on a fresh runtime.
pub fn block_on<F: Future>(fut: F) -> Result<F::Output, Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Builder::new_multi_thread().enable_all().build()?;
    Ok(rt.block_on(fut))
}

/// Ratio policy from `--assumptions`, when given.
pub fn read_assumptions(path: Option<&str>) -> Result<Option<StatementAssumptions>, Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            let a: StatementAssumptions = input::file::read_json(p)?;
            a.validate()?;
            Ok(Some(a))
        }
        None => Ok(None),
    }
}
