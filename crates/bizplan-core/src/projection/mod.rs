//! Monthly metric projection: scenario multipliers, compounded growth and
//! the profit / profitability series derived from them.

pub mod derived;
pub mod scenario;
pub mod simulation;

pub use derived::{profit_series, profitability, profitability_series};
pub use scenario::{compute_series, try_compute_series, ScenarioTag};
pub use simulation::{run_projection, MetricSpec, ProjectionInput, ProjectionOutput, MAX_PROJECTION_YEARS};
