//! Summary income statement: record shapes, ratio policy and derivation.

pub mod assumptions;
pub mod derive;
pub mod record;

pub use assumptions::StatementAssumptions;
pub use derive::{build_statement, derive_summaries, derive_summary, derive_summary_with, StatementInput};
pub use record::{LineItem, PeriodRecord, SummaryChannel, SummaryFigures, SummaryPeriodRecord};
