//! Historical actuals: raw-record normalisation, pluggable sources, and a
//! loader that falls back to a generated sample dataset.

pub mod loader;
pub mod record;
pub mod sample;
pub mod source;

pub use loader::{fetch_with_retry, load_history, resolve_history, HistoryOrigin, LoadedHistory, LoaderConfig};
pub use record::{normalize_history, RawHistoryRecord};
pub use sample::{generate_sample_history, sample_base_revenue};
pub use source::{HistorySource, InlineSource, JsonFileSource};
