pub mod error;
pub mod types;

pub mod periods;
pub mod projection;
pub mod channels;
pub mod statement;
pub mod aggregate;
pub mod drilldown;
pub mod plan;

#[cfg(feature = "history")]
pub mod history;

#[cfg(feature = "persistence")]
pub mod persistence;

#[cfg(feature = "analysis")]
pub mod analysis;

pub use error::BizPlanError;
pub use types::*;

/// Standard result type for all bizplan operations
pub type BizPlanResult<T> = Result<T, BizPlanError>;
