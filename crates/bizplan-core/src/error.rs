use thiserror::Error;

#[derive(Debug, Error)]
pub enum BizPlanError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Division by zero in {context}")]
    DivisionByZero { context: String },

    #[error("Date error: {0}")]
    DateError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Data source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("Timed out after {millis}ms waiting for {operation}")]
    Timeout { operation: String, millis: u64 },

    #[error("External service error: {0}")]
    ExternalService(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for BizPlanError {
    fn from(e: serde_json::Error) -> Self {
        BizPlanError::SerializationError(e.to_string())
    }
}

impl From<std::io::Error> for BizPlanError {
    fn from(e: std::io::Error) -> Self {
        BizPlanError::Io(e.to_string())
    }
}
