use async_trait::async_trait;
use std::path::PathBuf;

use crate::error::BizPlanError;
use crate::history::record::RawHistoryRecord;
use crate::BizPlanResult;

/// Somewhere historical records can be fetched from.
#[async_trait]
pub trait HistorySource: Send + Sync {
    /// Short human-readable name for logs.
    fn describe(&self) -> String;

    async fn fetch(&self) -> BizPlanResult<Vec<RawHistoryRecord>>;
}

/// A JSON array of records on disk.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl HistorySource for JsonFileSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    async fn fetch(&self) -> BizPlanResult<Vec<RawHistoryRecord>> {
        let contents = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| BizPlanError::SourceUnavailable(format!("{}: {e}", self.path.display())))?;
        Ok(serde_json::from_str(&contents)?)
    }
}

/// Records already in memory, e.g. handed over by a host application.
#[derive(Debug, Clone, Default)]
pub struct InlineSource {
    records: Vec<RawHistoryRecord>,
}

impl InlineSource {
    pub fn new(records: Vec<RawHistoryRecord>) -> Self {
        Self { records }
    }
}

#[async_trait]
impl HistorySource for InlineSource {
    fn describe(&self) -> String {
        format!("inline ({} records)", self.records.len())
    }

    async fn fetch(&self) -> BizPlanResult<Vec<RawHistoryRecord>> {
        Ok(self.records.clone())
    }
}
