use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::BizPlanError;
use crate::history::record::{normalize_history, RawHistoryRecord};
use crate::history::sample::generate_sample_history;
use crate::history::source::HistorySource;
use crate::periods::year_of;
use crate::statement::PeriodRecord;
use crate::BizPlanResult;

/// Loader tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LoaderConfig {
    /// Per-attempt fetch timeout
    pub timeout_ms: u64,
    /// Extra attempts after the first failure
    pub retries: u32,
    /// A source with no record in this year or later is treated as stale
    pub threshold_year: i32,
    /// Keep only periods `<= through`
    pub through: Option<String>,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 10_000,
            retries: 1,
            threshold_year: 2023,
            through: None,
        }
    }
}

impl LoaderConfig {
    /// Analysis view: actuals only, through October 2025.
    pub fn actuals_only() -> Self {
        Self {
            through: Some("2025-10".into()),
            ..Default::default()
        }
    }
}

/// Where the loaded records came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum HistoryOrigin {
    Source,
    Fallback { reason: String },
}

impl HistoryOrigin {
    pub fn is_fallback(&self) -> bool {
        matches!(self, HistoryOrigin::Fallback { .. })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadedHistory {
    pub records: Vec<PeriodRecord>,
    pub origin: HistoryOrigin,
    pub warnings: Vec<String>,
}

/// Why `fetched` cannot be used, or `None` when it can.
fn fallback_reason(fetched: &BizPlanResult<Vec<RawHistoryRecord>>, threshold_year: i32) -> Option<String> {
    match fetched {
        Err(e) => Some(format!("source failed: {e}")),
        Ok(raw) if raw.is_empty() => Some("source returned no records".into()),
        Ok(raw) => {
            let recent = raw
                .iter()
                .filter_map(|r| r.period().and_then(year_of))
                .any(|y| y >= threshold_year);
            (!recent).then(|| format!("no record dated {threshold_year} or later"))
        }
    }
}

/// Turn a fetch outcome into usable records, substituting the generated
/// sample dataset when the source failed, was empty, or is stale.
pub fn resolve_history<R: Rng + ?Sized>(
    fetched: BizPlanResult<Vec<RawHistoryRecord>>,
    config: &LoaderConfig,
    rng: &mut R,
) -> LoadedHistory {
    let through = config.through.as_deref();

    if let Some(reason) = fallback_reason(&fetched, config.threshold_year) {
        log::warn!("using sample history: {reason}");
        let records = generate_sample_history(rng)
            .into_iter()
            .filter(|r| through.map_or(true, |t| r.period.as_str() <= t))
            .collect();
        return LoadedHistory {
            records,
            origin: HistoryOrigin::Fallback { reason },
            warnings: Vec::new(),
        };
    }

    let raw = fetched.unwrap_or_default();
    let (records, warnings) = normalize_history(&raw, through);
    log::info!("loaded {} historical records", records.len());
    LoadedHistory {
        records,
        origin: HistoryOrigin::Source,
        warnings,
    }
}

/// Fetch with a bounded timeout and retries, then resolve.
pub async fn fetch_with_retry(source: &dyn HistorySource, config: &LoaderConfig) -> BizPlanResult<Vec<RawHistoryRecord>> {
    let limit = Duration::from_millis(config.timeout_ms);
    let attempts = config.retries + 1;
    let mut last_err = BizPlanError::SourceUnavailable(source.describe());

    for attempt in 1..=attempts {
        match tokio::time::timeout(limit, source.fetch()).await {
            Ok(Ok(records)) => return Ok(records),
            Ok(Err(e)) => last_err = e,
            Err(_) => {
                last_err = BizPlanError::Timeout {
                    operation: format!("history fetch from {}", source.describe()),
                    millis: config.timeout_ms,
                }
            }
        }
        log::warn!("history fetch attempt {attempt}/{attempts} failed: {last_err}");
    }
    Err(last_err)
}

/// Load historical records from `source`, never failing: any problem falls back
/// to the generated sample dataset and is reported through `origin`.
pub async fn load_history<R: Rng + ?Sized>(
    source: &dyn HistorySource,
    config: &LoaderConfig,
    rng: &mut R,
) -> LoadedHistory {
    let fetched = fetch_with_retry(source, config).await;
    resolve_history(fetched, config, rng)
}
