use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::channels::{allocate, ChannelRecord};
use crate::statement::PeriodRecord;
use crate::types::Money;

/// One record as found in a historical data file. Keys may be lower- or
/// upper-case; this is the only place that distinction exists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawHistoryRecord {
    #[serde(default, alias = "PERIOD")]
    pub period: Option<String>,
    #[serde(default, alias = "REVENUE")]
    pub revenue: Option<Money>,
    #[serde(default, alias = "COST")]
    pub cost: Option<Money>,
    #[serde(default, alias = "INVENTORY")]
    pub inventory: Option<Money>,
    #[serde(default, alias = "CHANNELS")]
    pub channels: Option<Vec<ChannelRecord>>,
}

impl RawHistoryRecord {
    /// Trimmed period, `None` when missing or blank.
    pub fn period(&self) -> Option<&str> {
        self.period.as_deref().map(str::trim).filter(|p| !p.is_empty())
    }

    /// Canonical record. Missing revenue or cost is 0; channels are synthesised
    /// from the ratio table when absent and revenue is non-zero.
    pub fn normalize(&self) -> Option<PeriodRecord> {
        let period = self.period()?;
        let revenue = self.revenue.unwrap_or(Decimal::ZERO);
        let cost = self.cost.unwrap_or(Decimal::ZERO);

        let channels = match self.channels.as_ref().filter(|chs| !chs.is_empty()) {
            Some(chs) => Some(chs.clone()),
            None if !revenue.is_zero() => Some(allocate(revenue)),
            None => None,
        };

        Some(PeriodRecord::new(period, revenue, cost, self.inventory, channels))
    }
}

/// Normalise a batch, dropping records without a period and, when `through`
/// is set, any period after it. Returns the records and per-record warnings.
pub fn normalize_history(raw: &[RawHistoryRecord], through: Option<&str>) -> (Vec<PeriodRecord>, Vec<String>) {
    let mut warnings = Vec::new();
    let mut records = Vec::with_capacity(raw.len());

    for (idx, r) in raw.iter().enumerate() {
        match r.normalize() {
            Some(rec) if through.map_or(true, |t| rec.period.as_str() <= t) => records.push(rec),
            Some(_) => {}
            None => warnings.push(format!("Record #{idx} has no period and was skipped")),
        }
    }

    if !warnings.is_empty() {
        log::warn!("{} historical records skipped", warnings.len());
    }
    (records, warnings)
}
