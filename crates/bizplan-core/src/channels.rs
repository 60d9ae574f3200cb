//! The seven fixed sales channels, their revenue split, and user overrides of
//! realised (actual) sales per channel.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::BizPlanError;
use crate::statement::PeriodRecord;
use crate::types::{round_currency, Money, Rate};
use crate::BizPlanResult;

/// Canonical sales channels, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Channel {
    #[serde(rename = "백화점")]
    DepartmentStore,
    #[serde(rename = "면세점")]
    DutyFree,
    #[serde(rename = "직영(가두)")]
    DirectStreet,
    #[serde(rename = "온라인(직)")]
    OnlineDirect,
    #[serde(rename = "온라인(제휴)")]
    OnlinePartner,
    #[serde(rename = "아웃렛(직)")]
    OutletDirect,
    #[serde(rename = "기타")]
    Other,
}

impl Channel {
    pub const ALL: [Channel; 7] = [
        Channel::DepartmentStore,
        Channel::DutyFree,
        Channel::DirectStreet,
        Channel::OnlineDirect,
        Channel::OnlinePartner,
        Channel::OutletDirect,
        Channel::Other,
    ];

    /// Name used in records and reports.
    pub fn label(self) -> &'static str {
        match self {
            Channel::DepartmentStore => "백화점",
            Channel::DutyFree => "면세점",
            Channel::DirectStreet => "직영(가두)",
            Channel::OnlineDirect => "온라인(직)",
            Channel::OnlinePartner => "온라인(제휴)",
            Channel::OutletDirect => "아웃렛(직)",
            Channel::Other => "기타",
        }
    }

    /// Share of total revenue. The seven shares sum to exactly 1.
    pub fn ratio(self) -> Rate {
        match self {
            Channel::DepartmentStore => dec!(0.05),
            Channel::DutyFree => dec!(0.08),
            Channel::DirectStreet => dec!(0.15),
            Channel::OnlineDirect => dec!(0.35),
            Channel::OnlinePartner => dec!(0.25),
            Channel::OutletDirect => dec!(0.10),
            Channel::Other => dec!(0.02),
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Channel {
    type Err = BizPlanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Channel::ALL
            .into_iter()
            .find(|c| c.label() == s.trim())
            .ok_or_else(|| BizPlanError::InvalidInput {
                field: "channel".into(),
                reason: format!("Unknown channel '{s}'"),
            })
    }
}

/// Revenue attributed to one channel within one period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelRecord {
    pub name: String,
    pub revenue: Money,
    /// User-entered realised sales; derivation falls back to `revenue`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_sales: Option<Money>,
}

impl ChannelRecord {
    pub fn new(channel: Channel, revenue: Money) -> Self {
        Self {
            name: channel.label().to_string(),
            revenue,
            actual_sales: None,
        }
    }
}

/// Split `revenue` across all channels by the fixed ratio table, rounding each
/// share half up to whole currency units.
pub fn allocate(revenue: Money) -> Vec<ChannelRecord> {
    Channel::ALL
        .into_iter()
        .map(|channel| ChannelRecord::new(channel, round_currency(revenue * channel.ratio())))
        .collect()
}

/// Difference between `revenue` and the sum of its rounded channel shares.
pub fn allocation_drift(revenue: Money) -> Money {
    let allocated: Money = allocate(revenue).iter().map(|c| c.revenue).sum();
    revenue - allocated
}

/// Return a copy of `records` with one channel's actual sales overridden for
/// one period. Nothing is modified in place.
pub fn apply_actual_sales(
    records: &[PeriodRecord],
    period: &str,
    channel_name: &str,
    actual_sales: Money,
) -> BizPlanResult<Vec<PeriodRecord>> {
    if actual_sales < Decimal::ZERO {
        return Err(BizPlanError::InvalidInput {
            field: "actual_sales".into(),
            reason: format!("Actual sales must be non-negative, got {actual_sales}"),
        });
    }

    let idx = records
        .iter()
        .position(|r| r.period == period)
        .ok_or_else(|| BizPlanError::NotFound(format!("period '{period}'")))?;

    let channels = records[idx].channels.as_deref().unwrap_or(&[]);
    let ch_idx = channels
        .iter()
        .position(|c| c.name == channel_name)
        .ok_or_else(|| {
            BizPlanError::NotFound(format!("channel '{channel_name}' in period '{period}'"))
        })?;

    let mut updated = records.to_vec();
    if let Some(chs) = updated[idx].channels.as_mut() {
        chs[ch_idx].actual_sales = Some(actual_sales);
    }
    log::debug!("override {period}/{channel_name} actual sales -> {actual_sales}");
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ratios_sum_to_one() {
        let total: Rate = Channel::ALL.iter().map(|c| c.ratio()).sum();
        assert_eq!(total, Decimal::ONE);
    }

    #[test]
    fn test_allocate_one_million() {
        let channels = allocate(dec!(1_000_000));
        let revenues: Vec<Money> = channels.iter().map(|c| c.revenue).collect();
        assert_eq!(
            revenues,
            vec![
                dec!(50_000),
                dec!(80_000),
                dec!(150_000),
                dec!(350_000),
                dec!(250_000),
                dec!(100_000),
                dec!(20_000)
            ]
        );
        assert_eq!(allocation_drift(dec!(1_000_000)), Decimal::ZERO);
        assert_eq!(channels[3].name, "온라인(직)");
    }

    #[test]
    fn test_allocate_small_revenue_rounds_each_share() {
        // 0.05*30 = 1.5 -> 2, 0.08*30 = 2.4 -> 2, 0.15*30 = 4.5 -> 5, 0.35*30 = 10.5 -> 11,
        // 0.25*30 = 7.5 -> 8, 0.10*30 = 3, 0.02*30 = 0.6 -> 1
        let channels = allocate(dec!(30));
        let sum: Money = channels.iter().map(|c| c.revenue).sum();
        assert_eq!(sum, dec!(32));
        assert_eq!(allocation_drift(dec!(30)), dec!(-2));
    }

    #[test]
    fn test_channel_labels_round_trip() {
        for c in Channel::ALL {
            assert_eq!(c.label().parse::<Channel>().unwrap(), c);
        }
        assert!("편의점".parse::<Channel>().is_err());
        let json = serde_json::to_string(&Channel::DutyFree).unwrap();
        assert_eq!(json, "\"면세점\"");
    }

    fn record(period: &str) -> PeriodRecord {
        PeriodRecord::new(period, dec!(1000), dec!(600), None, Some(allocate(dec!(1000))))
    }

    #[test]
    fn test_apply_actual_sales_returns_new_records() {
        let records = vec![record("2026-01"), record("2026-02")];
        let updated = apply_actual_sales(&records, "2026-02", "면세점", dec!(75)).unwrap();
        assert_eq!(records[1].channels.as_ref().unwrap()[1].actual_sales, None);
        assert_eq!(updated[1].channels.as_ref().unwrap()[1].actual_sales, Some(dec!(75)));
        assert_eq!(updated[0], records[0]);
    }

    #[test]
    fn test_apply_actual_sales_errors() {
        let records = vec![record("2026-01")];
        assert!(matches!(
            apply_actual_sales(&records, "2030-01", "면세점", dec!(1)),
            Err(BizPlanError::NotFound(_))
        ));
        assert!(matches!(
            apply_actual_sales(&records, "2026-01", "편의점", dec!(1)),
            Err(BizPlanError::NotFound(_))
        ));
        assert!(matches!(
            apply_actual_sales(&records, "2026-01", "면세점", dec!(-1)),
            Err(BizPlanError::InvalidInput { .. })
        ));
    }
}
