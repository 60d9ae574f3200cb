use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::Bound;

use crate::periods::year_key;
use crate::statement::{LineItem, PeriodRecord, StatementAssumptions, SummaryFigures, SummaryPeriodRecord};
use crate::types::{Money, Percent};

use super::yoy::yoy_change;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Channel sub-totals for one year. `actual_sales` is already resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelTotals {
    pub name: String,
    pub sales_tag: Money,
    pub actual_sales: Money,
    pub shipment_price: Money,
}

/// Sum of every summary record sharing one year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YearlyAggregate {
    pub year: String,
    /// Number of period records folded into this year
    pub period_count: usize,
    #[serde(flatten)]
    pub figures: SummaryFigures,
    /// In order of first appearance
    pub channels: Vec<ChannelTotals>,
}

impl YearlyAggregate {
    fn empty(year: &str) -> Self {
        Self {
            year: year.to_string(),
            period_count: 0,
            figures: SummaryFigures::default(),
            channels: Vec::new(),
        }
    }

    pub fn has_channels(&self) -> bool {
        !self.channels.is_empty()
    }

    pub fn channel(&self, name: &str) -> Option<&ChannelTotals> {
        self.channels.iter().find(|c| c.name == name)
    }

    fn absorb(&mut self, record: &SummaryPeriodRecord, a: &StatementAssumptions) {
        self.period_count += 1;
        self.figures += &record.figures;

        for ch in record.channels.iter().flatten() {
            let actual = ch
                .actual_sales
                .unwrap_or(ch.sales_tag * a.default_actual_sales_ratio);
            match self.channels.iter_mut().find(|c| c.name == ch.name) {
                Some(existing) => {
                    existing.sales_tag += ch.sales_tag;
                    existing.actual_sales += actual;
                    existing.shipment_price += ch.shipment_price;
                }
                None => self.channels.push(ChannelTotals {
                    name: ch.name.clone(),
                    sales_tag: ch.sales_tag,
                    actual_sales: actual,
                    shipment_price: ch.shipment_price,
                }),
            }
        }
    }
}

/// Yearly roll-up keyed by year, iterating in ascending order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct YearlyTable {
    pub years: BTreeMap<String, YearlyAggregate>,
}

impl YearlyTable {
    pub fn year_keys(&self) -> impl Iterator<Item = &str> {
        self.years.keys().map(|k| k.as_str())
    }

    pub fn get(&self, year: &str) -> Option<&YearlyAggregate> {
        self.years.get(year)
    }

    /// The aggregate immediately preceding `year` in the table.
    pub fn previous(&self, year: &str) -> Option<&YearlyAggregate> {
        self.years
            .range::<str, _>((Bound::Unbounded, Bound::Excluded(year)))
            .next_back()
            .map(|(_, agg)| agg)
    }

    /// Year-over-year change of one line item, `None` for the first year or
    /// a zero prior value.
    pub fn yoy(&self, year: &str, item: LineItem) -> Option<Percent> {
        let current = self.get(year)?;
        let prev = self.previous(year).map(|p| p.figures.get(item));
        yoy_change(current.figures.get(item), prev)
    }

    /// Union of channel names across all years, in order of first appearance.
    pub fn channel_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for agg in self.years.values() {
            for ch in &agg.channels {
                if !names.contains(&ch.name) {
                    names.push(ch.name.clone());
                }
            }
        }
        names
    }

    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// Roll summary records up by year with the standard ratio policy.
pub fn aggregate_by_year(records: &[SummaryPeriodRecord]) -> YearlyTable {
    aggregate_by_year_with(records, &StatementAssumptions::default())
}

/// Roll summary records up by year.
///
/// Records are folded in ascending period order regardless of input order, so
/// the Decimal sums are reproducible. A channel missing `actual_sales` counts
/// as `sales_tag * default_actual_sales_ratio`, resolved once while merging.
pub fn aggregate_by_year_with(records: &[SummaryPeriodRecord], a: &StatementAssumptions) -> YearlyTable {
    let mut ordered: Vec<&SummaryPeriodRecord> = records.iter().collect();
    ordered.sort_by(|x, y| x.period.cmp(&y.period));

    let mut years: BTreeMap<String, YearlyAggregate> = BTreeMap::new();
    for record in ordered {
        let year = year_key(&record.period);
        years
            .entry(year.to_string())
            .or_insert_with(|| YearlyAggregate::empty(year))
            .absorb(record, a);
    }

    log::debug!("aggregated {} records into {} years", records.len(), years.len());
    YearlyTable { years }
}

/// Historical records followed by planned ones. A planned record replaces a
/// historical record for the same period.
pub fn combine_records(historical: &[PeriodRecord], planned: &[PeriodRecord]) -> Vec<PeriodRecord> {
    let mut combined: Vec<PeriodRecord> = historical
        .iter()
        .filter(|h| !planned.iter().any(|p| p.period == h.period))
        .cloned()
        .collect();
    combined.extend(planned.iter().cloned());
    combined.sort_by(|x, y| x.period.cmp(&y.period));
    combined
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channels::allocate;
    use crate::statement::{derive_summary, SummaryChannel};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn summary(period: &str, revenue: Decimal, cost: Decimal) -> SummaryPeriodRecord {
        derive_summary(&PeriodRecord::new(period, revenue, cost, Some(dec!(10)), Some(allocate(revenue))))
    }

    #[test]
    fn test_groups_by_year_prefix() {
        let records = vec![
            summary("2024-01", dec!(100), dec!(60)),
            summary("2024-02", dec!(200), dec!(120)),
            summary("2025-01", dec!(300), dec!(180)),
        ];
        let table = aggregate_by_year(&records);
        let keys: Vec<&str> = table.year_keys().collect();
        assert_eq!(keys, vec!["2024", "2025"]);
        assert_eq!(table.get("2024").unwrap().period_count, 2);
        assert_eq!(table.get("2024").unwrap().figures.ending_inventory, dec!(20));
    }

    #[test]
    fn test_operating_profit_is_additive() {
        let records: Vec<SummaryPeriodRecord> = (1..=12)
            .map(|m| summary(&format!("2026-{m:02}"), Decimal::from(1000 + m * 37), Decimal::from(700 + m * 11)))
            .collect();
        let table = aggregate_by_year(&records);
        let expected: Decimal = records.iter().map(|r| r.figures.operating_profit).sum();
        let got = table.get("2026").unwrap().figures.operating_profit;
        assert!((got - expected).abs() < dec!(0.0000001), "{got} vs {expected}");
    }

    #[test]
    fn test_input_order_does_not_matter() {
        let a = summary("2026-01", dec!(1000), dec!(333));
        let b = summary("2026-02", dec!(777), dec!(123));
        let forward = aggregate_by_year(&[a.clone(), b.clone()]);
        let backward = aggregate_by_year(&[b, a]);
        assert_eq!(forward, backward);
    }

    #[test]
    fn test_year_only_period_keys() {
        let table = aggregate_by_year(&[summary("2023", dec!(10), dec!(5))]);
        assert!(table.get("2023").is_some());
    }

    #[test]
    fn test_channel_merge_defaults_missing_actual_sales() {
        let mut rec = summary("2026-01", dec!(0), dec!(0));
        rec.channels = Some(vec![SummaryChannel {
            name: "기타".into(),
            sales_tag: dec!(100),
            actual_sales: None,
            shipment_price: dec!(50),
        }]);
        let mut rec2 = rec.clone();
        rec2.period = "2026-02".into();
        rec2.channels = Some(vec![SummaryChannel {
            name: "기타".into(),
            sales_tag: dec!(10),
            actual_sales: Some(dec!(7)),
            shipment_price: dec!(5),
        }]);

        let table = aggregate_by_year(&[rec, rec2]);
        let ch = table.get("2026").unwrap().channel("기타").unwrap();
        assert_eq!(ch.sales_tag, dec!(110));
        assert_eq!(ch.actual_sales, dec!(97));
        assert_eq!(ch.shipment_price, dec!(55));
    }

    #[test]
    fn test_yoy_and_previous() {
        let records = vec![
            summary("2024-01", dec!(1000), dec!(600)),
            summary("2025-01", dec!(1500), dec!(600)),
        ];
        let table = aggregate_by_year(&records);
        assert_eq!(table.yoy("2024", LineItem::PurchaseOrder), None);
        assert_eq!(table.yoy("2025", LineItem::PurchaseOrder), Some(dec!(50)));
        assert_eq!(table.previous("2025").unwrap().year, "2024");
        assert!(table.previous("2024").is_none());
    }

    #[test]
    fn test_previous_skips_missing_years() {
        let records = vec![
            summary("2022-03", dec!(100), dec!(50)),
            summary("2024-03", dec!(300), dec!(50)),
            summary("2025-03", dec!(600), dec!(50)),
        ];
        let table = aggregate_by_year(&records);
        assert_eq!(table.previous("2024").unwrap().year, "2022");
        assert_eq!(table.previous("2023").unwrap().year, "2022");
        assert_eq!(table.previous("2030").unwrap().year, "2025");
        assert!(table.previous("2022").is_none());
        assert_eq!(table.yoy("2024", LineItem::PurchaseOrder), Some(dec!(200)));
    }

    #[test]
    fn test_channel_names_union() {
        let table = aggregate_by_year(&[summary("2024-01", dec!(100), dec!(1))]);
        assert_eq!(table.channel_names().len(), 7);
        assert!(aggregate_by_year(&[]).is_empty());
    }

    #[test]
    fn test_combine_prefers_planned_records() {
        let hist = vec![
            PeriodRecord::new("2025-10", dec!(1), dec!(1), None, None),
            PeriodRecord::new("2025-11", dec!(2), dec!(1), None, None),
        ];
        let plan = vec![PeriodRecord::new("2025-11", dec!(9), dec!(1), None, None)];
        let combined = combine_records(&hist, &plan);
        assert_eq!(combined.len(), 2);
        assert_eq!(combined[1].revenue, dec!(9));
    }
}
