use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Instant;

use crate::periods::year_key;
use crate::projection::profitability;
use crate::statement::{derive_summaries, LineItem, PeriodRecord, StatementAssumptions};
use crate::types::{with_metadata, ComputationOutput, Money, Percent};
use crate::BizPlanResult;

use super::yearly::{aggregate_by_year_with, combine_records, YearlyTable};
use super::yoy::{absolute_change, is_favourable};

// ---------------------------------------------------------------------------
// Revenue / cost / profit comparison
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YearComparison {
    pub year: String,
    pub revenue: Money,
    pub cost: Money,
    pub profit: Money,
    /// Recomputed from the yearly totals
    pub profitability: Percent,
}

/// Sum revenue and cost per year. Profitability is taken from the totals,
/// never averaged across periods.
pub fn compare_years(records: &[PeriodRecord]) -> Vec<YearComparison> {
    let mut totals: BTreeMap<&str, (Money, Money)> = BTreeMap::new();
    for r in records {
        let entry = totals
            .entry(year_key(&r.period))
            .or_insert((Decimal::ZERO, Decimal::ZERO));
        entry.0 += r.revenue;
        entry.1 += r.cost;
    }

    totals
        .into_iter()
        .map(|(year, (revenue, cost))| {
            let profit = revenue - cost;
            YearComparison {
                year: year.to_string(),
                revenue,
                cost,
                profit,
                profitability: profitability(revenue, profit),
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Yearly statement view
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatementCell {
    pub year: String,
    pub value: Money,
    pub yoy: Option<Percent>,
    /// Signed change against the prior year
    pub change: Option<Money>,
    pub favourable: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatementRow {
    pub item: LineItem,
    pub label: String,
    pub cells: Vec<StatementCell>,
}

/// Every line item with its per-year value and YoY change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YearlyStatementView {
    pub years: Vec<String>,
    pub rows: Vec<StatementRow>,
}

pub fn statement_view(table: &YearlyTable) -> YearlyStatementView {
    let years: Vec<String> = table.year_keys().map(str::to_string).collect();
    let rows = LineItem::ALL
        .into_iter()
        .map(|item| StatementRow {
            item,
            label: item.label().to_string(),
            cells: table
                .years
                .values()
                .map(|agg| {
                    let value = agg.figures.get(item);
                    let yoy = table.yoy(&agg.year, item);
                    StatementCell {
                        year: agg.year.clone(),
                        value,
                        yoy,
                        change: absolute_change(value, table.previous(&agg.year).map(|p| p.figures.get(item))),
                        favourable: yoy.map(|y| is_favourable(y, item.is_cost())),
                    }
                })
                .collect(),
        })
        .collect();
    YearlyStatementView { years, rows }
}

// ---------------------------------------------------------------------------
// Top-level report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YearlyInput {
    /// Historical (or any) period records
    pub records: Vec<PeriodRecord>,
    /// Planned records; these replace `records` entries for the same period
    #[serde(default)]
    pub planned: Vec<PeriodRecord>,
    #[serde(default)]
    pub assumptions: Option<StatementAssumptions>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YearlyReport {
    pub comparison: Vec<YearComparison>,
    pub statement: YearlyStatementView,
    pub table: YearlyTable,
}

/// Merge history with the plan, derive summaries, and roll everything up by year.
pub fn build_yearly_report(input: &YearlyInput) -> BizPlanResult<ComputationOutput<YearlyReport>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let assumptions = input.assumptions.clone().unwrap_or_default();
    assumptions.validate()?;

    let records: Vec<PeriodRecord> = combine_records(&input.records, &input.planned)
        .into_iter()
        .map(PeriodRecord::recomputed)
        .collect();
    if records.is_empty() {
        warnings.push("No period records supplied; report is empty".into());
    }

    let summaries = derive_summaries(&records, &assumptions);
    let table = aggregate_by_year_with(&summaries, &assumptions);
    for agg in table.years.values() {
        let monthly = records
            .iter()
            .any(|r| r.period.contains('-') && year_key(&r.period) == agg.year);
        if monthly && agg.period_count < 12 {
            warnings.push(format!("Year {} covers only {} periods", agg.year, agg.period_count));
        }
    }

    let report = YearlyReport {
        comparison: compare_years(&records),
        statement: statement_view(&table),
        table,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Ascending-period yearly roll-up of derived summary statements with YoY on |prior year|",
        &assumptions,
        warnings,
        elapsed,
        report,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_compare_years_recomputes_profitability() {
        let records = vec![
            PeriodRecord::new("2024-01", dec!(100), dec!(90), None, None),
            PeriodRecord::new("2024-02", dec!(300), dec!(110), None, None),
            PeriodRecord::new("2025-01", Decimal::ZERO, dec!(5), None, None),
        ];
        let rows = compare_years(&records);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].revenue, dec!(400));
        assert_eq!(rows[0].profit, dec!(200));
        assert_eq!(rows[0].profitability, dec!(50));
        assert_eq!(rows[1].profitability, Decimal::ZERO);
    }

    #[test]
    fn test_statement_view_shape() {
        let input = YearlyInput {
            records: vec![
                PeriodRecord::new("2024-06", dec!(1000), dec!(600), None, None),
                PeriodRecord::new("2025-06", dec!(2000), dec!(600), None, None),
            ],
            planned: vec![],
            assumptions: None,
        };
        let out = build_yearly_report(&input).unwrap();
        let view = &out.result.statement;
        assert_eq!(view.years, vec!["2024".to_string(), "2025".to_string()]);
        assert_eq!(view.rows.len(), 17);

        let po = view.rows.iter().find(|r| r.item == LineItem::PurchaseOrder).unwrap();
        assert_eq!(po.cells[0].yoy, None);
        assert_eq!(po.cells[1].yoy, Some(dec!(100)));
        assert_eq!(po.cells[1].change, Some(po.cells[1].value - po.cells[0].value));
        assert_eq!(po.cells[1].favourable, Some(true));
        assert_eq!(po.cells[0].favourable, None);
        assert!(out.warnings.iter().any(|w| w.contains("only 1 periods")));
    }

    #[test]
    fn test_empty_report_warns() {
        let input = YearlyInput {
            records: vec![],
            planned: vec![],
            assumptions: None,
        };
        let out = build_yearly_report(&input).unwrap();
        assert!(out.result.table.is_empty());
        assert!(!out.warnings.is_empty());
    }
}
