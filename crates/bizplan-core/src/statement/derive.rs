use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Instant;

use crate::statement::assumptions::StatementAssumptions;
use crate::statement::record::{PeriodRecord, SummaryChannel, SummaryFigures, SummaryPeriodRecord};
use crate::types::{with_metadata, ComputationOutput, Money};
use crate::BizPlanResult;

/// Allowed gap between the two direct-profit formulas, which agree
/// algebraically but may differ in the last Decimal digit.
const DIRECT_PROFIT_TOLERANCE: Decimal = dec!(0.000001);

// ---------------------------------------------------------------------------
// Input / output
// ---------------------------------------------------------------------------

/// A batch of period records to expand into summary income statements.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatementInput {
    pub records: Vec<PeriodRecord>,
    /// Ratio policy; the standard table when omitted
    #[serde(default)]
    pub assumptions: Option<StatementAssumptions>,
}

// ---------------------------------------------------------------------------
// Derivation
// ---------------------------------------------------------------------------

/// Expand one period record with the standard ratio policy.
pub fn derive_summary(record: &PeriodRecord) -> SummaryPeriodRecord {
    derive_summary_with(record, &StatementAssumptions::default())
}

/// Expand one period record into the full summary income statement.
///
/// Pure and total: every field is a function of `record` and `a` only.
pub fn derive_summary_with(record: &PeriodRecord, a: &StatementAssumptions) -> SummaryPeriodRecord {
    let revenue = record.revenue;
    let cost = record.cost;

    let channels: Option<Vec<SummaryChannel>> = record.channel_slice().map(|chs| {
        chs.iter()
            .map(|ch| {
                let actual = ch.actual_sales.unwrap_or(ch.revenue);
                SummaryChannel {
                    name: ch.name.clone(),
                    sales_tag: ch.revenue * a.sales_tag_ratio,
                    actual_sales: Some(actual),
                    shipment_price: actual * a.shipment_ratio,
                }
            })
            .collect()
    });

    let (total_sales_tag, total_actual_sales, total_shipment_price) = match &channels {
        Some(chs) => (
            chs.iter().map(|c| c.sales_tag).sum::<Money>(),
            chs.iter().filter_map(|c| c.actual_sales).sum::<Money>(),
            chs.iter().map(|c| c.shipment_price).sum::<Money>(),
        ),
        None => (
            revenue * a.sales_tag_ratio,
            revenue,
            revenue * a.shipment_ratio,
        ),
    };

    let sales_less_vat = total_shipment_price / a.vat_divisor;
    let cogs = cost * a.cogs_ratio;
    let gross_profit = sales_less_vat - cogs;
    let direct_costs = cost * a.direct_cost_ratio;
    let direct_profit = gross_profit - direct_costs;

    let direct_formula = sales_less_vat - cost * (a.cogs_ratio + a.direct_cost_ratio);
    debug_assert!(
        (direct_profit - direct_formula).abs() <= DIRECT_PROFIT_TOLERANCE,
        "direct profit mismatch for {}: {} vs {}",
        record.period,
        direct_profit,
        direct_formula
    );

    let advertising_expense = revenue * a.advertising_ratio;
    let personnel_expense = revenue * a.personnel_ratio;
    let own_lease_fee = revenue * a.own_lease_ratio;
    let common_cost_allocation = revenue * a.common_cost_ratio;
    let other_operating_expense = own_lease_fee + common_cost_allocation;
    let total_operating_expense = advertising_expense
        + personnel_expense
        + other_operating_expense
        + own_lease_fee
        + common_cost_allocation;
    let operating_profit = sales_less_vat - cogs - total_operating_expense;

    SummaryPeriodRecord {
        period: record.period.clone(),
        figures: SummaryFigures {
            ending_inventory: record.inventory.unwrap_or(Decimal::ZERO),
            purchase_order: revenue * a.purchase_order_ratio,
            total_sales_tag,
            total_actual_sales,
            total_shipment_price,
            sales_less_vat,
            cogs,
            gross_profit,
            direct_costs,
            direct_profit,
            advertising_expense,
            personnel_expense,
            other_operating_expense,
            own_lease_fee,
            common_cost_allocation,
            total_operating_expense,
            operating_profit,
        },
        channels,
    }
}

/// Expand every record, preserving input order.
pub fn derive_summaries(records: &[PeriodRecord], a: &StatementAssumptions) -> Vec<SummaryPeriodRecord> {
    records.iter().map(|r| derive_summary_with(r, a)).collect()
}

/// Validate the ratio policy, re-derive profit fields, and expand the batch.
pub fn build_statement(
    input: &StatementInput,
) -> BizPlanResult<ComputationOutput<Vec<SummaryPeriodRecord>>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let assumptions = input.assumptions.clone().unwrap_or_default();
    assumptions.validate()?;

    let mut seen = HashSet::new();
    for r in &input.records {
        if !seen.insert(r.period.as_str()) {
            warnings.push(format!("Period {} appears more than once", r.period));
        }
        if r.revenue < Decimal::ZERO || r.cost < Decimal::ZERO {
            warnings.push(format!("Period {} has negative revenue or cost", r.period));
        }
    }

    let records: Vec<PeriodRecord> = input
        .records
        .iter()
        .cloned()
        .map(PeriodRecord::recomputed)
        .collect();
    let output = derive_summaries(&records, &assumptions);

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Fixed-ratio expansion of revenue, cost and channel sales into a summary income statement",
        &assumptions,
        warnings,
        elapsed,
        output,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channels::{allocate, ChannelRecord};

    fn plain_record() -> PeriodRecord {
        PeriodRecord::new("2026-01", dec!(1000), dec!(600), Some(dec!(450)), None)
    }

    #[test]
    fn test_no_channel_fallbacks() {
        let s = derive_summary(&plain_record());
        let f = &s.figures;
        assert_eq!(f.ending_inventory, dec!(450));
        assert_eq!(f.purchase_order, dec!(1200));
        assert_eq!(f.total_sales_tag, dec!(1100));
        assert_eq!(f.total_actual_sales, dec!(1000));
        assert_eq!(f.total_shipment_price, dec!(900));
        assert_eq!(f.cogs, dec!(420));
        assert_eq!(f.direct_costs, dec!(120));
        assert!(s.channels.is_none());
    }

    #[test]
    fn test_operating_lines() {
        let f = derive_summary(&plain_record()).figures;
        assert_eq!(f.advertising_expense, dec!(150));
        assert_eq!(f.personnel_expense, dec!(100));
        assert_eq!(f.own_lease_fee, dec!(30));
        assert_eq!(f.common_cost_allocation, dec!(20));
        assert_eq!(f.other_operating_expense, dec!(50));
        assert_eq!(f.total_operating_expense, dec!(350));
    }

    #[test]
    fn test_profit_lines_follow_formulas() {
        let f = derive_summary(&plain_record()).figures;
        let slv = dec!(900) / dec!(1.1);
        assert_eq!(f.sales_less_vat, slv);
        assert_eq!(f.gross_profit, slv - dec!(420));
        assert_eq!(f.direct_profit, slv - dec!(540));
        assert_eq!(f.operating_profit, slv - dec!(420) - dec!(350));
    }

    #[test]
    fn test_channel_derivation() {
        let mut channels = allocate(dec!(1_000_000));
        channels[0].actual_sales = Some(dec!(40_000));
        let rec = PeriodRecord::new("2026-02", dec!(1_000_000), dec!(500_000), None, Some(channels));
        let s = derive_summary(&rec);
        let chs = s.channels.as_ref().unwrap();

        assert_eq!(chs.len(), 7);
        assert_eq!(chs[0].sales_tag, dec!(55_000));
        assert_eq!(chs[0].actual_sales, Some(dec!(40_000)));
        assert_eq!(chs[0].shipment_price, dec!(36_000));
        assert_eq!(chs[1].actual_sales, Some(dec!(80_000)));
        assert_eq!(chs[1].shipment_price, dec!(72_000));

        let f = &s.figures;
        assert_eq!(f.total_sales_tag, dec!(1_100_000));
        assert_eq!(f.total_actual_sales, dec!(990_000));
        assert_eq!(f.total_shipment_price, dec!(891_000));
        assert_eq!(f.ending_inventory, Decimal::ZERO);
    }

    #[test]
    fn test_empty_channel_list_uses_revenue_fallbacks() {
        let rec = PeriodRecord::new("2026-03", dec!(100), dec!(50), None, Some(Vec::<ChannelRecord>::new()));
        let s = derive_summary(&rec);
        assert!(s.channels.is_none());
        assert_eq!(s.figures.total_actual_sales, dec!(100));
    }

    #[test]
    fn test_derivation_is_deterministic() {
        let rec = PeriodRecord::new("2026-04", dec!(123456.78), dec!(98765.43), Some(dec!(1)), Some(allocate(dec!(123456.78))));
        assert_eq!(derive_summary(&rec), derive_summary(&rec));
    }

    #[test]
    fn test_custom_assumptions_flow_through() {
        let a = StatementAssumptions {
            cogs_ratio: dec!(0.5),
            advertising_ratio: dec!(0.05),
            ..Default::default()
        };
        let f = derive_summary_with(&plain_record(), &a).figures;
        assert_eq!(f.cogs, dec!(300));
        assert_eq!(f.advertising_expense, dec!(50));
        assert_eq!(f.total_operating_expense, dec!(250));
        assert_eq!(f.direct_profit, f.gross_profit - f.direct_costs);
    }

    #[test]
    fn test_build_statement_warns_and_recomputes() {
        let mut stale = plain_record();
        stale.profit = dec!(1);
        let input = StatementInput {
            records: vec![stale, plain_record()],
            assumptions: None,
        };
        let out = build_statement(&input).unwrap();
        assert_eq!(out.result.len(), 2);
        assert!(out.warnings.iter().any(|w| w.contains("more than once")));
    }

    #[test]
    fn test_build_statement_rejects_bad_assumptions() {
        let input = StatementInput {
            records: vec![plain_record()],
            assumptions: Some(StatementAssumptions {
                vat_divisor: Decimal::ZERO,
                ..Default::default()
            }),
        };
        assert!(build_statement(&input).is_err());
    }
}
