//! Expand/collapse view state over a yearly statement table.
//!
//! The state only records which `(year, kind)` cells are open. Detail rows are
//! read from an already-built [`YearlyTable`]; nothing here re-aggregates.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::aggregate::{YearlyAggregate, YearlyTable};
use crate::statement::{LineItem, StatementAssumptions};
use crate::types::{checked_ratio, Money, Percent};

/// Line items that can be drilled into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DrillKind {
    SalesTag,
    ActualSales,
    ShipmentPrice,
    Cogs,
    DirectCosts,
    OtherOperatingExpense,
}

impl DrillKind {
    pub const ALL: [DrillKind; 6] = [
        DrillKind::SalesTag,
        DrillKind::ActualSales,
        DrillKind::ShipmentPrice,
        DrillKind::Cogs,
        DrillKind::DirectCosts,
        DrillKind::OtherOperatingExpense,
    ];

    /// Channel kinds break down by sales channel; the rest by cost component.
    pub fn is_channel_kind(self) -> bool {
        matches!(self, DrillKind::SalesTag | DrillKind::ActualSales | DrillKind::ShipmentPrice)
    }

    /// The statement row this kind expands.
    pub fn line_item(self) -> LineItem {
        match self {
            DrillKind::SalesTag => LineItem::TotalSalesTag,
            DrillKind::ActualSales => LineItem::TotalActualSales,
            DrillKind::ShipmentPrice => LineItem::TotalShipmentPrice,
            DrillKind::Cogs => LineItem::Cogs,
            DrillKind::DirectCosts => LineItem::DirectCosts,
            DrillKind::OtherOperatingExpense => LineItem::OtherOperatingExpense,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DrillKind::SalesTag => "salesTag",
            DrillKind::ActualSales => "actualSales",
            DrillKind::ShipmentPrice => "shipmentPrice",
            DrillKind::Cogs => "cogs",
            DrillKind::DirectCosts => "directCosts",
            DrillKind::OtherOperatingExpense => "otherOperatingExpense",
        }
    }
}

impl fmt::Display for DrillKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A cell can be expanded when it has something to show. Cost kinds always do;
/// channel kinds need at least one channel in that year.
pub fn is_eligible(table: &YearlyTable, year: &str, kind: DrillKind) -> bool {
    match table.get(year) {
        Some(agg) => !kind.is_channel_kind() || agg.has_channels(),
        None => false,
    }
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrilldownState {
    expanded: BTreeSet<(String, DrillKind)>,
}

impl DrilldownState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip one cell and return its new state.
    pub fn toggle(&mut self, year: &str, kind: DrillKind) -> bool {
        let key = (year.to_string(), kind);
        if self.expanded.remove(&key) {
            false
        } else {
            self.expanded.insert(key);
            true
        }
    }

    pub fn is_expanded(&self, year: &str, kind: DrillKind) -> bool {
        self.expanded.contains(&(year.to_string(), kind))
    }

    /// Open every eligible cell of `table`.
    pub fn expand_all(&mut self, table: &YearlyTable) {
        for year in table.year_keys() {
            for kind in DrillKind::ALL {
                if is_eligible(table, year, kind) {
                    self.expanded.insert((year.to_string(), kind));
                }
            }
        }
    }

    pub fn collapse_all(&mut self) {
        self.expanded.clear();
    }

    /// True when `kind` is open for at least one year, i.e. its sub-rows are shown.
    pub fn any_expanded(&self, kind: DrillKind) -> bool {
        self.expanded.iter().any(|(_, k)| *k == kind)
    }

    pub fn expanded_cells(&self) -> impl Iterator<Item = (&str, DrillKind)> {
        self.expanded.iter().map(|(y, k)| (y.as_str(), *k))
    }

    pub fn is_empty(&self) -> bool {
        self.expanded.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Detail rows
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailRow {
    pub label: String,
    pub value: Money,
    /// Percent of the parent line; `None` when the parent is zero
    pub share: Option<Percent>,
}

fn detail(label: &str, value: Money, parent: Money) -> DetailRow {
    DetailRow {
        label: label.to_string(),
        value,
        share: checked_ratio(value, parent).map(|r| r * Decimal::ONE_HUNDRED),
    }
}

/// Sub-rows of one aggregate cell. `channel_names` fixes row order for channel
/// kinds; a channel absent from this year reads as 0.
pub fn detail_rows(
    agg: &YearlyAggregate,
    kind: DrillKind,
    channel_names: &[String],
    a: &StatementAssumptions,
) -> Vec<DetailRow> {
    let f = &agg.figures;
    let parent = f.get(kind.line_item());
    match kind {
        DrillKind::SalesTag | DrillKind::ActualSales | DrillKind::ShipmentPrice => channel_names
            .iter()
            .map(|name| {
                let value = agg
                    .channel(name)
                    .map(|ch| match kind {
                        DrillKind::SalesTag => ch.sales_tag,
                        DrillKind::ActualSales => ch.actual_sales,
                        _ => ch.shipment_price,
                    })
                    .unwrap_or(Decimal::ZERO);
                detail(name, value, parent)
            })
            .collect(),
        DrillKind::Cogs => {
            let merchandise = f.cogs * a.merchandise_cost_share;
            vec![
                detail("상품원가", merchandise, parent),
                detail("기타원가", f.cogs - merchandise, parent),
            ]
        }
        DrillKind::DirectCosts => {
            let lease = f.direct_costs * a.direct_lease_share;
            vec![
                detail("임대료", lease, parent),
                detail("인건비(직접)", f.direct_costs - lease, parent),
            ]
        }
        DrillKind::OtherOperatingExpense => vec![
            detail(LineItem::OwnLeaseFee.label(), f.own_lease_fee, parent),
            detail(LineItem::CommonCostAllocation.label(), f.common_cost_allocation, parent),
        ],
    }
}

/// An open cell together with its sub-rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpandedCell {
    pub year: String,
    pub kind: DrillKind,
    pub rows: Vec<DetailRow>,
}

/// Sub-rows for every open cell. Collapsed cells are skipped, not discarded;
/// reopening them yields the same rows.
pub fn visible_details(
    state: &DrilldownState,
    table: &YearlyTable,
    a: &StatementAssumptions,
) -> Vec<ExpandedCell> {
    let names = table.channel_names();
    state
        .expanded_cells()
        .filter_map(|(year, kind)| {
            table.get(year).map(|agg| ExpandedCell {
                year: year.to_string(),
                kind,
                rows: detail_rows(agg, kind, &names, a),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::aggregate_by_year;
    use crate::channels::allocate;
    use crate::statement::{derive_summary, PeriodRecord};
    use rust_decimal_macros::dec;

    fn table() -> YearlyTable {
        let with_channels = derive_summary(&PeriodRecord::new(
            "2025-01",
            dec!(1_000_000),
            dec!(600_000),
            None,
            Some(allocate(dec!(1_000_000))),
        ));
        let without = derive_summary(&PeriodRecord::new("2026-01", dec!(500), dec!(300), None, None));
        aggregate_by_year(&[with_channels, without])
    }

    #[test]
    fn test_toggle_twice_restores_state() {
        let mut state = DrilldownState::new();
        assert!(state.toggle("2025", DrillKind::Cogs));
        assert!(state.is_expanded("2025", DrillKind::Cogs));
        assert!(!state.toggle("2025", DrillKind::Cogs));
        assert_eq!(state, DrilldownState::new());
    }

    #[test]
    fn test_expand_all_respects_eligibility() {
        let t = table();
        let mut state = DrilldownState::new();
        state.expand_all(&t);
        assert!(state.is_expanded("2025", DrillKind::SalesTag));
        assert!(!state.is_expanded("2026", DrillKind::SalesTag));
        assert!(state.is_expanded("2026", DrillKind::Cogs));
        assert_eq!(state.expanded_cells().count(), 6 + 3);

        state.collapse_all();
        assert!(state.is_empty());
        for year in ["2025", "2026"] {
            for kind in DrillKind::ALL {
                assert!(!state.is_expanded(year, kind));
            }
        }
    }

    #[test]
    fn test_cost_breakdowns_sum_to_parent() {
        let t = table();
        let agg = t.get("2025").unwrap();
        let a = StatementAssumptions::default();

        let cogs = detail_rows(agg, DrillKind::Cogs, &[], &a);
        assert_eq!(cogs[0].value, dec!(336_000));
        assert_eq!(cogs[0].value + cogs[1].value, agg.figures.cogs);
        assert_eq!(cogs[0].share, Some(dec!(80)));

        let direct = detail_rows(agg, DrillKind::DirectCosts, &[], &a);
        assert_eq!(direct[0].value, dec!(60_000));
        assert_eq!(direct[1].value, dec!(60_000));

        let other = detail_rows(agg, DrillKind::OtherOperatingExpense, &[], &a);
        assert_eq!(other[0].value, agg.figures.own_lease_fee);
        assert_eq!(other[1].value, agg.figures.common_cost_allocation);
    }

    #[test]
    fn test_channel_rows_follow_union_order() {
        let t = table();
        let names = t.channel_names();
        let a = StatementAssumptions::default();

        let rows = detail_rows(t.get("2025").unwrap(), DrillKind::SalesTag, &names, &a);
        assert_eq!(rows.len(), 7);
        assert_eq!(rows[0].label, "백화점");
        assert_eq!(rows[0].value, dec!(55_000));
        assert_eq!(rows[0].share, Some(dec!(5)));

        let empty_year = detail_rows(t.get("2026").unwrap(), DrillKind::SalesTag, &names, &a);
        assert!(empty_year.iter().all(|r| r.value.is_zero()));
    }

    #[test]
    fn test_visible_details_only_open_cells() {
        let t = table();
        let a = StatementAssumptions::default();
        let mut state = DrilldownState::new();
        state.toggle("2026", DrillKind::DirectCosts);
        state.toggle("1999", DrillKind::Cogs);

        let cells = visible_details(&state, &t, &a);
        assert_eq!(cells.len(), 1);
        assert_eq!(cells[0].kind, DrillKind::DirectCosts);
        assert!(state.any_expanded(DrillKind::DirectCosts));
        assert!(!state.any_expanded(DrillKind::SalesTag));
    }
}
