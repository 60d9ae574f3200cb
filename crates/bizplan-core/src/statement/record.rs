use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::AddAssign;

use crate::channels::ChannelRecord;
use crate::projection::profitability;
use crate::types::{Money, Percent};

// ---------------------------------------------------------------------------
// Simplified period record
// ---------------------------------------------------------------------------

/// Top-line figures for one period (a month or a year).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodRecord {
    pub period: String,
    pub revenue: Money,
    pub cost: Money,
    /// Always `revenue - cost`
    #[serde(default)]
    pub profit: Money,
    /// `profit / revenue * 100`, 0 when revenue is not positive
    #[serde(default)]
    pub profitability: Percent,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inventory: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channels: Option<Vec<ChannelRecord>>,
}

impl PeriodRecord {
    pub fn new(
        period: impl Into<String>,
        revenue: Money,
        cost: Money,
        inventory: Option<Money>,
        channels: Option<Vec<ChannelRecord>>,
    ) -> Self {
        let profit = revenue - cost;
        Self {
            period: period.into(),
            revenue,
            cost,
            profit,
            profitability: profitability(revenue, profit),
            inventory,
            channels,
        }
    }

    /// Same record with profit and profitability recomputed from revenue and cost.
    pub fn recomputed(self) -> Self {
        PeriodRecord::new(self.period, self.revenue, self.cost, self.inventory, self.channels)
    }

    /// Channel list, treating an empty list the same as an absent one.
    pub fn channel_slice(&self) -> Option<&[ChannelRecord]> {
        self.channels.as_deref().filter(|chs| !chs.is_empty())
    }
}

// ---------------------------------------------------------------------------
// Summary income statement
// ---------------------------------------------------------------------------

/// The seventeen numeric line items of the summary income statement.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryFigures {
    pub ending_inventory: Money,
    pub purchase_order: Money,
    pub total_sales_tag: Money,
    pub total_actual_sales: Money,
    pub total_shipment_price: Money,
    #[serde(rename = "salesLessVAT")]
    pub sales_less_vat: Money,
    pub cogs: Money,
    pub gross_profit: Money,
    pub direct_costs: Money,
    pub direct_profit: Money,
    pub advertising_expense: Money,
    pub personnel_expense: Money,
    pub other_operating_expense: Money,
    pub own_lease_fee: Money,
    pub common_cost_allocation: Money,
    pub total_operating_expense: Money,
    pub operating_profit: Money,
}

impl SummaryFigures {
    pub fn get(&self, item: LineItem) -> Money {
        match item {
            LineItem::EndingInventory => self.ending_inventory,
            LineItem::PurchaseOrder => self.purchase_order,
            LineItem::TotalSalesTag => self.total_sales_tag,
            LineItem::TotalActualSales => self.total_actual_sales,
            LineItem::TotalShipmentPrice => self.total_shipment_price,
            LineItem::SalesLessVat => self.sales_less_vat,
            LineItem::Cogs => self.cogs,
            LineItem::GrossProfit => self.gross_profit,
            LineItem::DirectCosts => self.direct_costs,
            LineItem::DirectProfit => self.direct_profit,
            LineItem::AdvertisingExpense => self.advertising_expense,
            LineItem::PersonnelExpense => self.personnel_expense,
            LineItem::OtherOperatingExpense => self.other_operating_expense,
            LineItem::OwnLeaseFee => self.own_lease_fee,
            LineItem::CommonCostAllocation => self.common_cost_allocation,
            LineItem::TotalOperatingExpense => self.total_operating_expense,
            LineItem::OperatingProfit => self.operating_profit,
        }
    }
}

impl AddAssign<&SummaryFigures> for SummaryFigures {
    fn add_assign(&mut self, rhs: &SummaryFigures) {
        self.ending_inventory += rhs.ending_inventory;
        self.purchase_order += rhs.purchase_order;
        self.total_sales_tag += rhs.total_sales_tag;
        self.total_actual_sales += rhs.total_actual_sales;
        self.total_shipment_price += rhs.total_shipment_price;
        self.sales_less_vat += rhs.sales_less_vat;
        self.cogs += rhs.cogs;
        self.gross_profit += rhs.gross_profit;
        self.direct_costs += rhs.direct_costs;
        self.direct_profit += rhs.direct_profit;
        self.advertising_expense += rhs.advertising_expense;
        self.personnel_expense += rhs.personnel_expense;
        self.other_operating_expense += rhs.other_operating_expense;
        self.own_lease_fee += rhs.own_lease_fee;
        self.common_cost_allocation += rhs.common_cost_allocation;
        self.total_operating_expense += rhs.total_operating_expense;
        self.operating_profit += rhs.operating_profit;
    }
}

/// Channel detail of a summary record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryChannel {
    pub name: String,
    pub sales_tag: Money,
    /// Absent in some stored bundles; readers fall back to a share of `sales_tag`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_sales: Option<Money>,
    pub shipment_price: Money,
}

/// Full income-statement record for one period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryPeriodRecord {
    pub period: String,
    #[serde(flatten)]
    pub figures: SummaryFigures,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channels: Option<Vec<SummaryChannel>>,
}

// ---------------------------------------------------------------------------
// Line items
// ---------------------------------------------------------------------------

/// Rows of the summary income statement, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LineItem {
    EndingInventory,
    PurchaseOrder,
    TotalSalesTag,
    TotalActualSales,
    TotalShipmentPrice,
    #[serde(rename = "salesLessVAT")]
    SalesLessVat,
    Cogs,
    GrossProfit,
    DirectCosts,
    DirectProfit,
    AdvertisingExpense,
    PersonnelExpense,
    OtherOperatingExpense,
    OwnLeaseFee,
    CommonCostAllocation,
    TotalOperatingExpense,
    OperatingProfit,
}

impl LineItem {
    pub const ALL: [LineItem; 17] = [
        LineItem::EndingInventory,
        LineItem::PurchaseOrder,
        LineItem::TotalSalesTag,
        LineItem::TotalActualSales,
        LineItem::TotalShipmentPrice,
        LineItem::SalesLessVat,
        LineItem::Cogs,
        LineItem::GrossProfit,
        LineItem::DirectCosts,
        LineItem::DirectProfit,
        LineItem::AdvertisingExpense,
        LineItem::PersonnelExpense,
        LineItem::OtherOperatingExpense,
        LineItem::OwnLeaseFee,
        LineItem::CommonCostAllocation,
        LineItem::TotalOperatingExpense,
        LineItem::OperatingProfit,
    ];

    /// Row label as printed on the statement.
    pub fn label(self) -> &'static str {
        match self {
            LineItem::EndingInventory => "기말재고택금액",
            LineItem::PurchaseOrder => "발주금액",
            LineItem::TotalSalesTag => "판매TAG 합계",
            LineItem::TotalActualSales => "실판가 합계",
            LineItem::TotalShipmentPrice => "출고가(V+) 소계",
            LineItem::SalesLessVat => "부가세차감(출고)매출",
            LineItem::Cogs => "매출원가",
            LineItem::GrossProfit => "매출총이익",
            LineItem::DirectCosts => "직접비 소계",
            LineItem::DirectProfit => "직접이익",
            LineItem::AdvertisingExpense => "광고선전비",
            LineItem::PersonnelExpense => "인건비",
            LineItem::OtherOperatingExpense => "기타영업비 소계",
            LineItem::OwnLeaseFee => "자가임차료",
            LineItem::CommonCostAllocation => "공통비 배부",
            LineItem::TotalOperatingExpense => "영업비 합계",
            LineItem::OperatingProfit => "영업이익",
        }
    }

    /// Profit lines can legitimately go negative.
    pub fn is_profit(self) -> bool {
        matches!(
            self,
            LineItem::GrossProfit | LineItem::DirectProfit | LineItem::OperatingProfit
        )
    }

    /// Expense lines, where a decrease is the favourable direction.
    pub fn is_cost(self) -> bool {
        matches!(
            self,
            LineItem::Cogs
                | LineItem::DirectCosts
                | LineItem::AdvertisingExpense
                | LineItem::PersonnelExpense
                | LineItem::OtherOperatingExpense
                | LineItem::OwnLeaseFee
                | LineItem::CommonCostAllocation
                | LineItem::TotalOperatingExpense
        )
    }
}

impl fmt::Display for LineItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
