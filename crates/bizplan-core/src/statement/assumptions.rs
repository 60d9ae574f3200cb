use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::BizPlanError;
use crate::types::Rate;
use crate::BizPlanResult;

/// Ratio policy used to expand top-line figures into the summary income
/// statement. These are policy constants, not estimates; every derivation
/// reads them from here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatementAssumptions {
    /// Purchase order as a multiple of revenue
    pub purchase_order_ratio: Rate,
    /// Sales tag (list price) as a multiple of channel revenue
    pub sales_tag_ratio: Rate,
    /// Shipment price as a share of actual sales
    pub shipment_ratio: Rate,
    /// Divisor removing VAT from shipment price
    pub vat_divisor: Rate,
    /// COGS as a share of cost
    pub cogs_ratio: Rate,
    /// Direct costs as a share of cost
    pub direct_cost_ratio: Rate,
    /// Advertising as a share of revenue
    pub advertising_ratio: Rate,
    /// Personnel as a share of revenue
    pub personnel_ratio: Rate,
    /// Own-store lease fee as a share of revenue
    pub own_lease_ratio: Rate,
    /// Common cost allocation as a share of revenue
    pub common_cost_ratio: Rate,
    /// Actual sales assumed for a channel lacking one, as a share of its sales tag
    pub default_actual_sales_ratio: Rate,
    /// Merchandise share of COGS in the drill-down (the rest is "other cost")
    pub merchandise_cost_share: Rate,
    /// Lease share of direct costs in the drill-down (the rest is direct labor)
    pub direct_lease_share: Rate,
}

impl Default for StatementAssumptions {
    fn default() -> Self {
        Self {
            purchase_order_ratio: dec!(1.2),
            sales_tag_ratio: dec!(1.1),
            shipment_ratio: dec!(0.9),
            vat_divisor: dec!(1.1),
            cogs_ratio: dec!(0.7),
            direct_cost_ratio: dec!(0.2),
            advertising_ratio: dec!(0.15),
            personnel_ratio: dec!(0.10),
            own_lease_ratio: dec!(0.03),
            common_cost_ratio: dec!(0.02),
            default_actual_sales_ratio: dec!(0.9),
            merchandise_cost_share: dec!(0.8),
            direct_lease_share: dec!(0.5),
        }
    }
}

impl StatementAssumptions {
    /// Other operating expense ratio: own lease plus common cost.
    pub fn other_operating_ratio(&self) -> Rate {
        self.own_lease_ratio + self.common_cost_ratio
    }

    /// Total operating expense ratio. Other operating expense is counted both
    /// as a subtotal and through its two components.
    pub fn total_operating_ratio(&self) -> Rate {
        self.advertising_ratio
            + self.personnel_ratio
            + self.other_operating_ratio()
            + self.own_lease_ratio
            + self.common_cost_ratio
    }

    pub fn validate(&self) -> BizPlanResult<()> {
        let non_negative = [
            ("purchase_order_ratio", self.purchase_order_ratio),
            ("sales_tag_ratio", self.sales_tag_ratio),
            ("shipment_ratio", self.shipment_ratio),
            ("cogs_ratio", self.cogs_ratio),
            ("direct_cost_ratio", self.direct_cost_ratio),
            ("advertising_ratio", self.advertising_ratio),
            ("personnel_ratio", self.personnel_ratio),
            ("own_lease_ratio", self.own_lease_ratio),
            ("common_cost_ratio", self.common_cost_ratio),
            ("default_actual_sales_ratio", self.default_actual_sales_ratio),
        ];
        for (field, value) in non_negative {
            if value < Decimal::ZERO {
                return Err(BizPlanError::InvalidInput {
                    field: field.into(),
                    reason: format!("Ratio must be non-negative, got {value}"),
                });
            }
        }

        if self.vat_divisor <= Decimal::ZERO {
            return Err(BizPlanError::InvalidInput {
                field: "vat_divisor".into(),
                reason: format!("Divisor must be positive, got {}", self.vat_divisor),
            });
        }

        for (field, value) in [
            ("merchandise_cost_share", self.merchandise_cost_share),
            ("direct_lease_share", self.direct_lease_share),
        ] {
            if value < Decimal::ZERO || value > Decimal::ONE {
                return Err(BizPlanError::InvalidInput {
                    field: field.into(),
                    reason: format!("Share must be between 0 and 1, got {value}"),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_ratio_totals() {
        let a = StatementAssumptions::default();
        assert_eq!(a.other_operating_ratio(), dec!(0.05));
        assert_eq!(a.total_operating_ratio(), dec!(0.35));
        assert_eq!(a.cogs_ratio + a.direct_cost_ratio, dec!(0.9));
        assert!(a.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let a: StatementAssumptions = serde_json::from_str(r#"{ "cogs_ratio": "0.65" }"#).unwrap();
        assert_eq!(a.cogs_ratio, dec!(0.65));
        assert_eq!(a.advertising_ratio, dec!(0.15));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let a = StatementAssumptions {
            vat_divisor: Decimal::ZERO,
            ..Default::default()
        };
        assert!(a.validate().is_err());

        let b = StatementAssumptions {
            merchandise_cost_share: dec!(1.5),
            ..Default::default()
        };
        assert!(b.validate().is_err());

        let c = StatementAssumptions {
            personnel_ratio: dec!(-0.1),
            ..Default::default()
        };
        assert!(c.validate().is_err());
    }
}
