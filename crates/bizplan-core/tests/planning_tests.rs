use bizplan_core::aggregate::{build_yearly_report, YearlyInput};
use bizplan_core::history::{load_history, HistoryOrigin, InlineSource, LoaderConfig, RawHistoryRecord};
use bizplan_core::persistence::{MemoryStore, SimulationStore};
use bizplan_core::plan::{run_plan, PlanInput};
use pretty_assertions::assert_eq;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ===========================================================================
// History + plan end to end
// ===========================================================================

fn plan_input() -> PlanInput {
    let mut input = PlanInput {
        plan_year: 2025,
        ..Default::default()
    };
    for period in ["2026-01", "2026-02", "2027-01"] {
        input.revenue.insert(period.into(), dec!(1_000_000));
        input.markup.insert(period.into(), dec!(100));
        input.purchase_order.insert(period.into(), dec!(1_000_000));
    }
    input
}

#[tokio::test]
async fn test_fallback_history_plus_plan_yearly_report() {
    let mut rng = StdRng::seed_from_u64(11);
    let history = load_history(&InlineSource::default(), &LoaderConfig::actuals_only(), &mut rng).await;
    assert!(history.origin.is_fallback());
    assert_eq!(history.records.last().unwrap().period, "2025-10");

    let plan = run_plan(&plan_input()).unwrap().result;
    assert_eq!(plan.records.len(), 26);
    assert_eq!(plan.records[2].cost, dec!(500_000));
    assert_eq!(plan.records[2].inventory, Some(dec!(800_000)));

    let report = build_yearly_report(&YearlyInput {
        records: history.records.clone(),
        planned: plan.records.clone(),
        assumptions: None,
    })
    .unwrap()
    .result;

    let years: Vec<&str> = report.table.year_keys().collect();
    assert_eq!(years, vec!["2023", "2024", "2025", "2026", "2027"]);
    assert_eq!(report.table.get("2025").unwrap().period_count, 12);

    let y2026 = report.comparison.iter().find(|c| c.year == "2026").unwrap();
    assert_eq!(y2026.revenue, dec!(2_000_000));
    assert_eq!(y2026.cost, dec!(1_000_000));
}

#[tokio::test]
async fn test_source_history_is_used_when_recent() {
    let source = InlineSource::new(vec![
        RawHistoryRecord {
            period: Some("2023-01".into()),
            revenue: Some(dec!(100)),
            cost: Some(dec!(60)),
            ..Default::default()
        },
        RawHistoryRecord {
            period: Some("2025-12".into()),
            revenue: Some(dec!(100)),
            ..Default::default()
        },
    ]);
    let mut rng = StdRng::seed_from_u64(0);
    let loaded = load_history(&source, &LoaderConfig::actuals_only(), &mut rng).await;
    assert_eq!(loaded.origin, HistoryOrigin::Source);
    assert_eq!(loaded.records.len(), 1);
    assert_eq!(loaded.records[0].profit, dec!(40));
}

#[test]
fn test_saved_plan_snapshot() {
    let plan = run_plan(&plan_input()).unwrap().result;
    let mut store = MemoryStore::new();
    let saved = store.save(" 2026 base ", plan.statement.clone()).unwrap();
    assert_eq!(saved.name, "2026 base");
    assert_eq!(saved.data.len(), 26);

    let jan = saved.data.iter().find(|d| d.period == "2026-01").unwrap();
    assert_eq!(jan.figures.total_actual_sales, dec!(1_000_000));
    assert!(saved.data.iter().filter(|d| d.period == "2025-11").all(|d| d.figures.purchase_order == Decimal::ZERO));
}
