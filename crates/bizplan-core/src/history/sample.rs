use rand::Rng;
use rust_decimal::Decimal;

use crate::channels::allocate;
use crate::periods::{MonthPeriod, MonthSeq};
use crate::statement::PeriodRecord;
use crate::types::{round_currency, Money};

pub const SAMPLE_FIRST_YEAR: i32 = 2023;
pub const SAMPLE_LAST_YEAR: i32 = 2027;

/// Monthly base revenue of the sample dataset for one year.
pub fn sample_base_revenue(year: i32) -> Money {
    let base: i64 = match year {
        i32::MIN..=2023 => 800_000_000,
        2024 => 1_000_000_000,
        2025 => 1_200_000_000,
        2026 => 1_400_000_000,
        _ => 1_600_000_000,
    };
    Decimal::from(base)
}

/// Uniform ratio in `[lo_bp, hi_bp)` basis points, exact in Decimal.
fn ratio_bp<R: Rng + ?Sized>(rng: &mut R, lo_bp: i64, hi_bp: i64) -> Decimal {
    Decimal::new(rng.gen_range(lo_bp..hi_bp), 4)
}

/// Synthetic monthly history from January 2023 to December 2027.
///
/// Revenue varies 90-110 % around the year's base, cost is 60-70 % of revenue
/// and inventory 40-50 %. Every figure is rounded and channels come from the
/// ratio table. Deterministic for a seeded `rng`.
pub fn generate_sample_history<R: Rng + ?Sized>(rng: &mut R) -> Vec<PeriodRecord> {
    let start = MonthPeriod::january(SAMPLE_FIRST_YEAR);
    let months = ((SAMPLE_LAST_YEAR - SAMPLE_FIRST_YEAR + 1) * 12) as usize;

    MonthSeq::new(start, months)
        .map(|p| {
            let revenue = round_currency(sample_base_revenue(p.year()) * ratio_bp(rng, 9_000, 11_000));
            let cost = round_currency(revenue * ratio_bp(rng, 6_000, 7_000));
            let inventory = round_currency(revenue * ratio_bp(rng, 4_000, 5_000));
            PeriodRecord::new(p.to_string(), revenue, cost, Some(inventory), Some(allocate(revenue)))
        })
        .collect()
}
