pub mod comparison;
pub mod yearly;
pub mod yoy;

pub use comparison::{
    build_yearly_report, compare_years, statement_view, StatementCell, StatementRow,
    YearComparison, YearlyInput, YearlyReport, YearlyStatementView,
};
pub use yearly::{
    aggregate_by_year, aggregate_by_year_with, combine_records, ChannelTotals, YearlyAggregate,
    YearlyTable,
};
pub use yoy::{absolute_change, is_favourable, yoy_change};
