pub mod aggregate;
pub mod dashboard;
pub mod facets;
pub mod metrics;
pub mod temporal;

pub use aggregate::{
    aggregate, AggregationResult, Dimension, GroupBy, Measure, ShareRow, SummaryRow, Totals,
};
pub use dashboard::{DashboardTables, DashboardView, HoursDistribution, KeyMetrics, ViewMeta};
pub use facets::FacetOptions;
pub use metrics::{DerivedMetrics, Metric};
pub use temporal::{bucket, daily, monthly, Granularity, PeriodPoint, TimeSeries};
