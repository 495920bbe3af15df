pub mod evaluator;
pub mod predicates;
pub mod spec;

pub use evaluator::{filter_records, FilterPlan};
pub use predicates::{GroupThreshold, RecordPredicate, ThresholdDimension};
pub use spec::{AmountRange, DateRange, FilterSpec};
