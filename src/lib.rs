pub mod analyzer;
pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod filter;
pub mod parser;
pub mod record;

pub use analyzer::{aggregate, AggregationResult, DashboardView, Dimension, FacetOptions, GroupBy, Measure};
pub use config::AppConfig;
pub use error::AppError;
pub use filter::{filter_records, FilterSpec};
pub use parser::{parse_csv, parse_csv_reader};
pub use record::{enrich, RawEntry, Record};

// ─── E2E Integration Tests ──────────────────────────────────────────────────
