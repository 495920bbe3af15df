//! CLI argument parsing for billing-dash

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Output format for the dashboard summary
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable key metrics and top clients (default)
    Text,
    /// The whole dashboard view as JSON
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "billing-dash")]
#[command(version)]
#[command(about = "Filter and summarise legal time and billing exports", long_about = None)]
pub struct Cli {
    /// Billing export (CSV) to load
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Filter selection as JSON (camelCase keys, e.g. {"year": 2024, "minAttorneyHours": 40})
    #[arg(short = 'f', long = "filters", value_name = "FILE")]
    pub filters: Option<PathBuf>,

    /// Application config (delimiters, top clients, date formats)
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Write one CSV per dashboard table into this directory
    #[arg(long = "export-dir", value_name = "DIR")]
    pub export_dir: Option<PathBuf>,

    /// Write the XLSX dashboard report to this file
    #[arg(long = "xlsx", value_name = "FILE")]
    pub xlsx: Option<PathBuf>,

    /// Output format (text or json)
    #[arg(long = "format", value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Debug-level logging (overridden by RUST_LOG)
    #[arg(short, long)]
    pub verbose: bool,
}
