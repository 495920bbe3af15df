use serde::Serialize;

use crate::record::Record;

/// Output of `parse_csv`: enriched records plus load metadata.
#[derive(Debug)]
pub struct ParseOutput {
    pub records: Vec<Record>,
    pub total_rows_processed: usize,
    pub detected_columns: Vec<String>,
    pub missing_optional_columns: Vec<String>,
    pub parse_duration_ms: u64,
}

impl ParseOutput {
    pub fn summary(&self) -> LoadSummary {
        LoadSummary {
            total_records: self.records.len(),
            detected_columns: self.detected_columns.clone(),
            missing_optional_columns: self.missing_optional_columns.clone(),
            parse_duration_ms: self.parse_duration_ms,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadSummary {
    pub total_records: usize,
    pub detected_columns: Vec<String>,
    pub missing_optional_columns: Vec<String>,
    pub parse_duration_ms: u64,
}
