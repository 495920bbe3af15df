use std::io::Read;
use std::path::Path;
use std::time::Instant;

use chrono::NaiveDate;

use crate::config::AppConfig;
use crate::error::AppError;
use crate::parser::columns::{self, validate_columns, ColumnMap};
use crate::parser::deserializers::{parse_date, parse_number, parse_opt_string};
use crate::parser::types::ParseOutput;
use crate::record::{enrich, RawEntry, Record};

/// Parse a billing export from `path`.
/// `progress_cb(rows_processed)` is called every 500 rows.
pub fn parse_csv(
    path: &Path,
    config: &AppConfig,
    progress_cb: impl Fn(usize),
) -> Result<ParseOutput, AppError> {
    log::info!("Loading time entries from {}", path.display());
    let file = std::fs::File::open(path)?;
    parse_csv_reader(std::io::BufReader::new(file), config, progress_cb)
}

/// Core parsing logic, accepts any `Read` source.
///
/// The first invalid cell aborts the whole load: no partial record set is
/// ever returned.
pub fn parse_csv_reader<R: Read>(
    reader: R,
    config: &AppConfig,
    progress_cb: impl Fn(usize),
) -> Result<ParseOutput, AppError> {
    let start = Instant::now();

    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(config.delimiter_byte())
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    // Phase 1: validate columns
    let headers = rdr.headers()?.clone();
    if headers.is_empty() || headers.iter().all(|h| h.trim().is_empty()) {
        return Err(AppError::EmptyFile);
    }
    let col_map = ColumnMap::from_headers(&headers);
    let col_validation = validate_columns(&col_map)?;

    // Phase 2: parse and enrich rows
    let mut records: Vec<Record> = Vec::new();
    let mut row_idx = 0usize;

    for result in rdr.records() {
        row_idx += 1;
        if row_idx % 500 == 0 {
            progress_cb(row_idx);
        }

        let record = result?;
        let line = record
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(row_idx + 1);
        let row = Row {
            col_map: &col_map,
            record: &record,
            line,
            date_formats: &config.date_formats,
        };
        records.push(enrich(row.to_raw_entry()?));
    }

    let parse_duration_ms = start.elapsed().as_millis() as u64;
    log::info!(
        "Loaded {} time entries in {} ms",
        records.len(),
        parse_duration_ms
    );
    if !col_validation.missing_optional.is_empty() {
        log::debug!(
            "Optional columns absent: {}",
            col_validation.missing_optional.join(", ")
        );
    }

    Ok(ParseOutput {
        records,
        total_rows_processed: row_idx,
        detected_columns: col_validation.present,
        missing_optional_columns: col_validation.missing_optional,
        parse_duration_ms,
    })
}

/// One CSV row viewed through the header map.
struct Row<'a> {
    col_map: &'a ColumnMap,
    record: &'a csv::StringRecord,
    line: usize,
    date_formats: &'a [String],
}

impl Row<'_> {
    fn to_raw_entry(&self) -> Result<RawEntry, AppError> {
        Ok(RawEntry {
            activity_date: self.required_date(columns::ACTIVITY_DATE)?,
            matter_pending_date: self.optional_date(columns::MATTER_PENDING_DATE)?,
            matter_close_date: self.optional_date(columns::MATTER_CLOSE_DATE)?,
            attorney_name: self.required_text(columns::ATTORNEY, "attorney name")?,
            originating_attorney: self.text(columns::ORIGINATING_ATTORNEY),
            practice_area: self.text(columns::PRACTICE_AREA),
            matter_location: self.text(columns::MATTER_LOCATION),
            matter_status: self.text(columns::MATTER_STATUS),
            matter_stage: self.text(columns::MATTER_STAGE),
            billable_matter_flag: self.text(columns::BILLABLE_MATTER),
            matter_description: self.text(columns::MATTER_DESCRIPTION),
            billable_hours: self.number(columns::BILLABLE_HOURS)?,
            non_billable_hours: self.number(columns::NON_BILLABLE_HOURS)?,
            billed_hours: self.number(columns::BILLED_HOURS)?,
            unbilled_hours: self.number(columns::UNBILLED_HOURS)?,
            tracked_hours: self.number(columns::TRACKED_HOURS)?,
            billable_hours_amount: self.number(columns::BILLABLE_AMOUNT)?,
            billed_hours_amount: self.number(columns::BILLED_AMOUNT)?,
        })
    }

    fn cell(&self, col: &str) -> &str {
        self.col_map.get(self.record, col).unwrap_or("")
    }

    fn invalid(&self, col: &str, expected: &'static str) -> AppError {
        AppError::InvalidValue {
            line: self.line,
            column: col.to_string(),
            value: self.cell(col).to_string(),
            expected,
        }
    }

    fn text(&self, col: &str) -> Option<String> {
        parse_opt_string(self.cell(col))
    }

    fn required_text(&self, col: &str, expected: &'static str) -> Result<String, AppError> {
        self.text(col).ok_or_else(|| self.invalid(col, expected))
    }

    fn required_date(&self, col: &str) -> Result<NaiveDate, AppError> {
        parse_date(self.cell(col), self.date_formats).ok_or_else(|| self.invalid(col, "a date"))
    }

    fn optional_date(&self, col: &str) -> Result<Option<NaiveDate>, AppError> {
        if self.cell(col).trim().is_empty() {
            return Ok(None);
        }
        self.required_date(col).map(Some)
    }

    fn number(&self, col: &str) -> Result<f64, AppError> {
        parse_number(self.cell(col)).ok_or_else(|| self.invalid(col, "a number"))
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
