use std::collections::HashMap;

use crate::error::AppError;

pub const ACTIVITY_DATE: &str = "Activity date";
pub const MATTER_PENDING_DATE: &str = "Matter pending date";
pub const MATTER_CLOSE_DATE: &str = "Matter close date";
pub const ATTORNEY: &str = "User full name (first, last)";
pub const ORIGINATING_ATTORNEY: &str = "Originating attorney";
pub const PRACTICE_AREA: &str = "Practice area";
pub const MATTER_LOCATION: &str = "Matter location";
pub const MATTER_STATUS: &str = "Matter status";
pub const MATTER_STAGE: &str = "Matter stage";
pub const BILLABLE_MATTER: &str = "Billable matter";
pub const MATTER_DESCRIPTION: &str = "Matter description";
pub const BILLABLE_HOURS: &str = "Billable hours";
pub const NON_BILLABLE_HOURS: &str = "Non-billable hours";
pub const BILLED_HOURS: &str = "Billed hours";
pub const UNBILLED_HOURS: &str = "Unbilled hours";
pub const TRACKED_HOURS: &str = "Tracked hours";
pub const BILLABLE_AMOUNT: &str = "Billable hours amount";
pub const BILLED_AMOUNT: &str = "Billed hours amount";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Presence {
    Required,
    /// Absent from the header: every value in that column reads as a blank cell.
    Optional,
}

/// Every column the loader reads. Unknown extra columns are ignored.
const SCHEMA: &[(&str, Presence)] = &[
    (ACTIVITY_DATE, Presence::Required),
    (ATTORNEY, Presence::Required),
    (ORIGINATING_ATTORNEY, Presence::Required),
    (PRACTICE_AREA, Presence::Required),
    (MATTER_LOCATION, Presence::Required),
    (MATTER_STATUS, Presence::Required),
    (MATTER_STAGE, Presence::Optional),
    (BILLABLE_MATTER, Presence::Required),
    (MATTER_DESCRIPTION, Presence::Required),
    (BILLABLE_HOURS, Presence::Required),
    (NON_BILLABLE_HOURS, Presence::Required),
    (BILLED_HOURS, Presence::Required),
    (UNBILLED_HOURS, Presence::Required),
    (TRACKED_HOURS, Presence::Required),
    (BILLABLE_AMOUNT, Presence::Required),
    (BILLED_AMOUNT, Presence::Required),
    (MATTER_PENDING_DATE, Presence::Optional),
    (MATTER_CLOSE_DATE, Presence::Optional),
];

/// Header name to field position for one export file.
///
/// Names are compared after trimming, with a UTF-8 BOM on the first field
/// removed. When a name repeats, lookups resolve to its first position.
pub struct ColumnMap {
    positions: HashMap<String, usize>,
    headers: Vec<String>,
}

impl ColumnMap {
    pub fn from_headers(record: &csv::StringRecord) -> Self {
        let headers: Vec<String> = record
            .iter()
            .map(|field| field.trim_start_matches('\u{FEFF}').trim().to_string())
            .collect();
        let mut positions = HashMap::with_capacity(headers.len());
        for (pos, name) in headers.iter().enumerate() {
            if positions.contains_key(name) {
                log::warn!("Header {:?} repeats at field {}, keeping the first", name, pos + 1);
                continue;
            }
            positions.insert(name.clone(), pos);
        }
        ColumnMap { positions, headers }
    }

    /// Cell of `record` under `col`, or `None` when the header lacks it or
    /// the row is short.
    pub fn get<'a>(&self, record: &'a csv::StringRecord, col: &str) -> Option<&'a str> {
        let pos = *self.positions.get(col)?;
        record.get(pos)
    }

    pub fn has(&self, col: &str) -> bool {
        self.positions.contains_key(col)
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }
}

/// Outcome of checking a header against the loader's schema.
#[derive(Debug)]
pub struct ColumnValidation {
    /// The header as read, in file order.
    pub present: Vec<String>,
    pub missing_optional: Vec<String>,
}

pub fn validate_columns(col_map: &ColumnMap) -> Result<ColumnValidation, AppError> {
    let (missing_required, missing_optional): (Vec<_>, Vec<_>) = SCHEMA
        .iter()
        .filter(|(name, _)| !col_map.has(name))
        .partition(|(_, presence)| *presence == Presence::Required);

    if !missing_required.is_empty() {
        let names = missing_required.iter().map(|(n, _)| n.to_string()).collect();
        return Err(AppError::MissingColumns(names));
    }

    Ok(ColumnValidation {
        present: col_map.headers().to_vec(),
        missing_optional: missing_optional.iter().map(|(n, _)| n.to_string()).collect(),
    })
}
