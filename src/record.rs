use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Default grouping value for blank practice areas and locations.
pub const UNSPECIFIED: &str = "Unspecified";

/// One time entry as delivered by the loader: typed, but not yet normalised.
#[derive(Debug, Clone, PartialEq)]
pub struct RawEntry {
    pub activity_date: NaiveDate,
    pub matter_pending_date: Option<NaiveDate>,
    pub matter_close_date: Option<NaiveDate>,
    pub attorney_name: String,
    pub originating_attorney: Option<String>,
    pub practice_area: Option<String>,
    pub matter_location: Option<String>,
    pub matter_status: Option<String>,
    pub matter_stage: Option<String>,
    pub billable_matter_flag: Option<String>,
    pub matter_description: Option<String>,
    pub billable_hours: f64,
    pub non_billable_hours: f64,
    pub billed_hours: f64,
    pub unbilled_hours: f64,
    pub tracked_hours: f64,
    pub billable_hours_amount: f64,
    pub billed_hours_amount: f64,
}

/// An enriched time entry. Every grouping key is total and the derived
/// fields depend only on this entry's own raw fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub activity_date: NaiveDate,
    pub matter_pending_date: Option<NaiveDate>,
    pub matter_close_date: Option<NaiveDate>,
    pub attorney_name: String,
    pub originating_attorney: Option<String>,
    pub practice_area: String,
    pub matter_location: String,
    pub matter_status: Option<String>,
    pub matter_stage: Option<String>,
    pub billable_matter_flag: Option<String>,
    /// Client identifier.
    pub matter_description: String,
    pub billable_hours: f64,
    pub non_billable_hours: f64,
    pub billed_hours: f64,
    pub unbilled_hours: f64,
    pub tracked_hours: f64,
    pub billable_hours_amount: f64,
    pub billed_hours_amount: f64,

    pub year: i32,
    pub month: u32,
    pub month_name: String,
    pub quarter: u32,
    pub total_hours: f64,
    pub utilization_rate: f64,
}

impl Record {
    pub fn client(&self) -> &str {
        &self.matter_description
    }
}

/// Normalise one raw entry: fill grouping defaults and compute the
/// calendar and ratio fields.
pub fn enrich(raw: RawEntry) -> Record {
    let date = raw.activity_date;
    let total_hours = raw.billable_hours + raw.non_billable_hours;
    let utilization_rate = if total_hours > 0.0 {
        raw.billable_hours / total_hours * 100.0
    } else {
        0.0
    };

    Record {
        activity_date: date,
        matter_pending_date: raw.matter_pending_date,
        matter_close_date: raw.matter_close_date,
        attorney_name: raw.attorney_name.trim().to_string(),
        originating_attorney: non_blank(raw.originating_attorney),
        practice_area: non_blank(raw.practice_area).unwrap_or_else(|| UNSPECIFIED.to_string()),
        matter_location: non_blank(raw.matter_location)
            .unwrap_or_else(|| UNSPECIFIED.to_string()),
        matter_status: non_blank(raw.matter_status),
        matter_stage: non_blank(raw.matter_stage),
        billable_matter_flag: non_blank(raw.billable_matter_flag),
        matter_description: non_blank(raw.matter_description).unwrap_or_default(),
        billable_hours: raw.billable_hours,
        non_billable_hours: raw.non_billable_hours,
        billed_hours: raw.billed_hours,
        unbilled_hours: raw.unbilled_hours,
        tracked_hours: raw.tracked_hours,
        billable_hours_amount: raw.billable_hours_amount,
        billed_hours_amount: raw.billed_hours_amount,
        year: date.year(),
        month: date.month(),
        month_name: month_name(date.month()).to_string(),
        quarter: quarter_of(date.month()),
        total_hours,
        utilization_rate,
    }
}

pub fn enrich_all(raw: Vec<RawEntry>) -> Vec<Record> {
    raw.into_iter().map(enrich).collect()
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Calendar quarter (1-4) for a month number.
pub fn quarter_of(month: u32) -> u32 {
    (month.clamp(1, 12) - 1) / 3 + 1
}

pub fn month_name(month: u32) -> &'static str {
    match month {
        1 => "January",
        2 => "February",
        3 => "March",
        4 => "April",
        5 => "May",
        6 => "June",
        7 => "July",
        8 => "August",
        9 => "September",
        10 => "October",
        11 => "November",
        12 => "December",
        _ => "Unknown",
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::raw;
    use super::*;

    #[test]
    fn test_enrich_calendar_fields() {
        let r = enrich(raw("2024-11-15", "A", "Litigation", 1.0));
        assert_eq!(r.year, 2024);
        assert_eq!(r.month, 11);
        assert_eq!(r.month_name, "November");
        assert_eq!(r.quarter, 4);
    }

    #[test]
    fn test_enrich_defaults_blank_grouping_keys() {
        let mut e = raw("2024-01-02", "A", "", 1.0);
        e.matter_location = Some("   ".into());
        e.matter_description = None;
        e.originating_attorney = Some("".into());
        let r = enrich(e);
        assert_eq!(r.practice_area, UNSPECIFIED);
        assert_eq!(r.matter_location, UNSPECIFIED);
        assert_eq!(r.matter_description, "");
        assert!(r.originating_attorney.is_none());
    }

    #[test]
    fn test_enrich_utilization_rate() {
        let mut e = raw("2024-01-02", "A", "Tax", 3.0);
        e.non_billable_hours = 1.0;
        let r = enrich(e);
        assert!((r.total_hours - 4.0).abs() < 1e-10);
        assert!((r.utilization_rate - 75.0).abs() < 1e-10);
    }

    #[test]
    fn test_enrich_utilization_zero_hours() {
        let r = enrich(raw("2024-01-02", "A", "Tax", 0.0));
        assert_eq!(r.total_hours, 0.0);
        assert_eq!(r.utilization_rate, 0.0);
        assert!(!r.utilization_rate.is_nan());
    }

    #[test]
    fn test_quarter_boundaries() {
        assert_eq!(quarter_of(1), 1);
        assert_eq!(quarter_of(3), 1);
        assert_eq!(quarter_of(4), 2);
        assert_eq!(quarter_of(9), 3);
        assert_eq!(quarter_of(10), 4);
        assert_eq!(quarter_of(12), 4);
    }

    #[test]
    fn test_month_names() {
        assert_eq!(month_name(1), "January");
        assert_eq!(month_name(12), "December");
        assert_eq!(month_name(13), "Unknown");
    }
}
