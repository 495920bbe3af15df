use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::record::{month_name, Record};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Granularity {
    Day,
    Month,
}

impl Granularity {
    /// First day of the period containing `date`.
    pub fn period_start(&self, date: NaiveDate) -> NaiveDate {
        match self {
            Granularity::Day => date,
            Granularity::Month => date.with_day(1).unwrap_or(date),
        }
    }

    /// "2024-01-15" for days, "2024-01" for months.
    pub fn period_key(&self, start: NaiveDate) -> String {
        match self {
            Granularity::Day => start.format("%Y-%m-%d").to_string(),
            Granularity::Month => start.format("%Y-%m").to_string(),
        }
    }

    /// "01/15" for days, "January 2024" for months.
    pub fn period_label(&self, start: NaiveDate) -> String {
        match self {
            Granularity::Day => format!("{:02}/{:02}", start.month(), start.day()),
            Granularity::Month => format!("{} {}", month_name(start.month()), start.year()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodPoint {
    pub period_key: String,
    pub period_label: String,
    pub period_start: NaiveDate,
    pub billable_hours: f64,
    pub billed_hours: f64,
    pub non_billable_hours: f64,
}

/// Trend series, ascending by period start. Only periods with at least one
/// entry appear: a missing period means "no data".
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSeries {
    pub granularity: Granularity,
    pub points: Vec<PeriodPoint>,
}

impl TimeSeries {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn get(&self, period_key: &str) -> Option<&PeriodPoint> {
        self.points.iter().find(|p| p.period_key == period_key)
    }
}

pub fn bucket(records: &[Record], granularity: Granularity) -> TimeSeries {
    let mut sums: BTreeMap<NaiveDate, (f64, f64, f64)> = BTreeMap::new();
    for r in records {
        let entry = sums
            .entry(granularity.period_start(r.activity_date))
            .or_insert((0.0, 0.0, 0.0));
        entry.0 += r.billable_hours;
        entry.1 += r.billed_hours;
        entry.2 += r.non_billable_hours;
    }

    let points = sums
        .into_iter()
        .map(|(start, (billable, billed, non_billable))| PeriodPoint {
            period_key: granularity.period_key(start),
            period_label: granularity.period_label(start),
            period_start: start,
            billable_hours: billable,
            billed_hours: billed,
            non_billable_hours: non_billable,
        })
        .collect();

    TimeSeries {
        granularity,
        points,
    }
}

pub fn daily(records: &[Record]) -> TimeSeries {
    bucket(records, Granularity::Day)
}

pub fn monthly(records: &[Record]) -> TimeSeries {
    bucket(records, Granularity::Month)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::enrich;
    use crate::record::fixtures::{raw, scenario};

    fn entry(date: &str, billable: f64, billed: f64, non_billable: f64) -> Record {
        let mut e = raw(date, "A", "Tax", billable);
        e.billed_hours = billed;
        e.non_billable_hours = non_billable;
        enrich(e)
    }

    #[test]
    fn test_daily_sums_same_day() {
        let records = vec![
            entry("2024-01-15", 2.0, 1.0, 0.5),
            entry("2024-01-15", 3.0, 3.0, 0.0),
            entry("2024-01-16", 1.0, 0.0, 1.0),
        ];
        let series = daily(&records);
        assert_eq!(series.points.len(), 2);
        let p = series.get("2024-01-15").unwrap();
        assert!((p.billable_hours - 5.0).abs() < 1e-10);
        assert!((p.billed_hours - 4.0).abs() < 1e-10);
        assert!((p.non_billable_hours - 0.5).abs() < 1e-10);
        assert_eq!(p.period_label, "01/15");
    }

    #[test]
    fn test_no_gap_filling() {
        let records = vec![entry("2024-01-10", 1.0, 0.0, 0.0), entry("2024-04-02", 1.0, 0.0, 0.0)];
        let series = monthly(&records);
        let keys: Vec<&str> = series.points.iter().map(|p| p.period_key.as_str()).collect();
        assert_eq!(keys, vec!["2024-01", "2024-04"]);
    }

    #[test]
    fn test_sorted_ascending_across_years() {
        let records = vec![
            entry("2024-01-03", 1.0, 0.0, 0.0),
            entry("2023-12-30", 1.0, 0.0, 0.0),
            entry("2023-12-01", 1.0, 0.0, 0.0),
        ];
        let series = monthly(&records);
        let keys: Vec<&str> = series.points.iter().map(|p| p.period_key.as_str()).collect();
        assert_eq!(keys, vec!["2023-12", "2024-01"]);
        assert_eq!(series.points[0].period_label, "December 2023");
        assert_eq!(
            series.points[0].period_start,
            NaiveDate::from_ymd_opt(2023, 12, 1).unwrap()
        );
        assert!((series.points[0].billable_hours - 2.0).abs() < 1e-10);
    }

    #[test]
    fn test_monthly_scenario() {
        let series = monthly(&scenario());
        assert_eq!(series.points.len(), 2);
        assert!((series.get("2024-03").unwrap().billable_hours - 8.0).abs() < 1e-10);
        assert!((series.get("2024-04").unwrap().non_billable_hours - 5.0).abs() < 1e-10);
    }

    #[test]
    fn test_empty_series() {
        assert!(daily(&[]).is_empty());
        assert!(monthly(&[]).is_empty());
    }
}
