use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Inclusive calendar-date range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Inclusive numeric range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AmountRange {
    pub min: f64,
    pub max: f64,
}

impl AmountRange {
    pub fn contains(&self, value: f64) -> bool {
        self.min <= value && value <= self.max
    }
}

/// The active constraints of one dashboard view, across the six facets.
///
/// A plain value: every field defaults to "absent", an empty set matches
/// everything, and a threshold of `0` (or below) is inactive.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterSpec {
    // Time
    pub year: Option<i32>,
    pub quarter: Option<u32>,
    pub months: BTreeSet<String>,
    pub date_range: Option<DateRange>,

    // Attorney
    pub attorneys: BTreeSet<String>,
    pub originating_attorneys: BTreeSet<String>,
    pub min_attorney_hours: Option<f64>,

    // Practice
    pub practice_areas: BTreeSet<String>,
    pub locations: BTreeSet<String>,

    // Matter
    pub matter_statuses: BTreeSet<String>,
    pub matter_stages: BTreeSet<String>,
    pub billable_matter_flags: BTreeSet<String>,

    // Financial
    pub min_amount: Option<f64>,
    pub rate_range: Option<AmountRange>,

    // Client
    pub clients: BTreeSet<String>,
    pub min_client_hours: Option<f64>,
}

impl FilterSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    pub fn with_quarter(mut self, quarter: u32) -> Self {
        self.quarter = Some(quarter);
        self
    }

    pub fn with_months<I, S>(mut self, months: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.months.extend(months.into_iter().map(Into::into));
        self
    }

    pub fn with_date_range(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.date_range = Some(DateRange { start, end });
        self
    }

    pub fn with_attorneys<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attorneys.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn with_min_attorney_hours(mut self, hours: f64) -> Self {
        self.min_attorney_hours = Some(hours);
        self
    }

    pub fn with_practice_areas<I, S>(mut self, areas: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.practice_areas.extend(areas.into_iter().map(Into::into));
        self
    }

    pub fn with_min_amount(mut self, amount: f64) -> Self {
        self.min_amount = Some(amount);
        self
    }

    pub fn with_rate_range(mut self, min: f64, max: f64) -> Self {
        self.rate_range = Some(AmountRange { min, max });
        self
    }

    pub fn with_clients<I, S>(mut self, clients: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.clients.extend(clients.into_iter().map(Into::into));
        self
    }

    pub fn with_min_client_hours(mut self, hours: f64) -> Self {
        self.min_client_hours = Some(hours);
        self
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn is_empty(&self) -> bool {
        self.active_facets().is_empty()
    }

    /// `(label, rendered value)` for every active constraint, in evaluation
    /// order.
    pub fn active_facets(&self) -> Vec<(&'static str, String)> {
        let mut out = Vec::new();
        if let Some(year) = self.year {
            out.push(("Year", year.to_string()));
        }
        if let Some(q) = self.quarter {
            out.push(("Quarter", format!("Q{}", q)));
        }
        push_set(&mut out, "Months", &self.months);
        if let Some(r) = self.date_range {
            out.push(("Date range", format!("{} to {}", r.start, r.end)));
        }
        push_set(&mut out, "Attorneys", &self.attorneys);
        push_set(&mut out, "Originating attorneys", &self.originating_attorneys);
        push_set(&mut out, "Practice areas", &self.practice_areas);
        push_set(&mut out, "Locations", &self.locations);
        push_set(&mut out, "Matter status", &self.matter_statuses);
        push_set(&mut out, "Matter stage", &self.matter_stages);
        push_set(&mut out, "Billable matter", &self.billable_matter_flags);
        if let Some(min) = active_threshold(self.min_amount) {
            out.push(("Minimum billable amount", format!("{:.2}", min)));
        }
        if let Some(r) = self.rate_range {
            out.push(("Rate range", format!("{:.2} to {:.2}", r.min, r.max)));
        }
        push_set(&mut out, "Clients", &self.clients);
        if let Some(min) = active_threshold(self.min_attorney_hours) {
            out.push(("Minimum attorney hours", format!("{:.2}", min)));
        }
        if let Some(min) = active_threshold(self.min_client_hours) {
            out.push(("Minimum client hours", format!("{:.2}", min)));
        }
        out
    }
}

/// `Some(x)` only for a threshold strictly above zero.
pub(crate) fn active_threshold(value: Option<f64>) -> Option<f64> {
    value.filter(|v| *v > 0.0)
}

fn push_set(out: &mut Vec<(&'static str, String)>, label: &'static str, set: &BTreeSet<String>) {
    if !set.is_empty() {
        let values: Vec<&str> = set.iter().map(String::as_str).collect();
        out.push((label, values.join(", ")));
    }
}
