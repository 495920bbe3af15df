use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::Serialize;

use crate::filter::spec::{AmountRange, DateRange, FilterSpec};
use crate::record::{month_name, Record};

/// Value lists and ranges a filter control surface offers, derived from the
/// loaded records. Absent optional values never appear in a list.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FacetOptions {
    pub years: Vec<i32>,
    pub quarters: Vec<u32>,
    /// Calendar order.
    pub months: Vec<String>,
    pub date_range: Option<DateRange>,
    pub attorneys: Vec<String>,
    pub originating_attorneys: Vec<String>,
    pub practice_areas: Vec<String>,
    pub locations: Vec<String>,
    pub matter_statuses: Vec<String>,
    pub matter_stages: Vec<String>,
    pub billable_matter_flags: Vec<String>,
    pub clients: Vec<String>,
    pub max_entry_billable_hours: f64,
    pub amount_range: Option<AmountRange>,
    pub max_client_hours: f64,
}

impl FacetOptions {
    pub fn from_records(records: &[Record]) -> Self {
        let mut years = BTreeSet::new();
        let mut quarters = BTreeSet::new();
        let mut months = BTreeSet::new();
        let mut attorneys = BTreeSet::new();
        let mut originating = BTreeSet::new();
        let mut practice_areas = BTreeSet::new();
        let mut locations = BTreeSet::new();
        let mut statuses = BTreeSet::new();
        let mut stages = BTreeSet::new();
        let mut flags = BTreeSet::new();
        let mut client_hours: BTreeMap<&str, f64> = BTreeMap::new();

        let mut first: Option<NaiveDate> = None;
        let mut last: Option<NaiveDate> = None;
        let mut amount_range: Option<AmountRange> = None;
        let mut max_entry_billable_hours = 0.0f64;

        for r in records {
            years.insert(r.year);
            quarters.insert(r.quarter);
            months.insert(r.month);
            attorneys.insert(r.attorney_name.as_str());
            practice_areas.insert(r.practice_area.as_str());
            locations.insert(r.matter_location.as_str());
            insert_opt(&mut originating, &r.originating_attorney);
            insert_opt(&mut statuses, &r.matter_status);
            insert_opt(&mut stages, &r.matter_stage);
            insert_opt(&mut flags, &r.billable_matter_flag);
            *client_hours.entry(r.client()).or_insert(0.0) += r.billable_hours;

            first = Some(first.map_or(r.activity_date, |d| d.min(r.activity_date)));
            last = Some(last.map_or(r.activity_date, |d| d.max(r.activity_date)));
            let amount = r.billable_hours_amount;
            amount_range = Some(match amount_range {
                Some(range) => AmountRange {
                    min: range.min.min(amount),
                    max: range.max.max(amount),
                },
                None => AmountRange {
                    min: amount,
                    max: amount,
                },
            });
            max_entry_billable_hours = max_entry_billable_hours.max(r.billable_hours);
        }

        let max_client_hours = client_hours.values().copied().fold(0.0, f64::max);

        FacetOptions {
            years: years.into_iter().collect(),
            quarters: quarters.into_iter().collect(),
            months: months
                .into_iter()
                .map(|m| month_name(m).to_string())
                .collect(),
            date_range: first.zip(last).map(|(start, end)| DateRange { start, end }),
            attorneys: to_vec(attorneys),
            originating_attorneys: to_vec(originating),
            practice_areas: to_vec(practice_areas),
            locations: to_vec(locations),
            matter_statuses: to_vec(statuses),
            matter_stages: to_vec(stages),
            billable_matter_flags: to_vec(flags),
            clients: client_hours.keys().map(|c| c.to_string()).collect(),
            max_entry_billable_hours,
            amount_range,
            max_client_hours,
        }
    }

    /// The starting view: latest year selected, every other facet open.
    pub fn initial_filter(&self) -> FilterSpec {
        FilterSpec {
            year: self.years.last().copied(),
            ..FilterSpec::default()
        }
    }
}

fn insert_opt<'a>(set: &mut BTreeSet<&'a str>, value: &'a Option<String>) {
    if let Some(v) = value {
        set.insert(v.as_str());
    }
}

fn to_vec(set: BTreeSet<&str>) -> Vec<String> {
    set.into_iter().map(str::to_string).collect()
}
