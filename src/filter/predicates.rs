use std::collections::{BTreeSet, HashMap, HashSet};

use crate::filter::spec::{AmountRange, DateRange};
use crate::record::Record;

/// A constraint decided by one record's own fields.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordPredicate {
    Year(i32),
    Quarter(u32),
    Months(BTreeSet<String>),
    DateRange(DateRange),
    Attorneys(BTreeSet<String>),
    OriginatingAttorneys(BTreeSet<String>),
    PracticeAreas(BTreeSet<String>),
    Locations(BTreeSet<String>),
    MatterStatuses(BTreeSet<String>),
    MatterStages(BTreeSet<String>),
    BillableMatterFlags(BTreeSet<String>),
    MinAmount(f64),
    RateRange(AmountRange),
    Clients(BTreeSet<String>),
}

impl RecordPredicate {
    pub fn matches(&self, r: &Record) -> bool {
        match self {
            RecordPredicate::Year(y) => r.year == *y,
            RecordPredicate::Quarter(q) => r.quarter == *q,
            RecordPredicate::Months(set) => set.contains(&r.month_name),
            RecordPredicate::DateRange(range) => range.contains(r.activity_date),
            RecordPredicate::Attorneys(set) => set.contains(&r.attorney_name),
            RecordPredicate::OriginatingAttorneys(set) => in_set(set, &r.originating_attorney),
            RecordPredicate::PracticeAreas(set) => set.contains(&r.practice_area),
            RecordPredicate::Locations(set) => set.contains(&r.matter_location),
            RecordPredicate::MatterStatuses(set) => in_set(set, &r.matter_status),
            RecordPredicate::MatterStages(set) => in_set(set, &r.matter_stage),
            RecordPredicate::BillableMatterFlags(set) => in_set(set, &r.billable_matter_flag),
            RecordPredicate::MinAmount(min) => r.billable_hours_amount >= *min,
            RecordPredicate::RateRange(range) => range.contains(r.billable_hours_amount),
            RecordPredicate::Clients(set) => set.contains(&r.matter_description),
        }
    }

    pub fn apply(&self, records: &[Record]) -> Vec<Record> {
        records.iter().filter(|r| self.matches(r)).cloned().collect()
    }
}

/// Absent optional values never match a non-empty selection.
fn in_set(set: &BTreeSet<String>, value: &Option<String>) -> bool {
    value.as_ref().is_some_and(|v| set.contains(v))
}

/// Dimension a group threshold sums over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThresholdDimension {
    Attorney,
    Client,
}

impl ThresholdDimension {
    fn key<'a>(&self, r: &'a Record) -> &'a str {
        match self {
            ThresholdDimension::Attorney => &r.attorney_name,
            ThresholdDimension::Client => r.client(),
        }
    }
}

/// "Keep only groups whose billable hours reach `min_hours`", evaluated
/// against whatever record set it is handed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroupThreshold {
    pub dimension: ThresholdDimension,
    pub min_hours: f64,
}

impl GroupThreshold {
    /// Groups of `records` whose billable sum meets the threshold.
    pub fn qualifying_groups<'a>(&self, records: &'a [Record]) -> HashSet<&'a str> {
        let mut sums: HashMap<&str, f64> = HashMap::new();
        for r in records {
            *sums.entry(self.dimension.key(r)).or_insert(0.0) += r.billable_hours;
        }
        sums.into_iter()
            .filter(|(_, hours)| *hours >= self.min_hours)
            .map(|(key, _)| key)
            .collect()
    }

    pub fn apply(&self, records: &[Record]) -> Vec<Record> {
        let keep = self.qualifying_groups(records);
        records
            .iter()
            .filter(|r| keep.contains(self.dimension.key(r)))
            .cloned()
            .collect()
    }
}
