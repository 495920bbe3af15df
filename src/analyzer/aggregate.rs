use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::Serialize;

use crate::analyzer::metrics::{ratio, DerivedMetrics};
use crate::parser::columns;
use crate::record::Record;

// ─── Keys and measures ───────────────────────────────────────────────────────

/// A categorical field usable as a grouping key. Every record has exactly
/// one value for each, so no record is ever dropped by grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Dimension {
    Attorney,
    PracticeArea,
    Client,
    Location,
}

impl Dimension {
    pub fn key<'a>(&self, r: &'a Record) -> &'a str {
        match self {
            Dimension::Attorney => &r.attorney_name,
            Dimension::PracticeArea => &r.practice_area,
            Dimension::Client => r.client(),
            Dimension::Location => &r.matter_location,
        }
    }

    /// Header used when the dimension is exported as a column.
    pub fn column_name(&self) -> &'static str {
        match self {
            Dimension::Attorney => columns::ATTORNEY,
            Dimension::PracticeArea => columns::PRACTICE_AREA,
            Dimension::Client => columns::MATTER_DESCRIPTION,
            Dimension::Location => columns::MATTER_LOCATION,
        }
    }
}

/// One dimension, or an ordered (parent, child) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum GroupBy {
    One(Dimension),
    Two(Dimension, Dimension),
}

impl GroupBy {
    pub fn dimensions(&self) -> Vec<Dimension> {
        match *self {
            GroupBy::One(d) => vec![d],
            GroupBy::Two(a, b) => vec![a, b],
        }
    }

    pub fn key(&self, r: &Record) -> Vec<String> {
        self.dimensions()
            .iter()
            .map(|d| d.key(r).to_string())
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Measure {
    BillableHours,
    NonBillableHours,
    BilledHours,
    UnbilledHours,
    TrackedHours,
    BillableAmount,
    BilledAmount,
}

impl Measure {
    pub const ALL: [Measure; 7] = [
        Measure::BillableHours,
        Measure::NonBillableHours,
        Measure::BilledHours,
        Measure::UnbilledHours,
        Measure::TrackedHours,
        Measure::BillableAmount,
        Measure::BilledAmount,
    ];

    /// Column set of the attorney / client / practice tables.
    pub const STANDARD: [Measure; 6] = [
        Measure::BillableHours,
        Measure::NonBillableHours,
        Measure::BilledHours,
        Measure::BillableAmount,
        Measure::BilledAmount,
        Measure::TrackedHours,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Measure::BillableHours => columns::BILLABLE_HOURS,
            Measure::NonBillableHours => columns::NON_BILLABLE_HOURS,
            Measure::BilledHours => columns::BILLED_HOURS,
            Measure::UnbilledHours => columns::UNBILLED_HOURS,
            Measure::TrackedHours => columns::TRACKED_HOURS,
            Measure::BillableAmount => columns::BILLABLE_AMOUNT,
            Measure::BilledAmount => columns::BILLED_AMOUNT,
        }
    }
}

// ─── Totals ──────────────────────────────────────────────────────────────────

/// Running sums of every numeric field over a group of records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    pub billable_hours: f64,
    pub non_billable_hours: f64,
    pub billed_hours: f64,
    pub unbilled_hours: f64,
    pub tracked_hours: f64,
    pub billable_amount: f64,
    pub billed_amount: f64,
    pub entries: usize,
}

impl Totals {
    pub fn add(&mut self, r: &Record) {
        self.billable_hours += r.billable_hours;
        self.non_billable_hours += r.non_billable_hours;
        self.billed_hours += r.billed_hours;
        self.unbilled_hours += r.unbilled_hours;
        self.tracked_hours += r.tracked_hours;
        self.billable_amount += r.billable_hours_amount;
        self.billed_amount += r.billed_hours_amount;
        self.entries += 1;
    }

    pub fn merge(&mut self, other: &Totals) {
        self.billable_hours += other.billable_hours;
        self.non_billable_hours += other.non_billable_hours;
        self.billed_hours += other.billed_hours;
        self.unbilled_hours += other.unbilled_hours;
        self.tracked_hours += other.tracked_hours;
        self.billable_amount += other.billable_amount;
        self.billed_amount += other.billed_amount;
        self.entries += other.entries;
    }

    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a Record>) -> Self {
        let mut totals = Totals::default();
        for r in records {
            totals.add(r);
        }
        totals
    }

    pub fn get(&self, measure: Measure) -> f64 {
        match measure {
            Measure::BillableHours => self.billable_hours,
            Measure::NonBillableHours => self.non_billable_hours,
            Measure::BilledHours => self.billed_hours,
            Measure::UnbilledHours => self.unbilled_hours,
            Measure::TrackedHours => self.tracked_hours,
            Measure::BillableAmount => self.billable_amount,
            Measure::BilledAmount => self.billed_amount,
        }
    }

    pub fn metrics(&self) -> DerivedMetrics {
        DerivedMetrics::compute(
            self.billable_hours,
            self.billed_hours,
            self.tracked_hours,
            self.billable_amount,
        )
    }
}

// ─── Aggregation result ──────────────────────────────────────────────────────

/// A key (or key pair) with its sums and derived ratios.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryRow {
    pub key: Vec<String>,
    #[serde(flatten)]
    pub totals: Totals,
    #[serde(flatten)]
    pub metrics: DerivedMetrics,
}

/// A child's share of its parent and of the grand total, in percent.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareRow {
    pub parent: String,
    pub child: String,
    pub value: f64,
    pub share_of_parent: f64,
    pub share_of_total: f64,
}

/// Grouped sums over a record set. Keys are unique; iteration is in key
/// order.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregationResult {
    pub group_by: GroupBy,
    /// Fields reported for this table, in column order.
    pub measures: Vec<Measure>,
    rows: BTreeMap<Vec<String>, Totals>,
}

impl AggregationResult {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, key: &[&str]) -> Option<&Totals> {
        let key: Vec<String> = key.iter().map(|k| k.to_string()).collect();
        self.rows.get(&key)
    }

    pub fn rows(&self) -> impl Iterator<Item = (&[String], &Totals)> {
        self.rows.iter().map(|(k, t)| (k.as_slice(), t))
    }

    pub fn summary_rows(&self) -> Vec<SummaryRow> {
        self.rows
            .iter()
            .map(|(key, totals)| SummaryRow {
                key: key.clone(),
                totals: *totals,
                metrics: totals.metrics(),
            })
            .collect()
    }

    pub fn grand_total(&self) -> Totals {
        let mut total = Totals::default();
        for t in self.rows.values() {
            total.merge(t);
        }
        total
    }

    /// Re-aggregate onto the single dimension at `level` of the key.
    /// Returns `None` if `level` is out of range.
    pub fn rollup(&self, level: usize) -> Option<AggregationResult> {
        let dimension = *self.group_by.dimensions().get(level)?;
        let mut rows: BTreeMap<Vec<String>, Totals> = BTreeMap::new();
        for (key, totals) in &self.rows {
            rows.entry(vec![key[level].clone()])
                .or_default()
                .merge(totals);
        }
        Some(AggregationResult {
            group_by: GroupBy::One(dimension),
            measures: self.measures.clone(),
            rows,
        })
    }

    /// The `n` rows with the largest `measure`, ties broken by key.
    pub fn top_n(&self, measure: Measure, n: usize) -> Vec<SummaryRow> {
        let mut rows = self.summary_rows();
        rows.sort_by(|a, b| {
            b.totals
                .get(measure)
                .partial_cmp(&a.totals.get(measure))
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.key.cmp(&b.key))
        });
        rows.truncate(n);
        rows
    }

    /// Share-of-whole rows for a two-level table; empty for one level.
    pub fn shares(&self, measure: Measure) -> Vec<ShareRow> {
        if !matches!(self.group_by, GroupBy::Two(..)) {
            return Vec::new();
        }
        let Some(parents) = self.rollup(0) else {
            return Vec::new();
        };
        let total = self.grand_total().get(measure);
        self.rows
            .iter()
            .map(|(key, totals)| {
                let value = totals.get(measure);
                let parent_value = parents
                    .get(&[key[0].as_str()])
                    .map(|t| t.get(measure))
                    .unwrap_or(0.0);
                ShareRow {
                    parent: key[0].clone(),
                    child: key[1].clone(),
                    value,
                    share_of_parent: ratio(value, parent_value) * 100.0,
                    share_of_total: ratio(value, total) * 100.0,
                }
            })
            .collect()
    }
}

/// Group `records` by `group_by`, summing every numeric field. Groups with
/// a zero sum are kept; an empty input gives an empty result.
pub fn aggregate(records: &[Record], group_by: GroupBy, measures: &[Measure]) -> AggregationResult {
    let mut rows: BTreeMap<Vec<String>, Totals> = BTreeMap::new();
    for r in records {
        rows.entry(group_by.key(r)).or_default().add(r);
    }
    AggregationResult {
        group_by,
        measures: measures.to_vec(),
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::enrich;
    use crate::record::fixtures::{raw, scenario};

    fn by_attorney(records: &[Record]) -> AggregationResult {
        aggregate(records, GroupBy::One(Dimension::Attorney), &Measure::STANDARD)
    }

    #[test]
    fn test_scenario_by_attorney() {
        let result = by_attorney(&scenario());
        assert_eq!(result.len(), 2);

        let a = result.get(&["A"]).unwrap();
        assert!((a.billable_hours - 8.0).abs() < 1e-10);
        assert!((a.tracked_hours - 8.0).abs() < 1e-10);
        assert!((a.billable_amount - 1600.0).abs() < 1e-10);
        let am = a.metrics();
        assert!((am.utilization_rate - 100.0).abs() < 1e-10);
        assert!((am.average_rate - 200.0).abs() < 1e-10);
        assert!((am.efficiency_rate - 87.5).abs() < 1e-10);

        let b = result.get(&["B"]).unwrap();
        assert!((b.billable_hours - 10.0).abs() < 1e-10);
        assert!((b.tracked_hours - 15.0).abs() < 1e-10);
        assert!((b.billable_amount - 2500.0).abs() < 1e-10);
        let bm = b.metrics();
        assert!((bm.utilization_rate - 66.666_666_67).abs() < 1e-6);
        assert!((bm.average_rate - 250.0).abs() < 1e-10);
    }

    #[test]
    fn test_empty_input_gives_empty_result() {
        let result = by_attorney(&[]);
        assert!(result.is_empty());
        assert!(result.summary_rows().is_empty());
        let total = result.grand_total();
        assert_eq!(total.entries, 0);
        assert_eq!(total.metrics().utilization_rate, 0.0);
        assert_eq!(total.metrics().average_rate, 0.0);
    }

    #[test]
    fn test_zero_sum_groups_are_kept() {
        let mut e = raw("2024-02-01", "C", "Pro Bono", 0.0);
        e.non_billable_hours = 2.0;
        e.tracked_hours = 2.0;
        let records = vec![enrich(e)];
        let result = aggregate(&records, GroupBy::One(Dimension::PracticeArea), &Measure::STANDARD);
        let row = result.get(&["Pro Bono"]).unwrap();
        assert_eq!(row.billable_hours, 0.0);
        let m = row.metrics();
        assert_eq!(m.utilization_rate, 0.0);
        assert_eq!(m.efficiency_rate, 0.0);
        assert_eq!(m.average_rate, 0.0);
    }

    #[test]
    fn test_grouping_is_case_sensitive() {
        let records = vec![
            enrich(raw("2024-02-01", "A", "Tax", 1.0)),
            enrich(raw("2024-02-01", "A", "tax", 1.0)),
        ];
        let result = aggregate(&records, GroupBy::One(Dimension::PracticeArea), &Measure::STANDARD);
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn test_two_level_rollup_matches_single_level() {
        let records = scenario();
        let pair = aggregate(
            &records,
            GroupBy::Two(Dimension::Client, Dimension::PracticeArea),
            &Measure::STANDARD,
        );
        assert_eq!(pair.len(), 3);
        let rolled = pair.rollup(1).unwrap();
        let direct = aggregate(&records, GroupBy::One(Dimension::PracticeArea), &Measure::STANDARD);
        assert_eq!(rolled.group_by, GroupBy::One(Dimension::PracticeArea));
        for (key, totals) in direct.rows() {
            let keys: Vec<&str> = key.iter().map(String::as_str).collect();
            let r = rolled.get(&keys).unwrap();
            assert!((r.billable_hours - totals.billable_hours).abs() < 1e-9);
            assert_eq!(r.entries, totals.entries);
        }
        assert!(pair.rollup(2).is_none());
    }

    #[test]
    fn test_top_n_orders_by_measure_desc() {
        let records = scenario();
        let by_client = aggregate(&records, GroupBy::One(Dimension::Client), &Measure::STANDARD);
        let top = by_client.top_n(Measure::BillableHours, 1);
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].key, vec!["Acme".to_string()]);
        assert!((top[0].totals.billable_hours - 15.0).abs() < 1e-10);
        assert_eq!(by_client.top_n(Measure::BillableHours, 10).len(), 2);
    }

    #[test]
    fn test_shares_within_parent() {
        let records = scenario();
        let pair = aggregate(
            &records,
            GroupBy::Two(Dimension::PracticeArea, Dimension::Attorney),
            &Measure::STANDARD,
        );
        let shares = pair.shares(Measure::BillableHours);
        assert_eq!(shares.len(), 2);
        for s in &shares {
            assert!((s.share_of_parent - 100.0).abs() < 1e-10);
        }
        let total_share: f64 = shares.iter().map(|s| s.share_of_total).sum();
        assert!((total_share - 100.0).abs() < 1e-9);

        let single = by_attorney(&records);
        assert!(single.shares(Measure::BillableHours).is_empty());
    }

    #[test]
    fn test_shares_zero_parent_guarded() {
        let records = vec![enrich(raw("2024-02-01", "A", "Tax", 0.0))];
        let pair = aggregate(
            &records,
            GroupBy::Two(Dimension::PracticeArea, Dimension::Attorney),
            &Measure::STANDARD,
        );
        let shares = pair.shares(Measure::BillableHours);
        assert_eq!(shares[0].share_of_parent, 0.0);
        assert_eq!(shares[0].share_of_total, 0.0);
    }
}
