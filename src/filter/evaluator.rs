use std::collections::BTreeSet;

use crate::filter::predicates::{GroupThreshold, RecordPredicate, ThresholdDimension};
use crate::filter::spec::{active_threshold, FilterSpec};
use crate::record::Record;

/// A `FilterSpec` compiled into its two evaluation stages.
///
/// Independent predicates always run first; group thresholds then run in a
/// fixed order (attorney, then client), each over the set left by the
/// previous step. A threshold therefore means "minimum hours within the
/// currently filtered view".
#[derive(Debug, Clone, PartialEq)]
pub struct FilterPlan {
    pub predicates: Vec<RecordPredicate>,
    pub thresholds: Vec<GroupThreshold>,
}

impl FilterPlan {
    pub fn from_spec(spec: &FilterSpec) -> Self {
        let mut predicates = Vec::new();

        if let Some(y) = spec.year {
            predicates.push(RecordPredicate::Year(y));
        }
        if let Some(q) = spec.quarter {
            predicates.push(RecordPredicate::Quarter(q));
        }
        let sets: [(&BTreeSet<String>, fn(BTreeSet<String>) -> RecordPredicate); 9] = [
            (&spec.months, RecordPredicate::Months),
            (&spec.attorneys, RecordPredicate::Attorneys),
            (&spec.originating_attorneys, RecordPredicate::OriginatingAttorneys),
            (&spec.practice_areas, RecordPredicate::PracticeAreas),
            (&spec.locations, RecordPredicate::Locations),
            (&spec.matter_statuses, RecordPredicate::MatterStatuses),
            (&spec.matter_stages, RecordPredicate::MatterStages),
            (&spec.billable_matter_flags, RecordPredicate::BillableMatterFlags),
            (&spec.clients, RecordPredicate::Clients),
        ];
        for (set, make) in sets {
            if !set.is_empty() {
                predicates.push(make(set.clone()));
            }
        }
        if let Some(range) = spec.date_range {
            predicates.push(RecordPredicate::DateRange(range));
        }
        if let Some(min) = active_threshold(spec.min_amount) {
            predicates.push(RecordPredicate::MinAmount(min));
        }
        if let Some(range) = spec.rate_range {
            predicates.push(RecordPredicate::RateRange(range));
        }

        let mut thresholds = Vec::new();
        if let Some(min) = active_threshold(spec.min_attorney_hours) {
            thresholds.push(GroupThreshold {
                dimension: ThresholdDimension::Attorney,
                min_hours: min,
            });
        }
        if let Some(min) = active_threshold(spec.min_client_hours) {
            thresholds.push(GroupThreshold {
                dimension: ThresholdDimension::Client,
                min_hours: min,
            });
        }

        FilterPlan {
            predicates,
            thresholds,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty() && self.thresholds.is_empty()
    }

    /// Stage 1: records passing every independent predicate, in input order.
    pub fn apply_predicates(&self, records: &[Record]) -> Vec<Record> {
        records
            .iter()
            .filter(|r| self.predicates.iter().all(|p| p.matches(r)))
            .cloned()
            .collect()
    }

    /// Stage 2: group thresholds over the output of stage 1.
    ///
    /// With both thresholds active, dropping a client can push an attorney
    /// back under the minimum, so the ordered pass repeats until the set is
    /// stable. A single threshold is stable after one pass.
    pub fn apply_thresholds(&self, records: Vec<Record>) -> Vec<Record> {
        let mut current = self.threshold_pass(records);
        if self.thresholds.len() < 2 {
            return current;
        }
        loop {
            let before = current.len();
            current = self.threshold_pass(current);
            // thresholds only ever remove records
            if current.len() == before {
                return current;
            }
        }
    }

    fn threshold_pass(&self, records: Vec<Record>) -> Vec<Record> {
        self.thresholds.iter().fold(records, |current, t| {
            let kept = t.apply(&current);
            log::debug!(
                "{:?} threshold {:.2}h: {} -> {} entries",
                t.dimension,
                t.min_hours,
                current.len(),
                kept.len()
            );
            kept
        })
    }

    pub fn apply(&self, records: &[Record]) -> Vec<Record> {
        let narrowed = self.apply_predicates(records);
        log::debug!(
            "{} record predicates: {} -> {} entries",
            self.predicates.len(),
            records.len(),
            narrowed.len()
        );
        self.apply_thresholds(narrowed)
    }
}

/// Subset of `records` satisfying every active constraint of `spec`.
pub fn filter_records(records: &[Record], spec: &FilterSpec) -> Vec<Record> {
    FilterPlan::from_spec(spec).apply(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::fixtures::{raw, scenario};
    use crate::record::{enrich, Record};

    fn names(records: &[Record]) -> Vec<&str> {
        records.iter().map(|r| r.attorney_name.as_str()).collect()
    }

    /// X: 8h of Tax. Y: 4h Tax + 8h Litigation = 12h.
    fn threshold_fixture() -> Vec<Record> {
        vec![
            enrich(raw("2024-01-03", "X", "Tax", 8.0)),
            enrich(raw("2024-01-04", "Y", "Tax", 4.0)),
            enrich(raw("2024-01-05", "Y", "Litigation", 8.0)),
        ]
    }

    #[test]
    fn test_empty_spec_keeps_everything() {
        let records = scenario();
        let spec = FilterSpec::default();
        assert!(FilterPlan::from_spec(&spec).is_empty());
        assert_eq!(filter_records(&records, &spec), records);
    }

    #[test]
    fn test_scenario_min_attorney_hours_nine() {
        let records = scenario();
        let spec = FilterSpec::new().with_min_attorney_hours(9.0);
        let out = filter_records(&records, &spec);
        assert_eq!(names(&out), vec!["B"]);
    }

    #[test]
    fn test_threshold_keeps_only_qualifying_attorney() {
        let spec = FilterSpec::new().with_min_attorney_hours(10.0);
        let out = filter_records(&threshold_fixture(), &spec);
        assert_eq!(names(&out), vec!["Y", "Y"]);
    }

    #[test]
    fn test_threshold_sees_only_the_filtered_view() {
        // Narrowing to Tax leaves Y with 4h, below the 10h minimum.
        let spec = FilterSpec::new()
            .with_min_attorney_hours(10.0)
            .with_practice_areas(["Tax"]);
        let out = filter_records(&threshold_fixture(), &spec);
        assert!(out.is_empty(), "Y drops below threshold once Litigation is removed");

        let spec = FilterSpec::new()
            .with_min_attorney_hours(4.0)
            .with_practice_areas(["Tax"]);
        let out = filter_records(&threshold_fixture(), &spec);
        assert_eq!(names(&out), vec!["X", "Y"]);
    }

    #[test]
    fn test_attorney_threshold_runs_before_client_threshold() {
        // Acme: X 6h + Y 1h. Globex: Y 3h.
        let mut a = raw("2024-01-01", "X", "Tax", 6.0);
        a.matter_description = Some("Acme".into());
        let mut b = raw("2024-01-01", "Y", "Tax", 1.0);
        b.matter_description = Some("Acme".into());
        let mut c = raw("2024-01-02", "Y", "Tax", 3.0);
        c.matter_description = Some("Globex".into());
        let records: Vec<Record> = vec![enrich(a), enrich(b), enrich(c)];

        let spec = FilterSpec::new()
            .with_min_attorney_hours(5.0)
            .with_min_client_hours(6.5);
        let plan = FilterPlan::from_spec(&spec);
        assert_eq!(plan.thresholds[0].dimension, ThresholdDimension::Attorney);
        assert_eq!(plan.thresholds[1].dimension, ThresholdDimension::Client);

        // Attorney pass removes Y (4h), leaving Acme at 6h < 6.5h.
        assert!(plan.apply(&records).is_empty());

        // Client-first would have kept Acme (7h) and then X (6h).
        let client_first = GroupThreshold {
            dimension: ThresholdDimension::Client,
            min_hours: 6.5,
        }
        .apply(&records);
        let then_attorney = GroupThreshold {
            dimension: ThresholdDimension::Attorney,
            min_hours: 5.0,
        }
        .apply(&client_first);
        assert_eq!(names(&then_attorney), vec!["X"]);
    }

    #[test]
    fn test_both_thresholds_repeat_until_stable() {
        // X: Acme 4h + Globex 2h. Y: Globex 7h.
        let mut a = raw("2024-01-01", "X", "Tax", 4.0);
        a.matter_description = Some("Acme".into());
        let mut b = raw("2024-01-02", "X", "Tax", 2.0);
        b.matter_description = Some("Globex".into());
        let mut c = raw("2024-01-03", "Y", "Tax", 7.0);
        c.matter_description = Some("Globex".into());
        let records: Vec<Record> = vec![enrich(a), enrich(b), enrich(c)];

        let spec = FilterSpec::new()
            .with_min_attorney_hours(5.0)
            .with_min_client_hours(6.0);
        // First pass drops Acme, leaving X with 2h; second pass drops X.
        let once = filter_records(&records, &spec);
        assert_eq!(names(&once), vec!["Y"]);
        assert_eq!(filter_records(&once, &spec), once);
    }

    #[test]
    fn test_zero_threshold_is_noop() {
        let records = threshold_fixture();
        let spec = FilterSpec::new()
            .with_min_attorney_hours(0.0)
            .with_min_client_hours(0.0);
        assert_eq!(filter_records(&records, &spec).len(), records.len());
    }

    #[test]
    fn test_and_across_facets_or_within() {
        let records = scenario();
        let spec = FilterSpec::new()
            .with_attorneys(["A", "B"])
            .with_practice_areas(["Corporate"]);
        let out = filter_records(&records, &spec);
        assert_eq!(names(&out), vec!["B"]);
    }

    #[test]
    fn test_no_match_yields_empty_not_error() {
        let records = scenario();
        let spec = FilterSpec::new().with_year(1999);
        assert!(filter_records(&records, &spec).is_empty());
        assert!(filter_records(&[], &FilterSpec::new().with_min_client_hours(3.0)).is_empty());
    }

    #[test]
    fn test_filter_preserves_input_order() {
        let records = scenario();
        let out = filter_records(&records, &FilterSpec::new().with_year(2024));
        assert_eq!(out, records);
    }
}
