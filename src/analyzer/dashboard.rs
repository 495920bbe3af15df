/// Dashboard view: filters a record set once and computes every table the
/// billing dashboard shows.
use std::time::Instant;

use serde::Serialize;

use super::aggregate::{aggregate, AggregationResult, Dimension, GroupBy, Measure, SummaryRow, Totals};
use super::metrics::{average_rate, utilization_rate};
use super::temporal::{daily, monthly, TimeSeries};
use crate::filter::{filter_records, FilterSpec};
use crate::record::Record;

// ─── Data Structures ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub meta: ViewMeta,
    pub key_metrics: KeyMetrics,
    pub hours_distribution: HoursDistribution,
    #[serde(skip)]
    pub by_practice_area: AggregationResult,
    #[serde(skip)]
    pub by_attorney: AggregationResult,
    #[serde(skip)]
    pub by_client: AggregationResult,
    #[serde(skip)]
    pub by_client_practice: AggregationResult,
    #[serde(skip)]
    pub by_practice_attorney: AggregationResult,
    pub top_clients: Vec<SummaryRow>,
    pub daily: TimeSeries,
    pub monthly: TimeSeries,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewMeta {
    pub total_records: usize,
    pub filtered_records: usize,
    pub active_facets: Vec<ActiveFacet>,
    pub calcul_duration_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveFacet {
    pub label: String,
    pub value: String,
}

/// Headline figures of the filtered view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyMetrics {
    pub total_billable_hours: f64,
    pub total_billable_amount: f64,
    pub total_billed_hours: f64,
    pub total_billed_amount: f64,
    pub utilization_rate: f64,
    pub average_rate: f64,
}

impl KeyMetrics {
    pub fn from_totals(t: &Totals) -> Self {
        KeyMetrics {
            total_billable_hours: t.billable_hours,
            total_billable_amount: t.billable_amount,
            total_billed_hours: t.billed_hours,
            total_billed_amount: t.billed_amount,
            utilization_rate: utilization_rate(t.billable_hours, t.tracked_hours),
            average_rate: average_rate(t.billable_amount, t.billable_hours),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HoursDistribution {
    pub billable_hours: f64,
    pub non_billable_hours: f64,
    pub unbilled_hours: f64,
}

impl HoursDistribution {
    pub fn from_totals(t: &Totals) -> Self {
        HoursDistribution {
            billable_hours: t.billable_hours,
            non_billable_hours: t.non_billable_hours,
            unbilled_hours: t.unbilled_hours,
        }
    }
}

/// Serialisable form of the grouped tables, for JSON output.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardTables {
    pub by_practice_area: Vec<SummaryRow>,
    pub by_attorney: Vec<SummaryRow>,
    pub by_client: Vec<SummaryRow>,
    pub by_client_practice: Vec<SummaryRow>,
    pub by_practice_attorney: Vec<SummaryRow>,
}

// ─── Main Entry Point ────────────────────────────────────────────────────────

impl DashboardView {
    pub fn build(records: &[Record], spec: &FilterSpec, top_clients: usize) -> Self {
        let start = Instant::now();

        let filtered = filter_records(records, spec);
        let totals = Totals::from_records(&filtered);

        let one = |d: Dimension| aggregate(&filtered, GroupBy::One(d), &Measure::STANDARD);
        let two = |a: Dimension, b: Dimension| {
            aggregate(&filtered, GroupBy::Two(a, b), &Measure::STANDARD)
        };

        let by_practice_area = one(Dimension::PracticeArea);
        let by_attorney = one(Dimension::Attorney);
        let by_client = one(Dimension::Client);
        let by_client_practice = two(Dimension::Client, Dimension::PracticeArea);
        let by_practice_attorney = two(Dimension::PracticeArea, Dimension::Attorney);
        let top = by_client.top_n(Measure::BillableHours, top_clients);

        let active_facets = spec
            .active_facets()
            .into_iter()
            .map(|(label, value)| ActiveFacet {
                label: label.to_string(),
                value,
            })
            .collect();

        let view = DashboardView {
            meta: ViewMeta {
                total_records: records.len(),
                filtered_records: filtered.len(),
                active_facets,
                calcul_duration_ms: start.elapsed().as_millis() as u64,
            },
            key_metrics: KeyMetrics::from_totals(&totals),
            hours_distribution: HoursDistribution::from_totals(&totals),
            by_practice_area,
            by_attorney,
            by_client,
            by_client_practice,
            by_practice_attorney,
            top_clients: top,
            daily: daily(&filtered),
            monthly: monthly(&filtered),
        };

        log::info!(
            "Dashboard built: {} of {} entries in {} ms",
            view.meta.filtered_records,
            view.meta.total_records,
            view.meta.calcul_duration_ms
        );
        view
    }

    pub fn tables(&self) -> DashboardTables {
        DashboardTables {
            by_practice_area: self.by_practice_area.summary_rows(),
            by_attorney: self.by_attorney.summary_rows(),
            by_client: self.by_client.summary_rows(),
            by_client_practice: self.by_client_practice.summary_rows(),
            by_practice_attorney: self.by_practice_attorney.summary_rows(),
        }
    }

    /// Every grouped table with the file stem it is exported under.
    pub fn named_tables(&self) -> [(&'static str, &AggregationResult); 5] {
        [
            ("practice_area_metrics", &self.by_practice_area),
            ("attorney_metrics", &self.by_attorney),
            ("client_metrics", &self.by_client),
            ("client_by_practice_area", &self.by_client_practice),
            ("practice_area_by_attorney", &self.by_practice_attorney),
        ]
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
