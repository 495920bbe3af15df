//! Ratio metrics over summed fields. Every function returns 0.0 on a zero
//! denominator; a category with no billable activity is a normal group.

use serde::Serialize;

/// Billable hours as a percentage of tracked hours.
pub fn utilization_rate(billable_hours: f64, tracked_hours: f64) -> f64 {
    ratio(billable_hours, tracked_hours) * 100.0
}

/// Billed hours as a percentage of billable hours.
pub fn efficiency_rate(billed_hours: f64, billable_hours: f64) -> f64 {
    ratio(billed_hours, billable_hours) * 100.0
}

/// Billable amount per billable hour.
pub fn average_rate(billable_amount: f64, billable_hours: f64) -> f64 {
    ratio(billable_amount, billable_hours)
}

/// `num / den`, or 0.0 when `den` is not strictly positive.
pub fn ratio(num: f64, den: f64) -> f64 {
    if den > 0.0 {
        num / den
    } else {
        0.0
    }
}

/// Presentation rounding; internal sums keep full precision.
pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Metric {
    UtilizationRate,
    EfficiencyRate,
    AverageRate,
}

impl Metric {
    pub const ALL: [Metric; 3] = [
        Metric::UtilizationRate,
        Metric::EfficiencyRate,
        Metric::AverageRate,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Metric::UtilizationRate => "Utilization Rate",
            Metric::EfficiencyRate => "Efficiency Rate",
            Metric::AverageRate => "Average Rate",
        }
    }
}

/// The three derived ratios of one aggregated row, unrounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedMetrics {
    pub utilization_rate: f64,
    pub efficiency_rate: f64,
    pub average_rate: f64,
}

impl DerivedMetrics {
    pub fn compute(
        billable_hours: f64,
        billed_hours: f64,
        tracked_hours: f64,
        billable_amount: f64,
    ) -> Self {
        DerivedMetrics {
            utilization_rate: utilization_rate(billable_hours, tracked_hours),
            efficiency_rate: efficiency_rate(billed_hours, billable_hours),
            average_rate: average_rate(billable_amount, billable_hours),
        }
    }

    pub fn get(&self, metric: Metric) -> f64 {
        match metric {
            Metric::UtilizationRate => self.utilization_rate,
            Metric::EfficiencyRate => self.efficiency_rate,
            Metric::AverageRate => self.average_rate,
        }
    }

    pub fn rounded(&self) -> Self {
        DerivedMetrics {
            utilization_rate: round2(self.utilization_rate),
            efficiency_rate: round2(self.efficiency_rate),
            average_rate: round2(self.average_rate),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utilization_zero_tracked() {
        assert_eq!(utilization_rate(5.0, 0.0), 0.0);
        assert_eq!(utilization_rate(0.0, 0.0), 0.0);
    }

    #[test]
    fn test_efficiency_and_average_zero_billable() {
        assert_eq!(efficiency_rate(3.0, 0.0), 0.0);
        assert_eq!(average_rate(500.0, 0.0), 0.0);
    }

    #[test]
    fn test_known_values() {
        assert!((utilization_rate(10.0, 15.0) - 66.666_666_666).abs() < 1e-6);
        assert!((efficiency_rate(8.0, 10.0) - 80.0).abs() < 1e-10);
        assert!((average_rate(2500.0, 10.0) - 250.0).abs() < 1e-10);
    }

    #[test]
    fn test_never_nan() {
        let m = DerivedMetrics::compute(0.0, 0.0, 0.0, 0.0);
        for metric in Metric::ALL {
            assert!(!m.get(metric).is_nan());
            assert_eq!(m.get(metric), 0.0);
        }
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(66.666_666), 66.67);
        assert_eq!(round2(200.0), 200.0);
        assert_eq!(round2(0.004), 0.0);
        let m = DerivedMetrics::compute(10.0, 8.0, 15.0, 2500.0).rounded();
        assert_eq!(m.utilization_rate, 66.67);
        assert_eq!(m.efficiency_rate, 80.0);
        assert_eq!(m.average_rate, 250.0);
    }
}
