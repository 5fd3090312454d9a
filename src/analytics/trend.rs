//! Least-squares trend line over an ordered series.
//!
//! The x-axis is the position index (0, 1, 2, ...), not the time key itself,
//! so gaps between keys are ignored.

use serde::Serialize;

use super::aggregate::{group_totals, GroupBy};
use super::Observation;
use crate::models::RevenueRecord;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendResult {
    pub keys: Vec<String>,
    pub values: Vec<f64>,
    pub slope: f64,
    pub intercept: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub key: String,
    pub actual: f64,
    pub trend: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Upward,
    Downward,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendStrength {
    Strong,
    Moderate,
    Gradual,
}

/// Fit `value = slope * index + intercept`.
///
/// Fewer than two points, or a zero denominator, yield a flat zero line.
pub fn fit(points: Vec<(String, f64)>) -> TrendResult {
    let (keys, values): (Vec<String>, Vec<f64>) = points.into_iter().unzip();
    let n = values.len() as f64;

    let mut sum_x = 0.0;
    let mut sum_y = 0.0;
    let mut sum_xy = 0.0;
    let mut sum_xx = 0.0;
    for (i, &y) in values.iter().enumerate() {
        let x = i as f64;
        sum_x += x;
        sum_y += y;
        sum_xy += x * y;
        sum_xx += x * x;
    }

    let denominator = n * sum_xx - sum_x * sum_x;
    let (slope, intercept) = if values.len() < 2 || denominator == 0.0 {
        (0.0, 0.0)
    } else {
        let slope = (n * sum_xy - sum_x * sum_y) / denominator;
        (slope, (sum_y - slope * sum_x) / n)
    };

    TrendResult { keys, values, slope, intercept }
}

impl TrendResult {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn trend_at(&self, index: usize) -> f64 {
        self.slope * index as f64 + self.intercept
    }

    /// Actual vs fitted value per key, for charting
    pub fn points(&self) -> Vec<TrendPoint> {
        self.keys
            .iter()
            .zip(&self.values)
            .enumerate()
            .map(|(i, (key, actual))| TrendPoint {
                key: key.clone(),
                actual: *actual,
                trend: self.trend_at(i),
            })
            .collect()
    }

    pub fn direction(&self) -> TrendDirection {
        if self.slope > 0.0 {
            TrendDirection::Upward
        } else {
            TrendDirection::Downward
        }
    }

    pub fn strength(&self) -> TrendStrength {
        let magnitude = self.slope.abs();
        if magnitude > 1000.0 {
            TrendStrength::Strong
        } else if magnitude > 500.0 {
            TrendStrength::Moderate
        } else {
            TrendStrength::Gradual
        }
    }
}

/// Trend over time-grouped totals (day, week or month buckets)
pub fn grouped_trend<T: Observation>(records: &[T], group_by: GroupBy) -> TrendResult {
    // Restaurant buckets have no time order; fall back to months.
    let group_by = match group_by {
        GroupBy::Restaurant => GroupBy::Month,
        other => other,
    };
    fit(group_totals(records, group_by)
        .into_iter()
        .map(|g| (g.key, g.total))
        .collect())
}

/// One point per revenue row, ordered by month
pub fn revenue_trend(records: &[RevenueRecord]) -> TrendResult {
    let mut sorted: Vec<&RevenueRecord> = records.iter().collect();
    sorted.sort_by_key(|r| r.month);
    fit(sorted
        .into_iter()
        .map(|r| (r.month.to_string(), r.monthly_sale))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::test_support::{revenue, sale};

    fn series(values: &[f64]) -> Vec<(String, f64)> {
        values.iter().enumerate().map(|(i, v)| (format!("k{}", i), *v)).collect()
    }

    #[test]
    fn test_degenerate_inputs_are_flat() {
        let empty = fit(Vec::new());
        assert_eq!((empty.slope, empty.intercept), (0.0, 0.0));
        assert!(empty.is_empty());

        let single = fit(series(&[42.0]));
        assert_eq!((single.slope, single.intercept), (0.0, 0.0));
        assert_eq!(single.len(), 1);
    }

    #[test]
    fn test_recovers_exact_line() {
        let values: Vec<f64> = (0..10).map(|i| 3.0 * i as f64 + 7.0).collect();
        let trend = fit(series(&values));
        assert!((trend.slope - 3.0).abs() < 1e-9);
        assert!((trend.intercept - 7.0).abs() < 1e-9);
        assert!((trend.trend_at(20) - 67.0).abs() < 1e-9);
    }

    #[test]
    fn test_points_echo_input() {
        let trend = fit(series(&[1.0, 3.0]));
        let points = trend.points();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].key, "k0");
        assert_eq!(points[1].actual, 3.0);
        assert!((points[1].trend - 3.0).abs() < 1e-9);
        assert_eq!(trend.keys.len(), trend.values.len());
    }

    #[test]
    fn test_direction_and_strength() {
        let down = fit(series(&[4000.0, 2000.0, 0.0]));
        assert_eq!(down.direction(), TrendDirection::Downward);
        assert_eq!(down.strength(), TrendStrength::Strong);

        let up = fit(series(&[0.0, 600.0]));
        assert_eq!(up.direction(), TrendDirection::Upward);
        assert_eq!(up.strength(), TrendStrength::Moderate);

        let flat = fit(series(&[5.0, 5.0, 5.0]));
        assert_eq!(flat.direction(), TrendDirection::Downward);
        assert_eq!(flat.strength(), TrendStrength::Gradual);
    }

    #[test]
    fn test_revenue_trend_sorts_by_month() {
        let rows = vec![
            revenue(1, 1, Some("A"), "2024-03", 300.0),
            revenue(2, 1, Some("A"), "2024-01", 100.0),
            revenue(3, 1, Some("A"), "2024-02", 200.0),
        ];
        let trend = revenue_trend(&rows);
        assert_eq!(trend.keys, vec!["2024-01", "2024-02", "2024-03"]);
        assert!((trend.slope - 100.0).abs() < 1e-9);
        assert!((trend.intercept - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_grouped_trend_uses_time_buckets() {
        let sales = vec![
            sale(1, 1, Some("A"), "2024-01-01", 10.0),
            sale(2, 2, Some("B"), "2024-01-01", 10.0),
            sale(3, 1, Some("A"), "2024-01-02", 40.0),
        ];
        let trend = grouped_trend(&sales, GroupBy::Day);
        assert_eq!(trend.values, vec![20.0, 40.0]);
        assert!((trend.slope - 20.0).abs() < 1e-9);

        let by_restaurant = grouped_trend(&sales, GroupBy::Restaurant);
        assert_eq!(by_restaurant.keys, vec!["2024-01"]);
    }
}
