//! Calendar-month seasonality: mean value per month label, years collapsed.

use chrono::Datelike;
use serde::Serialize;
use std::collections::BTreeMap;

use super::Observation;

/// Month label (`"01"`..`"12"`) to mean value
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SeasonalityResult(pub BTreeMap<String, f64>);

pub fn month_label(month: u32) -> String {
    format!("{:02}", month)
}

/// Mean value per calendar month across the whole input
pub fn estimate<T: Observation>(records: &[T]) -> SeasonalityResult {
    let mut sums: BTreeMap<String, (f64, usize)> = BTreeMap::new();
    for record in records {
        let entry = sums
            .entry(month_label(record.observed_on().month()))
            .or_insert((0.0, 0));
        entry.0 += record.value();
        entry.1 += 1;
    }

    SeasonalityResult(
        sums.into_iter()
            .map(|(month, (sum, count))| (month, sum / count as f64))
            .collect(),
    )
}

impl SeasonalityResult {
    pub fn get(&self, month: &str) -> Option<f64> {
        self.0.get(month).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Highest-averaging month (earliest label wins ties)
    pub fn peak(&self) -> Option<(&str, f64)> {
        let mut best: Option<(&str, f64)> = None;
        for (month, &avg) in &self.0 {
            if best.map_or(true, |(_, b)| avg > b) {
                best = Some((month.as_str(), avg));
            }
        }
        best
    }

    /// Lowest-averaging month (earliest label wins ties)
    pub fn trough(&self) -> Option<(&str, f64)> {
        let mut best: Option<(&str, f64)> = None;
        for (month, &avg) in &self.0 {
            if best.map_or(true, |(_, b)| avg < b) {
                best = Some((month.as_str(), avg));
            }
        }
        best
    }

    /// Percentage by which the peak month exceeds the trough month.
    ///
    /// `None` with fewer than two months or a non-positive trough.
    pub fn variation_percent(&self) -> Option<f64> {
        if self.len() < 2 {
            return None;
        }
        let (_, high) = self.peak()?;
        let (_, low) = self.trough()?;
        if low <= 0.0 {
            return None;
        }
        Some((high / low - 1.0) * 100.0)
    }

    /// Ratio of the highest month average to the lowest positive one.
    ///
    /// Months averaging zero are ignored; `None` when no positive month exists.
    pub fn peak_to_trough_ratio(&self) -> Option<f64> {
        let max = self.0.values().copied().fold(f64::NEG_INFINITY, f64::max);
        let min_positive = self
            .0
            .values()
            .copied()
            .filter(|v| *v > 0.0)
            .fold(f64::INFINITY, f64::min);
        if min_positive.is_finite() && max.is_finite() {
            Some(max / min_positive)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::test_support::{revenue, sale};
    use crate::models::SalesRecord;

    #[test]
    fn test_month_means() {
        let sales = vec![
            sale(1, 1, Some("A"), "2024-01-03", 100.0),
            sale(2, 1, Some("A"), "2024-01-20", 200.0),
            sale(3, 1, Some("A"), "2024-02-01", 50.0),
        ];
        let result = estimate(&sales);
        assert_eq!(result.len(), 2);
        assert_eq!(result.get("01"), Some(150.0));
        assert_eq!(result.get("02"), Some(50.0));
    }

    #[test]
    fn test_years_are_collapsed() {
        let rows = vec![
            revenue(1, 1, Some("A"), "2023-06", 1000.0),
            revenue(2, 1, Some("A"), "2024-06", 3000.0),
            revenue(3, 2, Some("B"), "2024-07", 500.0),
        ];
        let result = estimate(&rows);
        assert_eq!(result.get("06"), Some(2000.0));
        assert_eq!(result.get("07"), Some(500.0));
    }

    #[test]
    fn test_single_observation_is_its_own_mean() {
        let result = estimate(&[sale(1, 1, None, "2024-11-11", 42.0)]);
        assert_eq!(result.get("11"), Some(42.0));
    }

    #[test]
    fn test_peak_trough_and_variation() {
        let sales = vec![
            sale(1, 1, Some("A"), "2024-01-01", 100.0),
            sale(2, 1, Some("A"), "2024-02-01", 300.0),
            sale(3, 1, Some("A"), "2024-03-01", 200.0),
        ];
        let result = estimate(&sales);
        assert_eq!(result.peak(), Some(("02", 300.0)));
        assert_eq!(result.trough(), Some(("01", 100.0)));
        assert_eq!(result.variation_percent(), Some(200.0));
        assert_eq!(result.peak_to_trough_ratio(), Some(3.0));
    }

    #[test]
    fn test_empty_and_zero_months() {
        let empty = estimate::<SalesRecord>(&[]);
        assert!(empty.is_empty());
        assert_eq!(empty.peak(), None);
        assert_eq!(empty.variation_percent(), None);
        assert_eq!(empty.peak_to_trough_ratio(), None);

        let zeros = estimate(&[
            sale(1, 1, None, "2024-01-01", 0.0),
            sale(2, 1, None, "2024-02-01", 80.0),
        ]);
        assert_eq!(zeros.variation_percent(), None);
        assert_eq!(zeros.peak_to_trough_ratio(), Some(1.0));
    }

    #[test]
    fn test_serializes_as_plain_map() {
        let result = estimate(&[sale(1, 1, None, "2024-05-01", 10.0)]);
        assert_eq!(serde_json::to_string(&result).unwrap(), r#"{"05":10.0}"#);
    }
}
