//! Summary statistics and grouped totals.

use anyhow::{anyhow, Result};
use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;

use super::Observation;
use crate::models::YearMonth;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SummaryStats {
    pub total: f64,
    pub count: usize,
    pub average: f64,
    pub min: f64,
    pub max: f64,
}

/// Totals, count, mean and range over the record values.
///
/// An empty set reports an average of 0 (and 0 for min/max) rather than NaN.
pub fn summarize<T: Observation>(records: &[T]) -> SummaryStats {
    if records.is_empty() {
        return SummaryStats { total: 0.0, count: 0, average: 0.0, min: 0.0, max: 0.0 };
    }

    let mut total = 0.0;
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for value in records.iter().map(|r| r.value()) {
        total += value;
        min = min.min(value);
        max = max.max(value);
    }

    SummaryStats {
        total,
        count: records.len(),
        average: total / records.len() as f64,
        min,
        max,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupBy {
    Day,
    Week,
    Month,
    Restaurant,
}

impl FromStr for GroupBy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "day" => Ok(GroupBy::Day),
            "week" => Ok(GroupBy::Week),
            "month" => Ok(GroupBy::Month),
            "restaurant" => Ok(GroupBy::Restaurant),
            other => Err(anyhow!("unknown grouping '{}' (expected day, week, month or restaurant)", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupTotal {
    pub key: String,
    pub total: f64,
    pub count: usize,
}

/// Monday of the ISO week containing `date`
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

fn time_key(date: NaiveDate, group_by: GroupBy) -> String {
    match group_by {
        GroupBy::Week => week_start(date).format("%Y-%m-%d").to_string(),
        GroupBy::Month => YearMonth::of(date).to_string(),
        _ => date.format("%Y-%m-%d").to_string(),
    }
}

/// Sum values per group.
///
/// Time groupings come back in ascending key order for charting; restaurant
/// grouping comes back by total descending so callers can take a top N.
pub fn group_totals<T: Observation>(records: &[T], group_by: GroupBy) -> Vec<GroupTotal> {
    if group_by == GroupBy::Restaurant {
        let mut groups: HashMap<String, (f64, usize)> = HashMap::new();
        for record in records {
            let entry = groups.entry(record.restaurant_label()).or_insert((0.0, 0));
            entry.0 += record.value();
            entry.1 += 1;
        }

        let mut out: Vec<GroupTotal> = groups
            .into_iter()
            .map(|(key, (total, count))| GroupTotal { key, total, count })
            .collect();
        out.sort_by(|a, b| b.total.total_cmp(&a.total).then_with(|| a.key.cmp(&b.key)));
        return out;
    }

    // ISO date and YYYY-MM keys sort chronologically as strings.
    let mut groups: BTreeMap<String, (f64, usize)> = BTreeMap::new();
    for record in records {
        let entry = groups
            .entry(time_key(record.observed_on(), group_by))
            .or_insert((0.0, 0));
        entry.0 += record.value();
        entry.1 += 1;
    }

    groups
        .into_iter()
        .map(|(key, (total, count))| GroupTotal { key, total, count })
        .collect()
}

/// Highest-grossing restaurants, at most `limit` of them
pub fn top_restaurants<T: Observation>(records: &[T], limit: usize) -> Vec<GroupTotal> {
    let mut groups = group_totals(records, GroupBy::Restaurant);
    groups.truncate(limit);
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::test_support::sale;
    use crate::models::SalesRecord;

    fn sample() -> Vec<SalesRecord> {
        vec![
            sale(1, 1, Some("Grill"), "2024-01-01", 100.0),
            sale(2, 2, Some("Deli"), "2024-01-02", 40.0),
            sale(3, 1, Some("Grill"), "2024-01-09", 60.0),
            sale(4, 3, Some("Noodles"), "2024-02-14", 250.0),
            sale(5, 2, Some("Deli"), "2024-02-14", 10.0),
        ]
    }

    #[test]
    fn test_summary_stats() {
        let stats = summarize(&sample());
        assert_eq!(stats.total, 460.0);
        assert_eq!(stats.count, 5);
        assert_eq!(stats.average, 92.0);
        assert_eq!(stats.min, 10.0);
        assert_eq!(stats.max, 250.0);
    }

    #[test]
    fn test_empty_average_is_zero() {
        let stats = summarize::<SalesRecord>(&[]);
        assert_eq!(stats.count, 0);
        assert_eq!(stats.average, 0.0);
        assert!(!stats.average.is_nan());
        assert_eq!(stats.min, 0.0);
        assert_eq!(stats.max, 0.0);
    }

    #[test]
    fn test_weekly_groups_scenario() {
        let sales = vec![
            sale(1, 1, Some("A"), "2024-01-01", 100.0),
            sale(2, 1, Some("A"), "2024-01-08", 200.0),
            sale(3, 1, Some("A"), "2024-01-15", 150.0),
        ];
        let groups = group_totals(&sales, GroupBy::Week);
        let totals: Vec<f64> = groups.iter().map(|g| g.total).collect();
        assert_eq!(totals, vec![100.0, 200.0, 150.0]);
        assert_eq!(groups[0].key, "2024-01-01");
        assert_eq!(groups[2].key, "2024-01-15");
    }

    #[test]
    fn test_week_key_is_monday() {
        // 2024-01-07 is a Sunday, belongs to the week starting 2024-01-01
        let sunday = NaiveDate::from_ymd_opt(2024, 1, 7).unwrap();
        assert_eq!(week_start(sunday), NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        let wednesday = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
        assert_eq!(week_start(wednesday), NaiveDate::from_ymd_opt(2024, 1, 8).unwrap());
    }

    #[test]
    fn test_month_groups_ascending() {
        let groups = group_totals(&sample(), GroupBy::Month);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0], GroupTotal { key: "2024-01".into(), total: 200.0, count: 3 });
        assert_eq!(groups[1], GroupTotal { key: "2024-02".into(), total: 260.0, count: 2 });
    }

    #[test]
    fn test_restaurant_groups_by_total_descending() {
        let groups = group_totals(&sample(), GroupBy::Restaurant);
        let keys: Vec<&str> = groups.iter().map(|g| g.key.as_str()).collect();
        assert_eq!(keys, vec!["Noodles", "Grill", "Deli"]);
        assert_eq!(top_restaurants(&sample(), 2).len(), 2);
    }

    #[test]
    fn test_null_names_group_by_id() {
        let sales = vec![sale(1, 9, None, "2024-01-01", 5.0)];
        let groups = group_totals(&sales, GroupBy::Restaurant);
        assert_eq!(groups[0].key, "Restaurant #9");
    }

    #[test]
    fn test_group_totals_partition_the_total() {
        let sales = sample();
        let total = summarize(&sales).total;
        for group_by in [GroupBy::Day, GroupBy::Week, GroupBy::Month, GroupBy::Restaurant] {
            let grouped: f64 = group_totals(&sales, group_by).iter().map(|g| g.total).sum();
            assert!((grouped - total).abs() < 1e-9, "{:?} groups do not add up", group_by);
            let counted: usize = group_totals(&sales, group_by).iter().map(|g| g.count).sum();
            assert_eq!(counted, sales.len());
        }
    }

    #[test]
    fn test_group_by_parse() {
        assert_eq!("Week".parse::<GroupBy>().unwrap(), GroupBy::Week);
        assert!("year".parse::<GroupBy>().is_err());
    }
}
