//! Sales forecast: average daily value extrapolated over a timeframe,
//! scaled by a growth rate and, with enough history, a seasonal factor.

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::str::FromStr;

use super::seasonality;
use super::Observation;

/// Seasonal adjustment needs more than this many records
pub const SEASONAL_MIN_RECORDS: usize = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Timeframe {
    Week,
    Month,
    Quarter,
    Year,
}

impl Timeframe {
    pub fn days(self) -> u32 {
        match self {
            Timeframe::Week => 7,
            Timeframe::Month => 30,
            Timeframe::Quarter => 90,
            Timeframe::Year => 365,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Timeframe::Week => "week",
            Timeframe::Month => "month",
            Timeframe::Quarter => "quarter",
            Timeframe::Year => "year",
        }
    }
}

impl FromStr for Timeframe {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "week" => Ok(Timeframe::Week),
            "month" => Ok(Timeframe::Month),
            "quarter" => Ok(Timeframe::Quarter),
            "year" => Ok(Timeframe::Year),
            other => Err(anyhow!("unknown timeframe '{}' (expected week, month, quarter or year)", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastResult {
    pub timeframe: Timeframe,
    pub period_length_days: u32,
    pub total_days: i64,
    pub average_daily_value: f64,
    pub base_forecast: f64,
    pub growth_rate: f64,
    pub growth_adjusted_forecast: f64,
    pub seasonal_factor: f64,
    pub seasonal_adjustment: bool,
    pub seasonal_adjusted_forecast: f64,
}

impl ForecastResult {
    fn zero(timeframe: Timeframe, growth_rate: f64) -> Self {
        Self {
            timeframe,
            period_length_days: timeframe.days(),
            total_days: 0,
            average_daily_value: 0.0,
            base_forecast: 0.0,
            growth_rate,
            growth_adjusted_forecast: 0.0,
            seasonal_factor: 1.0,
            seasonal_adjustment: false,
            seasonal_adjusted_forecast: 0.0,
        }
    }

    /// The figure to present: seasonal when applied, otherwise growth-adjusted
    pub fn value(&self) -> f64 {
        self.seasonal_adjusted_forecast
    }
}

/// Inclusive span of the observed dates; 1 when fewer than two distinct dates exist
pub fn observed_days<T: Observation>(records: &[T]) -> i64 {
    let dates: BTreeSet<_> = records.iter().map(|r| r.observed_on()).collect();
    match (dates.first(), dates.last()) {
        (Some(first), Some(last)) if dates.len() >= 2 => (*last - *first).num_days() + 1,
        _ => 1,
    }
}

/// Seasonal multiplier: highest calendar-month average over the lowest positive one
pub fn seasonal_factor<T: Observation>(records: &[T]) -> Option<f64> {
    seasonality::estimate(records).peak_to_trough_ratio()
}

/// Project the value of the next `timeframe`.
///
/// `growth_rate` is a signed percentage. Empty input gives an all-zero result.
pub fn forecast<T: Observation>(records: &[T], timeframe: Timeframe, growth_rate: f64) -> ForecastResult {
    if records.is_empty() {
        return ForecastResult::zero(timeframe, growth_rate);
    }

    let total: f64 = records.iter().map(|r| r.value()).sum();
    let total_days = observed_days(records);
    let average_daily_value = total / total_days as f64;
    let period_length_days = timeframe.days();
    let base_forecast = average_daily_value * period_length_days as f64;
    let growth_adjusted_forecast = base_forecast * (1.0 + growth_rate / 100.0);

    let factor = if records.len() > SEASONAL_MIN_RECORDS {
        seasonal_factor(records)
    } else {
        None
    };

    let (seasonal_factor, seasonal_adjustment) = match factor {
        Some(f) => (f, true),
        None => (1.0, false),
    };

    ForecastResult {
        timeframe,
        period_length_days,
        total_days,
        average_daily_value,
        base_forecast,
        growth_rate,
        growth_adjusted_forecast,
        seasonal_factor,
        seasonal_adjustment,
        seasonal_adjusted_forecast: growth_adjusted_forecast * seasonal_factor,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::test_support::sale;
    use crate::models::SalesRecord;
    use chrono::{Duration, NaiveDate};

    #[test]
    fn test_empty_forecast_is_zero() {
        let result = forecast::<SalesRecord>(&[], Timeframe::Month, 12.5);
        assert_eq!(result.value(), 0.0);
        assert_eq!(result.base_forecast, 0.0);
        assert!(!result.seasonal_adjusted_forecast.is_nan());
        assert!(!result.seasonal_adjustment);
        assert_eq!(result.period_length_days, 30);
    }

    #[test]
    fn test_single_record_uses_one_day() {
        let result = forecast(&[sale(1, 1, None, "2024-01-01", 70.0)], Timeframe::Week, 0.0);
        assert_eq!(result.total_days, 1);
        assert_eq!(result.average_daily_value, 70.0);
        assert_eq!(result.base_forecast, 490.0);
        assert_eq!(result.value(), 490.0);
    }

    #[test]
    fn test_same_day_records_use_one_day() {
        let sales = vec![sale(1, 1, None, "2024-01-01", 10.0), sale(2, 2, None, "2024-01-01", 20.0)];
        assert_eq!(observed_days(&sales), 1);
    }

    #[test]
    fn test_growth_applied_to_base() {
        // 300 over 10 inclusive days = 30/day
        let sales = vec![
            sale(1, 1, None, "2024-01-01", 100.0),
            sale(2, 1, None, "2024-01-05", 100.0),
            sale(3, 1, None, "2024-01-10", 100.0),
        ];
        let result = forecast(&sales, Timeframe::Month, 10.0);
        assert_eq!(result.total_days, 10);
        assert_eq!(result.average_daily_value, 30.0);
        assert_eq!(result.base_forecast, 900.0);
        assert!((result.growth_adjusted_forecast - 990.0).abs() < 1e-9);
        assert!(!result.seasonal_adjustment);
        assert_eq!(result.seasonal_adjusted_forecast, result.growth_adjusted_forecast);

        let shrinking = forecast(&sales, Timeframe::Quarter, -50.0);
        assert!((shrinking.growth_adjusted_forecast - 1350.0).abs() < 1e-9);
    }

    #[test]
    fn test_seasonal_factor_applies_above_threshold() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        // 31 daily January sales of 10, then one February sale of 20.
        let mut sales: Vec<SalesRecord> = (0..31)
            .map(|i| {
                let date = start + Duration::days(i);
                sale(i + 1, 1, None, &date.format("%Y-%m-%d").to_string(), 10.0)
            })
            .collect();
        sales.push(sale(100, 1, None, "2024-02-01", 20.0));

        let result = forecast(&sales, Timeframe::Week, 0.0);
        assert!(result.seasonal_adjustment);
        assert_eq!(result.seasonal_factor, 2.0);
        assert!((result.seasonal_adjusted_forecast - result.growth_adjusted_forecast * 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_threshold_is_strictly_more_than_thirty() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let sales: Vec<SalesRecord> = (0..30)
            .map(|i| {
                let date = start + Duration::days(i * 3);
                sale(i + 1, 1, None, &date.format("%Y-%m-%d").to_string(), 5.0 + i as f64)
            })
            .collect();
        let result = forecast(&sales, Timeframe::Year, 0.0);
        assert!(!result.seasonal_adjustment);
        assert_eq!(result.seasonal_factor, 1.0);
    }

    #[test]
    fn test_timeframe_parse_and_days() {
        assert_eq!("Quarter".parse::<Timeframe>().unwrap().days(), 90);
        assert_eq!(Timeframe::Year.days(), 365);
        assert!("decade".parse::<Timeframe>().is_err());
    }
}
