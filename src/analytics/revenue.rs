//! Revenue-specific rollups: cost breakdown, margin and compounded projection.

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;

use super::Observation;
use crate::models::RevenueRecord;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct RevenueSummary {
    pub count: usize,
    pub total_sales: f64,
    pub total_maintenance: f64,
    pub total_salaries: f64,
    pub total_profit: f64,
    /// Profit as a percentage of sales; 0 without sales
    pub profit_margin: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RestaurantRevenue {
    pub restaurant: String,
    pub count: usize,
    pub total_sales: f64,
    pub total_maintenance: f64,
    pub total_salaries: f64,
    pub total_profit: f64,
}

pub fn summarize(records: &[RevenueRecord]) -> RevenueSummary {
    let mut summary = RevenueSummary { count: records.len(), ..Default::default() };
    for r in records {
        summary.total_sales += r.monthly_sale;
        summary.total_maintenance += r.monthly_maintenance;
        summary.total_salaries += r.employee_salaries;
        summary.total_profit += r.profit();
    }
    if summary.total_sales > 0.0 {
        summary.profit_margin = summary.total_profit / summary.total_sales * 100.0;
    }
    summary
}

/// Per-restaurant totals, highest sales first
pub fn by_restaurant(records: &[RevenueRecord]) -> Vec<RestaurantRevenue> {
    let mut groups: HashMap<String, RestaurantRevenue> = HashMap::new();
    for r in records {
        let label = r.restaurant_label();
        let entry = groups.entry(label.clone()).or_insert_with(|| RestaurantRevenue {
            restaurant: label,
            count: 0,
            total_sales: 0.0,
            total_maintenance: 0.0,
            total_salaries: 0.0,
            total_profit: 0.0,
        });
        entry.count += 1;
        entry.total_sales += r.monthly_sale;
        entry.total_maintenance += r.monthly_maintenance;
        entry.total_salaries += r.employee_salaries;
        entry.total_profit += r.profit();
    }

    let mut out: Vec<RestaurantRevenue> = groups.into_values().collect();
    out.sort_by(|a, b| {
        b.total_sales
            .total_cmp(&a.total_sales)
            .then_with(|| a.restaurant.cmp(&b.restaurant))
    });
    out
}

/// How far ahead a revenue projection reaches, and in what steps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Horizon {
    Month,
    Quarter,
    Year,
}

impl Horizon {
    pub fn periods(self) -> u32 {
        match self {
            Horizon::Month => 12,
            Horizon::Quarter => 4,
            Horizon::Year => 1,
        }
    }

    fn label(self, period: u32) -> String {
        match self {
            Horizon::Month => format!("Month {}", period),
            Horizon::Quarter => format!("Q{}", period),
            Horizon::Year => format!("Year {}", period),
        }
    }
}

impl FromStr for Horizon {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "month" => Ok(Horizon::Month),
            "quarter" => Ok(Horizon::Quarter),
            "year" => Ok(Horizon::Year),
            other => Err(anyhow!("unknown horizon '{}' (expected month, quarter or year)", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectionPoint {
    pub label: String,
    pub amount: f64,
}

/// Compound the latest month's sale forward by `growth_rate` percent per period.
///
/// The base is the monthly sale of the most recent row (by month; the last
/// such row in input order on ties). Amounts are rounded to whole units.
pub fn project(records: &[RevenueRecord], growth_rate: f64, horizon: Horizon) -> Vec<ProjectionPoint> {
    let Some(latest) = records.iter().max_by_key(|r| r.month) else {
        return Vec::new();
    };

    let base = latest.monthly_sale;
    let factor = 1.0 + growth_rate / 100.0;
    (1..=horizon.periods())
        .map(|period| ProjectionPoint {
            label: horizon.label(period),
            amount: (base * factor.powi(period as i32)).round(),
        })
        .collect()
}
