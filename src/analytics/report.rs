//! One-shot report builders: everything a sales or revenue page shows for a
//! given filter state, recomputed from scratch on every call.

use serde::Serialize;

use super::aggregate::{self, GroupBy, GroupTotal, SummaryStats};
use super::filter::{self, FilterCriteria};
use super::forecast::{self, ForecastResult, Timeframe};
use super::growth;
use super::revenue::{self, Horizon, ProjectionPoint, RestaurantRevenue, RevenueSummary};
use super::seasonality::{self, SeasonalityResult};
use super::trend::{self, TrendDirection, TrendPoint, TrendStrength};
use crate::models::{RevenueRecord, SalesRecord};

#[derive(Debug, Clone)]
pub struct SalesOptions {
    pub group_by: GroupBy,
    pub timeframe: Timeframe,
    /// Overrides the period growth rate fed to the forecast
    pub growth_rate: Option<f64>,
    pub top: usize,
}

impl Default for SalesOptions {
    fn default() -> Self {
        Self {
            group_by: GroupBy::Day,
            timeframe: Timeframe::Month,
            growth_rate: None,
            top: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TrendSummary {
    pub slope: f64,
    pub intercept: f64,
    pub direction: TrendDirection,
    pub strength: TrendStrength,
    pub points: Vec<TrendPoint>,
}

impl From<trend::TrendResult> for TrendSummary {
    fn from(t: trend::TrendResult) -> Self {
        Self {
            slope: t.slope,
            intercept: t.intercept,
            direction: t.direction(),
            strength: t.strength(),
            points: t.points(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SeasonalitySummary {
    pub averages: SeasonalityResult,
    pub peak_month: Option<String>,
    pub trough_month: Option<String>,
    pub variation_percent: Option<f64>,
}

impl From<SeasonalityResult> for SeasonalitySummary {
    fn from(s: SeasonalityResult) -> Self {
        Self {
            peak_month: s.peak().map(|(m, _)| m.to_string()),
            trough_month: s.trough().map(|(m, _)| m.to_string()),
            variation_percent: s.variation_percent(),
            averages: s,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SalesReport {
    pub summary: SummaryStats,
    /// Later half of the set against the earlier half
    pub growth_rate: f64,
    /// Latest half-timeframe window against the one before it
    pub period_growth_rate: f64,
    pub group_by: GroupBy,
    pub groups: Vec<GroupTotal>,
    pub top_restaurants: Vec<GroupTotal>,
    pub trend: TrendSummary,
    pub seasonality: SeasonalitySummary,
    pub forecast: ForecastResult,
}

impl SalesReport {
    /// Build from already-filtered records
    pub fn from_filtered(records: &[SalesRecord], options: &SalesOptions) -> Self {
        let period_growth_rate = growth::period_growth_rate(records, options.timeframe);
        let forecast_growth = options.growth_rate.unwrap_or(period_growth_rate);

        Self {
            summary: aggregate::summarize(records),
            growth_rate: growth::midpoint_growth_rate(records),
            period_growth_rate,
            group_by: options.group_by,
            groups: aggregate::group_totals(records, options.group_by),
            top_restaurants: aggregate::top_restaurants(records, options.top),
            trend: trend::grouped_trend(records, options.group_by).into(),
            seasonality: seasonality::estimate(records).into(),
            forecast: forecast::forecast(records, options.timeframe, forecast_growth),
        }
    }

    pub fn build(records: &[SalesRecord], criteria: &FilterCriteria, options: &SalesOptions) -> Self {
        Self::from_filtered(&filter::apply(records, criteria), options)
    }
}

#[derive(Debug, Clone)]
pub struct RevenueOptions {
    pub horizon: Horizon,
    /// Overrides the growth-against-remainder rate used for projection
    pub growth_rate: Option<f64>,
}

impl Default for RevenueOptions {
    fn default() -> Self {
        Self { horizon: Horizon::Month, growth_rate: None }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RevenueReport {
    pub summary: RevenueSummary,
    /// Filtered sales against the sales the filter excluded
    pub growth_rate: f64,
    pub by_restaurant: Vec<RestaurantRevenue>,
    pub trend: TrendSummary,
    pub seasonality: SeasonalitySummary,
    pub horizon: Horizon,
    pub projection: Vec<ProjectionPoint>,
}

impl RevenueReport {
    /// `all` is the unfiltered set; the filtered subset is derived from it.
    pub fn build(all: &[RevenueRecord], criteria: &FilterCriteria, options: &RevenueOptions) -> Self {
        let filtered = filter::apply(all, criteria);
        let summary = revenue::summarize(&filtered);
        let all_sales: f64 = all.iter().map(|r| r.monthly_sale).sum();
        let growth_rate = growth::growth_against_remainder(all_sales, summary.total_sales);
        let projection_growth = options.growth_rate.unwrap_or(growth_rate);

        Self {
            summary,
            growth_rate,
            by_restaurant: revenue::by_restaurant(&filtered),
            trend: trend::revenue_trend(&filtered).into(),
            seasonality: seasonality::estimate(&filtered).into(),
            horizon: options.horizon,
            projection: revenue::project(&filtered, projection_growth, options.horizon),
        }
    }
}
