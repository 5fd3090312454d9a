//! Shared business logic for the analytics API
//!
//! Every call fetches a fresh snapshot from the record source and runs the
//! pipeline over it; nothing is cached between requests.

use anyhow::Result;
use tracing::debug;

use crate::analytics::filter::{self, FilterCriteria};
use crate::analytics::forecast::{self, ForecastResult, Timeframe};
use crate::analytics::growth;
use crate::analytics::report::{RevenueOptions, RevenueReport, SalesOptions, SalesReport};
use crate::models::{Restaurant, RevenueRecord, SalesRecord};
use crate::source::RecordSource;

pub struct AnalyticsService<S> {
    source: S,
}

impl<S: RecordSource> AnalyticsService<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub async fn restaurants(&self) -> Result<Vec<Restaurant>> {
        self.source.restaurants().await
    }

    pub async fn sales(&self, criteria: &FilterCriteria) -> Result<Vec<SalesRecord>> {
        let all = self.source.sales().await?;
        let filtered = filter::apply(&all, criteria);
        debug!("Sales filter kept {} of {} rows", filtered.len(), all.len());
        Ok(filtered)
    }

    pub async fn revenue(&self, criteria: &FilterCriteria) -> Result<Vec<RevenueRecord>> {
        let all = self.source.revenue().await?;
        let filtered = filter::apply(&all, criteria);
        debug!("Revenue filter kept {} of {} rows", filtered.len(), all.len());
        Ok(filtered)
    }

    pub async fn sales_report(&self, criteria: &FilterCriteria, options: &SalesOptions) -> Result<SalesReport> {
        let filtered = self.sales(criteria).await?;
        Ok(SalesReport::from_filtered(&filtered, options))
    }

    /// Forecast for one timeframe; without an explicit rate the period growth rate is used.
    pub async fn sales_forecast(
        &self,
        criteria: &FilterCriteria,
        timeframe: Timeframe,
        growth_rate: Option<f64>,
    ) -> Result<ForecastResult> {
        let filtered = self.sales(criteria).await?;
        let rate = growth_rate.unwrap_or_else(|| growth::period_growth_rate(&filtered, timeframe));
        Ok(forecast::forecast(&filtered, timeframe, rate))
    }

    pub async fn revenue_report(&self, criteria: &FilterCriteria, options: &RevenueOptions) -> Result<RevenueReport> {
        let all = self.source.revenue().await?;
        Ok(RevenueReport::build(&all, criteria, options))
    }
}
