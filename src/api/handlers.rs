//! REST API handlers for restaurant analytics
//!
//! These handlers use the shared AnalyticsService.

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;

use super::service::AnalyticsService;
use crate::analytics::aggregate::GroupBy;
use crate::analytics::filter::{FilterCriteria, FilterParams};
use crate::analytics::forecast::{ForecastResult, Timeframe};
use crate::analytics::report::{RevenueOptions, RevenueReport, SalesOptions, SalesReport};
use crate::analytics::revenue::Horizon;
use crate::models::{Restaurant, RevenueExportRow, RevenueRecord, SalesExportRow, SalesRecord};
use crate::source::RecordSource;

// ============================================================================
// Response Types
// ============================================================================

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Serialize)]
pub struct RecordsResponse<T> {
    pub count: usize,
    pub records: Vec<T>,
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

fn bad_request(e: anyhow::Error) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(ErrorResponse { error: e.to_string() }))
}

fn internal(e: anyhow::Error) -> ApiError {
    error!("Request failed: {:#}", e);
    (StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorResponse { error: e.to_string() }))
}

// ============================================================================
// Query Parameters
// ============================================================================

/// Every report option arrives as a string so `all` and empty values can be
/// told apart from malformed ones.
#[derive(Debug, Default, Deserialize)]
pub struct ReportQuery {
    pub query: Option<String>,
    pub restaurant: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub month: Option<String>,
    pub group_by: Option<String>,
    pub timeframe: Option<String>,
    pub growth_rate: Option<String>,
    pub top: Option<String>,
    pub horizon: Option<String>,
}

fn given(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl ReportQuery {
    pub fn criteria(&self) -> anyhow::Result<FilterCriteria> {
        FilterParams {
            query: self.query.clone(),
            restaurant: self.restaurant.clone(),
            start_date: self.start_date.clone(),
            end_date: self.end_date.clone(),
            month: self.month.clone(),
        }
        .to_criteria()
    }

    pub fn growth_rate(&self) -> anyhow::Result<Option<f64>> {
        given(&self.growth_rate)
            .map(|g| {
                g.parse::<f64>()
                    .ok()
                    .filter(|v| v.is_finite())
                    .ok_or_else(|| anyhow::anyhow!("invalid growth_rate '{}'", g))
            })
            .transpose()
    }

    pub fn timeframe(&self) -> anyhow::Result<Timeframe> {
        given(&self.timeframe).map_or(Ok(Timeframe::Month), str::parse)
    }

    pub fn sales_options(&self) -> anyhow::Result<SalesOptions> {
        let defaults = SalesOptions::default();
        Ok(SalesOptions {
            group_by: given(&self.group_by).map_or(Ok(GroupBy::Day), str::parse)?,
            timeframe: self.timeframe()?,
            growth_rate: self.growth_rate()?,
            top: given(&self.top)
                .map(|t| t.parse::<usize>().map_err(|_| anyhow::anyhow!("invalid top '{}'", t)))
                .transpose()?
                .unwrap_or(defaults.top),
        })
    }

    pub fn revenue_options(&self) -> anyhow::Result<RevenueOptions> {
        Ok(RevenueOptions {
            horizon: given(&self.horizon).map_or(Ok(Horizon::Month), str::parse)?,
            growth_rate: self.growth_rate()?,
        })
    }
}

// ============================================================================
// Handlers
// ============================================================================

pub type AppState<S> = Arc<AnalyticsService<S>>;

/// GET /api/v1/health
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({"status": "ok"}))
}

/// GET /api/v1/restaurants
pub async fn get_restaurants<S: RecordSource>(
    State(service): State<AppState<S>>,
) -> Result<Json<Vec<Restaurant>>, ApiError> {
    service.restaurants().await.map(Json).map_err(internal)
}

/// GET /api/v1/sales
pub async fn get_sales<S: RecordSource>(
    State(service): State<AppState<S>>,
    Query(params): Query<ReportQuery>,
) -> Result<Json<RecordsResponse<SalesRecord>>, ApiError> {
    let criteria = params.criteria().map_err(bad_request)?;
    let records = service.sales(&criteria).await.map_err(internal)?;
    Ok(Json(RecordsResponse { count: records.len(), records }))
}

/// GET /api/v1/sales/report
pub async fn get_sales_report<S: RecordSource>(
    State(service): State<AppState<S>>,
    Query(params): Query<ReportQuery>,
) -> Result<Json<SalesReport>, ApiError> {
    let criteria = params.criteria().map_err(bad_request)?;
    let options = params.sales_options().map_err(bad_request)?;
    service
        .sales_report(&criteria, &options)
        .await
        .map(Json)
        .map_err(internal)
}

/// GET /api/v1/sales/forecast
pub async fn get_sales_forecast<S: RecordSource>(
    State(service): State<AppState<S>>,
    Query(params): Query<ReportQuery>,
) -> Result<Json<ForecastResult>, ApiError> {
    let criteria = params.criteria().map_err(bad_request)?;
    let timeframe = params.timeframe().map_err(bad_request)?;
    let growth_rate = params.growth_rate().map_err(bad_request)?;
    service
        .sales_forecast(&criteria, timeframe, growth_rate)
        .await
        .map(Json)
        .map_err(internal)
}

/// GET /api/v1/sales/export
pub async fn export_sales<S: RecordSource>(
    State(service): State<AppState<S>>,
    Query(params): Query<ReportQuery>,
) -> Result<Response, ApiError> {
    let criteria = params.criteria().map_err(bad_request)?;
    let records = service.sales(&criteria).await.map_err(internal)?;
    let body = sales_csv(&records).map_err(internal)?;
    Ok(csv_response("sales_report.csv", body))
}

/// GET /api/v1/revenue
pub async fn get_revenue<S: RecordSource>(
    State(service): State<AppState<S>>,
    Query(params): Query<ReportQuery>,
) -> Result<Json<RecordsResponse<RevenueRecord>>, ApiError> {
    let criteria = params.criteria().map_err(bad_request)?;
    let records = service.revenue(&criteria).await.map_err(internal)?;
    Ok(Json(RecordsResponse { count: records.len(), records }))
}

/// GET /api/v1/revenue/report
pub async fn get_revenue_report<S: RecordSource>(
    State(service): State<AppState<S>>,
    Query(params): Query<ReportQuery>,
) -> Result<Json<RevenueReport>, ApiError> {
    let criteria = params.criteria().map_err(bad_request)?;
    let options = params.revenue_options().map_err(bad_request)?;
    service
        .revenue_report(&criteria, &options)
        .await
        .map(Json)
        .map_err(internal)
}

/// GET /api/v1/revenue/export
pub async fn export_revenue<S: RecordSource>(
    State(service): State<AppState<S>>,
    Query(params): Query<ReportQuery>,
) -> Result<Response, ApiError> {
    let criteria = params.criteria().map_err(bad_request)?;
    let records = service.revenue(&criteria).await.map_err(internal)?;
    let body = revenue_csv(&records).map_err(internal)?;
    Ok(csv_response("revenue_report.csv", body))
}

// ============================================================================
// CSV export
// ============================================================================

fn csv_response(filename: &str, body: String) -> Response {
    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{}\"", filename)),
        ],
        body,
    )
        .into_response()
}

pub fn sales_csv(records: &[SalesRecord]) -> anyhow::Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for r in records {
        writer.serialize(SalesExportRow {
            sales_id: r.sales_id,
            restaurant: r.restaurant_name.as_deref().unwrap_or(""),
            date: r.date.format("%Y-%m-%d").to_string(),
            amount: r.amount,
        })?;
    }
    let bytes = writer.into_inner().map_err(|e| anyhow::anyhow!("flushing csv: {}", e))?;
    Ok(String::from_utf8(bytes)?)
}

pub fn revenue_csv(records: &[RevenueRecord]) -> anyhow::Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for r in records {
        writer.serialize(RevenueExportRow {
            revenue_id: r.revenue_id,
            restaurant: r.restaurant_name.as_deref().unwrap_or(""),
            month: r.month.to_string(),
            monthly_sale: r.monthly_sale,
            monthly_maintenance: r.monthly_maintenance,
            employee_salaries: r.employee_salaries,
            profit: r.profit(),
        })?;
    }
    let bytes = writer.into_inner().map_err(|e| anyhow::anyhow!("flushing csv: {}", e))?;
    Ok(String::from_utf8(bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::test_support::{revenue, sale};

    #[test]
    fn test_query_defaults() {
        let q = ReportQuery::default();
        assert!(q.criteria().unwrap().is_empty());
        let options = q.sales_options().unwrap();
        assert_eq!(options.group_by, GroupBy::Day);
        assert_eq!(options.timeframe, Timeframe::Month);
        assert_eq!(options.growth_rate, None);
        assert_eq!(options.top, 5);
        assert_eq!(q.revenue_options().unwrap().horizon, Horizon::Month);
    }

    #[test]
    fn test_query_rejects_bad_values() {
        let q = ReportQuery { group_by: Some("fortnight".into()), ..Default::default() };
        assert!(q.sales_options().is_err());
        let q = ReportQuery { growth_rate: Some("NaN".into()), ..Default::default() };
        assert!(q.growth_rate().is_err());
        let q = ReportQuery { top: Some("-1".into()), ..Default::default() };
        assert!(q.sales_options().is_err());
    }

    #[test]
    fn test_sales_csv_layout() {
        let csv = sales_csv(&[sale(1, 1, Some("Grill, Downtown"), "2024-01-01", 12.5)]).unwrap();
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("sales_id,restaurant,date,amount"));
        assert_eq!(lines.next(), Some("1,\"Grill, Downtown\",2024-01-01,12.5"));
    }

    #[test]
    fn test_revenue_csv_writes_derived_profit() {
        let mut row = revenue(3, 1, Some("Deli"), "2024-02", 1000.0);
        row.monthly_maintenance = 100.0;
        row.employee_salaries = 250.0;
        let csv = revenue_csv(&[row]).unwrap();
        assert!(csv.lines().nth(1).unwrap().ends_with(",650.0"));
    }
}
