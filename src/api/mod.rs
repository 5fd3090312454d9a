//! API module for restaurant analytics
//!
//! Read-only REST interface over the sales and revenue reports.

pub mod handlers;
pub mod service;

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::source::RecordSource;
pub use service::AnalyticsService;

pub fn create_rest_router<S: RecordSource>(service: Arc<AnalyticsService<S>>) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health check
        .route("/api/v1/health", get(handlers::health))
        .route("/api/v1/restaurants", get(handlers::get_restaurants::<S>))
        // Sales
        .route("/api/v1/sales", get(handlers::get_sales::<S>))
        .route("/api/v1/sales/report", get(handlers::get_sales_report::<S>))
        .route("/api/v1/sales/forecast", get(handlers::get_sales_forecast::<S>))
        .route("/api/v1/sales/export", get(handlers::export_sales::<S>))
        // Revenue
        .route("/api/v1/revenue", get(handlers::get_revenue::<S>))
        .route("/api/v1/revenue/report", get(handlers::get_revenue_report::<S>))
        .route("/api/v1/revenue/export", get(handlers::export_revenue::<S>))
        // State and middleware
        .with_state(service)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
