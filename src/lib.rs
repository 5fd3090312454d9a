//! Restaurant sales and revenue analytics
//!
//! Filtering, aggregation, trend fitting, seasonality and forecasting over
//! sales and monthly revenue rows, served from an embedded SurrealDB store.

pub mod analytics;
pub mod api;
pub mod db;
pub mod models;
pub mod source;
