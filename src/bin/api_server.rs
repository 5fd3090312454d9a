//! REST API Server for Restaurant Analytics
//!
//! Usage:
//!   ./target/release/api_server [options]
//!
//! Options:
//!   --port PORT       Port to listen on (default: 8080)
//!   --db-path PATH    Path to SurrealDB database (default: data/restaurants.db)
//!   --csv-dir PATH    Serve straight from a CSV directory instead of the database
//!
//! REST endpoints:
//!   GET /api/v1/health             - Health check
//!   GET /api/v1/restaurants        - All restaurants
//!   GET /api/v1/sales              - Filtered sales rows
//!   GET /api/v1/sales/report       - Sales summary, groups, trend, seasonality, forecast
//!   GET /api/v1/sales/forecast     - Sales forecast for one timeframe
//!   GET /api/v1/sales/export       - Filtered sales as CSV
//!   GET /api/v1/revenue            - Filtered revenue rows
//!   GET /api/v1/revenue/report     - Revenue summary, trend, seasonality, projection
//!   GET /api/v1/revenue/export     - Filtered revenue as CSV

use anyhow::Result;
use clap::Parser;
use restaurant_analytics::api::{create_rest_router, AnalyticsService};
use restaurant_analytics::db::SurrealSource;
use restaurant_analytics::source::{MemorySource, RecordSource};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "api_server")]
#[command(about = "Serve restaurant sales and revenue reports over REST")]
struct Args {
    /// Port to listen on
    #[arg(long, default_value = "8080")]
    port: u16,

    /// Path to SurrealDB database
    #[arg(long, default_value = "data/restaurants.db")]
    db_path: String,

    /// Serve from a CSV directory instead of the database
    #[arg(long)]
    csv_dir: Option<PathBuf>,
}

fn print_banner(port: u16, backend: &str) {
    println!("============================================================");
    println!("         RESTAURANT ANALYTICS API SERVER");
    println!("============================================================");
    println!();
    println!("  Port:     {}", port);
    println!("  REST:     http://localhost:{}/api/v1/", port);
    println!("  Data:     {}", backend);
    println!();
    println!("REST Endpoints:");
    println!("  GET /api/v1/health              Health check");
    println!("  GET /api/v1/restaurants         Restaurants");
    println!("  GET /api/v1/sales               Sales rows");
    println!("  GET /api/v1/sales/report        Sales report");
    println!("  GET /api/v1/sales/forecast      Sales forecast");
    println!("  GET /api/v1/sales/export        Sales CSV");
    println!("  GET /api/v1/revenue             Revenue rows");
    println!("  GET /api/v1/revenue/report      Revenue report");
    println!("  GET /api/v1/revenue/export      Revenue CSV");
    println!();
    println!("Filters: query, restaurant, start_date, end_date, month");
    println!("Options: group_by, timeframe, growth_rate, top, horizon");
    println!("============================================================");
}

async fn serve<S: RecordSource>(source: S, addr: SocketAddr) -> Result<()> {
    let service = Arc::new(AnalyticsService::new(source));
    let app = create_rest_router(service);

    tracing::info!("Starting REST server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .init();

    let args = Args::parse();
    let addr: SocketAddr = format!("0.0.0.0:{}", args.port).parse()?;

    match &args.csv_dir {
        Some(dir) => {
            print_banner(args.port, &format!("CSV files in {}", dir.display()));
            serve(MemorySource::read_dir(dir)?, addr).await
        }
        None => {
            print_banner(args.port, &format!("SurrealDB at {}", args.db_path));
            serve(SurrealSource::open(&args.db_path).await?, addr).await
        }
    }
}
