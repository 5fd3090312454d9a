//! Load a CSV dataset directory into the embedded SurrealDB store
//!
//! Usage:
//!   cargo run --release --bin ingest -- [--data-dir data/raw] [--db-path data/restaurants.db] [--reset]

use anyhow::{bail, Result};
use clap::Parser;
use restaurant_analytics::db;
use restaurant_analytics::source::Dataset;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "ingest")]
#[command(about = "Ingest restaurants.csv, sales.csv and revenue.csv into SurrealDB")]
struct Args {
    /// Directory holding the three CSV files
    #[arg(long, default_value = "data/raw")]
    data_dir: PathBuf,

    /// Path to SurrealDB database
    #[arg(long, default_value = "data/restaurants.db")]
    db_path: String,

    /// Delete existing rows before loading
    #[arg(long)]
    reset: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("info")
        .init();

    let args = Args::parse();

    if !args.data_dir.is_dir() {
        bail!("data directory {} does not exist", args.data_dir.display());
    }

    info!("Reading CSV files from {:?}", args.data_dir);
    let dataset = Dataset::read_dir(&args.data_dir)?;

    info!("Connecting to SurrealDB at {}", args.db_path);
    let db = db::connect(&args.db_path).await?;

    info!("Initializing schema...");
    db::init_schema(&db).await?;

    if args.reset {
        info!("Clearing existing rows...");
        db::clear(&db).await?;
    }

    info!("Inserting rows...");
    let (restaurants, sales, revenue) = db::insert_dataset(&db, dataset).await?;
    info!(
        "Ingestion complete: {} restaurants, {} sales, {} revenue rows",
        restaurants, sales, revenue
    );

    // Verify counts
    let (restaurant_total, sales_total, revenue_total) = db::table_counts(&db).await?;
    info!("Database totals:");
    info!("  Restaurants: {}", restaurant_total);
    info!("  Sales:       {}", sales_total);
    info!("  Revenue:     {}", revenue_total);

    Ok(())
}
