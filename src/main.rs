use anyhow::Result;
use clap::Parser;
use restaurant_analytics::analytics::{aggregate, revenue};
use restaurant_analytics::db::{self, SurrealSource};
use restaurant_analytics::source::RecordSource;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "restaurant_analytics")]
#[command(about = "Print statistics about the loaded restaurant dataset")]
struct Args {
    /// Path to SurrealDB database
    #[arg(long, default_value = "data/restaurants.db")]
    db_path: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("info")
        .init();

    let args = Args::parse();
    let source = SurrealSource::open(&args.db_path).await?;

    info!("Connected to SurrealDB");

    info!("=== Database Statistics ===");

    let (restaurants, sales, revenue_rows) = db::table_counts(source.conn()).await?;
    info!("Restaurants: {}, sales: {}, revenue rows: {}", restaurants, sales, revenue_rows);

    let sales = source.sales().await?;
    if let (Some(first), Some(last)) = (sales.iter().map(|s| s.date).min(), sales.iter().map(|s| s.date).max()) {
        info!("Sales span {} to {}", first, last);
    }

    let stats = aggregate::summarize(&sales);
    info!(
        "Sales total {:.2} over {} rows (avg {:.2}, min {:.2}, max {:.2})",
        stats.total, stats.count, stats.average, stats.min, stats.max
    );

    // Top 5 restaurants by sales
    for group in aggregate::top_restaurants(&sales, 5) {
        info!("  {:<30} {:>14.2} ({} sales)", group.key, group.total, group.count);
    }

    let summary = revenue::summarize(&source.revenue().await?);
    info!(
        "Revenue: sales {:.2}, maintenance {:.2}, salaries {:.2}, profit {:.2} ({:.1}% margin)",
        summary.total_sales,
        summary.total_maintenance,
        summary.total_salaries,
        summary.total_profit,
        summary.profit_margin
    );

    Ok(())
}
