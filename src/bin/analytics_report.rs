//! Restaurant Analytics Report - sales, revenue and forecasts in the terminal
//!
//! Run: ./target/release/analytics_report [section] [filters]
//! Sections: all, sales, revenue, forecast
//!
//! Reads from the SurrealDB store by default, or straight from a CSV
//! directory with `--csv-dir`.

use anyhow::Result;
use clap::Parser;
use restaurant_analytics::analytics::forecast::Timeframe;
use restaurant_analytics::analytics::report::TrendSummary;
use restaurant_analytics::analytics::SeasonalityResult;
use restaurant_analytics::api::handlers::ReportQuery;
use restaurant_analytics::api::AnalyticsService;
use restaurant_analytics::db::SurrealSource;
use restaurant_analytics::source::{MemorySource, RecordSource};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "analytics_report")]
#[command(about = "Print sales, revenue and forecast reports")]
struct Args {
    /// Report section: all, sales, revenue or forecast
    #[arg(default_value = "all")]
    section: String,

    /// Path to SurrealDB database
    #[arg(long, default_value = "data/restaurants.db")]
    db_path: String,

    /// Read restaurants.csv, sales.csv and revenue.csv from this directory instead of the database
    #[arg(long)]
    csv_dir: Option<PathBuf>,

    /// Case-insensitive text matched against the restaurant name
    #[arg(long)]
    query: Option<String>,

    /// Restaurant id, or "all"
    #[arg(long)]
    restaurant: Option<String>,

    /// First day included (YYYY-MM-DD)
    #[arg(long)]
    start_date: Option<String>,

    /// Last day included (YYYY-MM-DD)
    #[arg(long)]
    end_date: Option<String>,

    /// Single month (YYYY-MM)
    #[arg(long)]
    month: Option<String>,

    /// Sales grouping: day, week, month or restaurant
    #[arg(long)]
    group_by: Option<String>,

    /// Forecast timeframe: week, month, quarter or year
    #[arg(long)]
    timeframe: Option<String>,

    /// Growth rate in percent, overriding the measured one
    #[arg(long, allow_hyphen_values = true)]
    growth_rate: Option<String>,

    /// Number of top restaurants to list
    #[arg(long)]
    top: Option<String>,

    /// Revenue projection horizon: month, quarter or year
    #[arg(long)]
    horizon: Option<String>,
}

impl Args {
    fn report_query(&self) -> ReportQuery {
        ReportQuery {
            query: self.query.clone(),
            restaurant: self.restaurant.clone(),
            start_date: self.start_date.clone(),
            end_date: self.end_date.clone(),
            month: self.month.clone(),
            group_by: self.group_by.clone(),
            timeframe: self.timeframe.clone(),
            growth_rate: self.growth_rate.clone(),
            top: self.top.clone(),
            horizon: self.horizon.clone(),
        }
    }
}

fn print_section_header(title: &str) {
    println!("\n{}", "═".repeat(85));
    println!("  {}", title);
    println!("{}\n", "═".repeat(85));
}

fn print_subsection(title: &str) {
    println!("\n{}", title);
    println!("{}", "─".repeat(75));
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("warn")
        .init();

    let args = Args::parse();
    let query = args.report_query();

    match &args.csv_dir {
        Some(dir) => run(MemorySource::read_dir(dir)?, &args.section, &query).await,
        None => run(SurrealSource::open(&args.db_path).await?, &args.section, &query).await,
    }
}

async fn run<S: RecordSource>(source: S, section: &str, query: &ReportQuery) -> Result<()> {
    let service = AnalyticsService::new(source);

    println!("\n{}", "█".repeat(85));
    println!("{}  RESTAURANT ANALYTICS REPORT  {}", "█".repeat(27), "█".repeat(26));
    println!("{}\n", "█".repeat(85));

    match section {
        "all" => {
            run_sales_section(&service, query).await?;
            run_revenue_section(&service, query).await?;
            run_forecast_section(&service, query).await?;
        }
        "sales" => run_sales_section(&service, query).await?,
        "revenue" => run_revenue_section(&service, query).await?,
        "forecast" => run_forecast_section(&service, query).await?,
        _ => {
            println!("Unknown section: {}", section);
            println!("Available: all, sales, revenue, forecast");
        }
    }

    println!("\n{}", "█".repeat(85));
    Ok(())
}

fn print_trend(trend: &TrendSummary) {
    println!(
        "  Slope {:+.2} per period, intercept {:.2} → {:?} ({:?})",
        trend.slope, trend.intercept, trend.direction, trend.strength
    );
    println!();
    println!("  {:14} {:>14} {:>14}", "Period", "Actual", "Trend");
    println!("  {}", "─".repeat(44));
    for point in &trend.points {
        println!("  {:14} {:>14.2} {:>14.2}", point.key, point.actual, point.trend);
    }
}

fn print_seasonality(averages: &SeasonalityResult, peak: Option<&str>, trough: Option<&str>, variation: Option<f64>) {
    if averages.is_empty() {
        println!("  No data");
        return;
    }
    println!("  {:8} {:>14}", "Month", "Average");
    println!("  {}", "─".repeat(24));
    for (month, avg) in &averages.0 {
        let marker = if Some(month.as_str()) == peak {
            "  ▲ peak"
        } else if Some(month.as_str()) == trough {
            "  ▼ trough"
        } else {
            ""
        };
        println!("  {:8} {:>14.2}{}", month, avg, marker);
    }
    if let Some(v) = variation {
        println!("\n  Peak-to-trough variation: {:.1}%", v);
    }
}

async fn run_sales_section<S: RecordSource>(service: &AnalyticsService<S>, query: &ReportQuery) -> Result<()> {
    print_section_header("1. SALES");

    let criteria = query.criteria()?;
    let options = query.sales_options()?;
    let report = service.sales_report(&criteria, &options).await?;

    print_subsection("Summary");
    let s = &report.summary;
    println!("  Sales:           {}", s.count);
    println!("  Total:           {:.2}", s.total);
    println!("  Average:         {:.2}", s.average);
    println!("  Min / Max:       {:.2} / {:.2}", s.min, s.max);
    println!("  Growth (halves): {:+.1}%", report.growth_rate);
    println!(
        "  Growth (last {}): {:+.1}%",
        options.timeframe.label(),
        report.period_growth_rate
    );

    print_subsection(&format!("Totals by {:?}", report.group_by));
    println!("  {:32} {:>14} {:>8}", "Group", "Total", "Count");
    println!("  {}", "─".repeat(56));
    for group in &report.groups {
        println!("  {:32} {:>14.2} {:>8}", group.key, group.total, group.count);
    }

    print_subsection(&format!("Top {} Restaurants", options.top));
    for (rank, group) in report.top_restaurants.iter().enumerate() {
        println!("  {:>2}. {:30} {:>14.2} ({} sales)", rank + 1, group.key, group.total, group.count);
    }

    print_subsection("Trend");
    print_trend(&report.trend);

    print_subsection("Seasonality (average sale by calendar month)");
    let season = &report.seasonality;
    print_seasonality(
        &season.averages,
        season.peak_month.as_deref(),
        season.trough_month.as_deref(),
        season.variation_percent,
    );

    Ok(())
}

async fn run_revenue_section<S: RecordSource>(service: &AnalyticsService<S>, query: &ReportQuery) -> Result<()> {
    print_section_header("2. REVENUE");

    let criteria = query.criteria()?;
    let options = query.revenue_options()?;
    let report = service.revenue_report(&criteria, &options).await?;

    print_subsection("Summary");
    let s = &report.summary;
    println!("  Months reported: {}", s.count);
    println!("  Sales:           {:.2}", s.total_sales);
    println!("  Maintenance:     {:.2}", s.total_maintenance);
    println!("  Salaries:        {:.2}", s.total_salaries);
    println!("  Profit:          {:.2} ({:.1}% margin)", s.total_profit, s.profit_margin);
    println!("  Growth vs rest:  {:+.1}%", report.growth_rate);

    print_subsection("By Restaurant");
    println!(
        "  {:28} {:>6} {:>14} {:>12} {:>12} {:>14}",
        "Restaurant", "Months", "Sales", "Maint.", "Salaries", "Profit"
    );
    println!("  {}", "─".repeat(91));
    for r in &report.by_restaurant {
        println!(
            "  {:28} {:>6} {:>14.2} {:>12.2} {:>12.2} {:>14.2}",
            r.restaurant, r.count, r.total_sales, r.total_maintenance, r.total_salaries, r.total_profit
        );
    }

    print_subsection("Monthly Sales Trend");
    print_trend(&report.trend);

    print_subsection("Seasonality (average monthly sale by calendar month)");
    let season = &report.seasonality;
    print_seasonality(
        &season.averages,
        season.peak_month.as_deref(),
        season.trough_month.as_deref(),
        season.variation_percent,
    );

    print_subsection(&format!("Projection ({:?} horizon)", report.horizon));
    for point in &report.projection {
        println!("  {:10} {:>14.0}", point.label, point.amount);
    }

    Ok(())
}

async fn run_forecast_section<S: RecordSource>(service: &AnalyticsService<S>, query: &ReportQuery) -> Result<()> {
    print_section_header("3. SALES FORECAST");

    let criteria = query.criteria()?;
    let growth_rate = query.growth_rate()?;

    println!(
        "  {:8} {:>6} {:>12} {:>14} {:>9} {:>14} {:>8} {:>14}",
        "Period", "Days", "Avg/Day", "Base", "Growth", "Adjusted", "Season", "Forecast"
    );
    println!("  {}", "─".repeat(94));

    let mut observed_days = 0;
    for timeframe in [Timeframe::Week, Timeframe::Month, Timeframe::Quarter, Timeframe::Year] {
        let f = service.sales_forecast(&criteria, timeframe, growth_rate).await?;
        observed_days = f.total_days;
        let season = if f.seasonal_adjustment {
            format!("×{:.2}", f.seasonal_factor)
        } else {
            "-".to_string()
        };
        println!(
            "  {:8} {:>6} {:>12.2} {:>14.2} {:>8.1}% {:>14.2} {:>8} {:>14.2}",
            timeframe.label(),
            f.period_length_days,
            f.average_daily_value,
            f.base_forecast,
            f.growth_rate,
            f.growth_adjusted_forecast,
            season,
            f.value()
        );
    }

    println!("\n  Observed span: {} days", observed_days);

    Ok(())
}
