//! Synthetic data generator for the restaurant analytics dataset
//!
//! Writes `restaurants.csv`, `sales.csv` and `revenue.csv` with per-restaurant
//! trend, a yearly seasonal cycle and random noise, so every report has
//! something to find.
//!
//! Usage:
//!   cargo run --release --bin generate_synthetic -- [OPTIONS]
//!
//! Options:
//!   --restaurants <N>    Number of restaurants (default: 12)
//!   --start <DATE>       First sales day (default: 2023-01-01)
//!   --months <N>         Months of history to generate (default: 24)
//!   --max-daily <N>      Maximum sales rows per restaurant per day (default: 3)
//!   --seed <N>           Random seed for reproducibility (optional)
//!   --output-dir <PATH>  Output directory (default: data/raw)

use chrono::{Datelike, Months, NaiveDate};
use clap::Parser;
use csv::WriterBuilder;
use rand::prelude::*;
use rand::rngs::StdRng;
use restaurant_analytics::models::YearMonth;
use restaurant_analytics::source::{RESTAURANTS_FILE, REVENUE_FILE, SALES_FILE};
use serde::Serialize;
use std::collections::BTreeMap;
use std::error::Error;
use std::f64::consts::PI;
use std::path::PathBuf;

/// Synthetic data generator for restaurant sales and revenue
#[derive(Parser, Debug)]
#[command(name = "generate_synthetic")]
#[command(about = "Generate synthetic restaurant sales and revenue data")]
struct Args {
    /// Number of restaurants
    #[arg(long, default_value = "12")]
    restaurants: usize,

    /// First day of generated sales (YYYY-MM-DD)
    #[arg(long, default_value = "2023-01-01")]
    start: NaiveDate,

    /// Months of history to generate
    #[arg(long, default_value = "24")]
    months: u32,

    /// Maximum sales rows per restaurant per day
    #[arg(long, default_value = "3")]
    max_daily: u32,

    /// Random seed for reproducibility
    #[arg(long)]
    seed: Option<u64>,

    /// Output directory for the three CSV files
    #[arg(long, default_value = "data/raw")]
    output_dir: PathBuf,
}

const NAME_PREFIXES: &[&str] = &[
    "Golden", "Rustic", "Blue", "Little", "Olive", "Smoky", "Corner", "Harbor", "Copper", "Green",
];
const NAME_SUFFIXES: &[&str] = &[
    "Grill", "Bistro", "Diner", "Kitchen", "Taqueria", "Noodle Bar", "Pizzeria", "Cafe", "Deli", "Smokehouse",
];

#[derive(Debug, Serialize)]
struct RestaurantRow {
    restaurant_id: i64,
    name: String,
}

#[derive(Debug, Serialize)]
struct SaleRow {
    sales_id: i64,
    restaurant_id: i64,
    date: String,
    amount: f64,
}

#[derive(Debug, Serialize)]
struct RevenueRow {
    revenue_id: i64,
    restaurant_id: i64,
    month: String,
    monthly_sale: f64,
    monthly_maintenance: f64,
    employee_salaries: f64,
    profit: f64,
}

/// Shape of one restaurant's business
struct Profile {
    restaurant_id: i64,
    daily_base: f64,
    /// Fractional growth per year
    annual_growth: f64,
    /// Calendar month (1-12) of the seasonal high
    peak_month: u32,
    seasonal_amplitude: f64,
}

fn restaurant_name(index: usize, rng: &mut impl Rng) -> String {
    let prefix = NAME_PREFIXES[rng.gen_range(0..NAME_PREFIXES.len())];
    let suffix = NAME_SUFFIXES[index % NAME_SUFFIXES.len()];
    format!("{} {}", prefix, suffix)
}

fn random_profile(restaurant_id: i64, rng: &mut impl Rng) -> Profile {
    Profile {
        restaurant_id,
        daily_base: rng.gen_range(300.0..1500.0),
        annual_growth: rng.gen_range(-0.05..0.25),
        peak_month: rng.gen_range(1..=12),
        seasonal_amplitude: rng.gen_range(0.1..0.35),
    }
}

/// Expected daily takings on `date`, before noise
fn expected_daily(profile: &Profile, start: NaiveDate, date: NaiveDate) -> f64 {
    let years = (date - start).num_days() as f64 / 365.0;
    let trend = (1.0 + profile.annual_growth).powf(years);
    let phase = 2.0 * PI * (date.month() as f64 - profile.peak_month as f64) / 12.0;
    let season = 1.0 + profile.seasonal_amplitude * phase.cos();
    profile.daily_base * trend * season
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let end = args
        .start
        .checked_add_months(Months::new(args.months))
        .ok_or("start date plus months is out of range")?;

    println!("🔧 Synthetic Restaurant Data Generator");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("Output dir:       {}", args.output_dir.display());
    println!("Restaurants:      {}", args.restaurants);
    println!("Date range:       {} .. {}", args.start, end.pred_opt().unwrap_or(end));
    println!("Max sales/day:    {}", args.max_daily);
    if let Some(seed) = args.seed {
        println!("Random seed:      {}", seed);
    }
    println!();

    // Initialize RNG
    let mut rng: StdRng = match args.seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    };

    std::fs::create_dir_all(&args.output_dir)?;

    // Restaurants
    println!("🏪 Generating restaurants...");
    let mut restaurant_writer = WriterBuilder::new()
        .has_headers(true)
        .from_path(args.output_dir.join(RESTAURANTS_FILE))?;
    let mut profiles = Vec::with_capacity(args.restaurants);
    for i in 0..args.restaurants {
        let restaurant_id = i as i64 + 1;
        restaurant_writer.serialize(RestaurantRow {
            restaurant_id,
            name: restaurant_name(i, &mut rng),
        })?;
        profiles.push(random_profile(restaurant_id, &mut rng));
    }
    restaurant_writer.flush()?;

    // Sales, accumulating monthly totals for the revenue file
    println!("🧾 Generating sales...");
    let mut sales_writer = WriterBuilder::new()
        .has_headers(true)
        .from_path(args.output_dir.join(SALES_FILE))?;
    let mut monthly: BTreeMap<(i64, YearMonth), f64> = BTreeMap::new();
    let mut sales_id = 0i64;

    for date in args.start.iter_days().take_while(|d| *d < end) {
        for profile in &profiles {
            let tickets = rng.gen_range(0..=args.max_daily);
            if tickets == 0 {
                continue;
            }
            let expected = expected_daily(profile, args.start, date) / tickets as f64;
            for _ in 0..tickets {
                let noise = rng.gen_range(0.7..1.3);
                let amount = round_cents(expected * noise);
                sales_id += 1;
                sales_writer.serialize(SaleRow {
                    sales_id,
                    restaurant_id: profile.restaurant_id,
                    date: date.format("%Y-%m-%d").to_string(),
                    amount,
                })?;
                *monthly.entry((profile.restaurant_id, YearMonth::of(date))).or_insert(0.0) += amount;
            }
        }

        if date.day() == 1 && date.month() == 1 {
            println!("   {} - {} sales so far", date.year(), sales_id);
        }
    }
    sales_writer.flush()?;

    // Revenue
    println!("💰 Generating monthly revenue...");
    let mut revenue_writer = WriterBuilder::new()
        .has_headers(true)
        .from_path(args.output_dir.join(REVENUE_FILE))?;
    let mut revenue_id = 0i64;
    for ((restaurant_id, month), total) in &monthly {
        let monthly_sale = round_cents(*total);
        let monthly_maintenance = round_cents(monthly_sale * rng.gen_range(0.06..0.14));
        let employee_salaries = round_cents(monthly_sale * rng.gen_range(0.25..0.45));
        revenue_id += 1;
        revenue_writer.serialize(RevenueRow {
            revenue_id,
            restaurant_id: *restaurant_id,
            month: month.to_string(),
            monthly_sale,
            monthly_maintenance,
            employee_salaries,
            profit: round_cents(monthly_sale - monthly_maintenance - employee_salaries),
        })?;
    }
    revenue_writer.flush()?;

    println!();
    println!("✅ Complete!");
    println!("   Restaurants:  {}", profiles.len());
    println!("   Sales rows:   {}", sales_id);
    println!("   Revenue rows: {}", revenue_id);

    Ok(())
}
