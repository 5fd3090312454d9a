//! Read interface the reports are fed from, plus the CSV dataset loader.

use anyhow::{Context, Result};
use csv::ReaderBuilder;
use serde::de::DeserializeOwned;
use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::path::Path;
use tracing::{info, warn};

use crate::models::{
    CsvRestaurant, CsvRevenue, CsvSale, Restaurant, RevenueRecord, SalesRecord, StoredRevenue, StoredSale,
};

pub const RESTAURANTS_FILE: &str = "restaurants.csv";
pub const SALES_FILE: &str = "sales.csv";
pub const REVENUE_FILE: &str = "revenue.csv";

/// Where report rows come from. Each call returns a fresh snapshot.
pub trait RecordSource: Send + Sync + 'static {
    fn restaurants(&self) -> impl Future<Output = Result<Vec<Restaurant>>> + Send;
    fn sales(&self) -> impl Future<Output = Result<Vec<SalesRecord>>> + Send;
    fn revenue(&self) -> impl Future<Output = Result<Vec<RevenueRecord>>> + Send;
}

/// Attach restaurant names; rows pointing at unknown restaurants keep a null name.
pub fn join_sales(rows: Vec<StoredSale>, restaurants: &[Restaurant]) -> Vec<SalesRecord> {
    let names = name_index(restaurants);
    rows.into_iter()
        .map(|row| {
            let name = names.get(&row.restaurant_id).cloned();
            row.join(name)
        })
        .collect()
}

pub fn join_revenue(rows: Vec<StoredRevenue>, restaurants: &[Restaurant]) -> Vec<RevenueRecord> {
    let names = name_index(restaurants);
    rows.into_iter()
        .map(|row| {
            let name = names.get(&row.restaurant_id).cloned();
            row.join(name)
        })
        .collect()
}

fn name_index(restaurants: &[Restaurant]) -> HashMap<i64, String> {
    restaurants
        .iter()
        .map(|r| (r.restaurant_id, r.name.clone()))
        .collect()
}

/// Raw rows of a CSV dataset directory, validated but not yet joined
#[derive(Debug, Default)]
pub struct Dataset {
    pub restaurants: Vec<Restaurant>,
    pub sales: Vec<StoredSale>,
    pub revenue: Vec<StoredRevenue>,
}

fn read_rows<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("opening {}", path.display()))?;

    let mut rows = Vec::new();
    for (line, row) in reader.deserialize().enumerate() {
        match row {
            Ok(row) => rows.push(row),
            // +2: header line and 1-based numbering
            Err(e) => warn!("Skipping {} line {}: {}", path.display(), line + 2, e),
        }
    }
    Ok(rows)
}

/// Keep the first row for each id; later duplicates are logged and dropped.
fn dedup_by_id<T>(rows: Vec<T>, kind: &str, id: impl Fn(&T) -> i64) -> Vec<T> {
    let mut seen = HashSet::new();
    rows.into_iter()
        .filter(|row| {
            let fresh = seen.insert(id(row));
            if !fresh {
                warn!("Skipping duplicate {} id {}", kind, id(row));
            }
            fresh
        })
        .collect()
}

impl Dataset {
    /// Load `restaurants.csv`, `sales.csv` and `revenue.csv` from `dir`.
    ///
    /// Unparseable or invalid rows are logged and skipped.
    pub fn read_dir(dir: &Path) -> Result<Self> {
        let restaurants: Vec<CsvRestaurant> = read_rows(&dir.join(RESTAURANTS_FILE))?;
        let sales: Vec<CsvSale> = read_rows(&dir.join(SALES_FILE))?;
        let revenue: Vec<CsvRevenue> = read_rows(&dir.join(REVENUE_FILE))?;

        let sales: Vec<StoredSale> = sales
            .iter()
            .filter_map(|row| match row.to_stored() {
                Ok(stored) => Some(stored),
                Err(e) => {
                    warn!("Skipping sale: {}", e);
                    None
                }
            })
            .collect();

        let revenue: Vec<StoredRevenue> = revenue
            .iter()
            .filter_map(|row| {
                if let Some(stored_profit) = row.profit {
                    let derived = row.monthly_sale - row.monthly_maintenance - row.employee_salaries;
                    if (stored_profit - derived).abs() > 0.005 {
                        warn!(
                            "Revenue {} profit column {} disagrees with derived {}; using derived",
                            row.revenue_id, stored_profit, derived
                        );
                    }
                }
                match row.to_stored() {
                    Ok(stored) => Some(stored),
                    Err(e) => {
                        warn!("Skipping revenue row {}: {}", row.revenue_id, e);
                        None
                    }
                }
            })
            .collect();

        let restaurants = dedup_by_id(restaurants, "restaurant", |r| r.restaurant_id);
        let sales = dedup_by_id(sales, "sale", |s| s.sales_id);
        let revenue = dedup_by_id(revenue, "revenue", |r| r.revenue_id);

        info!(
            "Read {} restaurants, {} sales, {} revenue rows from {}",
            restaurants.len(),
            sales.len(),
            revenue.len(),
            dir.display()
        );

        Ok(Self {
            restaurants: restaurants
                .into_iter()
                .map(|r| Restaurant { restaurant_id: r.restaurant_id, name: r.name })
                .collect(),
            sales,
            revenue,
        })
    }
}

/// Record source held entirely in memory
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    pub restaurants: Vec<Restaurant>,
    pub sales: Vec<SalesRecord>,
    pub revenue: Vec<RevenueRecord>,
}

impl MemorySource {
    pub fn from_dataset(dataset: Dataset) -> Self {
        let sales = join_sales(dataset.sales, &dataset.restaurants);
        let revenue = join_revenue(dataset.revenue, &dataset.restaurants);
        Self { restaurants: dataset.restaurants, sales, revenue }
    }

    pub fn read_dir(dir: &Path) -> Result<Self> {
        Ok(Self::from_dataset(Dataset::read_dir(dir)?))
    }
}

impl RecordSource for MemorySource {
    async fn restaurants(&self) -> Result<Vec<Restaurant>> {
        Ok(self.restaurants.clone())
    }

    async fn sales(&self) -> Result<Vec<SalesRecord>> {
        Ok(self.sales.clone())
    }

    async fn revenue(&self) -> Result<Vec<RevenueRecord>> {
        Ok(self.revenue.clone())
    }
}
