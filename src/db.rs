use anyhow::Result;
use serde::Deserialize;
use surrealdb::engine::local::{Db, RocksDb};
use surrealdb::Surreal;

use crate::models::{Restaurant, RevenueRecord, SalesRecord, StoredRevenue, StoredSale};
use crate::source::{join_revenue, join_sales, Dataset, RecordSource};

pub type DbConn = Surreal<Db>;

/// Initialize database connection with RocksDB backend
pub async fn connect(path: &str) -> Result<DbConn> {
    let db = Surreal::new::<RocksDb>(path).await?;
    db.use_ns("restaurants").use_db("analytics").await?;
    Ok(db)
}

/// Initialize database schema; safe to run against an existing store
pub async fn init_schema(db: &DbConn) -> Result<()> {
    db.query(
        r#"
        DEFINE TABLE IF NOT EXISTS restaurant SCHEMAFULL;
        DEFINE FIELD IF NOT EXISTS restaurant_id ON restaurant TYPE int;
        DEFINE FIELD IF NOT EXISTS name ON restaurant TYPE string;
        DEFINE INDEX IF NOT EXISTS idx_restaurant_id ON restaurant FIELDS restaurant_id UNIQUE;

        -- Dates are stored as YYYY-MM-DD strings, months as YYYY-MM
        DEFINE TABLE IF NOT EXISTS sales SCHEMALESS;
        DEFINE INDEX IF NOT EXISTS idx_sales_id ON sales FIELDS sales_id UNIQUE;
        DEFINE INDEX IF NOT EXISTS idx_sales_date ON sales FIELDS date;
        DEFINE INDEX IF NOT EXISTS idx_sales_restaurant ON sales FIELDS restaurant_id;

        DEFINE TABLE IF NOT EXISTS revenue SCHEMALESS;
        DEFINE INDEX IF NOT EXISTS idx_revenue_id ON revenue FIELDS revenue_id UNIQUE;
        DEFINE INDEX IF NOT EXISTS idx_revenue_month ON revenue FIELDS month;
        DEFINE INDEX IF NOT EXISTS idx_revenue_restaurant ON revenue FIELDS restaurant_id;
        "#,
    )
    .await?
    .check()?;

    Ok(())
}

/// Remove every row from the analytics tables
pub async fn clear(db: &DbConn) -> Result<()> {
    db.query("DELETE sales; DELETE revenue; DELETE restaurant;")
        .await?
        .check()?;
    Ok(())
}

/// Insert a parsed dataset in one transaction, returning how many rows of
/// each kind were written. On any failure nothing is written.
pub async fn insert_dataset(db: &DbConn, dataset: Dataset) -> Result<(usize, usize, usize)> {
    let counts = (dataset.restaurants.len(), dataset.sales.len(), dataset.revenue.len());

    db.query(
        r#"
        BEGIN TRANSACTION;
        INSERT INTO restaurant $restaurants;
        INSERT INTO sales $sales;
        INSERT INTO revenue $revenue;
        COMMIT TRANSACTION;
        "#,
    )
    .bind(("restaurants", dataset.restaurants))
    .bind(("sales", dataset.sales))
    .bind(("revenue", dataset.revenue))
    .await?
    .check()?;

    Ok(counts)
}

#[derive(Debug, Deserialize)]
struct CountResult {
    count: i64,
}

async fn count(db: &DbConn, table: &str) -> Result<i64> {
    let result: Option<CountResult> = db
        .query(format!("SELECT count() as count FROM {} GROUP ALL", table))
        .await?
        .take(0)?;
    Ok(result.map(|c| c.count).unwrap_or(0))
}

/// Row counts per table: (restaurants, sales, revenue)
pub async fn table_counts(db: &DbConn) -> Result<(i64, i64, i64)> {
    Ok((
        count(db, "restaurant").await?,
        count(db, "sales").await?,
        count(db, "revenue").await?,
    ))
}

/// Record source backed by the embedded SurrealDB store
#[derive(Clone)]
pub struct SurrealSource {
    db: DbConn,
}

impl SurrealSource {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }

    pub async fn open(path: &str) -> Result<Self> {
        Ok(Self::new(connect(path).await?))
    }

    pub fn conn(&self) -> &DbConn {
        &self.db
    }
}

impl RecordSource for SurrealSource {
    async fn restaurants(&self) -> Result<Vec<Restaurant>> {
        let rows: Vec<Restaurant> = self
            .db
            .query("SELECT restaurant_id, name FROM restaurant ORDER BY name")
            .await?
            .take(0)?;
        Ok(rows)
    }

    async fn sales(&self) -> Result<Vec<SalesRecord>> {
        let restaurants = self.restaurants().await?;
        let rows: Vec<StoredSale> = self
            .db
            .query("SELECT sales_id, restaurant_id, date, amount FROM sales ORDER BY date, sales_id")
            .await?
            .take(0)?;
        Ok(join_sales(rows, &restaurants))
    }

    async fn revenue(&self) -> Result<Vec<RevenueRecord>> {
        let restaurants = self.restaurants().await?;
        let rows: Vec<StoredRevenue> = self
            .db
            .query(
                r#"
                SELECT revenue_id, restaurant_id, month, monthly_sale,
                       monthly_maintenance, employee_salaries, profit
                FROM revenue
                ORDER BY month, revenue_id
                "#,
            )
            .await?
            .take(0)?;
        Ok(join_revenue(rows, &restaurants))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::YearMonth;
    use chrono::NaiveDate;
    use surrealdb::engine::local::Mem;

    async fn memory_db() -> DbConn {
        let db = Surreal::new::<Mem>(()).await.unwrap();
        db.use_ns("restaurants").use_db("analytics").await.unwrap();
        db
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn dataset(sales_ids: &[i64]) -> Dataset {
        Dataset {
            restaurants: vec![
                Restaurant { restaurant_id: 1, name: "Grill".into() },
                Restaurant { restaurant_id: 2, name: "Deli".into() },
            ],
            sales: sales_ids
                .iter()
                .enumerate()
                .map(|(i, &id)| StoredSale {
                    sales_id: id,
                    restaurant_id: 1 + (i as i64 % 2),
                    date: date("2024-01-10") - chrono::Duration::days(i as i64),
                    amount: 10.0 * (i as f64 + 1.0),
                })
                .collect(),
            revenue: vec![StoredRevenue {
                revenue_id: 1,
                restaurant_id: 2,
                month: "2024-02".parse().unwrap(),
                monthly_sale: 1000.0,
                monthly_maintenance: 100.0,
                employee_salaries: 300.0,
                profit: 600.0,
            }],
        }
    }

    #[tokio::test]
    async fn test_schema_rerun_and_store_round_trip() {
        let db = memory_db().await;
        init_schema(&db).await.unwrap();
        init_schema(&db).await.unwrap();

        let written = insert_dataset(&db, dataset(&[1, 2, 3])).await.unwrap();
        assert_eq!(written, (2, 3, 1));
        assert_eq!(table_counts(&db).await.unwrap(), (2, 3, 1));

        let source = SurrealSource::new(db.clone());
        let sales = source.sales().await.unwrap();
        let dates: Vec<NaiveDate> = sales.iter().map(|s| s.date).collect();
        assert_eq!(dates, vec![date("2024-01-08"), date("2024-01-09"), date("2024-01-10")]);
        assert_eq!(sales[0].sales_id, 3);
        assert_eq!(sales[0].restaurant_name.as_deref(), Some("Grill"));
        assert_eq!(sales[1].restaurant_name.as_deref(), Some("Deli"));

        let revenue = source.revenue().await.unwrap();
        assert_eq!(revenue.len(), 1);
        assert_eq!(revenue[0].month, "2024-02".parse::<YearMonth>().unwrap());
        assert_eq!(revenue[0].profit(), 600.0);

        clear(&db).await.unwrap();
        init_schema(&db).await.unwrap();
        assert_eq!(table_counts(&db).await.unwrap(), (0, 0, 0));
    }

    #[tokio::test]
    async fn test_duplicate_ids_leave_store_untouched() {
        let db = memory_db().await;
        init_schema(&db).await.unwrap();

        assert!(insert_dataset(&db, dataset(&[1, 2, 1])).await.is_err());
        assert_eq!(table_counts(&db).await.unwrap(), (0, 0, 0));
    }
}
