use anyhow::{anyhow, Result};
use chrono::{Datelike, NaiveDate, NaiveTime};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Raw restaurant row from CSV ingestion
#[derive(Debug, Deserialize)]
pub struct CsvRestaurant {
    pub restaurant_id: i64,
    pub name: String,
}

/// Raw sales row from CSV ingestion
#[derive(Debug, Deserialize)]
pub struct CsvSale {
    pub sales_id: i64,
    pub restaurant_id: i64,
    pub date: String,
    pub amount: f64,
}

/// Raw revenue row from CSV ingestion.
///
/// Exported files usually carry a `profit` column; it is read so such files
/// load cleanly, but the value is never trusted.
#[derive(Debug, Deserialize)]
pub struct CsvRevenue {
    pub revenue_id: i64,
    pub restaurant_id: i64,
    pub month: String,
    pub monthly_sale: f64,
    pub monthly_maintenance: f64,
    pub employee_salaries: f64,
    #[serde(default)]
    pub profit: Option<f64>,
}

/// Calendar month token, printed and parsed as `YYYY-MM`.
///
/// Stored as the first day of the month so ordering is chronological.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth(NaiveDate);

impl YearMonth {
    /// Month containing `date`
    pub fn of(date: NaiveDate) -> Self {
        Self(date.with_day(1).unwrap_or(date))
    }

    pub fn first_day(&self) -> NaiveDate {
        self.0
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m"))
    }
}

impl FromStr for YearMonth {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.len() == 7 {
            return NaiveDate::parse_from_str(&format!("{}-01", s), "%Y-%m-%d")
                .map(Self)
                .map_err(|e| anyhow!("invalid month '{}': {}", s, e));
        }
        // Full dates are accepted too; only the year and month are kept.
        parse_calendar_date(s)
            .map(Self::of)
            .map_err(|_| anyhow!("invalid month '{}'", s))
    }
}

impl Serialize for YearMonth {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for YearMonth {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Parse a calendar date, ignoring any time-of-day suffix
/// (`2024-01-08`, `2024-01-08 13:45:00` and `2024-01-08T13:45:00Z` all work).
pub fn parse_calendar_date(s: &str) -> Result<NaiveDate> {
    let s = s.trim();
    let (head, rest) = match (s.get(..10), s.get(10..)) {
        (Some(head), Some(rest)) => (head, rest),
        _ => (s, ""),
    };
    if !rest.is_empty() && !is_time_suffix(rest) {
        return Err(anyhow!("invalid date '{}': unexpected trailing text", s));
    }
    NaiveDate::parse_from_str(head, "%Y-%m-%d").map_err(|e| anyhow!("invalid date '{}': {}", s, e))
}

/// `T13:45...` or ` 13:45...`; anything after the minutes is not inspected.
fn is_time_suffix(rest: &str) -> bool {
    let Some(time) = rest.strip_prefix('T').or_else(|| rest.strip_prefix(' ')) else {
        return false;
    };
    time.get(..5)
        .map_or(false, |hm| NaiveTime::parse_from_str(hm, "%H:%M").is_ok())
}

/// Restaurant entity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Restaurant {
    pub restaurant_id: i64,
    pub name: String,
}

/// Sales record as stored in SurrealDB (no joined fields)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredSale {
    pub sales_id: i64,
    pub restaurant_id: i64,
    pub date: NaiveDate,
    pub amount: f64,
}

/// Revenue record as stored in SurrealDB
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredRevenue {
    pub revenue_id: i64,
    pub restaurant_id: i64,
    pub month: YearMonth,
    pub monthly_sale: f64,
    pub monthly_maintenance: f64,
    pub employee_salaries: f64,
    pub profit: f64,
}

/// Sales row joined with its restaurant name
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SalesRecord {
    pub sales_id: i64,
    pub restaurant_id: i64,
    pub restaurant_name: Option<String>,
    pub date: NaiveDate,
    pub amount: f64,
}

/// Monthly revenue row joined with its restaurant name
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RevenueRecord {
    pub revenue_id: i64,
    pub restaurant_id: i64,
    pub restaurant_name: Option<String>,
    pub month: YearMonth,
    pub monthly_sale: f64,
    pub monthly_maintenance: f64,
    pub employee_salaries: f64,
}

impl RevenueRecord {
    pub fn profit(&self) -> f64 {
        self.monthly_sale - self.monthly_maintenance - self.employee_salaries
    }
}

/// Flat export row; profit is written from the derived value
#[derive(Debug, Serialize)]
pub struct RevenueExportRow<'a> {
    pub revenue_id: i64,
    pub restaurant: &'a str,
    pub month: String,
    pub monthly_sale: f64,
    pub monthly_maintenance: f64,
    pub employee_salaries: f64,
    pub profit: f64,
}

#[derive(Debug, Serialize)]
pub struct SalesExportRow<'a> {
    pub sales_id: i64,
    pub restaurant: &'a str,
    pub date: String,
    pub amount: f64,
}

impl CsvSale {
    pub fn to_stored(&self) -> Result<StoredSale> {
        if !self.amount.is_finite() || self.amount < 0.0 {
            return Err(anyhow!("sale {} has invalid amount {}", self.sales_id, self.amount));
        }
        Ok(StoredSale {
            sales_id: self.sales_id,
            restaurant_id: self.restaurant_id,
            date: parse_calendar_date(&self.date)?,
            amount: self.amount,
        })
    }
}

impl CsvRevenue {
    pub fn to_stored(&self) -> Result<StoredRevenue> {
        let month: YearMonth = self.month.parse()?;
        let profit = self.monthly_sale - self.monthly_maintenance - self.employee_salaries;
        Ok(StoredRevenue {
            revenue_id: self.revenue_id,
            restaurant_id: self.restaurant_id,
            month,
            monthly_sale: self.monthly_sale,
            monthly_maintenance: self.monthly_maintenance,
            employee_salaries: self.employee_salaries,
            profit,
        })
    }
}

impl StoredSale {
    pub fn join(self, restaurant_name: Option<String>) -> SalesRecord {
        SalesRecord {
            sales_id: self.sales_id,
            restaurant_id: self.restaurant_id,
            restaurant_name,
            date: self.date,
            amount: self.amount,
        }
    }
}

impl StoredRevenue {
    /// The stored profit column is dropped; `RevenueRecord::profit` recomputes it.
    pub fn join(self, restaurant_name: Option<String>) -> RevenueRecord {
        RevenueRecord {
            revenue_id: self.revenue_id,
            restaurant_id: self.restaurant_id,
            restaurant_name,
            month: self.month,
            monthly_sale: self.monthly_sale,
            monthly_maintenance: self.monthly_maintenance,
            employee_salaries: self.employee_salaries,
        }
    }
}
