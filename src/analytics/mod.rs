//! Sales and revenue analytics pipeline
//!
//! Filter → {aggregate, trend, seasonality, growth} → forecast. Every stage is
//! a pure function of the records it is handed; nothing is cached between calls.

pub mod aggregate;
pub mod filter;
pub mod forecast;
pub mod growth;
pub mod report;
pub mod revenue;
pub mod seasonality;
pub mod trend;

use chrono::NaiveDate;

use crate::models::{RevenueRecord, SalesRecord, YearMonth};

pub use aggregate::{GroupBy, GroupTotal, SummaryStats};
pub use filter::{FilterCriteria, FilterParams};
pub use forecast::{ForecastResult, Timeframe};
pub use report::{RevenueReport, SalesReport};
pub use seasonality::SeasonalityResult;
pub use trend::TrendResult;

/// Read view over a record that the pipeline stages operate on.
pub trait Observation {
    fn restaurant_id(&self) -> i64;
    fn restaurant_name(&self) -> Option<&str>;
    /// Calendar date the value is attributed to
    fn observed_on(&self) -> NaiveDate;
    /// The measured amount (sale amount, or monthly sale for revenue)
    fn value(&self) -> f64;

    /// Inclusive date-range check; open bounds always pass.
    fn within(&self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> bool {
        let date = self.observed_on();
        start.map_or(true, |s| date >= s) && end.map_or(true, |e| date <= e)
    }

    /// Name used when grouping by restaurant
    fn restaurant_label(&self) -> String {
        match self.restaurant_name() {
            Some(name) => name.to_string(),
            None => format!("Restaurant #{}", self.restaurant_id()),
        }
    }
}

impl Observation for SalesRecord {
    fn restaurant_id(&self) -> i64 {
        self.restaurant_id
    }

    fn restaurant_name(&self) -> Option<&str> {
        self.restaurant_name.as_deref()
    }

    fn observed_on(&self) -> NaiveDate {
        self.date
    }

    fn value(&self) -> f64 {
        self.amount
    }
}

impl Observation for RevenueRecord {
    fn restaurant_id(&self) -> i64 {
        self.restaurant_id
    }

    fn restaurant_name(&self) -> Option<&str> {
        self.restaurant_name.as_deref()
    }

    fn observed_on(&self) -> NaiveDate {
        self.month.first_day()
    }

    fn value(&self) -> f64 {
        self.monthly_sale
    }

    // Revenue rows only carry a month, so bounds are widened to whole months.
    fn within(&self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> bool {
        start.map_or(true, |s| self.month >= YearMonth::of(s))
            && end.map_or(true, |e| self.month <= YearMonth::of(e))
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::models::{parse_calendar_date, RevenueRecord, SalesRecord};

    pub fn sale(id: i64, restaurant_id: i64, name: Option<&str>, date: &str, amount: f64) -> SalesRecord {
        SalesRecord {
            sales_id: id,
            restaurant_id,
            restaurant_name: name.map(str::to_string),
            date: parse_calendar_date(date).unwrap(),
            amount,
        }
    }

    pub fn revenue(id: i64, restaurant_id: i64, name: Option<&str>, month: &str, monthly_sale: f64) -> RevenueRecord {
        RevenueRecord {
            revenue_id: id,
            restaurant_id,
            restaurant_name: name.map(str::to_string),
            month: month.parse().unwrap(),
            monthly_sale,
            monthly_maintenance: 0.0,
            employee_salaries: 0.0,
        }
    }
}
