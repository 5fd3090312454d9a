//! Record filtering shared by the sales and revenue reports.

use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use serde::Deserialize;

use super::Observation;
use crate::models::{parse_calendar_date, YearMonth};

/// Typed filter state. `None` means "match everything" for that criterion.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterCriteria {
    pub query: Option<String>,
    pub restaurant_id: Option<i64>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub month: Option<YearMonth>,
}

/// Raw filter parameters as they arrive from query strings or CLI flags.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilterParams {
    pub query: Option<String>,
    pub restaurant: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub month: Option<String>,
}

/// Empty strings and `all` are treated as absent.
fn present(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("all"))
}

impl FilterParams {
    pub fn to_criteria(&self) -> Result<FilterCriteria> {
        let restaurant_id = present(&self.restaurant)
            .map(|id| {
                id.parse::<i64>()
                    .map_err(|_| anyhow!("invalid restaurant id '{}'", id))
            })
            .transpose()?;

        Ok(FilterCriteria {
            query: present(&self.query).map(str::to_string),
            restaurant_id,
            start: present(&self.start_date).map(parse_calendar_date).transpose()?,
            end: present(&self.end_date).map(parse_calendar_date).transpose()?,
            month: present(&self.month).map(str::parse).transpose()?,
        })
    }
}

impl FilterCriteria {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn matches<T: Observation>(&self, record: &T) -> bool {
        if let Some(query) = &self.query {
            let needle = query.to_lowercase();
            match record.restaurant_name() {
                Some(name) if name.to_lowercase().contains(&needle) => {}
                _ => return false,
            }
        }

        if let Some(id) = self.restaurant_id {
            if record.restaurant_id() != id {
                return false;
            }
        }

        if (self.start.is_some() || self.end.is_some()) && !record.within(self.start, self.end) {
            return false;
        }

        match self.month {
            Some(month) => YearMonth::of(record.observed_on()) == month,
            None => true,
        }
    }
}

/// Records that match every supplied criterion, in input order.
pub fn apply<T: Observation + Clone>(records: &[T], criteria: &FilterCriteria) -> Vec<T> {
    records
        .iter()
        .filter(|r| criteria.matches(*r))
        .cloned()
        .collect()
}
