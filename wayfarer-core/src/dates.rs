use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{CoreError, CoreResult};

/// Inclusive calendar range `[start, end]`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> CoreResult<Self> {
        if end < start {
            return Err(CoreError::validation(format!(
                "end date {} is before start date {}",
                end, start
            )));
        }
        Ok(Self { start, end })
    }

    /// Number of nights between start and end.
    pub fn nights(&self) -> i64 {
        (self.end - self.start).num_days()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    pub fn contains_range(&self, other: &DateRange) -> bool {
        self.contains(other.start) && self.contains(other.end)
    }
}
