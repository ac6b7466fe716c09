//! Evaluation clock for date rules

use chrono::{FixedOffset, NaiveDate, Utc};

use super::CalendarError;

/// Source of the current calendar day
#[cfg_attr(test, mockall::automock)]
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Wall clock observed at a fixed UTC offset (the library's local day)
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    offset: FixedOffset,
}

impl SystemClock {
    pub fn new(utc_offset_hours: i32) -> Result<Self, CalendarError> {
        let offset = utc_offset_hours
            .checked_mul(3600)
            .and_then(FixedOffset::east_opt)
            .ok_or(CalendarError::InvalidOffset(utc_offset_hours))?;
        Ok(Self { offset })
    }
}

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.offset).date_naive()
    }
}
