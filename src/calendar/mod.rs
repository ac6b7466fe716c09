//! Holiday calendars, clocks and the loan due-date calculator

pub mod clock;
pub mod colombia;
pub mod dataset;
pub mod deadline;

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::config::CalendarConfig;

pub use clock::{Clock, SystemClock};
pub use colombia::ColombiaCalendar;
pub use dataset::HolidaySet;
pub use deadline::{DueDateCalculator, LoanDeadline, LoanWindow, MAX_WINDOW_DAYS};

/// A named non-working day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Holiday {
    pub date: NaiveDate,
    pub name: String,
}

impl Holiday {
    pub fn new(date: NaiveDate, name: impl Into<String>) -> Self {
        Self { date, name: name.into() }
    }
}

/// Source of public holidays for one region.
///
/// Implementations are read-only; the calculator receives one explicitly
/// rather than reaching for a global dataset.
pub trait HolidayCalendar: Send + Sync {
    /// Region identifier, e.g. `CO`
    fn region(&self) -> &str;

    /// Holidays in the inclusive range `[start, end]`, ordered by date
    fn holidays_between(&self, start: NaiveDate, end: NaiveDate) -> Vec<Holiday>;

    fn is_holiday(&self, date: NaiveDate) -> bool {
        !self.holidays_between(date, date).is_empty()
    }
}

/// Saturday or Sunday
pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Errors raised while building a holiday calendar at startup
#[derive(Error, Debug)]
pub enum CalendarError {
    #[error("Failed to read holiday dataset {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed holiday dataset: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Holiday dataset lists {0} more than once")]
    DuplicateDate(NaiveDate),

    #[error("Holiday dataset is for region {found}, expected {expected}")]
    RegionMismatch { expected: String, found: String },

    #[error("No built-in holiday rules for region {0}")]
    UnsupportedRegion(String),

    #[error("Invalid UTC offset: {0} hours")]
    InvalidOffset(i32),
}

/// Build the holiday calendar described by the configuration.
///
/// A dataset file takes precedence over the built-in rules, but it must be
/// declared for the configured region.
pub fn from_config(config: &CalendarConfig) -> Result<Arc<dyn HolidayCalendar>, CalendarError> {
    let region = normalize_region(&config.region)?;

    if let Some(path) = &config.holidays_file {
        let set = HolidaySet::load(path)?;
        let found = normalize_region(set.region())
            .map(str::to_string)
            .unwrap_or_else(|_| set.region().to_string());
        if found != region {
            return Err(CalendarError::RegionMismatch {
                expected: region.to_string(),
                found,
            });
        }
        tracing::info!(
            "Loaded {} holidays for {} (dataset version {})",
            set.len(),
            region,
            set.version()
        );
        return Ok(Arc::new(set));
    }

    tracing::info!("Using built-in holiday rules for {}", region);
    Ok(Arc::new(ColombiaCalendar))
}

fn normalize_region(region: &str) -> Result<&'static str, CalendarError> {
    match region.trim().to_lowercase().as_str() {
        "co" | "colombia" => Ok(ColombiaCalendar::REGION),
        _ => Err(CalendarError::UnsupportedRegion(region.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn calendar_config(region: &str, file: Option<PathBuf>) -> CalendarConfig {
        CalendarConfig {
            region: region.to_string(),
            utc_offset_hours: -5,
            holidays_file: file,
        }
    }

    #[test]
    fn test_is_weekend() {
        assert!(is_weekend(date(2026, 10, 17)));
        assert!(is_weekend(date(2026, 10, 18)));
        assert!(!is_weekend(date(2026, 10, 19)));
    }

    #[test]
    fn test_from_config_builtin_colombia() {
        let calendar = from_config(&calendar_config("Colombia", None)).unwrap();
        assert_eq!(calendar.region(), "CO");
        assert!(calendar.is_holiday(date(2026, 7, 20)));
    }

    #[test]
    fn test_from_config_unsupported_region() {
        let err = from_config(&calendar_config("peru", None)).err().unwrap();
        assert!(matches!(err, CalendarError::UnsupportedRegion(_)));
    }

    #[test]
    fn test_from_config_prefers_dataset() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"region": "CO", "version": "2026.1", "holidays": [{{"date": "2026-10-21", "name": "Cierre"}}]}}"#
        )
        .unwrap();

        let calendar = from_config(&calendar_config("co", Some(file.path().to_path_buf()))).unwrap();
        assert!(calendar.is_holiday(date(2026, 10, 21)));
        // Only the dataset is consulted
        assert!(!calendar.is_holiday(date(2026, 7, 20)));
    }

    #[test]
    fn test_from_config_rejects_foreign_dataset() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"region": "PE", "version": "1", "holidays": []}}"#).unwrap();

        let err = from_config(&calendar_config("co", Some(file.path().to_path_buf())))
            .err()
            .unwrap();
        assert!(matches!(err, CalendarError::RegionMismatch { .. }));
    }
}
