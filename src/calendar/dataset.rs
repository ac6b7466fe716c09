//! Versioned holiday datasets loaded from JSON files
//!
//! ```json
//! {
//!   "region": "CO",
//!   "version": "2026.1",
//!   "holidays": [{ "date": "2026-01-01", "name": "New Year's Day" }]
//! }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use chrono::NaiveDate;
use serde::Deserialize;

use super::{CalendarError, Holiday, HolidayCalendar};

#[derive(Debug, Deserialize)]
struct DatasetFile {
    region: String,
    version: String,
    holidays: Vec<Holiday>,
}

/// Explicit set of holiday dates for one region
#[derive(Debug, Clone)]
pub struct HolidaySet {
    region: String,
    version: String,
    holidays: BTreeMap<NaiveDate, String>,
}

impl HolidaySet {
    pub fn new(
        region: impl Into<String>,
        version: impl Into<String>,
        holidays: impl IntoIterator<Item = Holiday>,
    ) -> Result<Self, CalendarError> {
        let mut map = BTreeMap::new();
        for holiday in holidays {
            if map.insert(holiday.date, holiday.name).is_some() {
                return Err(CalendarError::DuplicateDate(holiday.date));
            }
        }
        Ok(Self {
            region: region.into(),
            version: version.into(),
            holidays: map,
        })
    }

    /// An empty calendar where only weekends are non-working
    pub fn empty(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            version: String::new(),
            holidays: BTreeMap::new(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, CalendarError> {
        let file: DatasetFile = serde_json::from_str(json)?;
        Self::new(file.region, file.version, file.holidays)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, CalendarError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| CalendarError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn len(&self) -> usize {
        self.holidays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.holidays.is_empty()
    }
}

impl HolidayCalendar for HolidaySet {
    fn region(&self) -> &str {
        &self.region
    }

    fn holidays_between(&self, start: NaiveDate, end: NaiveDate) -> Vec<Holiday> {
        if start > end {
            return Vec::new();
        }
        self.holidays
            .range(start..=end)
            .map(|(date, name)| Holiday::new(*date, name.clone()))
            .collect()
    }

    fn is_holiday(&self, date: NaiveDate) -> bool {
        self.holidays.contains_key(&date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    const DATASET: &str = r#"{
        "region": "CO",
        "version": "2026.1",
        "holidays": [
            { "date": "2026-12-25", "name": "Christmas Day" },
            { "date": "2026-12-08", "name": "Immaculate Conception" },
            { "date": "2026-11-16", "name": "Independence of Cartagena" }
        ]
    }"#;

    #[test]
    fn test_from_json() {
        let set = HolidaySet::from_json(DATASET).unwrap();
        assert_eq!(set.region(), "CO");
        assert_eq!(set.version(), "2026.1");
        assert_eq!(set.len(), 3);
        assert!(set.is_holiday(date(2026, 12, 8)));
        assert!(!set.is_holiday(date(2026, 12, 9)));
    }

    #[test]
    fn test_holidays_between_is_inclusive_and_ordered() {
        let set = HolidaySet::from_json(DATASET).unwrap();
        let found = set.holidays_between(date(2026, 11, 16), date(2026, 12, 8));
        assert_eq!(
            found,
            vec![
                Holiday::new(date(2026, 11, 16), "Independence of Cartagena"),
                Holiday::new(date(2026, 12, 8), "Immaculate Conception"),
            ]
        );
        assert!(set.holidays_between(date(2026, 12, 8), date(2026, 11, 16)).is_empty());
    }

    #[test]
    fn test_duplicate_dates_rejected() {
        let json = r#"{"region": "CO", "version": "1", "holidays": [
            {"date": "2026-01-01", "name": "A"},
            {"date": "2026-01-01", "name": "B"}
        ]}"#;
        let err = HolidaySet::from_json(json).unwrap_err();
        assert!(matches!(err, CalendarError::DuplicateDate(d) if d == date(2026, 1, 1)));
    }

    #[test]
    fn test_malformed_date_rejected() {
        let json = r#"{"region": "CO", "version": "1", "holidays": [{"date": "01-01-2026", "name": "A"}]}"#;
        assert!(matches!(HolidaySet::from_json(json), Err(CalendarError::Parse(_))));
    }

    #[test]
    fn test_load_missing_file() {
        let err = HolidaySet::load("/nonexistent/holidays.json").unwrap_err();
        assert!(matches!(err, CalendarError::Io { .. }));
    }

    #[test]
    fn test_shipped_dataset_matches_rules() {
        use crate::calendar::ColombiaCalendar;

        let set = HolidaySet::from_json(include_str!("../../config/holidays-co.json")).unwrap();
        let shipped: Vec<NaiveDate> = set
            .holidays_between(date(2026, 1, 1), date(2026, 12, 31))
            .into_iter()
            .map(|h| h.date)
            .collect();
        let computed: Vec<NaiveDate> = ColombiaCalendar::holidays_for_year(2026)
            .into_iter()
            .map(|h| h.date)
            .collect();
        assert_eq!(shipped, computed);
    }
}
