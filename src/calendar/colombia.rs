//! Colombian public holidays.
//!
//! Weekends and the following holidays are observed:
//! * New Year's Day (Jan 1)
//! * Epiphany (Jan 6, moved to Monday)
//! * Saint Joseph's Day (Mar 19, moved to Monday)
//! * Holy Thursday (Easter - 3)
//! * Good Friday (Easter - 2)
//! * Labour Day (May 1)
//! * Ascension Day (Easter + 43, a Monday)
//! * Corpus Christi (Easter + 64, a Monday)
//! * Sacred Heart (Easter + 71, a Monday)
//! * Saints Peter and Paul (Jun 29, moved to Monday)
//! * Independence Day (Jul 20)
//! * Battle of Boyacá (Aug 7)
//! * Assumption Day (Aug 15, moved to Monday)
//! * Columbus Day (Oct 12, moved to Monday)
//! * All Saints' Day (Nov 1, moved to Monday)
//! * Independence of Cartagena (Nov 11, moved to Monday)
//! * Immaculate Conception (Dec 8)
//! * Christmas Day (Dec 25)
//!
//! "Moved to Monday" holidays follow Ley 51 de 1983: when the date is not a
//! Monday the holiday is observed on the next Monday instead.

use chrono::{Datelike, Duration, NaiveDate};

use super::{Holiday, HolidayCalendar};

const FIXED: &[(u32, u32, &str)] = &[
    (1, 1, "New Year's Day"),
    (5, 1, "Labour Day"),
    (7, 20, "Independence Day"),
    (8, 7, "Battle of Boyacá"),
    (12, 8, "Immaculate Conception"),
    (12, 25, "Christmas Day"),
];

const MOVED_TO_MONDAY: &[(u32, u32, &str)] = &[
    (1, 6, "Epiphany"),
    (3, 19, "Saint Joseph's Day"),
    (6, 29, "Saints Peter and Paul"),
    (8, 15, "Assumption Day"),
    (10, 12, "Columbus Day"),
    (11, 1, "All Saints' Day"),
    (11, 11, "Independence of Cartagena"),
];

/// Offsets in days from Easter Sunday
const EASTER_RELATIVE: &[(i64, &str)] = &[
    (-3, "Holy Thursday"),
    (-2, "Good Friday"),
    (43, "Ascension Day"),
    (64, "Corpus Christi"),
    (71, "Sacred Heart"),
];

/// Rule-based Colombian holiday calendar, valid for any Gregorian year
#[derive(Debug, Clone, Copy, Default)]
pub struct ColombiaCalendar;

impl ColombiaCalendar {
    pub const REGION: &'static str = "CO";

    /// All holidays observed in `year`, ordered by date
    pub fn holidays_for_year(year: i32) -> Vec<Holiday> {
        let mut holidays: Vec<Holiday> = FIXED
            .iter()
            .filter_map(|&(m, d, name)| {
                NaiveDate::from_ymd_opt(year, m, d).map(|date| Holiday::new(date, name))
            })
            .collect();

        holidays.extend(MOVED_TO_MONDAY.iter().filter_map(|&(m, d, name)| {
            NaiveDate::from_ymd_opt(year, m, d).map(|date| Holiday::new(next_monday(date), name))
        }));

        if let Some(easter) = easter_sunday(year) {
            holidays.extend(
                EASTER_RELATIVE
                    .iter()
                    .map(|&(offset, name)| Holiday::new(easter + Duration::days(offset), name)),
            );
        }

        holidays.sort_by_key(|h| h.date);
        holidays
    }
}

impl HolidayCalendar for ColombiaCalendar {
    fn region(&self) -> &str {
        Self::REGION
    }

    fn holidays_between(&self, start: NaiveDate, end: NaiveDate) -> Vec<Holiday> {
        if start > end {
            return Vec::new();
        }
        (start.year()..=end.year())
            .flat_map(Self::holidays_for_year)
            .filter(|h| h.date >= start && h.date <= end)
            .collect()
    }
}

/// The date itself when it is a Monday, otherwise the following Monday
fn next_monday(date: NaiveDate) -> NaiveDate {
    let days_ahead = (7 - date.weekday().num_days_from_monday()) % 7;
    date + Duration::days(days_ahead as i64)
}

/// Gregorian Easter Sunday (anonymous computus)
pub fn easter_sunday(year: i32) -> Option<NaiveDate> {
    let a = year % 19;
    let b = year / 100;
    let c = year % 100;
    let d = b / 4;
    let e = b % 4;
    let f = (b + 8) / 25;
    let g = (b - f + 1) / 3;
    let h = (19 * a + b - d - g + 15) % 30;
    let i = c / 4;
    let k = c % 4;
    let l = (32 + 2 * e + 2 * i - h - k) % 7;
    let m = (a + 11 * h + 22 * l) / 451;
    let month = (h + l - 7 * m + 114) / 31;
    let day = (h + l - 7 * m + 114) % 31 + 1;
    NaiveDate::from_ymd_opt(year, month as u32, day as u32)
}
