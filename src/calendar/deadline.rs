//! Loan due-date computation
//!
//! A loan deadline is the start date plus a role-derived number of calendar
//! days, pushed forward by the weekends and holidays the loan period spans,
//! then rolled to the next working day.

use std::sync::Arc;

use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;
use utoipa::ToSchema;

use super::{is_weekend, Clock, HolidayCalendar};
use crate::{
    error::{DateBound, LendingError},
    models::user::BorrowerRole,
};

/// Day counts for an inclusive date range.
///
/// `total_days == weekend_days + holiday_count + working_days`; holidays
/// falling on a weekend are counted as weekend days only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct LoanWindow {
    pub total_days: i64,
    pub weekend_days: i64,
    pub holiday_count: i64,
    pub working_days: i64,
}

/// Computed loan deadline together with the window it was derived from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct LoanDeadline {
    pub total_days: i64,
    pub weekend_days: i64,
    pub holiday_days: i64,
    pub working_days: i64,
    pub deadline_date: NaiveDate,
}

/// Due-date calculator over an injected holiday calendar and clock
#[derive(Clone)]
pub struct DueDateCalculator {
    calendar: Arc<dyn HolidayCalendar>,
    clock: Arc<dyn Clock>,
}

impl DueDateCalculator {
    pub fn new(calendar: Arc<dyn HolidayCalendar>, clock: Arc<dyn Clock>) -> Self {
        Self { calendar, clock }
    }

    pub fn calendar(&self) -> &dyn HolidayCalendar {
        self.calendar.as_ref()
    }

    /// Evaluation day
    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Neither a weekend day nor a holiday
    pub fn is_working_day(&self, date: NaiveDate) -> bool {
        !is_weekend(date) && !self.calendar.is_holiday(date)
    }

    /// Count total, weekend, holiday and working days in `[start, end]`.
    ///
    /// Fails when `start` comes after `end`, lies before today, or the range
    /// is longer than `MAX_WINDOW_DAYS`.
    pub fn compute_window(&self, start: NaiveDate, end: NaiveDate) -> Result<LoanWindow, LendingError> {
        if start > end {
            return Err(LendingError::InvalidDateRange { bound: DateBound::StartAfterEnd });
        }
        if start < self.today() {
            return Err(LendingError::InvalidDateRange { bound: DateBound::StartInPast });
        }

        let total_days = (end - start).num_days() + 1;
        if total_days > MAX_WINDOW_DAYS {
            return Err(LendingError::InvalidDateRange { bound: DateBound::TooLong });
        }

        let weekend_days = weekend_days_from(start, total_days);
        let holiday_count = self
            .calendar
            .holidays_between(start, end)
            .iter()
            .filter(|h| !is_weekend(h.date))
            .count() as i64;

        Ok(LoanWindow {
            total_days,
            weekend_days,
            holiday_count,
            working_days: total_days - weekend_days - holiday_count,
        })
    }

    /// Adjust `base_deadline` for the non-working days between `start` and it.
    ///
    /// The window's weekend and holiday count, less one, is added to the base
    /// deadline; the result then rolls forward past weekends and holidays.
    pub fn compute_deadline_from(
        &self,
        start: NaiveDate,
        base_deadline: NaiveDate,
    ) -> Result<LoanDeadline, LendingError> {
        let window = self.compute_window(start, base_deadline)?;

        let extra_days = window.holiday_count + window.weekend_days - 1;
        let mut deadline = add_days(base_deadline, extra_days)?;
        while !self.is_working_day(deadline) {
            deadline = add_days(deadline, 1)?;
        }

        Ok(LoanDeadline {
            total_days: window.total_days,
            weekend_days: window.weekend_days,
            holiday_days: window.holiday_count,
            working_days: window.working_days,
            deadline_date: deadline,
        })
    }

    /// Deadline for a loan to `role` starting on `start`
    pub fn compute_deadline(&self, start: NaiveDate, role: BorrowerRole) -> Result<LoanDeadline, LendingError> {
        let base_deadline = add_days(start, role.base_period_days())?;
        self.compute_deadline_from(start, base_deadline)
    }

    /// Deadline for a loan to `role` starting today
    pub fn deadline_for(&self, role: BorrowerRole) -> Result<LoanDeadline, LendingError> {
        self.compute_deadline(self.today(), role)
    }
}

/// Longest range, in days, a single window may cover
pub const MAX_WINDOW_DAYS: i64 = 366;

fn add_days(date: NaiveDate, days: i64) -> Result<NaiveDate, LendingError> {
    Duration::try_days(days)
        .and_then(|delta| date.checked_add_signed(delta))
        .ok_or(LendingError::InvalidDateRange { bound: DateBound::OutOfRange })
}

/// Saturdays and Sundays among the `total_days` days starting at `start`
fn weekend_days_from(start: NaiveDate, total_days: i64) -> i64 {
    let first = i64::from(start.weekday().num_days_from_monday());
    let remainder = (0..total_days % 7)
        .filter(|offset| (first + offset) % 7 >= 5)
        .count() as i64;
    total_days / 7 * 2 + remainder
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::{clock::MockClock, ColombiaCalendar, Holiday, HolidaySet};
    use chrono::{Datelike, Weekday};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn fixed_clock(today: NaiveDate) -> Arc<dyn Clock> {
        let mut clock = MockClock::new();
        clock.expect_today().return_const(today);
        Arc::new(clock)
    }

    fn colombia(today: NaiveDate) -> DueDateCalculator {
        DueDateCalculator::new(Arc::new(ColombiaCalendar), fixed_clock(today))
    }

    fn no_holidays(today: NaiveDate) -> DueDateCalculator {
        DueDateCalculator::new(Arc::new(HolidaySet::empty("CO")), fixed_clock(today))
    }

    // Monday
    const TODAY: (i32, u32, u32) = (2026, 10, 19);

    fn today() -> NaiveDate {
        date(TODAY.0, TODAY.1, TODAY.2)
    }

    #[test]
    fn test_single_day_window() {
        let calc = colombia(today());
        let window = calc.compute_window(today(), today()).unwrap();
        assert_eq!(
            window,
            LoanWindow { total_days: 1, weekend_days: 0, holiday_count: 0, working_days: 1 }
        );
    }

    #[test]
    fn test_window_counts() {
        let calc = colombia(today());
        // Oct 19 - Nov 2, 2026: two weekends, All Saints' Day moved to Mon Nov 2
        let window = calc.compute_window(today(), date(2026, 11, 2)).unwrap();
        assert_eq!(window.total_days, 15);
        assert_eq!(window.weekend_days, 4);
        assert_eq!(window.holiday_count, 1);
        assert_eq!(window.working_days, 10);
    }

    #[test]
    fn test_weekend_holiday_not_double_counted() {
        let holidays = HolidaySet::new(
            "CO",
            "test",
            vec![Holiday::new(date(2026, 10, 24), "Saturday holiday")],
        )
        .unwrap();
        let calc = DueDateCalculator::new(Arc::new(holidays), fixed_clock(today()));
        let window = calc.compute_window(today(), date(2026, 10, 25)).unwrap();
        assert_eq!(window.weekend_days, 2);
        assert_eq!(window.holiday_count, 0);
        assert_eq!(window.working_days, 5);
    }

    #[test]
    fn test_start_after_end_rejected() {
        let calc = colombia(today());
        let err = calc.compute_window(date(2026, 10, 22), date(2026, 10, 21)).unwrap_err();
        assert_eq!(err, LendingError::InvalidDateRange { bound: DateBound::StartAfterEnd });

        let err = calc
            .compute_deadline_from(date(2026, 10, 22), date(2026, 10, 21))
            .unwrap_err();
        assert_eq!(err, LendingError::InvalidDateRange { bound: DateBound::StartAfterEnd });
    }

    #[test]
    fn test_start_in_past_rejected() {
        let calc = colombia(today());
        let err = calc
            .compute_deadline(date(2026, 10, 18), BorrowerRole::Guest)
            .unwrap_err();
        assert_eq!(err, LendingError::InvalidDateRange { bound: DateBound::StartInPast });
    }

    #[test]
    fn test_guest_from_monday_without_holidays() {
        let calc = no_holidays(today());
        let deadline = calc.compute_deadline(today(), BorrowerRole::Guest).unwrap();
        // Base deadline is Monday Oct 26; the window spans one weekend (2 - 1 = 1 extra day)
        assert_eq!(deadline.total_days, 8);
        assert_eq!(deadline.weekend_days, 2);
        assert_eq!(deadline.holiday_days, 0);
        assert_eq!(deadline.working_days, 6);
        assert_eq!(deadline.deadline_date, date(2026, 10, 27));
    }

    #[test]
    fn test_role_base_periods() {
        let calc = no_holidays(today());
        let expected = [
            (BorrowerRole::Employee, date(2026, 10, 28)),
            (BorrowerRole::Affiliate, date(2026, 10, 30)),
            (BorrowerRole::Guest, date(2026, 10, 27)),
        ];
        for (role, deadline) in expected {
            assert_eq!(calc.deadline_for(role).unwrap().deadline_date, deadline, "{:?}", role);
        }
    }

    #[test]
    fn test_holiday_in_window_extends_deadline() {
        // Mon Nov 9 + 7 = Mon Nov 16, Independence of Cartagena
        let calc = colombia(today());
        let deadline = calc.compute_deadline(date(2026, 11, 9), BorrowerRole::Guest).unwrap();
        assert_eq!(deadline.holiday_days, 1);
        assert_eq!(deadline.weekend_days, 2);
        assert_eq!(deadline.deadline_date, date(2026, 11, 18));
    }

    #[test]
    fn test_rolls_past_weekend_then_holiday() {
        // Admin: Oct 19 + 20 = Sun Nov 8; 6 weekend days + 1 holiday - 1 lands on
        // Sat Nov 14, then Sunday, then the Cartagena holiday on Mon Nov 16
        let calc = colombia(today());
        let deadline = calc.deadline_for(BorrowerRole::Admin).unwrap();
        assert_eq!(deadline.weekend_days, 6);
        assert_eq!(deadline.holiday_days, 1);
        assert_eq!(deadline.deadline_date, date(2026, 11, 17));
    }

    #[test]
    fn test_rolls_past_holiday_outside_window() {
        let holidays = HolidaySet::new(
            "CO",
            "test",
            vec![Holiday::new(date(2026, 10, 27), "Closure")],
        )
        .unwrap();
        let calc = DueDateCalculator::new(Arc::new(holidays), fixed_clock(today()));
        let deadline = calc.deadline_for(BorrowerRole::Guest).unwrap();
        assert_eq!(deadline.deadline_date, date(2026, 10, 28));
    }

    #[test]
    fn test_window_partition_over_a_year() {
        let first = date(2026, 1, 1);
        let calc = colombia(first);
        for start in first.iter_days().take_while(|d| d.year() == 2026) {
            for span in [0, 1, 6, 13, 30, 90] {
                let end = start + Duration::days(span);
                if end.year() != 2026 {
                    continue;
                }
                let w = calc.compute_window(start, end).unwrap();
                assert_eq!(w.total_days, span + 1);
                assert_eq!(w.total_days, w.weekend_days + w.holiday_count + w.working_days);
                assert!(w.working_days >= 0);
            }
        }
    }

    #[test]
    fn test_deadline_is_always_a_working_day() {
        let first = date(2026, 1, 1);
        let calc = colombia(first);
        let roles = [
            BorrowerRole::Admin,
            BorrowerRole::Employee,
            BorrowerRole::Affiliate,
            BorrowerRole::Guest,
        ];
        for start in first.iter_days().take_while(|d| d.year() == 2026) {
            for role in roles {
                let deadline = calc.compute_deadline(start, role).unwrap().deadline_date;
                assert!(!matches!(deadline.weekday(), Weekday::Sat | Weekday::Sun), "{}", deadline);
                assert!(!ColombiaCalendar.is_holiday(deadline), "{}", deadline);
                assert!(deadline >= start + Duration::days(role.base_period_days()));
            }
        }
    }

    #[test]
    fn test_short_window_pulls_deadline_back() {
        // Mon Oct 19 to Wed Oct 21: no weekend, no holiday, so one day earlier
        let calc = no_holidays(today());
        let deadline = calc.compute_deadline_from(today(), date(2026, 10, 21)).unwrap();
        assert_eq!(deadline.total_days, 3);
        assert_eq!(deadline.working_days, 3);
        assert_eq!(deadline.deadline_date, date(2026, 10, 20));
    }

    #[test]
    fn test_window_length_is_bounded() {
        let calc = colombia(today());
        let last = today() + Duration::days(MAX_WINDOW_DAYS - 1);
        assert_eq!(calc.compute_window(today(), last).unwrap().total_days, MAX_WINDOW_DAYS);

        let err = calc.compute_window(today(), last + Duration::days(1)).unwrap_err();
        assert_eq!(err, LendingError::InvalidDateRange { bound: DateBound::TooLong });

        let err = calc.compute_window(today(), NaiveDate::MAX).unwrap_err();
        assert_eq!(err, LendingError::InvalidDateRange { bound: DateBound::TooLong });
    }

    #[test]
    fn test_start_near_calendar_end_is_an_error() {
        let calc = colombia(today());
        let start = NaiveDate::MAX - Duration::days(3);
        for role in BorrowerRole::PRECEDENCE {
            let err = calc.compute_deadline(start, role).unwrap_err();
            assert_eq!(err, LendingError::InvalidDateRange { bound: DateBound::OutOfRange });
        }

        // Base deadline fits, but the weekend adjustment runs off the end
        let start = NaiveDate::MAX - Duration::days(8);
        let err = calc.compute_deadline(start, BorrowerRole::Guest).unwrap_err();
        assert_eq!(err, LendingError::InvalidDateRange { bound: DateBound::OutOfRange });
    }

    #[test]
    fn test_weekend_count_matches_day_by_day() {
        for start in today().iter_days().take(7) {
            for total in 1..=40 {
                let counted = start
                    .iter_days()
                    .take(total as usize)
                    .filter(|d| is_weekend(*d))
                    .count() as i64;
                assert_eq!(weekend_days_from(start, total), counted, "{} +{}", start, total);
            }
        }
    }
}
