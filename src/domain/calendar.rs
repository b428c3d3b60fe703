//! Pure calendar arithmetic for recurrence schedules and alert periods.
//!
//! Two deliberately different comparisons live here: recurrence due-checks
//! are date-based (`next_occurrence`), while monthly alert suppression is
//! period-based (`is_new_period`). They must not be conflated.

use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, NaiveTime, Utc};

use crate::domain::models::transaction::RecurringInterval;

/// Compute the next occurrence date for a recurrence interval.
///
/// Monthly and yearly steps clamp to the end of shorter months
/// (31 Jan -> 28/29 Feb; 29 Feb -> 28 Feb in non-leap years).
pub fn next_occurrence(from: NaiveDate, interval: RecurringInterval) -> NaiveDate {
    match interval {
        RecurringInterval::Daily => from + Duration::days(1),
        RecurringInterval::Weekly => from + Duration::days(7),
        // checked_add_months only fails past chrono's representable range
        RecurringInterval::Monthly => from.checked_add_months(Months::new(1)).unwrap_or(from),
        RecurringInterval::Yearly => from.checked_add_months(Months::new(12)).unwrap_or(from),
    }
}

/// True if `last` is absent or belongs to an earlier (year, month) than `now`.
pub fn is_new_period(last: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    match last {
        None => true,
        Some(last) => last.year() != now.year() || last.month() != now.month(),
    }
}

/// Midnight UTC at the start of the given date.
pub fn at_midnight(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// Half-open window `[start, end)` covering the calendar month of `at`.
pub fn month_window(at: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    let first = at.date_naive().with_day(1).unwrap_or(at.date_naive());
    let next_first = first.checked_add_months(Months::new(1)).unwrap_or(first);
    (at_midnight(first), at_midnight(next_first))
}

/// Half-open window covering the calendar month before the one containing `at`.
pub fn previous_month_window(at: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    let first = at.date_naive().with_day(1).unwrap_or(at.date_naive());
    month_window(at_midnight(first) - Duration::days(1))
}

/// Human label for the month containing `at`, e.g. "March 2024".
pub fn month_label(at: DateTime<Utc>) -> String {
    at.format("%B %Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn utc(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    #[test]
    fn daily_and_weekly_steps() {
        assert_eq!(
            next_occurrence(date(2024, 3, 1), RecurringInterval::Daily),
            date(2024, 3, 2)
        );
        assert_eq!(
            next_occurrence(date(2024, 12, 31), RecurringInterval::Daily),
            date(2025, 1, 1)
        );
        assert_eq!(
            next_occurrence(date(2024, 3, 1), RecurringInterval::Weekly),
            date(2024, 3, 8)
        );
    }

    #[test]
    fn monthly_clamps_to_month_length() {
        assert_eq!(
            next_occurrence(date(2024, 1, 31), RecurringInterval::Monthly),
            date(2024, 2, 29)
        );
        assert_eq!(
            next_occurrence(date(2023, 1, 31), RecurringInterval::Monthly),
            date(2023, 2, 28)
        );
        assert_eq!(
            next_occurrence(date(2024, 3, 1), RecurringInterval::Monthly),
            date(2024, 4, 1)
        );
        assert_eq!(
            next_occurrence(date(2024, 12, 15), RecurringInterval::Monthly),
            date(2025, 1, 15)
        );
    }

    #[test]
    fn yearly_handles_leap_day() {
        assert_eq!(
            next_occurrence(date(2024, 2, 29), RecurringInterval::Yearly),
            date(2025, 2, 28)
        );
        assert_eq!(
            next_occurrence(date(2024, 3, 1), RecurringInterval::Yearly),
            date(2025, 3, 1)
        );
    }

    #[test]
    fn new_period_compares_year_month_pairs() {
        assert!(is_new_period(None, utc(2024, 3, 1, 0)));
        assert!(is_new_period(Some(utc(2024, 2, 29, 23)), utc(2024, 3, 1, 0)));
        assert!(is_new_period(Some(utc(2023, 3, 15, 12)), utc(2024, 3, 15, 12)));
        assert!(!is_new_period(Some(utc(2024, 3, 1, 0)), utc(2024, 3, 31, 23)));
    }

    #[test]
    fn month_window_covers_whole_month() {
        let (start, end) = month_window(utc(2024, 2, 14, 9));
        assert_eq!(start, utc(2024, 2, 1, 0));
        assert_eq!(end, utc(2024, 3, 1, 0));

        let (start, end) = month_window(utc(2024, 12, 31, 23));
        assert_eq!(start, utc(2024, 12, 1, 0));
        assert_eq!(end, utc(2025, 1, 1, 0));
    }

    #[test]
    fn previous_month_window_rolls_back() {
        let (start, end) = previous_month_window(utc(2024, 3, 1, 0));
        assert_eq!(start, utc(2024, 2, 1, 0));
        assert_eq!(end, utc(2024, 3, 1, 0));

        let (start, end) = previous_month_window(utc(2024, 1, 15, 10));
        assert_eq!(start, utc(2023, 12, 1, 0));
        assert_eq!(end, utc(2024, 1, 1, 0));
    }

    proptest! {
        #[test]
        fn next_occurrence_is_strictly_later(
            days in 0i64..40_000,
            interval_idx in 0usize..4,
        ) {
            let from = date(1970, 1, 1) + Duration::days(days);
            let interval = [
                RecurringInterval::Daily,
                RecurringInterval::Weekly,
                RecurringInterval::Monthly,
                RecurringInterval::Yearly,
            ][interval_idx];

            let next = next_occurrence(from, interval);
            prop_assert!(next > from);
            // Deterministic: same input, same output.
            prop_assert_eq!(next, next_occurrence(from, interval));
        }
    }
}
