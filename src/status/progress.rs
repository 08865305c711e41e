//! Time-derived display values

use crate::entities::BookingStatus;
use chrono::{DateTime, Utc};

/// Percentage of a stay that has elapsed at `now`, in `0..=100`.
///
/// A checked-out booking is complete whatever the dates say. Otherwise the
/// ratio is taken on millisecond timestamps and rounded; a zero-length (or
/// inverted) window counts as already complete once `now` reaches it.
pub fn stay_progress(
    status: BookingStatus,
    check_in: DateTime<Utc>,
    check_out: DateTime<Utc>,
    now: DateTime<Utc>,
) -> u8 {
    if status == BookingStatus::CheckedOut {
        return 100;
    }
    if now < check_in {
        return 0;
    }
    if now > check_out {
        return 100;
    }

    let window = (check_out - check_in).num_milliseconds();
    if window <= 0 {
        return 100;
    }
    let elapsed = (now - check_in).num_milliseconds();

    (elapsed as f64 * 100.0 / window as f64).round().clamp(0.0, 100.0) as u8
}

/// Coarse age of a timestamp
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelativeAge {
    /// Less than an hour old, or in the future
    JustNow,
    /// Whole hours, 1..=23
    Hours(i64),
    /// Whole days, at least 1
    Days(i64),
}

/// Age of `timestamp` at `now`, by floor division of elapsed hours
pub fn relative_age(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> RelativeAge {
    let hours = (now - timestamp).num_hours();
    if hours < 1 {
        RelativeAge::JustNow
    } else if hours < 24 {
        RelativeAge::Hours(hours)
    } else {
        RelativeAge::Days(hours / 24)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn date(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, day, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_midpoint_is_fifty() {
        assert_eq!(
            stay_progress(BookingStatus::CheckedIn, date(1), date(5), date(3)),
            50
        );
    }

    #[test]
    fn test_bounds() {
        let status = BookingStatus::NotCheckedIn;
        assert_eq!(stay_progress(status, date(1), date(5), date(1)), 0);
        assert_eq!(stay_progress(status, date(1), date(5), date(5)), 100);
        assert_eq!(stay_progress(status, date(2), date(5), date(1)), 0);
        assert_eq!(stay_progress(status, date(1), date(5), date(9)), 100);
    }

    #[test]
    fn test_checked_out_overrides_dates() {
        assert_eq!(
            stay_progress(BookingStatus::CheckedOut, date(3), date(9), date(1)),
            100
        );
        assert_eq!(
            stay_progress(BookingStatus::CheckedOut, date(1), date(9), date(2)),
            100
        );
    }

    #[test]
    fn test_zero_length_window() {
        assert_eq!(
            stay_progress(BookingStatus::CheckedIn, date(4), date(4), date(4)),
            100
        );
    }

    #[test]
    fn test_rounding() {
        // 1 of 3 days -> 33.33 -> 33; 2 of 3 days -> 66.67 -> 67
        let status = BookingStatus::CheckedIn;
        assert_eq!(stay_progress(status, date(1), date(4), date(2)), 33);
        assert_eq!(stay_progress(status, date(1), date(4), date(3)), 67);
    }

    #[test]
    fn test_progress_is_monotonic() {
        let check_in = date(1);
        let check_out = date(5) + Duration::minutes(17);
        let mut previous = 0;
        let mut now = check_in;
        while now <= check_out {
            let progress = stay_progress(BookingStatus::CheckedIn, check_in, check_out, now);
            assert!(progress >= previous, "progress went back at {}", now);
            previous = progress;
            now += Duration::minutes(45);
        }
        assert_eq!(
            stay_progress(BookingStatus::CheckedIn, check_in, check_out, check_out),
            100
        );
    }

    #[test]
    fn test_relative_age() {
        let now = date(10);
        assert_eq!(relative_age(now, now), RelativeAge::JustNow);
        assert_eq!(
            relative_age(now - Duration::minutes(59), now),
            RelativeAge::JustNow
        );
        assert_eq!(relative_age(now + Duration::hours(5), now), RelativeAge::JustNow);
        assert_eq!(relative_age(now - Duration::hours(1), now), RelativeAge::Hours(1));
        assert_eq!(
            relative_age(now - Duration::minutes(23 * 60 + 59), now),
            RelativeAge::Hours(23)
        );
        assert_eq!(relative_age(now - Duration::hours(24), now), RelativeAge::Days(1));
        assert_eq!(relative_age(now - Duration::hours(71), now), RelativeAge::Days(2));
    }
}
