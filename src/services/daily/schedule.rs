use std::time::Duration;

use chrono::{DateTime, Days, LocalResult, NaiveTime, TimeZone};

/// The next local midnight after `now`.
///
/// Around DST transitions a local midnight can be ambiguous or skipped;
/// ambiguity resolves to the earliest valid instant, and a skipped midnight
/// falls back to `now + 24h`.
pub fn next_midnight<Tz: TimeZone>(now: &DateTime<Tz>) -> DateTime<Tz> {
    let tomorrow = now.date_naive() + Days::new(1);
    let midnight = tomorrow.and_time(NaiveTime::MIN);

    match now.timezone().from_local_datetime(&midnight) {
        LocalResult::Single(t) | LocalResult::Ambiguous(t, _) => t,
        LocalResult::None => now.clone() + chrono::Duration::hours(24),
    }
}

/// How long the reset timer has to sleep until the next local midnight.
pub fn duration_until_midnight<Tz: TimeZone>(now: &DateTime<Tz>) -> Duration {
    (next_midnight(now) - now.clone())
        .to_std()
        .unwrap_or(Duration::ZERO)
}

/// Render a countdown as `HH:MM:SS` for the status report.
pub fn format_countdown(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_midmorning_to_midnight() {
        let now = Utc.with_ymd_and_hms(2024, 3, 5, 10, 30, 0).unwrap();
        let next = next_midnight(&now);
        assert_eq!(next, Utc.with_ymd_and_hms(2024, 3, 6, 0, 0, 0).unwrap());
        assert_eq!(
            duration_until_midnight(&now),
            Duration::from_secs(13 * 3600 + 30 * 60)
        );
    }

    #[test]
    fn test_exactly_midnight_waits_a_full_day() {
        let now = Utc.with_ymd_and_hms(2024, 3, 5, 0, 0, 0).unwrap();
        assert_eq!(duration_until_midnight(&now), Duration::from_secs(86400));
    }

    #[test]
    fn test_one_second_before_midnight() {
        let now = Utc.with_ymd_and_hms(2024, 12, 31, 23, 59, 59).unwrap();
        let next = next_midnight(&now);
        assert_eq!(next, Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap());
        assert_eq!(duration_until_midnight(&now), Duration::from_secs(1));
    }

    #[test]
    fn test_format_countdown() {
        assert_eq!(format_countdown(Duration::from_secs(0)), "00:00:00");
        assert_eq!(format_countdown(Duration::from_secs(61)), "00:01:01");
        assert_eq!(
            format_countdown(Duration::from_secs(13 * 3600 + 30 * 60)),
            "13:30:00"
        );
    }
}
