use chrono::{DateTime, Duration, Utc};

/// How far behind "now" every window starts, to give the remote service time
/// to post its data.
pub const SAFETY_OFFSET_MINUTES: i64 = 15;

const TIMESTAMP_FORMAT: &str = "%m/%d/%Y %H:%M";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Trailing window for one stats query.
///
/// `start = now - 15m` and `end = start + span - 1m`. A span under one
/// minute yields a degenerate window; the remote service decides what to do
/// with it.
pub fn compute_window(now: DateTime<Utc>, aggregation_span: Duration) -> TimeWindow {
    let start = now - Duration::minutes(SAFETY_OFFSET_MINUTES);
    let end = start + (aggregation_span - Duration::minutes(1));
    TimeWindow { start, end }
}

impl TimeWindow {
    /// `MM/DD/YYYY HH:MM~MM/DD/YYYY HH:MM` with spaces encoded as `%20`.
    pub fn time_range(&self) -> String {
        format!(
            "{}~{}",
            self.start.format(TIMESTAMP_FORMAT),
            self.end.format(TIMESTAMP_FORMAT)
        )
        .replace(' ', "%20")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn new_year() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_five_minute_window() {
        let window = compute_window(new_year(), Duration::minutes(5));

        assert_eq!(window.start, Utc.with_ymd_and_hms(2023, 12, 31, 23, 45, 0).unwrap());
        assert_eq!(window.end, Utc.with_ymd_and_hms(2023, 12, 31, 23, 49, 0).unwrap());
        assert_eq!(window.time_range(), "12/31/2023%2023:45~12/31/2023%2023:49");
    }

    #[test]
    fn test_window_bounds_for_various_spans() {
        let now = Utc.with_ymd_and_hms(2024, 6, 15, 12, 7, 31).unwrap();
        for minutes in [1, 2, 5, 15, 60, 1440] {
            let window = compute_window(now, Duration::minutes(minutes));
            assert_eq!(window.start, now - Duration::minutes(15));
            assert_eq!(window.end, window.start + Duration::minutes(minutes) - Duration::minutes(1));
            assert!(window.end >= window.start);
        }
    }

    #[test]
    fn test_span_above_one_minute_is_strictly_ordered() {
        let window = compute_window(new_year(), Duration::minutes(2));
        assert!(window.end > window.start);
    }

    #[test]
    fn test_time_range_has_no_raw_spaces() {
        let window = compute_window(Utc::now(), Duration::minutes(10));
        let range = window.time_range();

        assert!(!range.contains(' '));
        assert_eq!(range.matches('~').count(), 1);
        assert_eq!(range.matches("%20").count(), 2);
    }
}
