use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Current time in epoch seconds.
pub fn now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock is before the unix epoch")
        .as_secs()
}

/// Current time in epoch milliseconds, used to stamp the six per-batch
/// latency timestamps in `Stats`.
pub fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock is before the unix epoch")
        .as_millis() as i64
}

/// Human-readable UTC timestamp for log banners.
pub fn now_str() -> String {
    Utc::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Formats a UTC date as `YYYY-MM-DD`, per the Date decoding contract.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Formats a UTC timestamp as `YYYY-MM-DDTHH:MM:SS[.ffffff]`, emitting
/// microsecond precision only when `typemod > 0`.
pub fn format_timestamp(ts: NaiveDateTime, typemod: i32) -> String {
    if typemod > 0 {
        ts.format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
    } else {
        ts.format("%Y-%m-%dT%H:%M:%S").to_string()
    }
}

/// Formats seconds-since-midnight plus a fractional remainder as
/// `HH:MM:SS[.ffffff]`.
pub fn format_time_of_day(total_seconds: i64, nanos: u32) -> String {
    let h = total_seconds / 3600;
    let m = (total_seconds % 3600) / 60;
    let s = total_seconds % 60;
    if nanos == 0 {
        format!("{:02}:{:02}:{:02}", h, m, s)
    } else {
        format!("{:02}:{:02}:{:02}.{:06}", h, m, s, nanos / 1_000)
    }
}

/// Converts an epoch-millisecond timestamp into a UTC `DateTime`, used by
/// the value decoder for `TimeRep::Timestamp`.
pub fn datetime_from_millis(millis: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(millis).unwrap_or_else(|| DateTime::from_timestamp(0, 0).unwrap())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn now_is_monotonic_enough() {
        let a = now();
        let b = now();
        assert!(b >= a);
    }

    #[test]
    fn time_of_day_formats_with_and_without_fraction() {
        assert_eq!(format_time_of_day(3661, 0), "01:01:01");
        assert_eq!(format_time_of_day(3661, 123_456_000), "01:01:01.123456");
    }
}
