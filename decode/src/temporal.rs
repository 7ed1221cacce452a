//! Date/Time/Timestamp decode, dispatched on the event's `TimeRep` tag.
//!
//! `TimeRep::Undef` on a temporal destination column is a fatal
//! `CdcError::Decode` — there is no reasonable default unit to assume.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use common::err::CdcError;
use common::model::TimeRep;
use common::time_util;

fn epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1970, 1, 1).expect("1970-01-01 is a valid calendar date")
}

fn parse_i64(raw: &str) -> Result<i64, CdcError> {
    raw.parse::<i64>()
        .map_err(|e| CdcError::Decode(format!("expected an integer temporal value, got {raw:?}: {e}")))
}

/// Formats a DATE destination value from a numeric epoch-days/epoch-time
/// payload, per `time_rep`.
pub fn decode_date(raw: &str, time_rep: TimeRep) -> Result<String, CdcError> {
    let date = match time_rep {
        TimeRep::Date => {
            let days = parse_i64(raw)?;
            epoch()
                .checked_add_signed(chrono::Duration::days(days))
                .ok_or_else(|| CdcError::Decode(format!("date value out of range: {days}")))?
        }
        TimeRep::Timestamp | TimeRep::MicroTimestamp | TimeRep::NanoTimestamp => {
            naive_datetime_from_epoch(raw, time_rep)?.date()
        }
        TimeRep::Undef => {
            return Err(CdcError::Decode("DATE destination requires a known time representation".into()))
        }
        other => return Err(CdcError::Decode(format!("{other:?} is not a valid DATE representation"))),
    };
    Ok(time_util::format_date(date))
}

/// Formats a TIMESTAMP destination value. `ZonedTimestamp` is already an
/// ISO-8601 string in the source event and passes through unchanged;
/// every other representation is a numeric offset from the epoch.
pub fn decode_timestamp(raw: &str, time_rep: TimeRep, typemod: i32) -> Result<String, CdcError> {
    match time_rep {
        TimeRep::ZonedTimestamp => Ok(raw.to_string()),
        TimeRep::Timestamp | TimeRep::MicroTimestamp | TimeRep::NanoTimestamp => {
            let dt = naive_datetime_from_epoch(raw, time_rep)?;
            Ok(time_util::format_timestamp(dt, typemod))
        }
        TimeRep::Undef => {
            Err(CdcError::Decode("TIMESTAMP destination requires a known time representation".into()))
        }
        other => Err(CdcError::Decode(format!("{other:?} is not a valid TIMESTAMP representation"))),
    }
}

/// Formats a TIME destination value from a numeric since-midnight payload.
pub fn decode_time(raw: &str, time_rep: TimeRep) -> Result<String, CdcError> {
    let value = parse_i64(raw)?;
    let (total_seconds, nanos) = match time_rep {
        TimeRep::Time => (value / 1_000, ((value % 1_000) * 1_000_000) as u32),
        TimeRep::MicroTime => (value / 1_000_000, ((value % 1_000_000) * 1_000) as u32),
        TimeRep::NanoTime => (value / 1_000_000_000, (value % 1_000_000_000) as u32),
        TimeRep::Undef => {
            return Err(CdcError::Decode("TIME destination requires a known time representation".into()))
        }
        other => return Err(CdcError::Decode(format!("{other:?} is not a valid TIME representation"))),
    };
    Ok(time_util::format_time_of_day(total_seconds, nanos))
}

fn naive_datetime_from_epoch(raw: &str, time_rep: TimeRep) -> Result<NaiveDateTime, CdcError> {
    let value = parse_i64(raw)?;
    let (secs, nanos) = match time_rep {
        TimeRep::Timestamp => (value.div_euclid(1_000), (value.rem_euclid(1_000) * 1_000_000) as u32),
        TimeRep::MicroTimestamp => (value.div_euclid(1_000_000), (value.rem_euclid(1_000_000) * 1_000) as u32),
        TimeRep::NanoTimestamp => (value.div_euclid(1_000_000_000), (value.rem_euclid(1_000_000_000)) as u32),
        _ => unreachable!("caller only passes timestamp-family TimeRep values"),
    };
    epoch()
        .and_time(NaiveTime::from_hms_opt(0, 0, 0).unwrap())
        .checked_add_signed(chrono::Duration::seconds(secs))
        .and_then(|dt| dt.checked_add_signed(chrono::Duration::nanoseconds(nanos as i64)))
        .ok_or_else(|| CdcError::Decode(format!("timestamp value out of range: {raw}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_decodes_from_epoch_days() {
        // 19756 days after 1970-01-01 is 2024-02-03.
        assert_eq!(decode_date("19756", TimeRep::Date).unwrap(), "2024-02-03");
    }

    #[test]
    fn undef_time_rep_on_a_date_column_is_fatal() {
        let err = decode_date("1", TimeRep::Undef).unwrap_err();
        assert_eq!(err.kind(), "decode");
    }

    #[test]
    fn zoned_timestamp_passes_through_unchanged() {
        let raw = "2024-02-03T23:00:00Z";
        assert_eq!(decode_timestamp(raw, TimeRep::ZonedTimestamp, 6).unwrap(), raw);
    }

    #[test]
    fn micro_timestamp_formats_with_fractional_seconds() {
        // 2024-02-03T23:00:00.500000 in microseconds since the epoch.
        let micros = (NaiveDate::from_ymd_opt(2024, 2, 3).unwrap().and_hms_opt(23, 0, 0).unwrap()
            - epoch().and_hms_opt(0, 0, 0).unwrap())
        .num_microseconds()
        .unwrap()
            + 500_000;
        let formatted = decode_timestamp(&micros.to_string(), TimeRep::MicroTimestamp, 6).unwrap();
        assert_eq!(formatted, "2024-02-03T23:00:00.500000");
    }

    #[test]
    fn time_without_typemod_drops_the_fraction() {
        // 3723 seconds past midnight = 01:02:03.
        assert_eq!(decode_time("3723000", TimeRep::Time).unwrap(), "01:02:03");
    }
}
