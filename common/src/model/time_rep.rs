use serde::{Deserialize, Serialize};

/// Tags the base unit of a numeric-encoded temporal value, taken from the
/// event's schema metadata (`schema.fields[..].name`). Required for any
/// date/time decoding; `Undef` on a date/time column is a fatal
/// `CdcError::Decode`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeRep {
    Undef,
    Date,
    Time,
    MicroTime,
    NanoTime,
    Timestamp,
    MicroTimestamp,
    NanoTimestamp,
    ZonedTimestamp,
}

impl Default for TimeRep {
    fn default() -> Self {
        TimeRep::Undef
    }
}

impl TimeRep {
    /// Maps a Debezium schema-field logical name to its `TimeRep`, falling
    /// back to `Undef` for anything not recognized.
    pub fn from_schema_name(name: &str) -> TimeRep {
        match name {
            "io.debezium.time.Date" => TimeRep::Date,
            "io.debezium.time.Time" => TimeRep::Time,
            "io.debezium.time.MicroTime" => TimeRep::MicroTime,
            "io.debezium.time.NanoTime" => TimeRep::NanoTime,
            "io.debezium.time.Timestamp" => TimeRep::Timestamp,
            "io.debezium.time.MicroTimestamp" => TimeRep::MicroTimestamp,
            "io.debezium.time.NanoTimestamp" => TimeRep::NanoTimestamp,
            "io.debezium.time.ZonedTimestamp" => TimeRep::ZonedTimestamp,
            _ => TimeRep::Undef,
        }
    }
}
