//! Maps a resolved destination type oid to the decode category (§4.A)
//! it drives. Oids are PostgreSQL's well-known built-in type oids.

use decode::DestinationClass;

const BOOL: u32 = 16;
const BYTEA: u32 = 17;
const INT8: u32 = 20;
const INT2: u32 = 21;
const INT4: u32 = 23;
const TEXT: u32 = 25;
const JSON: u32 = 114;
const FLOAT4: u32 = 700;
const FLOAT8: u32 = 701;
const BPCHAR: u32 = 1042;
const VARCHAR: u32 = 1043;
const DATE: u32 = 1082;
const TIME: u32 = 1083;
const TIMESTAMP: u32 = 1114;
const TIMESTAMPTZ: u32 = 1184;
const MONEY: u32 = 790;
const VARBIT: u32 = 1562;
const BIT: u32 = 1560;
const NUMERIC: u32 = 1700;
const UUID: u32 = 2950;
const TIMETZ: u32 = 1266;
const JSONB: u32 = 3802;

/// Classifies a destination type oid. Anything not in the well-known
/// table is treated as text passthrough (§4.A's "unknown types").
pub fn class_for_oid(oid: u32) -> DestinationClass {
    match oid {
        INT2 | INT4 | INT8 => DestinationClass::Integer,
        FLOAT4 | FLOAT8 => DestinationClass::Float,
        NUMERIC => DestinationClass::Numeric,
        MONEY => DestinationClass::Money,
        BOOL | TEXT | VARCHAR | BPCHAR | UUID | JSON | JSONB => DestinationClass::Text,
        BIT => DestinationClass::Bit,
        VARBIT => DestinationClass::Varbit,
        BYTEA => DestinationClass::Bytea,
        DATE => DestinationClass::Date,
        TIMESTAMP | TIMESTAMPTZ => DestinationClass::Timestamp,
        TIME | TIMETZ => DestinationClass::Time,
        _ => DestinationClass::Unknown,
    }
}

/// The destination type's SQL name, for the tuple-mode applier's
/// `$n::typename` parameter casts (§4.F). Unmapped oids fall back to
/// `text`, matching `class_for_oid`'s own unknown-type fallback.
pub fn type_name_for_oid(oid: u32) -> &'static str {
    match oid {
        BOOL => "bool",
        BYTEA => "bytea",
        INT8 => "int8",
        INT2 => "int2",
        INT4 => "int4",
        TEXT => "text",
        JSON => "json",
        JSONB => "jsonb",
        FLOAT4 => "float4",
        FLOAT8 => "float8",
        BPCHAR => "bpchar",
        VARCHAR => "varchar",
        DATE => "date",
        TIME => "time",
        TIMESTAMP => "timestamp",
        TIMESTAMPTZ => "timestamptz",
        MONEY => "money",
        VARBIT => "varbit",
        BIT => "bit",
        NUMERIC => "numeric",
        UUID => "uuid",
        TIMETZ => "timetz",
        _ => "text",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_common_types() {
        assert_eq!(class_for_oid(INT4), DestinationClass::Integer);
        assert_eq!(class_for_oid(NUMERIC), DestinationClass::Numeric);
        assert_eq!(class_for_oid(BYTEA), DestinationClass::Bytea);
    }

    #[test]
    fn unmapped_oid_is_unknown() {
        assert_eq!(class_for_oid(999_999), DestinationClass::Unknown);
    }

    #[test]
    fn type_name_covers_numeric_and_falls_back_to_text() {
        assert_eq!(type_name_for_oid(NUMERIC), "numeric");
        assert_eq!(type_name_for_oid(999_999), "text");
    }
}
