//! Top-level decode dispatch: routes a single field through the category
//! matching its destination column, then renders either a quoted SQL
//! literal or a raw value suitable for tuple-mode binding.

use common::err::CdcError;
use common::model::TimeRep;

use crate::{bitstring, bytea, numeric, temporal};

/// The destination-side category that decides how a field decodes.
/// Resolved by the catalog crate from the destination column's real
/// type oid before the event reaches the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DestinationClass {
    Integer,
    Float,
    Numeric,
    Money,
    Text,
    Bit,
    Varbit,
    Bytea,
    Date,
    Timestamp,
    Time,
    Unknown,
}

/// Everything the decoder needs to turn one field into a destination
/// value. `scale` is `None` when the source event carried no explicit
/// scale (only meaningful for `Numeric`/`Money`).
pub struct DecodeInput<'a> {
    pub destination_class: DestinationClass,
    pub typemod: i32,
    pub scale: Option<i32>,
    pub time_rep: TimeRep,
    pub raw_value: Option<&'a str>,
    /// SQL mode wants a quoted/escaped literal; tuple mode wants the bare
    /// value the applier binds as a typed parameter.
    pub quote_for_sql: bool,
}

/// Decodes one field. `Ok(None)` means destination NULL, in either mode.
pub fn decode_value(input: &DecodeInput) -> Result<Option<String>, CdcError> {
    let raw = match input.raw_value {
        None => return Ok(None),
        Some(s) if s.eq_ignore_ascii_case("null") => return Ok(None),
        Some(s) => s,
    };

    let rendered = match input.destination_class {
        DestinationClass::Integer | DestinationClass::Float => raw.to_string(),
        DestinationClass::Numeric => numeric::decode_scaled(raw, input.scale.unwrap_or(0))?,
        DestinationClass::Money => {
            numeric::decode_scaled(raw, input.scale.unwrap_or(numeric::MONEY_IMPLICIT_SCALE))?
        }
        DestinationClass::Text | DestinationClass::Unknown => quote_text(raw, input.quote_for_sql),
        DestinationClass::Bit | DestinationClass::Varbit => {
            let bits = bitstring::decode_bits(raw, input.typemod)?;
            if input.quote_for_sql {
                format!("b'{bits}'")
            } else {
                bits
            }
        }
        DestinationClass::Bytea => {
            let hex_upper = bytea::decode_hex(raw)?;
            if input.quote_for_sql {
                bytea::sql_literal(&hex_upper)
            } else {
                hex_upper
            }
        }
        DestinationClass::Date => {
            let s = temporal::decode_date(raw, input.time_rep)?;
            wrap_if_quoting(s, input.quote_for_sql)
        }
        DestinationClass::Timestamp => {
            let s = temporal::decode_timestamp(raw, input.time_rep, input.typemod)?;
            wrap_if_quoting(s, input.quote_for_sql)
        }
        DestinationClass::Time => {
            let s = temporal::decode_time(raw, input.time_rep)?;
            wrap_if_quoting(s, input.quote_for_sql)
        }
    };
    Ok(Some(rendered))
}

fn wrap_if_quoting(s: String, quote_for_sql: bool) -> String {
    if quote_for_sql {
        format!("'{s}'")
    } else {
        s
    }
}

/// Doubles embedded single quotes and wraps in `'...'` for SQL mode;
/// tuple mode passes the text through unescaped.
fn quote_text(raw: &str, quote_for_sql: bool) -> String {
    if quote_for_sql {
        format!("'{}'", raw.replace('\'', "''"))
    } else {
        raw.to_string()
    }
}
