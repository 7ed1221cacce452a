//! BYTEA decode: base64 payload rendered as uppercase hex, wrapped in
//! Postgres' `\x` hex-escape syntax when quoting for a SQL literal.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use common::err::CdcError;

/// Decodes a base64 bytea payload to a bare uppercase hex string (no
/// `\x` prefix, no quotes). Both emission modes add the `\x` prefix
/// themselves before the value reaches Postgres — `sql_literal` below
/// for SQL mode, the tuple-mode binder for a cast-and-bind parameter —
/// since a prefix-less hex string casts to Postgres' legacy escape
/// format, not hex.
pub fn decode_hex(raw_base64: &str) -> Result<String, CdcError> {
    let bytes = BASE64
        .decode(raw_base64.as_bytes())
        .map_err(|e| CdcError::Decode(format!("bytea base64 decode failed: {e}")))?;
    Ok(hex::encode_upper(bytes))
}

/// Wraps an already-decoded hex string in Postgres' `'\xAABBCC'` literal
/// syntax for SQL-mode emission.
pub fn sql_literal(hex_upper: &str) -> String {
    format!("'\\x{hex_upper}'")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_to_uppercase_hex() {
        let raw = BASE64.encode([0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(decode_hex(&raw).unwrap(), "DEADBEEF");
    }

    #[test]
    fn sql_literal_wraps_with_hex_escape() {
        assert_eq!(sql_literal("DEADBEEF"), "'\\xDEADBEEF'");
    }
}
