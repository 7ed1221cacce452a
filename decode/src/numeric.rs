//! NUMERIC/MONEY decode: base64 carries a big-endian two's-complement
//! integer; the destination scale says where the decimal point goes.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use common::err::CdcError;
use num_bigint::BigInt;

/// MONEY has no explicit scale in the change event; Postgres' own money
/// type is fixed at 4 fractional digits.
pub const MONEY_IMPLICIT_SCALE: i32 = 4;

/// Decodes a base64 big-endian two's-complement integer and places the
/// decimal point `scale` digits from the right, left-padding with zeros
/// when the unscaled magnitude has fewer digits than the scale.
pub fn decode_scaled(raw_base64: &str, scale: i32) -> Result<String, CdcError> {
    let bytes = BASE64
        .decode(raw_base64.as_bytes())
        .map_err(|e| CdcError::Decode(format!("numeric base64 decode failed: {e}")))?;
    if bytes.is_empty() {
        return Err(CdcError::Decode("numeric payload is empty".into()));
    }
    let value = BigInt::from_signed_bytes_be(&bytes);
    Ok(place_decimal_point(&value, scale))
}

fn place_decimal_point(value: &BigInt, scale: i32) -> String {
    if scale <= 0 {
        return value.to_string();
    }
    let scale = scale as usize;
    let negative = value.sign() == num_bigint::Sign::Minus;
    let digits = value.magnitude().to_str_radix(10);
    let padded = if digits.len() <= scale {
        format!("{}{}", "0".repeat(scale - digits.len() + 1), digits)
    } else {
        digits
    };
    let split_at = padded.len() - scale;
    let (whole, frac) = padded.split_at(split_at);
    let sign = if negative { "-" } else { "" };
    format!("{sign}{whole}.{frac}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn b64(bytes: &[u8]) -> String {
        BASE64.encode(bytes)
    }

    #[test]
    fn decodes_positive_value_with_scale() {
        // 123456 encoded big-endian, scale 2 -> "1234.56"
        let raw = b64(&1_234_56i32.to_be_bytes());
        assert_eq!(decode_scaled(&raw, 2).unwrap(), "1234.56");
    }

    #[test]
    fn decodes_negative_value_with_scale() {
        let raw = b64(&(-42i16).to_be_bytes());
        assert_eq!(decode_scaled(&raw, 2).unwrap(), "-0.42");
    }

    #[test]
    fn zero_scale_is_a_plain_integer() {
        let raw = b64(&7i8.to_be_bytes());
        assert_eq!(decode_scaled(&raw, 0).unwrap(), "7");
    }

    #[test]
    fn money_without_explicit_scale_defaults_to_four() {
        let raw = b64(&199_900i32.to_be_bytes());
        assert_eq!(decode_scaled(&raw, MONEY_IMPLICIT_SCALE).unwrap(), "19.9900");
    }

    #[test]
    fn round_trips_through_repeated_decode() {
        let raw = b64(&500i32.to_be_bytes());
        let once = decode_scaled(&raw, 2).unwrap();
        let twice = decode_scaled(&raw, 2).unwrap();
        assert_eq!(once, twice);
        assert_eq!(once, "5.00");
    }
}
