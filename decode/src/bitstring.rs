//! BIT/VARBIT decode: base64 bytes are reversed to little-endian bit
//! order, rendered 8 bits per byte, and left-zero-padded to the column's
//! typemod width.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use common::err::CdcError;

/// Decodes a base64 bit payload into a string of `'0'`/`'1'` characters,
/// left-padded with zeros to at least `typemod` digits.
pub fn decode_bits(raw_base64: &str, typemod: i32) -> Result<String, CdcError> {
    let mut bytes = BASE64
        .decode(raw_base64.as_bytes())
        .map_err(|e| CdcError::Decode(format!("bit base64 decode failed: {e}")))?;
    bytes.reverse();

    let mut bits = String::with_capacity(bytes.len() * 8);
    for byte in &bytes {
        bits.push_str(&format!("{byte:08b}"));
    }

    let trimmed = bits.trim_start_matches('0');
    let trimmed = if trimmed.is_empty() { "0" } else { trimmed };

    let width = typemod.max(1) as usize;
    if trimmed.len() >= width {
        Ok(trimmed.to_string())
    } else {
        Ok(format!("{}{}", "0".repeat(width - trimmed.len()), trimmed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn b64(bytes: &[u8]) -> String {
        BASE64.encode(bytes)
    }

    #[test]
    fn bit_one_decodes_to_single_digit() {
        // BIT(1) value 1 is encoded as a single 0x01 byte.
        let raw = b64(&[0x01]);
        assert_eq!(decode_bits(&raw, 1).unwrap(), "1");
    }

    #[test]
    fn left_pads_to_typemod_width() {
        let raw = b64(&[0x01]);
        assert_eq!(decode_bits(&raw, 8).unwrap(), "00000001");
    }

    #[test]
    fn decode_is_idempotent_on_its_own_output_bytes() {
        let raw = b64(&[0b1011_0010, 0x00]);
        let once = decode_bits(&raw, 16).unwrap();
        let twice = decode_bits(&raw, 16).unwrap();
        assert_eq!(once, twice);
    }
}
