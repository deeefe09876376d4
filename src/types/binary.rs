//! Oracle BINARY_FLOAT and BINARY_DOUBLE encoding and decoding
//!
//! Oracle stores binary floating point numbers in IEEE 754 format with the sign bit
//! manipulated to allow proper sorting:
//!
//! Encoding:
//! - If the sign bit is 0 (positive), set it to 1
//! - If the sign bit is 1 (negative), invert all bytes
//!
//! Decoding:
//! - If the sign bit is 1, clear it (set to 0)
//! - If the sign bit is 0, invert all bytes
//!
//! The data is stored in big-endian format.

use crate::constants::length;
use crate::error::{Error, Result};

const SIGN_32: u32 = 1 << 31;
const SIGN_64: u64 = 1 << 63;

fn fixed<const N: usize>(data: &[u8], type_name: &str) -> Result<[u8; N]> {
    data.get(..N)
        .and_then(|d| d.try_into().ok())
        .ok_or_else(|| {
            Error::DataConversionError(format!(
                "{} requires {} bytes, got {}",
                type_name,
                N,
                data.len()
            ))
        })
}

/// Encode an f32 to Oracle BINARY_FLOAT wire format (4 bytes)
pub fn encode_binary_float(value: f32) -> [u8; length::BINARY_FLOAT] {
    let bits = value.to_bits();
    let sortable = if bits & SIGN_32 == 0 { bits | SIGN_32 } else { !bits };
    sortable.to_be_bytes()
}

/// Decode an Oracle BINARY_FLOAT from wire format (4 bytes)
pub fn decode_binary_float(data: &[u8]) -> Result<f32> {
    let sortable = u32::from_be_bytes(fixed(data, "BINARY_FLOAT")?);
    let bits = if sortable & SIGN_32 != 0 {
        sortable & !SIGN_32
    } else {
        !sortable
    };
    Ok(f32::from_bits(bits))
}

/// Encode an f64 to Oracle BINARY_DOUBLE wire format (8 bytes)
pub fn encode_binary_double(value: f64) -> [u8; length::BINARY_DOUBLE] {
    let bits = value.to_bits();
    let sortable = if bits & SIGN_64 == 0 { bits | SIGN_64 } else { !bits };
    sortable.to_be_bytes()
}

/// Decode an Oracle BINARY_DOUBLE from wire format (8 bytes)
pub fn decode_binary_double(data: &[u8]) -> Result<f64> {
    let sortable = u64::from_be_bytes(fixed(data, "BINARY_DOUBLE")?);
    let bits = if sortable & SIGN_64 != 0 {
        sortable & !SIGN_64
    } else {
        !sortable
    };
    Ok(f64::from_bits(bits))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binary_float_positive() {
        let encoded = encode_binary_float(1.0);
        // 1.0f32 = 0x3f800000, sign bit set for sorting
        assert_eq!(encoded, [0xbf, 0x80, 0x00, 0x00]);
        assert_eq!(decode_binary_float(&encoded).unwrap(), 1.0);
    }

    #[test]
    fn test_binary_float_negative() {
        let encoded = encode_binary_float(-1.0);
        // -1.0f32 = 0xbf800000, all bytes inverted
        assert_eq!(encoded, [0x40, 0x7f, 0xff, 0xff]);
        assert_eq!(decode_binary_float(&encoded).unwrap(), -1.0);
    }

    #[test]
    fn test_binary_float_sort_order() {
        let values = [-100.5f32, -1.0, -0.25, 0.0, 0.25, 1.0, 4.4, 100.5];
        let encoded: Vec<_> = values.iter().map(|v| encode_binary_float(*v)).collect();
        assert!(encoded.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_binary_double_roundtrip() {
        for value in [0.0, 4.4, -4.4, f64::MAX, f64::MIN_POSITIVE, -1e-300] {
            let encoded = encode_binary_double(value);
            assert_eq!(decode_binary_double(&encoded).unwrap(), value);
        }
    }

    #[test]
    fn test_short_input_is_an_error() {
        assert!(decode_binary_float(&[0xbf, 0x80]).is_err());
        assert!(decode_binary_double(&[0; 4]).is_err());
    }
}
