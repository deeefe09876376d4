//! Oracle NUMBER encoding and decoding
//!
//! Oracle NUMBER is stored in a variable-length format:
//! - First byte: exponent (with sign encoding)
//! - Subsequent bytes: mantissa digits in base-100
//!
//! For positive numbers: exponent byte has high bit set, mantissa bytes are value + 1
//! For negative numbers: exponent byte is inverted, mantissa bytes are 101 - value,
//!                       and a trailing 102 byte is added (if not at max digits)

use bigdecimal::num_bigint::{BigInt, Sign};
use bigdecimal::BigDecimal;

use crate::constants::length;
use crate::error::{Error, Result};

/// Maximum number of decimal digits in an Oracle NUMBER mantissa
const MAX_DIGITS: usize = 40;

/// Maximum number of base-100 mantissa bytes
const MAX_MANTISSA_BYTES: usize = MAX_DIGITS / 2;

/// Terminator byte for negative numbers shorter than the maximum length
const NEGATIVE_TERMINATOR: u8 = 102;

/// Encoded zero
const ZERO: u8 = 0x80;

/// Encode a decimal to Oracle NUMBER wire format
pub fn encode_oracle_number(value: &BigDecimal) -> Result<Vec<u8>> {
    let (int, scale) = value.as_bigint_and_exponent();
    let is_negative = int.sign() == Sign::Minus;

    let mut digits: Vec<u8> = int
        .magnitude()
        .to_string()
        .bytes()
        .map(|b| b - b'0')
        .collect();

    // Strip trailing zeros, moving them into the exponent
    let mut scale = scale;
    while digits.len() > 1 && digits[digits.len() - 1] == 0 {
        digits.pop();
        scale -= 1;
    }

    if digits == [0] {
        return Ok(vec![ZERO]);
    }

    // Number of digits before the decimal point
    let mut decimal_point_index = digits.len() as i64 - scale;

    if digits.len() > MAX_DIGITS || decimal_point_index > 126 || decimal_point_index < -129 {
        return Err(Error::DataConversionError(format!(
            "{} is out of range for Oracle NUMBER",
            value
        )));
    }

    // Base-100 pairs must line up with the decimal point
    if decimal_point_index.rem_euclid(2) == 1 {
        digits.insert(0, 0);
        decimal_point_index += 1;
    }
    if digits.len() % 2 == 1 {
        digits.push(0);
    }
    if digits.len() / 2 > MAX_MANTISSA_BYTES {
        return Err(Error::DataConversionError(format!(
            "{} has too many significant digits for Oracle NUMBER",
            value
        )));
    }

    let mut result = Vec::with_capacity(digits.len() / 2 + 2);

    // Encode exponent
    let exponent_byte = (decimal_point_index / 2 + 192) as u8;
    result.push(if is_negative { !exponent_byte } else { exponent_byte });

    // Encode mantissa
    for pair in digits.chunks(2) {
        let pair_value = pair[0] * 10 + pair[1];
        result.push(if is_negative {
            101 - pair_value
        } else {
            pair_value + 1
        });
    }

    if is_negative && result.len() - 1 < MAX_MANTISSA_BYTES {
        result.push(NEGATIVE_TERMINATOR);
    }

    Ok(result)
}

/// Decode an Oracle NUMBER from wire format bytes
pub fn decode_oracle_number(data: &[u8]) -> Result<BigDecimal> {
    let (&exponent_byte, mantissa) = data.split_first().ok_or_else(|| {
        Error::DataConversionError("Empty data for Oracle NUMBER".to_string())
    })?;
    if data.len() > length::NUMBER {
        return Err(Error::DataConversionError(format!(
            "Oracle NUMBER of {} bytes exceeds the maximum of {}",
            data.len(),
            length::NUMBER
        )));
    }

    let is_positive = (exponent_byte & 0x80) != 0;

    // Special case: single byte means zero (positive) or -1e126 (negative)
    if mantissa.is_empty() {
        return Ok(if is_positive {
            BigDecimal::from(0)
        } else {
            BigDecimal::new(BigInt::from(-1), -126)
        });
    }

    // Base-100 exponent of the first mantissa pair
    let exponent = if is_positive {
        exponent_byte as i64 - 193
    } else {
        (!exponent_byte) as i64 - 193
    };

    let mantissa = match mantissa.split_last() {
        Some((&NEGATIVE_TERMINATOR, rest)) if !is_positive => rest,
        _ => mantissa,
    };

    let mut int = BigInt::from(0u32);
    for &byte in mantissa {
        let pair = if is_positive {
            byte.wrapping_sub(1)
        } else {
            101u8.wrapping_sub(byte)
        };
        if pair > 99 {
            return Err(Error::DataConversionError(format!(
                "invalid Oracle NUMBER mantissa byte {:#04x}",
                byte
            )));
        }
        int = int * 100u32 + u32::from(pair);
    }
    if !is_positive {
        int = -int;
    }

    let scale = 2 * (mantissa.len() as i64 - 1 - exponent);
    Ok(BigDecimal::new(int, scale).normalized())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    #[test]
    fn test_decode_zero() {
        assert_eq!(decode_oracle_number(&[0x80]).unwrap(), dec("0"));
    }

    #[test]
    fn test_decode_positive_integer() {
        // exponent=1, digits=[1,23]
        let data = [0xc2, 0x02, 0x18];
        assert_eq!(decode_oracle_number(&data).unwrap(), dec("123"));
    }

    #[test]
    fn test_decode_negative_integer() {
        // ~exponent, 101-digits, 102
        let data = [0x3d, 0x64, 0x4e, 0x66];
        assert_eq!(decode_oracle_number(&data).unwrap(), dec("-123"));
    }

    #[test]
    fn test_decode_decimal() {
        // exponent=0, digits=[1,50]
        let data = [0xc1, 0x02, 0x33];
        assert_eq!(decode_oracle_number(&data).unwrap(), dec("1.5"));
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode_oracle_number(&[]).is_err());
        assert!(decode_oracle_number(&[0xc1, 0xff]).is_err());
        assert!(decode_oracle_number(&[0xc1; 23]).is_err());
    }

    /// Exponent byte: 0xC1 + base-100 exponent for positives, inverted for
    /// negatives. Zero is the single byte 0x80.
    #[test]
    fn test_wire_number_exponent_encoding() {
        assert_eq!(encode_oracle_number(&dec("0")).unwrap(), vec![0x80]);
        assert_eq!(encode_oracle_number(&dec("5")).unwrap(), vec![0xC1, 0x06]);
        assert_eq!(encode_oracle_number(&dec("123")).unwrap(), vec![0xC2, 0x02, 0x18]);
        assert_eq!(
            encode_oracle_number(&dec("-5")).unwrap(),
            vec![0x3E, 0x60, 0x66]
        );
    }

    /// Trailing zeros move into the exponent: 100 is the single pair 01.
    #[test]
    fn test_wire_number_trailing_zeros() {
        assert_eq!(encode_oracle_number(&dec("100")).unwrap(), vec![0xC2, 0x02]);
        assert_eq!(encode_oracle_number(&dec("1234")).unwrap(), vec![0xC2, 13, 35]);
        assert_eq!(encode_oracle_number(&dec("12.3400")).unwrap(), vec![0xC1, 13, 35]);
    }

    #[test]
    fn test_small_fraction() {
        let encoded = encode_oracle_number(&dec("0.05")).unwrap();
        assert_eq!(encoded, vec![0xC0, 0x06]);
        assert_eq!(decode_oracle_number(&encoded).unwrap(), dec("0.05"));
    }

    #[test]
    fn test_roundtrip_various_numbers() {
        for val in [
            "1", "99", "100", "999", "1000", "-1", "-99", "-100", "3.14159", "-0.001",
            "12345678901234567890.123456789", "1.5e10", "-7.25e-8",
        ] {
            let encoded = encode_oracle_number(&dec(val)).unwrap();
            let decoded = decode_oracle_number(&encoded).unwrap();
            assert_eq!(decoded, dec(val), "Roundtrip failed for {}", val);
        }
    }

    #[test]
    fn test_too_many_digits() {
        let digits = "1".repeat(41);
        assert!(encode_oracle_number(&dec(&digits)).is_err());
        assert!(encode_oracle_number(&dec("1e200")).is_err());
    }
}
