//! Oracle DATE and TIMESTAMP encoding and decoding
//!
//! Oracle DATE format (7 bytes):
//! - Byte 0: Century (value + 100)
//! - Byte 1: Year in century (value + 100)
//! - Byte 2: Month (1-12)
//! - Byte 3: Day (1-31)
//! - Byte 4: Hour + 1 (1-24)
//! - Byte 5: Minute + 1 (1-60)
//! - Byte 6: Second + 1 (1-60)
//!
//! Oracle TIMESTAMP adds (4 more bytes):
//! - Bytes 7-10: Fractional seconds (nanoseconds as big-endian u32)
//!
//! Oracle TIMESTAMP WITH TIME ZONE adds (2 more bytes):
//! - Byte 11: Time zone hour offset + 20
//! - Byte 12: Time zone minute offset + 60
//!
//! For TIMESTAMP WITH TIME ZONE the date and time bytes hold the UTC instant;
//! the offset bytes say how to present it.

use chrono::{
    DateTime, Datelike, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Timelike,
};

use crate::constants::length;
use crate::error::{Error, Result};

/// Timezone hour offset constant
const TZ_HOUR_OFFSET: i32 = 20;
/// Timezone minute offset constant
const TZ_MINUTE_OFFSET: i32 = 60;
/// Flag indicating named timezone (not supported)
const HAS_REGION_ID: u8 = 0x80;

/// Earliest year Oracle accepts (4712 BC)
const MIN_YEAR: i32 = -4712;
/// Latest year Oracle accepts
const MAX_YEAR: i32 = 9999;

fn encode_date_part(value: &NaiveDateTime) -> Result<[u8; length::DATE]> {
    let year = value.year();
    if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
        return Err(Error::DataConversionError(format!(
            "year {} is outside the Oracle DATE range",
            year
        )));
    }

    Ok([
        (year / 100 + 100) as u8,
        (year % 100 + 100) as u8,
        value.month() as u8,
        value.day() as u8,
        value.hour() as u8 + 1,
        value.minute() as u8 + 1,
        value.second() as u8 + 1,
    ])
}

fn decode_date_part(data: &[u8]) -> Result<NaiveDateTime> {
    let year = (data[0] as i32 - 100) * 100 + (data[1] as i32 - 100);
    NaiveDate::from_ymd_opt(year, data[2] as u32, data[3] as u32)
        .and_then(|d| {
            d.and_hms_opt(
                data[4].saturating_sub(1) as u32,
                data[5].saturating_sub(1) as u32,
                data[6].saturating_sub(1) as u32,
            )
        })
        .ok_or_else(|| {
            Error::DataConversionError(format!("invalid Oracle DATE bytes {:02x?}", &data[..7]))
        })
}

/// Encode a value as Oracle DATE (7 bytes)
///
/// Fractional seconds are dropped.
pub fn encode_oracle_date(value: &NaiveDateTime) -> Result<Vec<u8>> {
    Ok(encode_date_part(value)?.to_vec())
}

/// Decode an Oracle DATE from wire format bytes (7 bytes)
pub fn decode_oracle_date(data: &[u8]) -> Result<NaiveDateTime> {
    if data.len() < length::DATE {
        return Err(Error::DataConversionError(format!(
            "Oracle DATE requires 7 bytes, got {}",
            data.len()
        )));
    }
    decode_date_part(data)
}

/// Encode a value as Oracle TIMESTAMP
///
/// Returns 7 bytes when there is no fractional second, 11 bytes otherwise.
/// Precision is kept to the microsecond.
pub fn encode_oracle_timestamp(value: &NaiveDateTime) -> Result<Vec<u8>> {
    let mut result = encode_date_part(value)?.to_vec();
    let nanos = value.nanosecond() / 1000 * 1000;
    if nanos > 0 {
        result.extend_from_slice(&nanos.to_be_bytes());
    }
    Ok(result)
}

/// Decode an Oracle TIMESTAMP (7 or 11 bytes)
pub fn decode_oracle_timestamp(data: &[u8]) -> Result<NaiveDateTime> {
    let date = decode_oracle_date(data)?;
    if data.len() < length::TIMESTAMP {
        return Ok(date);
    }

    let nanos = u32::from_be_bytes([data[7], data[8], data[9], data[10]]);
    date.with_nanosecond(nanos / 1000 * 1000).ok_or_else(|| {
        Error::DataConversionError(format!("invalid fractional seconds {}", nanos))
    })
}

/// Encode a value as Oracle TIMESTAMP WITH TIME ZONE (13 bytes)
pub fn encode_oracle_timestamp_tz(value: &DateTime<FixedOffset>) -> Result<Vec<u8>> {
    let mut result = encode_date_part(&value.naive_utc())?.to_vec();
    let nanos = value.nanosecond() / 1000 * 1000;
    result.extend_from_slice(&nanos.to_be_bytes());

    let offset_minutes = value.offset().local_minus_utc() / 60;
    result.push((offset_minutes / 60 + TZ_HOUR_OFFSET) as u8);
    result.push((offset_minutes % 60 + TZ_MINUTE_OFFSET) as u8);
    Ok(result)
}

/// Decode an Oracle TIMESTAMP WITH TIME ZONE (13 bytes)
///
/// Shorter values are read as UTC.
pub fn decode_oracle_timestamp_tz(data: &[u8]) -> Result<DateTime<FixedOffset>> {
    let utc = decode_oracle_timestamp(data)?;

    let offset_seconds = if data.len() >= length::TIMESTAMP_TZ && data[11] != 0 && data[12] != 0 {
        if data[11] & HAS_REGION_ID != 0 {
            return Err(Error::DataConversionError(
                "Named timezone regions are not supported".to_string(),
            ));
        }
        let hours = data[11] as i32 - TZ_HOUR_OFFSET;
        let minutes = data[12] as i32 - TZ_MINUTE_OFFSET;
        (hours * 60 + minutes) * 60
    } else {
        0
    };

    let offset = FixedOffset::east_opt(offset_seconds).ok_or_else(|| {
        Error::DataConversionError(format!("invalid timezone offset {}s", offset_seconds))
    })?;
    Ok(offset.from_utc_datetime(&utc))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(y: i32, m: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    #[test]
    fn test_decode_date() {
        // 2024-03-15 14:30:45
        let data = vec![
            120, // century: 20 + 100 = 120
            124, // year: 24 + 100 = 124
            3,   // month: 3
            15,  // day: 15
            15,  // hour: 14 + 1 = 15
            31,  // minute: 30 + 1 = 31
            46,  // second: 45 + 1 = 46
        ];

        let date = decode_oracle_date(&data).unwrap();
        assert_eq!(date, dt(2024, 3, 15, 14, 30, 45));
    }

    #[test]
    fn test_encode_date_drops_fraction() {
        let value = dt(2024, 3, 15, 14, 30, 45).with_nanosecond(500_000_000).unwrap();
        let encoded = encode_oracle_date(&value).unwrap();
        assert_eq!(encoded, vec![120, 124, 3, 15, 15, 31, 46]);
        assert_eq!(decode_oracle_date(&encoded).unwrap(), dt(2024, 3, 15, 14, 30, 45));
    }

    #[test]
    fn test_negative_year() {
        // Year -100 (100 BC)
        let data = vec![
            99,  // century: -1 + 100 = 99
            100, // year: 0 + 100 = 100
            1, 1, 1, 1, 1,
        ];

        let date = decode_oracle_date(&data).unwrap();
        assert_eq!(date.year(), -100);
        assert_eq!(encode_oracle_date(&date).unwrap(), data);
    }

    #[test]
    fn test_date_out_of_range() {
        let value = dt(-5000, 1, 1, 0, 0, 0);
        assert!(encode_oracle_date(&value).is_err());
        assert!(decode_oracle_date(&[120, 124, 3]).is_err());
        assert!(decode_oracle_date(&[120, 124, 13, 1, 1, 1, 1]).is_err());
    }

    #[test]
    fn test_timestamp_with_fractional() {
        let value = dt(2024, 3, 15, 14, 30, 45).with_nanosecond(123_456_000).unwrap();
        let encoded = encode_oracle_timestamp(&value).unwrap();
        assert_eq!(encoded.len(), 11);
        assert_eq!(&encoded[7..], &123_456_000u32.to_be_bytes());
        assert_eq!(decode_oracle_timestamp(&encoded).unwrap(), value);
    }

    #[test]
    fn test_timestamp_without_fraction_is_short() {
        let value = dt(2024, 3, 15, 14, 30, 45);
        let encoded = encode_oracle_timestamp(&value).unwrap();
        assert_eq!(encoded.len(), 7);
        assert_eq!(decode_oracle_timestamp(&encoded).unwrap(), value);
    }

    #[test]
    fn test_decode_timestamp_with_timezone() {
        // UTC 2024-03-15 09:00:45 presented at +05:30
        let mut data = vec![120, 124, 3, 15, 10, 1, 46];
        data.extend_from_slice(&[0, 0, 0, 0]); // No fractional seconds
        data.push(25); // tz_hour: 5 + 20 = 25
        data.push(90); // tz_minute: 30 + 60 = 90

        let ts = decode_oracle_timestamp_tz(&data).unwrap();
        assert_eq!(ts.offset().local_minus_utc(), 5 * 3600 + 30 * 60);
        assert_eq!(ts.naive_local(), dt(2024, 3, 15, 14, 30, 45));
    }

    #[test]
    fn test_timestamp_tz_negative_offset_roundtrip() {
        let offset = FixedOffset::west_opt(3 * 3600 + 30 * 60).unwrap();
        let value = offset
            .from_local_datetime(&dt(2008, 6, 28, 13, 34, 33))
            .unwrap();
        let encoded = encode_oracle_timestamp_tz(&value).unwrap();
        assert_eq!(encoded.len(), 13);
        assert_eq!(encoded[11], 17); // -3 + 20
        assert_eq!(encoded[12], 30); // -30 + 60

        let decoded = decode_oracle_timestamp_tz(&encoded).unwrap();
        assert_eq!(decoded, value);
        assert_eq!(decoded.offset(), value.offset());
    }

    #[test]
    fn test_region_timezone_rejected() {
        let mut data = vec![120, 124, 3, 15, 15, 31, 46, 0, 0, 0, 0];
        data.push(HAS_REGION_ID | 0x01);
        data.push(0x10);
        assert!(decode_oracle_timestamp_tz(&data).is_err());
    }
}
