//! Host values, raw column values and bind values
//!
//! - [`RawValue`]: what the transport hands over for a column on read
//! - [`HostValue`]: what the application sees
//! - [`BindValue`]: what the transport receives on write

use std::fmt;

use bigdecimal::BigDecimal;
use bytes::Bytes;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};

use crate::column::LogicalType;
use crate::config::SessionTimeZone;
use crate::constants::OracleType;
use crate::error::{Error, Result};
use crate::lob_channel::LobHandle;
use crate::types::LobValue;

/// A calendar date or a date-time with optional offset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemporalValue {
    /// Calendar date, no time of day or zone
    Date(NaiveDate),
    /// Date and time of day; `None` offset means naive
    DateTime(NaiveDateTime, Option<FixedOffset>),
}

impl TemporalValue {
    /// Create a calendar date
    pub fn ymd(year: i32, month: u32, day: u32) -> Result<Self> {
        NaiveDate::from_ymd_opt(year, month, day)
            .map(TemporalValue::Date)
            .ok_or_else(|| {
                Error::DataConversionError(format!("invalid date {}-{}-{}", year, month, day))
            })
    }

    /// Create a naive date-time
    pub fn naive(value: NaiveDateTime) -> Self {
        TemporalValue::DateTime(value, None)
    }

    /// Create a date-time carrying an explicit offset
    pub fn with_offset(value: DateTime<FixedOffset>) -> Self {
        TemporalValue::DateTime(value.naive_local(), Some(*value.offset()))
    }

    /// Logical type of this value
    pub fn logical_type(&self) -> LogicalType {
        match self {
            TemporalValue::Date(_) => LogicalType::Date,
            TemporalValue::DateTime(..) => LogicalType::DateTime,
        }
    }

    /// Calendar date part
    pub fn date(&self) -> NaiveDate {
        match self {
            TemporalValue::Date(d) => *d,
            TemporalValue::DateTime(dt, _) => dt.date(),
        }
    }

    /// Wall-clock date-time; dates become midnight
    pub fn naive_datetime(&self) -> NaiveDateTime {
        match self {
            TemporalValue::Date(d) => d.and_time(NaiveTime::MIN),
            TemporalValue::DateTime(dt, _) => *dt,
        }
    }

    /// Explicit offset, if any
    pub fn offset(&self) -> Option<FixedOffset> {
        match self {
            TemporalValue::Date(_) => None,
            TemporalValue::DateTime(_, offset) => *offset,
        }
    }

    /// Drop the time of day and any offset
    pub fn truncate_to_date(&self) -> Self {
        TemporalValue::Date(self.date())
    }

    /// The instant this value denotes
    ///
    /// Values with an explicit offset denote a fixed instant; naive values and
    /// dates are anchored in `zone`.
    pub fn instant(&self, zone: SessionTimeZone) -> Result<DateTime<FixedOffset>> {
        match self.offset() {
            Some(offset) => offset
                .from_local_datetime(&self.naive_datetime())
                .single()
                .ok_or_else(|| {
                    Error::DataConversionError(format!("{} has no single instant", self))
                }),
            None => zone.anchor(&self.naive_datetime()),
        }
    }
}

impl fmt::Display for TemporalValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemporalValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            TemporalValue::DateTime(dt, offset) => {
                write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S%.f"))?;
                if let Some(offset) = offset {
                    write!(f, "{}", offset)?;
                }
                Ok(())
            }
        }
    }
}

impl From<NaiveDate> for TemporalValue {
    fn from(v: NaiveDate) -> Self {
        TemporalValue::Date(v)
    }
}

impl From<NaiveDateTime> for TemporalValue {
    fn from(v: NaiveDateTime) -> Self {
        TemporalValue::naive(v)
    }
}

impl From<DateTime<FixedOffset>> for TemporalValue {
    fn from(v: DateTime<FixedOffset>) -> Self {
        TemporalValue::with_offset(v)
    }
}

/// Host-level type classification of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostType {
    /// Calendar date
    Date,
    /// Date-time
    DateTime,
    /// 64-bit integer
    Integer,
    /// Arbitrary precision decimal
    Decimal,
    /// Binary floating point
    Float,
    /// Binary content
    Binary,
    /// Character content
    Text,
}

impl fmt::Display for HostType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HostType::Date => "date",
            HostType::DateTime => "datetime",
            HostType::Integer => "integer",
            HostType::Decimal => "decimal",
            HostType::Float => "float",
            HostType::Binary => "binary",
            HostType::Text => "text",
        };
        write!(f, "{}", name)
    }
}

/// A value as the application sees it
#[derive(Debug, Clone, PartialEq)]
pub enum HostValue {
    /// NULL value
    Null,
    /// Character data (VARCHAR2, inline CLOB)
    Text(String),
    /// Binary data (inline BLOB)
    Bytes(Bytes),
    /// Integer value (NUMBER(p,0) that fits in i64)
    Integer(i64),
    /// Exact decimal value (NUMBER)
    Decimal(BigDecimal),
    /// Floating point value (BINARY_FLOAT, BINARY_DOUBLE)
    Float(f64),
    /// Date or date-time value
    Temporal(TemporalValue),
    /// LOB whose content must be read through a LOB channel
    Lob(LobHandle),
}

impl HostValue {
    /// Check if this value is NULL
    pub fn is_null(&self) -> bool {
        matches!(self, HostValue::Null)
    }

    /// Try to get as a string reference
    pub fn as_str(&self) -> Option<&str> {
        match self {
            HostValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get as bytes
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            HostValue::Bytes(b) => Some(b),
            HostValue::Text(s) => Some(s.as_bytes()),
            _ => None,
        }
    }

    /// Try to get as an integer
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            HostValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Try to get as a float
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            HostValue::Float(f) => Some(*f),
            HostValue::Integer(i) => Some(*i as f64),
            HostValue::Decimal(d) => d.to_string().parse().ok(),
            _ => None,
        }
    }

    /// Try to get as a decimal
    pub fn as_decimal(&self) -> Option<&BigDecimal> {
        match self {
            HostValue::Decimal(d) => Some(d),
            _ => None,
        }
    }

    /// Try to get as a temporal value
    pub fn as_temporal(&self) -> Option<&TemporalValue> {
        match self {
            HostValue::Temporal(t) => Some(t),
            _ => None,
        }
    }

    /// Try to get as a LOB handle
    pub fn as_lob(&self) -> Option<&LobHandle> {
        match self {
            HostValue::Lob(handle) => Some(handle),
            _ => None,
        }
    }
}

impl From<i64> for HostValue {
    fn from(v: i64) -> Self {
        HostValue::Integer(v)
    }
}

impl From<i32> for HostValue {
    fn from(v: i32) -> Self {
        HostValue::Integer(v as i64)
    }
}

impl From<f64> for HostValue {
    fn from(v: f64) -> Self {
        HostValue::Float(v)
    }
}

impl From<f32> for HostValue {
    fn from(v: f32) -> Self {
        HostValue::Float(v as f64)
    }
}

impl From<BigDecimal> for HostValue {
    fn from(v: BigDecimal) -> Self {
        HostValue::Decimal(v)
    }
}

impl From<&str> for HostValue {
    fn from(v: &str) -> Self {
        HostValue::Text(v.to_string())
    }
}

impl From<String> for HostValue {
    fn from(v: String) -> Self {
        HostValue::Text(v)
    }
}

impl From<Vec<u8>> for HostValue {
    fn from(v: Vec<u8>) -> Self {
        HostValue::Bytes(Bytes::from(v))
    }
}

impl From<&[u8]> for HostValue {
    fn from(v: &[u8]) -> Self {
        HostValue::Bytes(Bytes::copy_from_slice(v))
    }
}

impl From<Bytes> for HostValue {
    fn from(v: Bytes) -> Self {
        HostValue::Bytes(v)
    }
}

impl From<TemporalValue> for HostValue {
    fn from(v: TemporalValue) -> Self {
        HostValue::Temporal(v)
    }
}

impl From<NaiveDate> for HostValue {
    fn from(v: NaiveDate) -> Self {
        HostValue::Temporal(v.into())
    }
}

impl From<NaiveDateTime> for HostValue {
    fn from(v: NaiveDateTime) -> Self {
        HostValue::Temporal(v.into())
    }
}

impl From<DateTime<FixedOffset>> for HostValue {
    fn from(v: DateTime<FixedOffset>) -> Self {
        HostValue::Temporal(v.into())
    }
}

impl<T: Into<HostValue>> From<Option<T>> for HostValue {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(inner) => inner.into(),
            None => HostValue::Null,
        }
    }
}

impl fmt::Display for HostValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostValue::Null => write!(f, "NULL"),
            HostValue::Text(s) => write!(f, "{}", s),
            HostValue::Bytes(b) => write!(f, "<{} bytes>", b.len()),
            HostValue::Integer(i) => write!(f, "{}", i),
            HostValue::Decimal(d) => write!(f, "{}", d),
            HostValue::Float(fl) => write!(f, "{}", fl),
            HostValue::Temporal(t) => write!(f, "{}", t),
            HostValue::Lob(handle) => write!(f, "{}", handle),
        }
    }
}

/// A column value as delivered by the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawValue {
    /// SQL NULL
    Null,
    /// Wire-encoded scalar
    Data(Bytes),
    /// LOB column value
    Lob(LobValue),
}

impl RawValue {
    /// Check if this value is NULL
    pub fn is_null(&self) -> bool {
        matches!(self, RawValue::Null | RawValue::Lob(LobValue::Null))
    }
}

impl From<&[u8]> for RawValue {
    fn from(v: &[u8]) -> Self {
        RawValue::Data(Bytes::copy_from_slice(v))
    }
}

impl From<Vec<u8>> for RawValue {
    fn from(v: Vec<u8>) -> Self {
        RawValue::Data(Bytes::from(v))
    }
}

/// Payload of a bind value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindPayload {
    /// Bind NULL
    Null,
    /// Wire-encoded scalar, bound inline
    Data(Bytes),
    /// LOB content, streamed through a LOB channel after the row is written
    Stream(Bytes),
}

/// A value ready for protocol encoding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindValue {
    /// Oracle type to bind as
    pub oracle_type: OracleType,
    /// Bound content
    pub payload: BindPayload,
}

impl BindValue {
    /// Bind NULL as the given type
    pub fn null(oracle_type: OracleType) -> Self {
        Self {
            oracle_type,
            payload: BindPayload::Null,
        }
    }

    /// Bind a wire-encoded scalar
    pub fn data(oracle_type: OracleType, data: impl Into<Bytes>) -> Self {
        Self {
            oracle_type,
            payload: BindPayload::Data(data.into()),
        }
    }

    /// Bind LOB content to be streamed
    pub fn stream(oracle_type: OracleType, content: impl Into<Bytes>) -> Self {
        Self {
            oracle_type,
            payload: BindPayload::Stream(content.into()),
        }
    }

    /// Check if this binds NULL
    pub fn is_null(&self) -> bool {
        matches!(self.payload, BindPayload::Null)
    }

    /// Wire bytes of a scalar bind
    pub fn wire_bytes(&self) -> Option<&Bytes> {
        match &self.payload {
            BindPayload::Data(data) => Some(data),
            _ => None,
        }
    }

    /// The value a transport would report when reading this bind back
    ///
    /// Streamed LOB content comes back as inline (prefetched) data.
    pub fn into_raw(self) -> RawValue {
        match self.payload {
            BindPayload::Null if self.oracle_type.is_lob() => RawValue::Lob(LobValue::Null),
            BindPayload::Null => RawValue::Null,
            BindPayload::Data(data) => RawValue::Data(data),
            BindPayload::Stream(content) => RawValue::Lob(LobValue::inline(content)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temporal_accessors() {
        let date = TemporalValue::ymd(2008, 6, 28).unwrap();
        assert_eq!(date.logical_type(), LogicalType::Date);
        assert_eq!(date.naive_datetime().to_string(), "2008-06-28 00:00:00");
        assert_eq!(date.offset(), None);
        assert!(TemporalValue::ymd(2008, 2, 30).is_err());
    }

    #[test]
    fn test_temporal_display() {
        let offset = FixedOffset::east_opt(5 * 3600).unwrap();
        let dt = offset
            .with_ymd_and_hms(2008, 6, 28, 13, 34, 33)
            .unwrap();
        assert_eq!(
            TemporalValue::with_offset(dt).to_string(),
            "2008-06-28 13:34:33+05:00"
        );
        assert_eq!(TemporalValue::ymd(2008, 6, 28).unwrap().to_string(), "2008-06-28");
    }

    #[test]
    fn test_instant_ignores_zone_when_offset_is_explicit() {
        let offset = FixedOffset::east_opt(5 * 3600).unwrap();
        let dt = offset.with_ymd_and_hms(2008, 6, 28, 13, 34, 33).unwrap();
        let value = TemporalValue::with_offset(dt);
        assert_eq!(value.instant(SessionTimeZone::Utc).unwrap(), dt);
        assert_eq!(value.instant(SessionTimeZone::Local).unwrap(), dt);
    }

    #[test]
    fn test_host_value_conversions() {
        assert_eq!(HostValue::from(42), HostValue::Integer(42));
        assert_eq!(HostValue::from(None::<i64>), HostValue::Null);
        assert_eq!(HostValue::from("x").as_str(), Some("x"));
        let date = NaiveDate::from_ymd_opt(2008, 6, 28).unwrap();
        assert_eq!(
            HostValue::from(date),
            HostValue::Temporal(TemporalValue::Date(date))
        );
        assert_eq!(HostValue::Float(4.5).to_string(), "4.5");
    }

    #[test]
    fn test_bind_into_raw() {
        assert_eq!(
            BindValue::null(OracleType::Blob).into_raw(),
            RawValue::Lob(LobValue::Null)
        );
        assert_eq!(BindValue::null(OracleType::Date).into_raw(), RawValue::Null);
        assert_eq!(
            BindValue::stream(OracleType::Blob, Bytes::new()).into_raw(),
            RawValue::Lob(LobValue::Empty)
        );
        assert!(RawValue::Lob(LobValue::Null).is_null());
    }
}
