//! DATE, TIMESTAMP and TIMESTAMP WITH TIME ZONE coercion
//!
//! Reads produce a [`TemporalValue`] shaped by the column type and, for DATE
//! columns only, the attribute's logical type override. Writes accept either a
//! temporal value or a string, which is parsed with the override-aware shape.
//!
//! Zone handling on write:
//! - naive values keep their wall-clock digits (they are anchored in the
//!   session zone)
//! - values with an explicit offset are converted into the session zone, so
//!   the stored digits denote the same instant
//! - TIMESTAMP WITH TIME ZONE additionally stores the session offset

use std::sync::Arc;

use chrono::{DateTime, FixedOffset, NaiveDateTime};

use crate::column::{ColumnDescriptor, DatabaseType, LogicalType};
use crate::config::{CoercionConfig, DateOverrideZone, FormatPolicy, SessionTimeZone};
use crate::constants::OracleType;
use crate::error::{Error, Result};
use crate::parser;
use crate::types::{
    decode_oracle_date, decode_oracle_timestamp, decode_oracle_timestamp_tz, encode_oracle_date,
    encode_oracle_timestamp, encode_oracle_timestamp_tz,
};
use crate::value::{BindValue, HostType, HostValue, RawValue, TemporalValue};

use super::schema_mismatch;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TemporalColumn {
    Date,
    Timestamp,
    TimestampTz,
}

impl TemporalColumn {
    fn of(column: &ColumnDescriptor) -> Result<Self> {
        match column.data_type {
            DatabaseType::Date => Ok(TemporalColumn::Date),
            DatabaseType::Timestamp => Ok(TemporalColumn::Timestamp),
            DatabaseType::TimestampTz => Ok(TemporalColumn::TimestampTz),
            _ => Err(schema_mismatch(column)),
        }
    }

    fn oracle_type(self) -> OracleType {
        match self {
            TemporalColumn::Date => OracleType::Date,
            TemporalColumn::Timestamp => OracleType::Timestamp,
            TemporalColumn::TimestampTz => OracleType::TimestampTz,
        }
    }
}

/// Coercer for date and time columns
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemporalCoercer {
    date_override_zone: DateOverrideZone,
    policy: Option<Arc<FormatPolicy>>,
}

impl TemporalCoercer {
    /// Create a coercer using the process-wide format policy
    pub fn new(config: &CoercionConfig) -> Self {
        Self {
            date_override_zone: config.date_override_zone,
            policy: None,
        }
    }

    /// Use an explicit format policy instead of the process-wide one
    pub fn with_policy(mut self, policy: Arc<FormatPolicy>) -> Self {
        self.policy = Some(policy);
        self
    }

    fn policy(&self) -> &FormatPolicy {
        match &self.policy {
            Some(policy) => policy,
            None => FormatPolicy::global(),
        }
    }

    /// Logical type a value of this column has after coercion
    ///
    /// Only DATE columns honor the override; TIMESTAMP columns always
    /// produce date-times.
    pub fn effective_type(
        &self,
        column: &ColumnDescriptor,
        override_type: Option<LogicalType>,
    ) -> Result<LogicalType> {
        Ok(match TemporalColumn::of(column)? {
            TemporalColumn::Date => override_type.unwrap_or(LogicalType::Date),
            TemporalColumn::Timestamp | TemporalColumn::TimestampTz => LogicalType::DateTime,
        })
    }

    /// Host type reported for the column
    pub fn host_type(
        &self,
        column: &ColumnDescriptor,
        override_type: Option<LogicalType>,
    ) -> Result<HostType> {
        Ok(match self.effective_type(column, override_type)? {
            LogicalType::Date => HostType::Date,
            LogicalType::DateTime => HostType::DateTime,
        })
    }

    /// Convert a stored value into a host value; NULL gives `None`
    pub fn to_host(
        &self,
        raw: &RawValue,
        column: &ColumnDescriptor,
        override_type: Option<LogicalType>,
    ) -> Result<Option<TemporalValue>> {
        let kind = TemporalColumn::of(column)?;
        let data = match raw {
            RawValue::Null => return Ok(None),
            RawValue::Data(data) => data,
            RawValue::Lob(_) => {
                return Err(Error::DataConversionError(format!(
                    "column {}: LOB value delivered for {}",
                    column.name, column.data_type
                )))
            }
        };

        let value = match kind {
            TemporalColumn::Date => {
                let stored = decode_oracle_date(data)?;
                match override_type {
                    Some(LogicalType::DateTime) => TemporalValue::naive(stored),
                    _ => TemporalValue::Date(stored.date()),
                }
            }
            TemporalColumn::Timestamp => TemporalValue::naive(decode_oracle_timestamp(data)?),
            TemporalColumn::TimestampTz => {
                TemporalValue::with_offset(decode_oracle_timestamp_tz(data)?)
            }
        };
        Ok(Some(value))
    }

    /// Convert a host value into a bind value for the column
    ///
    /// Accepts `HostValue::Temporal`, `HostValue::Text` (parsed with the
    /// effective logical type) and `HostValue::Null`.
    pub fn to_storage(
        &self,
        value: &HostValue,
        column: &ColumnDescriptor,
        override_type: Option<LogicalType>,
        session: SessionTimeZone,
    ) -> Result<BindValue> {
        let kind = TemporalColumn::of(column)?;
        let value = match value {
            HostValue::Null => return Ok(BindValue::null(kind.oracle_type())),
            HostValue::Temporal(v) => *v,
            HostValue::Text(s) => {
                let expected = self.effective_type(column, override_type)?;
                parser::parse(s, expected, self.policy())?
            }
            other => {
                return Err(Error::DataConversionError(format!(
                    "column {}: cannot store {:?} as {}",
                    column.name, other, column.data_type
                )))
            }
        };

        let wall_clock = kind == TemporalColumn::Date
            && override_type == Some(LogicalType::DateTime)
            && self.date_override_zone == DateOverrideZone::WallClock;

        let encoded = match kind {
            TemporalColumn::Date => {
                encode_oracle_date(&storage_digits(&value, session, wall_clock)?)?
            }
            TemporalColumn::Timestamp => {
                encode_oracle_timestamp(&storage_digits(&value, session, false)?)?
            }
            TemporalColumn::TimestampTz => {
                encode_oracle_timestamp_tz(&session_instant(&value, session)?)?
            }
        };

        tracing::trace!(
            column = %column.name,
            value = %value,
            session = %session,
            "Coerced temporal value for storage"
        );
        Ok(BindValue::data(kind.oracle_type(), encoded))
    }
}

/// Wall-clock digits to store for a column without a zone
fn storage_digits(
    value: &TemporalValue,
    session: SessionTimeZone,
    wall_clock: bool,
) -> Result<NaiveDateTime> {
    match value {
        TemporalValue::Date(_) | TemporalValue::DateTime(_, None) => Ok(value.naive_datetime()),
        TemporalValue::DateTime(digits, Some(_)) if wall_clock => Ok(*digits),
        TemporalValue::DateTime(_, Some(_)) => {
            Ok(session_instant(value, session)?.naive_local())
        }
    }
}

/// The value expressed in the session zone, offset included
fn session_instant(
    value: &TemporalValue,
    session: SessionTimeZone,
) -> Result<DateTime<FixedOffset>> {
    match value.offset() {
        Some(_) => Ok(session.convert(&value.instant(session)?)),
        None => session.anchor(&value.naive_datetime()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};

    fn column(data_type: DatabaseType) -> ColumnDescriptor {
        ColumnDescriptor::new("created_at", data_type, true)
    }

    fn roundtrip(
        coercer: &TemporalCoercer,
        value: HostValue,
        col: &ColumnDescriptor,
        override_type: Option<LogicalType>,
    ) -> TemporalValue {
        let bind = coercer
            .to_storage(&value, col, override_type, SessionTimeZone::Utc)
            .unwrap();
        coercer
            .to_host(&bind.into_raw(), col, override_type)
            .unwrap()
            .unwrap()
    }

    fn dt(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2008, 6, 28)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn test_date_column_truncates_time() {
        let coercer = TemporalCoercer::default();
        let col = column(DatabaseType::Date);
        let read = roundtrip(&coercer, dt(13, 34, 33).into(), &col, None);
        assert_eq!(read, TemporalValue::ymd(2008, 6, 28).unwrap());
    }

    #[test]
    fn test_date_column_with_override_keeps_time() {
        let coercer = TemporalCoercer::default();
        let col = column(DatabaseType::Date);
        let read = roundtrip(
            &coercer,
            dt(13, 34, 33).into(),
            &col,
            Some(LogicalType::DateTime),
        );
        assert_eq!(read, TemporalValue::naive(dt(13, 34, 33)));
    }

    #[test]
    fn test_timestamp_ignores_override() {
        let coercer = TemporalCoercer::default();
        let col = column(DatabaseType::Timestamp);
        let read = roundtrip(&coercer, dt(13, 34, 33).into(), &col, Some(LogicalType::Date));
        assert_eq!(read, TemporalValue::naive(dt(13, 34, 33)));
        assert_eq!(
            coercer.host_type(&col, Some(LogicalType::Date)).unwrap(),
            HostType::DateTime
        );
    }

    #[test]
    fn test_date_drops_fraction_timestamp_keeps_micros() {
        let coercer = TemporalCoercer::default();
        let precise = dt(13, 34, 33) + chrono::Duration::microseconds(123_456);

        let date_col = column(DatabaseType::Date);
        let read = roundtrip(
            &coercer,
            precise.into(),
            &date_col,
            Some(LogicalType::DateTime),
        );
        assert_eq!(read, TemporalValue::naive(dt(13, 34, 33)));

        let ts_col = column(DatabaseType::Timestamp);
        assert_eq!(
            roundtrip(&coercer, precise.into(), &ts_col, None),
            TemporalValue::naive(precise)
        );
    }

    #[test]
    fn test_offset_value_converted_to_session() {
        let coercer = TemporalCoercer::default();
        let col = column(DatabaseType::Timestamp);
        let plus_five = FixedOffset::east_opt(5 * 3600)
            .unwrap()
            .with_ymd_and_hms(2008, 6, 28, 13, 34, 33)
            .unwrap();

        let read = roundtrip(&coercer, plus_five.into(), &col, None);
        assert_eq!(read, TemporalValue::naive(dt(8, 34, 33)));
    }

    #[test]
    fn test_wall_clock_date_override_drops_offset() {
        let config = CoercionConfig::new().date_override_zone(DateOverrideZone::WallClock);
        let coercer = TemporalCoercer::new(&config);
        let col = column(DatabaseType::Date);
        let plus_five = FixedOffset::east_opt(5 * 3600)
            .unwrap()
            .with_ymd_and_hms(2008, 6, 28, 13, 34, 33)
            .unwrap();

        let read = roundtrip(
            &coercer,
            plus_five.into(),
            &col,
            Some(LogicalType::DateTime),
        );
        assert_eq!(read, TemporalValue::naive(dt(13, 34, 33)));
    }

    #[test]
    fn test_timestamp_tz_binds_session_offset() {
        let coercer = TemporalCoercer::default();
        let col = column(DatabaseType::TimestampTz);
        let read = roundtrip(&coercer, dt(13, 34, 33).into(), &col, None);
        let utc = FixedOffset::east_opt(0).unwrap();
        assert_eq!(read, TemporalValue::DateTime(dt(13, 34, 33), Some(utc)));
    }

    #[test]
    fn test_string_parsed_with_effective_type() {
        let coercer = TemporalCoercer::default();
        let col = column(DatabaseType::Date);
        let read = roundtrip(
            &coercer,
            "2008-06-28".into(),
            &col,
            Some(LogicalType::DateTime),
        );
        assert_eq!(read, TemporalValue::naive(dt(0, 0, 0)));
    }

    #[test]
    fn test_null_and_wrong_types() {
        let coercer = TemporalCoercer::default();
        let col = column(DatabaseType::Date);
        let bind = coercer
            .to_storage(&HostValue::Null, &col, None, SessionTimeZone::Utc)
            .unwrap();
        assert!(bind.is_null());
        assert_eq!(coercer.to_host(&RawValue::Null, &col, None).unwrap(), None);

        assert!(coercer
            .to_storage(&HostValue::Integer(1), &col, None, SessionTimeZone::Utc)
            .is_err());

        let number = column(DatabaseType::number(10, 0));
        assert!(matches!(
            coercer.to_host(&RawValue::Null, &number, None),
            Err(Error::SchemaMismatch { .. })
        ));
    }

    #[test]
    fn test_unparseable_string_is_format_error() {
        let coercer = TemporalCoercer::default();
        let col = column(DatabaseType::Date);
        let err = coercer
            .to_storage(&"28/06/2008".into(), &col, None, SessionTimeZone::Utc)
            .unwrap_err();
        assert!(err.is_format_error());
    }
}
