//! BLOB and CLOB coercion
//!
//! Reads wrap whatever the transport delivered in a [`LobHandle`]; content is
//! fetched through a [`LobChannel`](crate::lob_channel::LobChannel). Writes
//! bind the content as a stream.

use bytes::Bytes;

use crate::column::{ColumnDescriptor, DatabaseType};
use crate::constants::OracleType;
use crate::error::{Error, Result};
use crate::lob_channel::LobHandle;
use crate::types::LobValue;
use crate::value::{BindValue, HostType, HostValue, RawValue};

use super::schema_mismatch;

/// Coercer for LOB columns
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LobCoercer;

impl LobCoercer {
    /// Create a LOB coercer
    pub fn new() -> Self {
        Self
    }

    fn kind(column: &ColumnDescriptor) -> Result<OracleType> {
        match column.data_type {
            DatabaseType::Blob => Ok(OracleType::Blob),
            DatabaseType::Clob => Ok(OracleType::Clob),
            _ => Err(schema_mismatch(column)),
        }
    }

    /// Host type reported for the column
    pub fn host_type(&self, column: &ColumnDescriptor) -> Result<HostType> {
        Ok(match Self::kind(column)? {
            OracleType::Clob => HostType::Text,
            _ => HostType::Binary,
        })
    }

    /// Wrap a stored value in a handle; NULL becomes an absent handle
    pub fn to_host(&self, raw: &RawValue, column: &ColumnDescriptor) -> Result<HostValue> {
        let kind = Self::kind(column)?;
        let value = match raw {
            RawValue::Null => LobValue::Null,
            RawValue::Lob(value) => value.clone(),
            RawValue::Data(data) => LobValue::inline(data.clone()),
        };
        Ok(HostValue::Lob(LobHandle::new(column.name.clone(), kind, value)))
    }

    /// Bind content to be streamed into the column
    ///
    /// A handle whose content is still on the server cannot be rebound; read
    /// it through a LOB channel first.
    pub fn to_storage(&self, value: &HostValue, column: &ColumnDescriptor) -> Result<BindValue> {
        let kind = Self::kind(column)?;
        let content: Bytes = match value {
            HostValue::Null => return Ok(BindValue::null(kind)),
            HostValue::Text(s) => Bytes::from(s.clone()),
            HostValue::Bytes(b) if kind == OracleType::Blob => b.clone(),
            HostValue::Bytes(b) => match std::str::from_utf8(b) {
                Ok(_) => b.clone(),
                Err(e) => {
                    return Err(Error::DataConversionError(format!(
                        "column {}: CLOB content is not UTF-8: {}",
                        column.name, e
                    )))
                }
            },
            HostValue::Lob(handle) => match handle.value().as_bytes()? {
                None => return Ok(BindValue::null(kind)),
                Some(data) => data,
            },
            other => {
                return Err(Error::DataConversionError(format!(
                    "column {}: cannot store {} as {}",
                    column.name, other, column.data_type
                )))
            }
        };
        Ok(BindValue::stream(kind, content))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lob_channel::LobState;

    #[test]
    fn test_null_reads_as_absent_handle() {
        let col = ColumnDescriptor::new("attachment", DatabaseType::Blob, true);
        let value = LobCoercer::new()
            .to_host(&RawValue::Lob(LobValue::Null), &col)
            .unwrap();
        let handle = value.as_lob().unwrap();
        assert_eq!(handle.state(), LobState::Absent);
        assert_eq!(handle.column(), "attachment");
    }

    #[test]
    fn test_empty_and_content_round_trip() {
        let coercer = LobCoercer::new();
        let col = ColumnDescriptor::new("notes", DatabaseType::Clob, true);

        let bind = coercer.to_storage(&"".into(), &col).unwrap();
        let read = coercer.to_host(&bind.into_raw(), &col).unwrap();
        assert_eq!(read.as_lob().unwrap().state(), LobState::Empty);

        let bind = coercer.to_storage(&"hello".into(), &col).unwrap();
        let read = coercer.to_host(&bind.into_raw(), &col).unwrap();
        assert_eq!(
            read.as_lob().unwrap().value().as_string().unwrap(),
            Some("hello".to_string())
        );
    }

    #[test]
    fn test_rejects_invalid_clob_bytes() {
        let col = ColumnDescriptor::new("notes", DatabaseType::Clob, true);
        assert!(LobCoercer::new()
            .to_storage(&HostValue::from(vec![0xffu8]), &col)
            .is_err());
        assert_eq!(
            LobCoercer::new().host_type(&col).unwrap(),
            HostType::Text
        );
    }
}
