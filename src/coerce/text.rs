//! VARCHAR2 / CHAR coercion

use crate::column::{ColumnDescriptor, DatabaseType};
use crate::constants::OracleType;
use crate::error::{Error, Result};
use crate::value::{BindValue, HostValue, RawValue};

use super::schema_mismatch;

/// Coercer for character columns
///
/// Strings pass through unchanged. Numbers and temporal values are rendered
/// with their `Display` form on write.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TextCoercer;

impl TextCoercer {
    /// Create a text coercer
    pub fn new() -> Self {
        Self
    }

    fn check(column: &ColumnDescriptor) -> Result<()> {
        match column.data_type {
            DatabaseType::Varchar => Ok(()),
            _ => Err(schema_mismatch(column)),
        }
    }

    /// Convert a stored value into a host value
    pub fn to_host(&self, raw: &RawValue, column: &ColumnDescriptor) -> Result<HostValue> {
        Self::check(column)?;
        match raw {
            RawValue::Null => Ok(HostValue::Null),
            // empty strings are NULL in Oracle
            RawValue::Data(data) if data.is_empty() => Ok(HostValue::Null),
            RawValue::Data(data) => String::from_utf8(data.to_vec())
                .map(HostValue::Text)
                .map_err(|e| {
                    Error::DataConversionError(format!("column {}: {}", column.name, e))
                }),
            RawValue::Lob(_) => Err(Error::DataConversionError(format!(
                "column {}: LOB value delivered for {}",
                column.name, column.data_type
            ))),
        }
    }

    /// Convert a host value into a bind value for the column
    pub fn to_storage(&self, value: &HostValue, column: &ColumnDescriptor) -> Result<BindValue> {
        Self::check(column)?;
        let text = match value {
            HostValue::Null => return Ok(BindValue::null(OracleType::Varchar)),
            HostValue::Text(s) => s.clone(),
            HostValue::Integer(_)
            | HostValue::Decimal(_)
            | HostValue::Float(_)
            | HostValue::Temporal(_) => value.to_string(),
            HostValue::Bytes(_) | HostValue::Lob(_) => {
                return Err(Error::DataConversionError(format!(
                    "column {}: cannot store {} as {}",
                    column.name, value, column.data_type
                )))
            }
        };
        Ok(BindValue::data(OracleType::Varchar, text.into_bytes()))
    }
}
