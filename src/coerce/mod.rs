//! Per-column value coercion
//!
//! A [`Coercer`] converts between a column's stored representation and the
//! host representation, in both directions:
//!
//! - `to_host`: [`RawValue`] from the transport to [`HostValue`]
//! - `to_storage`: [`HostValue`] from the application to [`BindValue`]
//!
//! Coercers are selected per declared database type by the
//! [`ColumnTypeRegistry`](crate::registry::ColumnTypeRegistry). They hold no
//! per-call state; the column, the attribute's logical type override and the
//! session time zone are passed in on every call.

mod lob;
mod numeric;
mod temporal;
mod text;

pub use lob::LobCoercer;
pub use numeric::NumericCoercer;
pub use temporal::TemporalCoercer;
pub use text::TextCoercer;

use crate::column::{ColumnDescriptor, LogicalType};
use crate::config::SessionTimeZone;
use crate::error::{Error, Result};
use crate::value::{BindValue, HostType, HostValue, RawValue};

/// Coercion strategy for one family of database types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Coercer {
    /// DATE, TIMESTAMP, TIMESTAMP WITH TIME ZONE
    Temporal(TemporalCoercer),
    /// NUMBER, BINARY_FLOAT, BINARY_DOUBLE
    Numeric(NumericCoercer),
    /// BLOB, CLOB
    Lob(LobCoercer),
    /// VARCHAR2, CHAR and national variants
    Text(TextCoercer),
}

impl Coercer {
    /// Host type produced for the column
    pub fn host_type(
        &self,
        column: &ColumnDescriptor,
        override_type: Option<LogicalType>,
    ) -> Result<HostType> {
        match self {
            Coercer::Temporal(c) => c.host_type(column, override_type),
            Coercer::Numeric(c) => c.host_type(column),
            Coercer::Lob(c) => c.host_type(column),
            Coercer::Text(_) => Ok(HostType::Text),
        }
    }

    /// Convert a stored value into a host value
    ///
    /// The override only affects DATE columns.
    pub fn to_host(
        &self,
        raw: &RawValue,
        column: &ColumnDescriptor,
        override_type: Option<LogicalType>,
    ) -> Result<HostValue> {
        match self {
            Coercer::Temporal(c) => Ok(c
                .to_host(raw, column, override_type)?
                .map_or(HostValue::Null, HostValue::Temporal)),
            Coercer::Numeric(c) => c.to_host(raw, column),
            Coercer::Lob(c) => c.to_host(raw, column),
            Coercer::Text(c) => c.to_host(raw, column),
        }
    }

    /// Convert a host value into a bind value for the column
    ///
    /// NULL is rejected for columns declared NOT NULL.
    pub fn to_storage(
        &self,
        value: &HostValue,
        column: &ColumnDescriptor,
        override_type: Option<LogicalType>,
        session: SessionTimeZone,
    ) -> Result<BindValue> {
        let bind = match self {
            Coercer::Temporal(c) => c.to_storage(value, column, override_type, session)?,
            Coercer::Numeric(c) => c.to_storage(value, column)?,
            Coercer::Lob(c) => c.to_storage(value, column)?,
            Coercer::Text(c) => c.to_storage(value, column)?,
        };
        if bind.is_null() && !column.nullable {
            return Err(Error::UnexpectedNull(column.name.clone()));
        }
        Ok(bind)
    }
}

pub(crate) fn schema_mismatch(column: &ColumnDescriptor) -> Error {
    Error::SchemaMismatch {
        column: column.name.clone(),
        type_name: column.data_type.to_string(),
    }
}
