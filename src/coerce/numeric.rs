//! NUMBER, BINARY_FLOAT and BINARY_DOUBLE coercion
//!
//! NUMBER columns are exact: writes round to the declared scale the way the
//! server does, and a value with more significant digits than the declared
//! precision is rejected with [`Error::PrecisionOverflow`].
//!
//! BINARY_FLOAT and BINARY_DOUBLE columns are IEEE floats. A BINARY_FLOAT is
//! widened to `f64` on read without any cleanup, so `4.4` stored in a
//! BINARY_FLOAT reads back as `4.400000095367432`.

use std::str::FromStr;

use bigdecimal::{BigDecimal, RoundingMode, ToPrimitive};

use crate::column::{ColumnDescriptor, DatabaseType};
use crate::constants::{OracleType, MAX_INTEGER_PRECISION};
use crate::error::{Error, Result};
use crate::types::{
    decode_binary_double, decode_binary_float, decode_oracle_number, encode_binary_double,
    encode_binary_float, encode_oracle_number,
};
use crate::value::{BindValue, HostType, HostValue, RawValue};

use super::schema_mismatch;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NumericColumn {
    Number {
        precision: Option<u8>,
        scale: Option<i8>,
    },
    BinaryFloat,
    BinaryDouble,
}

impl NumericColumn {
    fn of(column: &ColumnDescriptor) -> Result<Self> {
        match column.data_type {
            DatabaseType::Number { precision, scale } => {
                Ok(NumericColumn::Number { precision, scale })
            }
            DatabaseType::BinaryFloat => Ok(NumericColumn::BinaryFloat),
            DatabaseType::BinaryDouble => Ok(NumericColumn::BinaryDouble),
            _ => Err(schema_mismatch(column)),
        }
    }

    fn oracle_type(self) -> OracleType {
        match self {
            NumericColumn::Number { .. } => OracleType::Number,
            NumericColumn::BinaryFloat => OracleType::BinaryFloat,
            NumericColumn::BinaryDouble => OracleType::BinaryDouble,
        }
    }

    fn host_type(self) -> HostType {
        match self {
            NumericColumn::Number {
                precision: Some(p),
                scale: Some(0) | None,
            } if p <= MAX_INTEGER_PRECISION => HostType::Integer,
            NumericColumn::Number { .. } => HostType::Decimal,
            NumericColumn::BinaryFloat | NumericColumn::BinaryDouble => HostType::Float,
        }
    }
}

/// Coercer for numeric columns
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NumericCoercer;

impl NumericCoercer {
    /// Create a numeric coercer
    pub fn new() -> Self {
        Self
    }

    /// Host type reported for the column, independent of any value
    pub fn host_type(&self, column: &ColumnDescriptor) -> Result<HostType> {
        Ok(NumericColumn::of(column)?.host_type())
    }

    /// Convert a stored value into a host value
    pub fn to_host(&self, raw: &RawValue, column: &ColumnDescriptor) -> Result<HostValue> {
        let kind = NumericColumn::of(column)?;
        let data = match raw {
            RawValue::Null => return Ok(HostValue::Null),
            RawValue::Data(data) => data,
            RawValue::Lob(_) => {
                return Err(Error::DataConversionError(format!(
                    "column {}: LOB value delivered for {}",
                    column.name, column.data_type
                )))
            }
        };

        match kind {
            NumericColumn::BinaryFloat => {
                Ok(HostValue::Float(f64::from(decode_binary_float(data)?)))
            }
            NumericColumn::BinaryDouble => Ok(HostValue::Float(decode_binary_double(data)?)),
            NumericColumn::Number { .. } => {
                let value = decode_oracle_number(data)?;
                if kind.host_type() != HostType::Integer {
                    return Ok(HostValue::Decimal(value));
                }
                value.to_i64().map(HostValue::Integer).ok_or_else(|| {
                    Error::DataConversionError(format!(
                        "column {}: {} does not fit an integer",
                        column.name, value
                    ))
                })
            }
        }
    }

    /// Convert a host value into a bind value for the column
    ///
    /// Accepts integers, decimals, floats and numeric text.
    pub fn to_storage(&self, value: &HostValue, column: &ColumnDescriptor) -> Result<BindValue> {
        let kind = NumericColumn::of(column)?;
        if value.is_null() {
            return Ok(BindValue::null(kind.oracle_type()));
        }

        match kind {
            NumericColumn::Number { precision, scale } => {
                let exact = fit_number(to_decimal(value, column)?, precision, scale)?;
                tracing::trace!(
                    column = %column.name,
                    value = %exact,
                    "Coerced NUMBER for storage"
                );
                Ok(BindValue::data(OracleType::Number, encode_oracle_number(&exact)?))
            }
            NumericColumn::BinaryFloat => {
                let wide = to_f64(value, column)?;
                let float = wide as f32;
                if wide.is_finite() && float.is_infinite() {
                    return Err(Error::OutOfRange {
                        value: value.to_string(),
                        type_name: column.data_type.to_string(),
                    });
                }
                Ok(BindValue::data(
                    OracleType::BinaryFloat,
                    encode_binary_float(float).to_vec(),
                ))
            }
            NumericColumn::BinaryDouble => Ok(BindValue::data(
                OracleType::BinaryDouble,
                encode_binary_double(to_f64(value, column)?).to_vec(),
            )),
        }
    }
}

/// Round to the declared scale and check the declared precision
fn fit_number(value: BigDecimal, precision: Option<u8>, scale: Option<i8>) -> Result<BigDecimal> {
    let Some(precision) = precision else {
        return Ok(value);
    };
    let scale = scale.unwrap_or(0);
    let rounded = value.with_scale_round(i64::from(scale), RoundingMode::HalfUp);

    if rounded.digits() > u64::from(precision) {
        return Err(Error::PrecisionOverflow {
            value: value.to_string(),
            precision,
            scale,
        });
    }
    Ok(rounded)
}

fn to_decimal(value: &HostValue, column: &ColumnDescriptor) -> Result<BigDecimal> {
    match value {
        HostValue::Integer(i) => Ok(BigDecimal::from(*i)),
        HostValue::Decimal(d) => Ok(d.clone()),
        HostValue::Float(f) if f.is_finite() => {
            BigDecimal::from_str(&f.to_string()).map_err(|_| not_numeric(value, column))
        }
        HostValue::Text(s) => {
            BigDecimal::from_str(s.trim()).map_err(|_| not_numeric(value, column))
        }
        _ => Err(not_numeric(value, column)),
    }
}

fn to_f64(value: &HostValue, column: &ColumnDescriptor) -> Result<f64> {
    match value {
        HostValue::Text(s) => s.trim().parse().map_err(|_| not_numeric(value, column)),
        HostValue::Decimal(d) => match d.to_f64() {
            Some(f) if f.is_finite() => Ok(f),
            Some(_) => Err(Error::OutOfRange {
                value: d.to_string(),
                type_name: column.data_type.to_string(),
            }),
            None => Err(not_numeric(value, column)),
        },
        other => other.as_f64().ok_or_else(|| not_numeric(value, column)),
    }
}

fn not_numeric(value: &HostValue, column: &ColumnDescriptor) -> Error {
    Error::DataConversionError(format!(
        "column {}: cannot store {:?} as {}",
        column.name, value, column.data_type
    ))
}
