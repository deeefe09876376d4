//! Error types for the coercion layer
//!
//! This module defines all error types that can occur while converting column
//! values between Oracle's storage formats and host values, and while moving
//! LOB content through a transport.

use std::io;
use thiserror::Error;

use crate::column::LogicalType;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the coercion layer
#[derive(Error, Debug)]
#[allow(missing_docs)]
pub enum Error {
    // =========================================================================
    // Temporal Errors
    // =========================================================================
    /// Input did not match any pattern of the active format policy
    #[error("cannot parse {input:?} as {expected}: no configured format matches")]
    Format { input: String, expected: LogicalType },

    // =========================================================================
    // Numeric Errors
    // =========================================================================
    /// Value has more significant digits than NUMBER(precision, scale) allows
    #[error("value {value} exceeds NUMBER({precision},{scale})")]
    PrecisionOverflow {
        value: String,
        precision: u8,
        scale: i8,
    },

    /// Value lies outside the range of a binary floating point column
    #[error("value {value} is out of range for {type_name}")]
    OutOfRange { value: String, type_name: String },

    // =========================================================================
    // LOB Errors
    // =========================================================================
    /// Streamed LOB read or write failed; nothing was committed to the column
    #[error("LOB transport error on column {column}: {source}")]
    LobTransport {
        column: String,
        #[source]
        source: Box<Error>,
    },

    /// Transport-level failure reported by a LOB transport implementation
    #[error("transport failure: {0}")]
    Transport(String),

    // =========================================================================
    // Schema Errors
    // =========================================================================
    /// Declared database type has no coercer
    #[error("column {column}: unsupported database type {type_name}")]
    SchemaMismatch { column: String, type_name: String },

    // =========================================================================
    // Data Type Errors
    // =========================================================================
    /// Data conversion error
    #[error("data conversion error: {0}")]
    DataConversionError(String),

    /// NULL written to a column declared NOT NULL
    #[error("column {0} does not accept NULL")]
    UnexpectedNull(String),

    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid configuration value
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    // =========================================================================
    // I/O Errors
    // =========================================================================
    /// Underlying I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// Create a format error for the given input and expected shape
    pub fn format(input: impl Into<String>, expected: LogicalType) -> Self {
        Error::Format {
            input: input.into(),
            expected,
        }
    }

    /// Wrap a failure that happened while streaming a LOB for `column`
    pub fn lob_transport(column: impl Into<String>, source: Error) -> Self {
        Error::LobTransport {
            column: column.into(),
            source: Box::new(source),
        }
    }

    /// Check if this is a temporal format error
    pub fn is_format_error(&self) -> bool {
        matches!(self, Error::Format { .. })
    }

    /// Check if this error came from the LOB transport
    pub fn is_lob_transport_error(&self) -> bool {
        matches!(self, Error::LobTransport { .. })
    }

    /// Check if this error is recoverable (can retry)
    ///
    /// LOB writes never leave partial content behind, so the whole operation
    /// can be repeated.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::LobTransport { .. } | Error::Io(_))
    }
}
