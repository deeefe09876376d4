#![warn(missing_docs)]

//! # oracle-coerce
//!
//! Type coercion and LOB persistence for Oracle columns, written in pure Rust.
//!
//! This crate sits between an Oracle driver's wire protocol and the
//! application. It converts column values between Oracle's storage formats
//! and host values, and streams large object content in bounded chunks.
//!
//! ## Features
//!
//! - **Temporal coercion** - DATE, TIMESTAMP and TIMESTAMP WITH TIME ZONE with
//!   per-attribute logical type overrides and explicit session time zones
//! - **Configurable parsing** - ISO-8601 first, then Oracle NLS format models
//! - **Exact numbers** - NUMBER with Oracle rounding and precision checks,
//!   BINARY_FLOAT and BINARY_DOUBLE as IEEE floats
//! - **Atomic LOB writes** - content is staged in a temporary LOB and only
//!   assigned to the column once it is complete
//! - **Schema-driven** - coercers resolved from declared column types and
//!   cached per table
//!
//! ## Quick Start
//!
//! ```rust
//! use oracle_coerce::column::{ColumnDescriptor, LogicalType, TypeOverrides};
//! use oracle_coerce::config::{CoercionConfig, SessionTimeZone};
//! use oracle_coerce::registry::ColumnTypeRegistry;
//! use oracle_coerce::value::{HostValue, TemporalValue};
//!
//! let mut registry = ColumnTypeRegistry::new(CoercionConfig::default());
//! let overrides = TypeOverrides::new().with("shipped_at", LogicalType::DateTime);
//! let column = ColumnDescriptor::from_declared("shipped_at", "DATE", true);
//!
//! let coercer = registry.coercer_for("orders", &column).unwrap();
//! let bind = coercer
//!     .to_storage(
//!         &"2008-06-28 13:34:33".into(),
//!         &column,
//!         overrides.for_column(&column),
//!         SessionTimeZone::Utc,
//!     )
//!     .unwrap();
//!
//! // Read the bound value back as the database would return it
//! let value = coercer
//!     .to_host(&bind.into_raw(), &column, overrides.for_column(&column))
//!     .unwrap();
//! assert_eq!(value.to_string(), "2008-06-28 13:34:33");
//! ```
//!
//! ## Data Types
//!
//! | Oracle Type | Host Value |
//! |-------------|-----------|
//! | DATE | `TemporalValue::Date`, or `DateTime` with an override |
//! | TIMESTAMP | `TemporalValue::DateTime` (naive) |
//! | TIMESTAMP WITH TIME ZONE | `TemporalValue::DateTime` with offset |
//! | NUMBER(p,0), p <= 18 | `HostValue::Integer` |
//! | NUMBER | `HostValue::Decimal` (`BigDecimal`) |
//! | BINARY_FLOAT, BINARY_DOUBLE | `HostValue::Float` |
//! | VARCHAR2, CHAR | `HostValue::Text` |
//! | BLOB, CLOB | `HostValue::Lob` (read through a `LobChannel`) |

pub mod coerce;
pub mod column;
pub mod config;
pub mod constants;
pub mod error;
pub mod lob_channel;
pub mod parser;
pub mod registry;
pub mod transport;
pub mod types;
pub mod value;

// Re-export commonly used types
pub use coerce::Coercer;
pub use column::{ColumnDescriptor, DatabaseType, LogicalType, TypeOverrides};
pub use config::{
    CoercionConfig, DateOverrideZone, FormatPolicy, LobConfig, SessionTimeZone, TemporalFormat,
};
pub use constants::OracleType;
pub use error::{Error, Result};
pub use lob_channel::{LobChannel, LobHandle, LobState};
pub use registry::ColumnTypeRegistry;
pub use transport::{LobTransport, MemoryLobTransport};
pub use types::{LobData, LobLocator, LobValue};
pub use value::{BindPayload, BindValue, HostType, HostValue, RawValue, TemporalValue};
