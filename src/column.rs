//! Column descriptions and per-attribute type overrides
//!
//! A [`ColumnDescriptor`] is what schema introspection reports about a column:
//! its name, its declared [`DatabaseType`] and whether it is nullable.
//! [`TypeOverrides`] carry the application's logical type annotations, which
//! only influence DATE columns.

use std::fmt;

use indexmap::IndexMap;

use crate::constants::{OracleType, MAX_NUMBER_PRECISION};

/// Logical temporal type of a value: calendar date or full date-time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalType {
    /// Calendar date, no time of day
    Date,
    /// Date with time of day, optionally with a timezone offset
    DateTime,
}

impl fmt::Display for LogicalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogicalType::Date => write!(f, "date"),
            LogicalType::DateTime => write!(f, "datetime"),
        }
    }
}

/// Declared database type of a column
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DatabaseType {
    /// DATE (second precision, no timezone)
    Date,
    /// TIMESTAMP / TIMESTAMP WITH LOCAL TIME ZONE
    Timestamp,
    /// TIMESTAMP WITH TIME ZONE
    TimestampTz,
    /// NUMBER with optional precision and scale
    Number {
        /// Declared precision (None for unconstrained NUMBER)
        precision: Option<u8>,
        /// Declared scale (None for unconstrained NUMBER)
        scale: Option<i8>,
    },
    /// BINARY_FLOAT (IEEE single precision)
    BinaryFloat,
    /// BINARY_DOUBLE (IEEE double precision)
    BinaryDouble,
    /// BLOB
    Blob,
    /// CLOB / NCLOB
    Clob,
    /// VARCHAR2, NVARCHAR2, CHAR, NCHAR
    Varchar,
    /// A type reported by the catalog that has no coercer
    Unsupported(String),
}

impl DatabaseType {
    /// Parse a declared type as reported by the data dictionary
    ///
    /// Accepts forms such as `NUMBER`, `NUMBER(10)`, `NUMBER(10,2)`,
    /// `VARCHAR2(40 BYTE)`, `TIMESTAMP(6)` and `TIMESTAMP(6) WITH TIME ZONE`.
    /// Names that have no coercer become [`DatabaseType::Unsupported`].
    pub fn from_declared(declared: &str) -> Self {
        let normalized = declared.trim().to_ascii_uppercase();
        let (base, args) = match normalized.find('(') {
            Some(open) => {
                let close = normalized.rfind(')').unwrap_or(normalized.len());
                let base = format!(
                    "{}{}",
                    normalized[..open].trim_end(),
                    normalized.get(close + 1..).unwrap_or("")
                );
                (base, Some(&normalized[open + 1..close.max(open + 1)]))
            }
            None => (normalized.clone(), None),
        };

        match base.as_str() {
            "DATE" => DatabaseType::Date,
            "TIMESTAMP" | "TIMESTAMP WITH LOCAL TIME ZONE" => DatabaseType::Timestamp,
            "TIMESTAMP WITH TIME ZONE" => DatabaseType::TimestampTz,
            "BINARY_FLOAT" => DatabaseType::BinaryFloat,
            "BINARY_DOUBLE" => DatabaseType::BinaryDouble,
            "BLOB" => DatabaseType::Blob,
            "CLOB" | "NCLOB" => DatabaseType::Clob,
            "VARCHAR2" | "VARCHAR" | "NVARCHAR2" | "CHAR" | "NCHAR" => DatabaseType::Varchar,
            "NUMBER" => match args.map(parse_number_args) {
                None => DatabaseType::Number {
                    precision: None,
                    scale: None,
                },
                Some(Some((precision, scale))) => DatabaseType::Number {
                    precision: Some(precision),
                    scale: Some(scale),
                },
                Some(None) => DatabaseType::Unsupported(normalized),
            },
            _ => DatabaseType::Unsupported(normalized),
        }
    }

    /// Shorthand for a constrained NUMBER(precision, scale)
    pub fn number(precision: u8, scale: i8) -> Self {
        DatabaseType::Number {
            precision: Some(precision),
            scale: Some(scale),
        }
    }

    /// Oracle type number used on the wire, if the type is supported
    pub fn oracle_type(&self) -> Option<OracleType> {
        match self {
            DatabaseType::Date => Some(OracleType::Date),
            DatabaseType::Timestamp => Some(OracleType::Timestamp),
            DatabaseType::TimestampTz => Some(OracleType::TimestampTz),
            DatabaseType::Number { .. } => Some(OracleType::Number),
            DatabaseType::BinaryFloat => Some(OracleType::BinaryFloat),
            DatabaseType::BinaryDouble => Some(OracleType::BinaryDouble),
            DatabaseType::Blob => Some(OracleType::Blob),
            DatabaseType::Clob => Some(OracleType::Clob),
            DatabaseType::Varchar => Some(OracleType::Varchar),
            DatabaseType::Unsupported(_) => None,
        }
    }
}

fn parse_number_args(args: &str) -> Option<(u8, i8)> {
    let mut parts = args.split(',').map(str::trim);
    let precision = match parts.next()? {
        "*" => MAX_NUMBER_PRECISION,
        p => p.parse::<u8>().ok()?,
    };
    let scale = match parts.next() {
        Some(s) => s.parse::<i8>().ok()?,
        None => 0,
    };
    if parts.next().is_some() || precision == 0 || precision > MAX_NUMBER_PRECISION {
        return None;
    }
    Some((precision, scale))
}

impl fmt::Display for DatabaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatabaseType::Date => write!(f, "DATE"),
            DatabaseType::Timestamp => write!(f, "TIMESTAMP"),
            DatabaseType::TimestampTz => write!(f, "TIMESTAMP WITH TIME ZONE"),
            DatabaseType::Number {
                precision: Some(p),
                scale: Some(s),
            } => write!(f, "NUMBER({},{})", p, s),
            DatabaseType::Number { precision: Some(p), .. } => write!(f, "NUMBER({})", p),
            DatabaseType::Number { .. } => write!(f, "NUMBER"),
            DatabaseType::BinaryFloat => write!(f, "BINARY_FLOAT"),
            DatabaseType::BinaryDouble => write!(f, "BINARY_DOUBLE"),
            DatabaseType::Blob => write!(f, "BLOB"),
            DatabaseType::Clob => write!(f, "CLOB"),
            DatabaseType::Varchar => write!(f, "VARCHAR2"),
            DatabaseType::Unsupported(name) => write!(f, "{}", name),
        }
    }
}

/// Column metadata as reported by schema introspection
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColumnDescriptor {
    /// Column name
    pub name: String,
    /// Declared database type
    pub data_type: DatabaseType,
    /// Whether the column accepts NULL
    pub nullable: bool,
}

impl ColumnDescriptor {
    /// Create a new column descriptor
    pub fn new(name: impl Into<String>, data_type: DatabaseType, nullable: bool) -> Self {
        Self {
            name: name.into(),
            data_type,
            nullable,
        }
    }

    /// Create a descriptor from a catalog type string
    pub fn from_declared(name: impl Into<String>, declared: &str, nullable: bool) -> Self {
        Self::new(name, DatabaseType::from_declared(declared), nullable)
    }
}

/// Immutable attribute name to logical type map
///
/// Overrides are looked up case-insensitively, matching Oracle's handling of
/// unquoted identifiers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeOverrides {
    entries: IndexMap<String, LogicalType>,
}

impl TypeOverrides {
    /// Create an empty override set
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an override for an attribute
    pub fn with(mut self, attribute: impl AsRef<str>, logical_type: LogicalType) -> Self {
        self.entries
            .insert(attribute.as_ref().to_ascii_lowercase(), logical_type);
        self
    }

    /// Look up the override for an attribute
    pub fn get(&self, attribute: &str) -> Option<LogicalType> {
        self.entries.get(&attribute.to_ascii_lowercase()).copied()
    }

    /// Look up the override for a column
    pub fn for_column(&self, column: &ColumnDescriptor) -> Option<LogicalType> {
        self.get(&column.name)
    }

    /// Number of overrides
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if there are no overrides
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<S: AsRef<str>> FromIterator<(S, LogicalType)> for TypeOverrides {
    fn from_iter<I: IntoIterator<Item = (S, LogicalType)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(TypeOverrides::new(), |acc, (name, ty)| acc.with(name, ty))
    }
}
