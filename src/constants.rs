//! Oracle storage constants
//!
//! Type numbers, wire lengths and LOB locator flags shared by the codecs,
//! the coercers and the LOB channel.

// =============================================================================
// Oracle Data Types (ORA_TYPE_NUM)
// =============================================================================

/// Oracle internal data type numbers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum OracleType {
    /// VARCHAR2 string type
    Varchar = 1,
    /// NUMBER type
    Number = 2,
    /// DATE type
    Date = 12,
    /// BINARY_FLOAT
    BinaryFloat = 100,
    /// BINARY_DOUBLE
    BinaryDouble = 101,
    /// CLOB
    Clob = 112,
    /// BLOB
    Blob = 113,
    /// TIMESTAMP
    Timestamp = 180,
    /// TIMESTAMP WITH TIME ZONE
    TimestampTz = 181,
}

impl OracleType {
    /// Check if this type is a LOB type that is streamed through a locator
    pub fn is_lob(&self) -> bool {
        matches!(self, OracleType::Clob | OracleType::Blob)
    }
}

// =============================================================================
// Wire Lengths
// =============================================================================

/// Encoded sizes of fixed-width Oracle types
pub mod length {
    /// DATE: century, year, month, day, hour, minute, second
    pub const DATE: usize = 7;
    /// TIMESTAMP: DATE plus big-endian nanoseconds
    pub const TIMESTAMP: usize = 11;
    /// TIMESTAMP WITH TIME ZONE: TIMESTAMP plus hour and minute offset bytes
    pub const TIMESTAMP_TZ: usize = 13;
    /// BINARY_FLOAT
    pub const BINARY_FLOAT: usize = 4;
    /// BINARY_DOUBLE
    pub const BINARY_DOUBLE: usize = 8;
    /// Maximum NUMBER length (exponent + 20 mantissa bytes + terminator)
    pub const NUMBER: usize = 22;
}

/// Maximum declared precision of a NUMBER column
pub const MAX_NUMBER_PRECISION: u8 = 38;

/// Largest NUMBER(p,0) precision that always fits in an i64
pub const MAX_INTEGER_PRECISION: u8 = 18;

// =============================================================================
// LOB Constants
// =============================================================================

/// Smallest chunk the LOB channel streams with
pub const MIN_LOB_CHUNK_SIZE: u32 = 8192;

/// Default upper bound on a single streamed LOB chunk
pub const DEFAULT_MAX_LOB_CHUNK_SIZE: u32 = 32_767;

/// LOB locator flags
#[allow(missing_docs)]
pub mod lob_flags {
    // LOB locator offsets
    pub const LOC_OFFSET_FLAG_1: usize = 4;
    pub const LOC_OFFSET_FLAG_2: usize = 5;
    pub const LOC_OFFSET_FLAG_4: usize = 7;
    pub const LOC_FIXED_OFFSET: usize = 16;

    // LOB locator flags (byte 1 at offset 4)
    pub const LOC_FLAGS_BLOB: u8 = 0x01;

    // LOB locator flags (byte 2 at offset 5)
    pub const LOC_FLAGS_INIT: u8 = 0x08;

    // LOB locator flags (byte 4 at offset 7)
    pub const LOC_FLAGS_TEMP: u8 = 0x01;
}
