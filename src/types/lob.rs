//! LOB (Large Object) types
//!
//! This module provides the values a transport hands out for BLOB and CLOB
//! columns: locators for server-side content, inline prefetched content, and
//! the Empty and Null markers.

use bytes::Bytes;

use crate::constants::{lob_flags, OracleType};
use crate::error::{Error, Result};

/// Result of reading LOB data
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LobData {
    /// String data (from CLOB)
    String(String),
    /// Binary data (from BLOB)
    Bytes(Bytes),
}

impl LobData {
    /// Get as string (for CLOB)
    pub fn as_string(&self) -> Option<&String> {
        match self {
            LobData::String(s) => Some(s),
            LobData::Bytes(_) => None,
        }
    }

    /// Get as bytes (for BLOB)
    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            LobData::Bytes(b) => Some(b),
            LobData::String(_) => None,
        }
    }

    /// Convert to raw bytes; CLOB text becomes its UTF-8 encoding
    pub fn into_bytes(self) -> Bytes {
        match self {
            LobData::Bytes(b) => b,
            LobData::String(s) => Bytes::from(s),
        }
    }

    /// Get the length of the data in bytes
    pub fn len(&self) -> usize {
        match self {
            LobData::String(s) => s.len(),
            LobData::Bytes(b) => b.len(),
        }
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// LOB locator - holds the reference to a LOB stored in the database
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LobLocator {
    /// The raw locator bytes
    pub(crate) locator: Bytes,
    /// Size of the LOB in bytes (for BLOB) or characters (for CLOB)
    pub(crate) size: u64,
    /// Chunk size for read/write operations
    pub(crate) chunk_size: u32,
    /// Oracle type (CLOB or BLOB)
    pub(crate) oracle_type: OracleType,
}

impl LobLocator {
    /// Create a new LOB locator from raw data
    pub fn new(locator: Bytes, size: u64, chunk_size: u32, oracle_type: OracleType) -> Self {
        Self {
            locator,
            size,
            chunk_size,
            oracle_type,
        }
    }

    /// Get the size of the LOB
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Get the chunk size for read/write operations
    pub fn chunk_size(&self) -> u32 {
        self.chunk_size
    }

    /// Get the Oracle type
    pub fn oracle_type(&self) -> OracleType {
        self.oracle_type
    }

    /// Check if this is a BLOB
    pub fn is_blob(&self) -> bool {
        self.oracle_type == OracleType::Blob
    }

    /// Check if this is a CLOB
    pub fn is_clob(&self) -> bool {
        self.oracle_type == OracleType::Clob
    }

    /// Check if the locator is initialized
    pub fn is_initialized(&self) -> bool {
        self.flag(lob_flags::LOC_OFFSET_FLAG_2, lob_flags::LOC_FLAGS_INIT)
    }

    /// Check if this is a temporary LOB
    pub fn is_temp(&self) -> bool {
        self.flag(lob_flags::LOC_OFFSET_FLAG_4, lob_flags::LOC_FLAGS_TEMP)
    }

    fn flag(&self, offset: usize, mask: u8) -> bool {
        self.locator
            .get(offset)
            .map(|b| b & mask != 0)
            .unwrap_or(false)
    }

    /// Get the raw locator bytes
    pub fn locator_bytes(&self) -> &[u8] {
        &self.locator
    }
}

/// Represents a LOB value that can be either inline data or a locator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LobValue {
    /// LOB data that was prefetched inline (small LOBs)
    Inline(Bytes),
    /// LOB locator for data that must be fetched separately
    Locator(LobLocator),
    /// Empty LOB
    Empty,
    /// NULL LOB
    Null,
}

impl LobValue {
    /// Create an inline LOB value
    pub fn inline(data: Bytes) -> Self {
        if data.is_empty() {
            Self::Empty
        } else {
            Self::Inline(data)
        }
    }

    /// Create a LOB value from a locator
    pub fn locator(locator: LobLocator) -> Self {
        Self::Locator(locator)
    }

    /// Check if the LOB is null
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Check if the LOB is present but holds no data
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Null => false,
            Self::Inline(data) => data.is_empty(),
            Self::Locator(loc) => loc.size == 0,
        }
    }

    /// Get the size of the LOB (None for NULL)
    pub fn size(&self) -> Option<u64> {
        match self {
            Self::Null => None,
            Self::Empty => Some(0),
            Self::Inline(data) => Some(data.len() as u64),
            Self::Locator(loc) => Some(loc.size),
        }
    }

    /// Get the locator if this is a locator-based LOB
    pub fn as_locator(&self) -> Option<&LobLocator> {
        match self {
            Self::Locator(loc) => Some(loc),
            _ => None,
        }
    }

    /// Get inline BLOB data without a round trip
    pub fn as_bytes(&self) -> Result<Option<Bytes>> {
        match self {
            Self::Null => Ok(None),
            Self::Empty => Ok(Some(Bytes::new())),
            Self::Inline(data) => Ok(Some(data.clone())),
            Self::Locator(_) => Err(Error::DataConversionError(
                "LOB data requires explicit read operation".to_string(),
            )),
        }
    }

    /// Get inline CLOB data without a round trip
    pub fn as_string(&self) -> Result<Option<String>> {
        match self.as_bytes()? {
            None => Ok(None),
            Some(data) => String::from_utf8(data.to_vec())
                .map(Some)
                .map_err(|e| Error::DataConversionError(format!("CLOB is not UTF-8: {}", e))),
        }
    }
}
