//! Streaming LOB reads and writes
//!
//! A [`LobHandle`] is what a BLOB or CLOB column coerces to: the column name,
//! the LOB kind and the value the transport delivered (NULL, empty, inline
//! data or a locator). A [`LobChannel`] moves content between a handle and a
//! [`LobTransport`] in bounded chunks.
//!
//! # Write Atomicity
//!
//! Writes always replace the whole value. New content is streamed into a
//! fresh temporary LOB first; only when every chunk has been written and the
//! server-side length matches is the temporary LOB assigned to the column. If
//! anything fails before that point the temporary LOB is freed and the
//! column keeps its previous content, so the write can simply be repeated.
//!
//! # Example
//!
//! ```rust
//! use oracle_coerce::constants::OracleType;
//! use oracle_coerce::lob_channel::{LobChannel, LobHandle, LobState};
//! use oracle_coerce::transport::MemoryLobTransport;
//!
//! let mut transport = MemoryLobTransport::new();
//! let mut handle = LobHandle::absent("attachment", OracleType::Blob);
//!
//! let mut channel = LobChannel::new(&mut transport);
//! channel.write(&mut handle, Some(b"%PDF-1.7".as_slice())).unwrap();
//! assert_eq!(handle.state(), LobState::Populated);
//! assert_eq!(channel.read(&handle).unwrap().unwrap().as_ref(), b"%PDF-1.7");
//! ```

use std::fmt;

use bytes::{Bytes, BytesMut};

use crate::config::LobConfig;
use crate::constants::{OracleType, MIN_LOB_CHUNK_SIZE};
use crate::error::{Error, Result};
use crate::transport::LobTransport;
use crate::types::{LobData, LobLocator, LobValue};

/// Observable state of a LOB column value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LobState {
    /// NULL
    Absent,
    /// Present with zero length
    Empty,
    /// Present with content
    Populated,
}

/// A BLOB or CLOB column value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LobHandle {
    column: String,
    kind: OracleType,
    value: LobValue,
}

impl LobHandle {
    /// Create a handle for a value delivered by the transport
    pub fn new(column: impl Into<String>, kind: OracleType, value: LobValue) -> Self {
        Self {
            column: column.into(),
            kind,
            value,
        }
    }

    /// Create a handle for a NULL column value
    pub fn absent(column: impl Into<String>, kind: OracleType) -> Self {
        Self::new(column, kind, LobValue::Null)
    }

    /// Column this value belongs to
    pub fn column(&self) -> &str {
        &self.column
    }

    /// LOB kind (BLOB or CLOB)
    pub fn kind(&self) -> OracleType {
        self.kind
    }

    /// Current state
    pub fn state(&self) -> LobState {
        match &self.value {
            LobValue::Null => LobState::Absent,
            value if value.is_empty() => LobState::Empty,
            _ => LobState::Populated,
        }
    }

    /// Length in bytes (BLOB) or characters (CLOB); `None` when absent
    pub fn length(&self) -> Option<u64> {
        match (&self.value, self.kind) {
            (LobValue::Inline(data), OracleType::Clob) => {
                Some(String::from_utf8_lossy(data).chars().count() as u64)
            }
            (value, _) => value.size(),
        }
    }

    /// Locator, if the content lives on the server
    pub fn locator(&self) -> Option<&LobLocator> {
        self.value.as_locator()
    }

    /// The underlying transport value
    pub fn value(&self) -> &LobValue {
        &self.value
    }
}

impl fmt::Display for LobHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            OracleType::Clob => "CLOB",
            _ => "BLOB",
        };
        let unit = match self.kind {
            OracleType::Clob => "chars",
            _ => "bytes",
        };
        match self.length() {
            None => write!(f, "{}({}, NULL)", kind, self.column),
            Some(len) => write!(f, "{}({}, {} {})", kind, self.column, len, unit),
        }
    }
}

/// Content to stream into a temporary LOB
enum Content<'a> {
    Binary(&'a [u8]),
    Text(&'a str),
}

impl<'a> Content<'a> {
    fn units(&self) -> u64 {
        match self {
            Content::Binary(data) => data.len() as u64,
            Content::Text(text) => text.chars().count() as u64,
        }
    }

    /// Split into chunks of at most `size` units, paired with their unit count
    fn chunks(&self, size: usize) -> Box<dyn Iterator<Item = (&'a [u8], u64)> + 'a> {
        match *self {
            Content::Binary(data) => Box::new(data.chunks(size).map(|c| (c, c.len() as u64))),
            Content::Text(text) => {
                let mut rest = text;
                Box::new(std::iter::from_fn(move || {
                    if rest.is_empty() {
                        return None;
                    }
                    let end = rest
                        .char_indices()
                        .nth(size)
                        .map(|(i, _)| i)
                        .unwrap_or(rest.len());
                    let (head, tail) = rest.split_at(end);
                    rest = tail;
                    Some((head.as_bytes(), head.chars().count() as u64))
                }))
            }
        }
    }
}

/// Moves LOB content through a transport
///
/// The transport is borrowed mutably for the lifetime of the channel; one
/// operation is in flight at a time.
pub struct LobChannel<'t, T: LobTransport + ?Sized> {
    transport: &'t mut T,
    config: LobConfig,
}

impl<'t, T: LobTransport + ?Sized> LobChannel<'t, T> {
    /// Create a channel with the default configuration
    pub fn new(transport: &'t mut T) -> Self {
        Self::with_config(transport, LobConfig::default())
    }

    /// Create a channel with an explicit configuration
    pub fn with_config(transport: &'t mut T, config: LobConfig) -> Self {
        Self { transport, config }
    }

    /// Chunk size for streaming: the server's chunk size, at least
    /// `MIN_LOB_CHUNK_SIZE`, capped by the configured maximum
    fn chunk_size(&mut self, locator: &LobLocator) -> Result<u64> {
        let server = self.transport.lob_chunk_size(locator)?;
        Ok(u64::from(
            server
                .max(MIN_LOB_CHUNK_SIZE)
                .min(self.config.max_chunk_size)
                .max(1),
        ))
    }

    /// Read the whole value
    ///
    /// Returns `None` for NULL and an empty buffer for an empty LOB. CLOB
    /// content is returned as UTF-8.
    pub fn read(&mut self, handle: &LobHandle) -> Result<Option<Bytes>> {
        if !matches!(handle.value(), LobValue::Locator(_)) {
            return handle.value().as_bytes();
        }

        let mut buf = BytesMut::new();
        self.read_chunked(handle, |chunk| {
            buf.extend_from_slice(&chunk.into_bytes());
            Ok(())
        })?;
        Ok(Some(buf.freeze()))
    }

    /// Read the whole value of a CLOB as text
    pub fn read_text(&mut self, handle: &LobHandle) -> Result<Option<String>> {
        if handle.kind() != OracleType::Clob {
            return Err(Error::DataConversionError(format!(
                "column {}: cannot read BLOB as text, use read instead",
                handle.column()
            )));
        }
        if !matches!(handle.value(), LobValue::Locator(_)) {
            return handle.value().as_string();
        }

        let mut text = String::new();
        self.read_chunked(handle, |chunk| {
            match chunk {
                LobData::String(s) => text.push_str(&s),
                LobData::Bytes(b) => text.push_str(&String::from_utf8_lossy(&b)),
            }
            Ok(())
        })?;
        Ok(Some(text))
    }

    /// Read the value in chunks, handing each chunk to `callback`
    ///
    /// Returns the total length read in bytes (BLOB) or characters (CLOB).
    /// NULL and empty values produce no chunks. Errors returned by the
    /// callback stop the read and are passed through unchanged.
    pub fn read_chunked<F>(&mut self, handle: &LobHandle, mut callback: F) -> Result<u64>
    where
        F: FnMut(LobData) -> Result<()>,
    {
        let locator = match handle.value() {
            LobValue::Null | LobValue::Empty => return Ok(0),
            LobValue::Inline(data) => {
                let chunk = match handle.kind() {
                    OracleType::Clob => {
                        LobData::String(String::from_utf8_lossy(data).into_owned())
                    }
                    _ => LobData::Bytes(data.clone()),
                };
                let len = handle.length().unwrap_or(0);
                if len > 0 {
                    callback(chunk)?;
                }
                return Ok(len);
            }
            LobValue::Locator(locator) => locator,
        };

        let total = locator.size();
        if total == 0 {
            return Ok(0);
        }

        let column = handle.column();
        let chunk_size = self
            .chunk_size(locator)
            .map_err(|e| Error::lob_transport(column, e))?;

        let mut offset = 1u64;
        while offset <= total {
            let amount = (total - offset + 1).min(chunk_size);
            let chunk = self
                .transport
                .read_lob(locator, offset, amount)
                .map_err(|e| Error::lob_transport(column, e))?;

            let received = match &chunk {
                LobData::Bytes(b) => b.len() as u64,
                LobData::String(s) => s.chars().count() as u64,
            };
            if received == 0 || received > amount {
                return Err(Error::lob_transport(
                    column,
                    Error::Transport(format!(
                        "LOB read returned {} of {} requested at offset {}; length {} expected",
                        received, amount, offset, total
                    )),
                ));
            }

            tracing::trace!(
                column = column,
                offset = offset,
                amount = received,
                "Read LOB chunk"
            );
            callback(chunk)?;
            offset += received;
        }

        tracing::debug!(column = column, length = total, "Read LOB");
        Ok(total)
    }

    /// Replace the value
    ///
    /// `None` sets the column to NULL, an empty slice stores an empty LOB and
    /// anything else overwrites the previous content completely. CLOB content
    /// must be UTF-8.
    pub fn write(&mut self, handle: &mut LobHandle, content: Option<&[u8]>) -> Result<()> {
        match (content, handle.kind()) {
            (None, _) => self.clear(handle),
            (Some(data), OracleType::Clob) => {
                let text = std::str::from_utf8(data).map_err(|e| {
                    Error::DataConversionError(format!(
                        "column {}: CLOB content is not UTF-8: {}",
                        handle.column(),
                        e
                    ))
                })?;
                self.replace(handle, Content::Text(text))
            }
            (Some(data), _) => self.replace(handle, Content::Binary(data)),
        }
    }

    /// Replace the value of a CLOB with text
    pub fn write_text(&mut self, handle: &mut LobHandle, content: Option<&str>) -> Result<()> {
        if handle.kind() != OracleType::Clob {
            return Err(Error::DataConversionError(format!(
                "column {}: cannot write text to a BLOB, use write instead",
                handle.column()
            )));
        }
        match content {
            None => self.clear(handle),
            Some(text) => self.replace(handle, Content::Text(text)),
        }
    }

    fn clear(&mut self, handle: &mut LobHandle) -> Result<()> {
        self.transport
            .assign_lob(&handle.column, None)
            .map_err(|e| Error::lob_transport(&handle.column, e))?;
        handle.value = LobValue::Null;
        tracing::debug!(column = %handle.column, "Set LOB to NULL");
        Ok(())
    }

    fn replace(&mut self, handle: &mut LobHandle, content: Content<'_>) -> Result<()> {
        let temp = self
            .transport
            .create_temp_lob(handle.kind)
            .map_err(|e| Error::lob_transport(&handle.column, e))?;

        if let Err(e) = self.fill(&temp, &content, &handle.column) {
            self.discard(&temp, &handle.column);
            return Err(Error::lob_transport(&handle.column, e));
        }

        let assigned = self.transport.assign_lob(&handle.column, Some(&temp));
        self.discard(&temp, &handle.column);
        let assigned = assigned.map_err(|e| Error::lob_transport(&handle.column, e))?;

        handle.value = match assigned {
            Some(locator) => LobValue::Locator(locator),
            None => LobValue::Null,
        };
        tracing::debug!(
            column = %handle.column,
            length = content.units(),
            "Replaced LOB content"
        );
        Ok(())
    }

    /// Stream `content` into `temp` and verify the resulting length
    fn fill(&mut self, temp: &LobLocator, content: &Content<'_>, column: &str) -> Result<()> {
        let chunk_size = self.chunk_size(temp)? as usize;

        let mut offset = 1u64;
        for (piece, units) in content.chunks(chunk_size) {
            self.transport.write_lob(temp, offset, piece)?;
            tracing::trace!(
                column = column,
                offset = offset,
                amount = units,
                "Wrote LOB chunk"
            );
            offset += units;
        }

        let expected = content.units();
        let written = self.transport.lob_length(temp)?;
        if written != expected {
            return Err(Error::Transport(format!(
                "LOB length mismatch: wrote {}, server reports {}",
                expected, written
            )));
        }
        Ok(())
    }

    fn discard(&mut self, temp: &LobLocator, column: &str) {
        if let Err(e) = self.transport.free_temp_lob(temp) {
            tracing::warn!(column = column, error = %e, "Failed to free temporary LOB");
        }
    }
}
