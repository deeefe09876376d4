//! In-process LOB transport
//!
//! Stores LOBs in memory and behaves like a server connection as far as the
//! LOB channel can tell: locators carry the usual flag bytes, every call is
//! limited to one frame, and temporary LOBs must be freed explicitly. Faults
//! can be injected to exercise the failure paths.

use bytes::Bytes;
use indexmap::IndexMap;

use crate::constants::{lob_flags, OracleType};
use crate::error::{Error, Result};
use crate::types::{LobData, LobLocator, LobValue};
use crate::value::RawValue;

use super::LobTransport;

/// Default server chunk size
const DEFAULT_CHUNK_SIZE: u32 = 8060;

/// Default largest amount accepted in one read or write call
const DEFAULT_FRAME_LIMIT: u64 = 64 * 1024;

/// Length of a locator: fixed part followed by the LOB id
const LOCATOR_LEN: usize = lob_flags::LOC_FIXED_OFFSET + 8;

#[derive(Debug, Clone)]
enum Stored {
    Binary(Vec<u8>),
    Text(Vec<char>),
}

impl Stored {
    fn empty(kind: OracleType) -> Self {
        match kind {
            OracleType::Clob => Stored::Text(Vec::new()),
            _ => Stored::Binary(Vec::new()),
        }
    }

    fn len(&self) -> u64 {
        match self {
            Stored::Binary(data) => data.len() as u64,
            Stored::Text(chars) => chars.len() as u64,
        }
    }

    fn to_data(&self, start: usize, end: usize) -> LobData {
        match self {
            Stored::Binary(data) => LobData::Bytes(Bytes::copy_from_slice(&data[start..end])),
            Stored::Text(chars) => LobData::String(chars[start..end].iter().collect()),
        }
    }
}

#[derive(Debug, Clone)]
struct MemoryLob {
    kind: OracleType,
    content: Stored,
    temp: bool,
}

/// LOB transport backed by process memory
#[derive(Debug)]
pub struct MemoryLobTransport {
    lobs: IndexMap<u64, MemoryLob>,
    columns: IndexMap<String, u64>,
    next_id: u64,
    chunk_size: u32,
    frame_limit: u64,
    prefetch: u64,
    fail_writes_after: Option<usize>,
    truncate_reads_at: Option<u64>,
    write_calls: usize,
    read_calls: usize,
}

impl MemoryLobTransport {
    /// Create an empty transport
    pub fn new() -> Self {
        Self {
            lobs: IndexMap::new(),
            columns: IndexMap::new(),
            next_id: 1,
            chunk_size: DEFAULT_CHUNK_SIZE,
            frame_limit: DEFAULT_FRAME_LIMIT,
            prefetch: 0,
            fail_writes_after: None,
            truncate_reads_at: None,
            write_calls: 0,
            read_calls: 0,
        }
    }

    /// Set the chunk size reported for every LOB
    pub fn with_chunk_size(mut self, chunk_size: u32) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Set the largest amount a single read or write may carry
    pub fn with_frame_limit(mut self, frame_limit: u64) -> Self {
        self.frame_limit = frame_limit;
        self
    }

    /// Deliver LOBs up to `prefetch` units inline when fetched
    pub fn with_prefetch(mut self, prefetch: u64) -> Self {
        self.prefetch = prefetch;
        self
    }

    /// Fail every write after the next `writes` successful ones
    pub fn fail_writes_after(&mut self, writes: Option<usize>) {
        self.fail_writes_after = writes;
    }

    /// Pretend every LOB ends after `units` when read
    pub fn truncate_reads_at(&mut self, units: Option<u64>) {
        self.truncate_reads_at = units;
    }

    /// Number of write calls received, failed ones included
    pub fn write_calls(&self) -> usize {
        self.write_calls
    }

    /// Number of read calls received
    pub fn read_calls(&self) -> usize {
        self.read_calls
    }

    /// Number of temporary LOBs not yet freed
    pub fn temp_lob_count(&self) -> usize {
        self.lobs.values().filter(|lob| lob.temp).count()
    }

    /// Fetch a column the way a query would deliver it
    pub fn fetch(&self, column: &str) -> RawValue {
        let Some((id, lob)) = self
            .columns
            .get(column)
            .and_then(|id| self.lobs.get(id).map(|lob| (*id, lob)))
        else {
            return RawValue::Lob(LobValue::Null);
        };

        let size = lob.content.len();
        if size > 0 && size <= self.prefetch {
            let data = lob.content.to_data(0, size as usize).into_bytes();
            return RawValue::Lob(LobValue::inline(data));
        }
        RawValue::Lob(LobValue::locator(self.locator(id, lob)))
    }

    /// Content currently stored for a column, bypassing the frame limit
    pub fn column_content(&self, column: &str) -> Option<LobData> {
        let lob = self.columns.get(column).and_then(|id| self.lobs.get(id))?;
        Some(lob.content.to_data(0, lob.content.len() as usize))
    }

    fn locator(&self, id: u64, lob: &MemoryLob) -> LobLocator {
        let mut bytes = vec![0u8; LOCATOR_LEN];
        if lob.kind == OracleType::Blob {
            bytes[lob_flags::LOC_OFFSET_FLAG_1] |= lob_flags::LOC_FLAGS_BLOB;
        }
        bytes[lob_flags::LOC_OFFSET_FLAG_2] |= lob_flags::LOC_FLAGS_INIT;
        if lob.temp {
            bytes[lob_flags::LOC_OFFSET_FLAG_4] |= lob_flags::LOC_FLAGS_TEMP;
        }
        bytes[lob_flags::LOC_FIXED_OFFSET..].copy_from_slice(&id.to_be_bytes());
        LobLocator::new(
            Bytes::from(bytes),
            lob.content.len(),
            self.chunk_size,
            lob.kind,
        )
    }

    fn insert(&mut self, lob: MemoryLob) -> LobLocator {
        let id = self.next_id;
        self.next_id += 1;
        let locator = self.locator(id, &lob);
        self.lobs.insert(id, lob);
        locator
    }

    fn id_of(locator: &LobLocator) -> Result<u64> {
        locator
            .locator_bytes()
            .get(lob_flags::LOC_FIXED_OFFSET..LOCATOR_LEN)
            .and_then(|id| id.try_into().ok())
            .map(u64::from_be_bytes)
            .ok_or_else(|| Error::Transport("malformed LOB locator".to_string()))
    }

    fn lob(&self, locator: &LobLocator) -> Result<&MemoryLob> {
        let id = Self::id_of(locator)?;
        self.lobs
            .get(&id)
            .ok_or_else(|| Error::Transport(format!("LOB {} does not exist", id)))
    }

    fn check_frame(&self, amount: u64) -> Result<()> {
        if amount > self.frame_limit {
            return Err(Error::Transport(format!(
                "request of {} exceeds frame limit {}",
                amount, self.frame_limit
            )));
        }
        Ok(())
    }
}

impl Default for MemoryLobTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl LobTransport for MemoryLobTransport {
    fn create_temp_lob(&mut self, kind: OracleType) -> Result<LobLocator> {
        if !kind.is_lob() {
            return Err(Error::Transport(format!("{:?} is not a LOB type", kind)));
        }
        Ok(self.insert(MemoryLob {
            kind,
            content: Stored::empty(kind),
            temp: true,
        }))
    }

    fn lob_chunk_size(&mut self, locator: &LobLocator) -> Result<u32> {
        self.lob(locator)?;
        Ok(locator.chunk_size())
    }

    fn lob_length(&mut self, locator: &LobLocator) -> Result<u64> {
        Ok(self.lob(locator)?.content.len())
    }

    fn read_lob(&mut self, locator: &LobLocator, offset: u64, amount: u64) -> Result<LobData> {
        self.read_calls += 1;
        self.check_frame(amount)?;

        let lob = self.lob(locator)?;
        let mut len = lob.content.len();
        if let Some(limit) = self.truncate_reads_at {
            len = len.min(limit);
        }
        let start = offset.saturating_sub(1).min(len);
        let end = start.saturating_add(amount).min(len);
        Ok(lob.content.to_data(start as usize, end as usize))
    }

    fn write_lob(&mut self, locator: &LobLocator, offset: u64, data: &[u8]) -> Result<()> {
        self.write_calls += 1;
        match self.fail_writes_after {
            Some(0) => {
                return Err(Error::Transport(
                    "connection reset during LOB write".to_string(),
                ))
            }
            Some(remaining) => self.fail_writes_after = Some(remaining - 1),
            None => {}
        }

        let id = Self::id_of(locator)?;
        let frame_limit = self.frame_limit;
        let lob = self
            .lobs
            .get_mut(&id)
            .ok_or_else(|| Error::Transport(format!("LOB {} does not exist", id)))?;

        let start = offset
            .checked_sub(1)
            .filter(|start| *start <= lob.content.len())
            .ok_or_else(|| Error::Transport(format!("write offset {} out of range", offset)))?
            as usize;

        match &mut lob.content {
            Stored::Binary(content) => {
                if data.len() as u64 > frame_limit {
                    return Err(Error::Transport(format!(
                        "request of {} exceeds frame limit {}",
                        data.len(),
                        frame_limit
                    )));
                }
                let end = (start + data.len()).min(content.len());
                content.splice(start..end, data.iter().copied());
            }
            Stored::Text(content) => {
                let text = std::str::from_utf8(data)
                    .map_err(|e| Error::Transport(format!("CLOB data is not UTF-8: {}", e)))?;
                let chars: Vec<char> = text.chars().collect();
                if chars.len() as u64 > frame_limit {
                    return Err(Error::Transport(format!(
                        "request of {} exceeds frame limit {}",
                        chars.len(),
                        frame_limit
                    )));
                }
                let end = (start + chars.len()).min(content.len());
                content.splice(start..end, chars);
            }
        }
        Ok(())
    }

    fn free_temp_lob(&mut self, locator: &LobLocator) -> Result<()> {
        let id = Self::id_of(locator)?;
        match self.lobs.get(&id) {
            Some(lob) if lob.temp => {
                self.lobs.swap_remove(&id);
                Ok(())
            }
            Some(_) => Err(Error::Transport(format!("LOB {} is not temporary", id))),
            None => Err(Error::Transport(format!("LOB {} does not exist", id))),
        }
    }

    fn assign_lob(
        &mut self,
        column: &str,
        locator: Option<&LobLocator>,
    ) -> Result<Option<LobLocator>> {
        let assigned = match locator {
            Some(locator) => {
                let source = self.lob(locator)?.clone();
                Some(self.insert(MemoryLob {
                    temp: false,
                    ..source
                }))
            }
            None => None,
        };

        let previous = match &assigned {
            Some(new) => self.columns.insert(column.to_string(), Self::id_of(new)?),
            None => self.columns.swap_remove(column),
        };
        if let Some(previous) = previous {
            self.lobs.swap_remove(&previous);
        }
        Ok(assigned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temp_lob_lifecycle() {
        let mut transport = MemoryLobTransport::new();
        let temp = transport.create_temp_lob(OracleType::Blob).unwrap();
        assert!(temp.is_temp());
        assert!(temp.is_initialized());
        assert!(temp.is_blob());
        assert_eq!(transport.temp_lob_count(), 1);

        transport.write_lob(&temp, 1, b"hello").unwrap();
        transport.write_lob(&temp, 6, b" world").unwrap();
        assert_eq!(transport.lob_length(&temp).unwrap(), 11);

        transport.free_temp_lob(&temp).unwrap();
        assert_eq!(transport.temp_lob_count(), 0);
        assert!(transport.free_temp_lob(&temp).is_err());
    }

    #[test]
    fn test_overwrite_in_place() {
        let mut transport = MemoryLobTransport::new();
        let temp = transport.create_temp_lob(OracleType::Blob).unwrap();
        transport.write_lob(&temp, 1, b"abcdef").unwrap();
        transport.write_lob(&temp, 3, b"XY").unwrap();
        let data = transport.read_lob(&temp, 1, 100).unwrap();
        assert_eq!(data.as_bytes().unwrap().as_ref(), b"abXYef");
        assert!(transport.write_lob(&temp, 10, b"gap").is_err());
    }

    #[test]
    fn test_clob_counts_characters() {
        let mut transport = MemoryLobTransport::new();
        let temp = transport.create_temp_lob(OracleType::Clob).unwrap();
        transport.write_lob(&temp, 1, "größe".as_bytes()).unwrap();
        assert_eq!(transport.lob_length(&temp).unwrap(), 5);
        let data = transport.read_lob(&temp, 3, 2).unwrap();
        assert_eq!(data.as_string().unwrap(), "öß");
    }

    #[test]
    fn test_assign_replaces_column() {
        let mut transport = MemoryLobTransport::new();
        let temp = transport.create_temp_lob(OracleType::Blob).unwrap();
        transport.write_lob(&temp, 1, b"first").unwrap();
        let first = transport.assign_lob("doc", Some(&temp)).unwrap().unwrap();
        assert!(!first.is_temp());
        assert_eq!(first.size(), 5);
        transport.free_temp_lob(&temp).unwrap();

        let temp = transport.create_temp_lob(OracleType::Blob).unwrap();
        transport.write_lob(&temp, 1, b"2nd").unwrap();
        transport.assign_lob("doc", Some(&temp)).unwrap();
        transport.free_temp_lob(&temp).unwrap();

        assert!(transport.lob_length(&first).is_err());
        assert_eq!(
            transport.column_content("doc").unwrap().as_bytes().unwrap().as_ref(),
            b"2nd"
        );

        assert_eq!(transport.assign_lob("doc", None).unwrap(), None);
        assert_eq!(transport.fetch("doc"), RawValue::Lob(LobValue::Null));
    }

    #[test]
    fn test_frame_limit_and_fault_injection() {
        let mut transport = MemoryLobTransport::new().with_frame_limit(4);
        let temp = transport.create_temp_lob(OracleType::Blob).unwrap();
        assert!(transport.write_lob(&temp, 1, b"12345").is_err());
        assert!(transport.read_lob(&temp, 1, 5).is_err());

        transport.fail_writes_after(Some(1));
        transport.write_lob(&temp, 1, b"1234").unwrap();
        assert!(transport.write_lob(&temp, 5, b"5678").is_err());
        assert_eq!(transport.write_calls(), 3);
    }

    #[test]
    fn test_fetch_prefetches_small_lobs() {
        let mut transport = MemoryLobTransport::new().with_prefetch(16);
        let temp = transport.create_temp_lob(OracleType::Blob).unwrap();
        transport.write_lob(&temp, 1, b"tiny").unwrap();
        transport.assign_lob("doc", Some(&temp)).unwrap();

        assert_eq!(
            transport.fetch("doc"),
            RawValue::Lob(LobValue::Inline(Bytes::from_static(b"tiny")))
        );
    }
}
