//! Transport layer for LOB content
//!
//! The coercion layer never talks to the network itself. LOB content is moved
//! through a [`LobTransport`], which a driver implements on top of its LOB
//! operation messages. [`MemoryLobTransport`] keeps everything in process.

mod memory;

pub use memory::MemoryLobTransport;

use crate::constants::OracleType;
use crate::error::Result;
use crate::types::{LobData, LobLocator};

/// Blocking LOB operations offered by a driver connection
///
/// Offsets are 1-based. For CLOBs, offsets, amounts and lengths count
/// characters and written data is UTF-8; for BLOBs they count bytes.
pub trait LobTransport {
    /// Create an empty temporary LOB of the given kind
    fn create_temp_lob(&mut self, kind: OracleType) -> Result<LobLocator>;

    /// Chunk size the server recommends for this LOB
    fn lob_chunk_size(&mut self, locator: &LobLocator) -> Result<u32>;

    /// Current length of the LOB
    fn lob_length(&mut self, locator: &LobLocator) -> Result<u64>;

    /// Read up to `amount` units starting at `offset`
    fn read_lob(&mut self, locator: &LobLocator, offset: u64, amount: u64) -> Result<LobData>;

    /// Write `data` starting at `offset`, overwriting existing content
    fn write_lob(&mut self, locator: &LobLocator, offset: u64, data: &[u8]) -> Result<()>;

    /// Release a temporary LOB
    fn free_temp_lob(&mut self, locator: &LobLocator) -> Result<()>;

    /// Make `locator`'s content the column's value, or NULL for `None`
    ///
    /// Returns the locator of the column's new persistent LOB.
    fn assign_lob(
        &mut self,
        column: &str,
        locator: Option<&LobLocator>,
    ) -> Result<Option<LobLocator>>;
}
