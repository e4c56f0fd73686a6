//! Token store seam, token table, and an SMI-backed store.

use log::{debug, info};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::codec::{payload_from_token_value, token_value_from_payload};
use crate::constants::*;
use crate::error::{Result, SmbiosError};
use crate::smi::{checked_call, SmiRequest, SmiTransport};
use crate::types::{TokenId, TokenKind};

/// Access to firmware tokens.
///
/// Every call goes to firmware; implementations must not cache.
pub trait TokenStore {
    /// Whether a boolean token is currently selected
    fn is_active(&mut self, token: TokenId) -> Result<bool>;

    /// Select a boolean token
    fn activate(&mut self, token: TokenId) -> Result<()>;

    /// Read a byte-string token's payload
    fn read_bytes(&mut self, token: TokenId, len: usize) -> Result<Vec<u8>>;

    /// Replace a byte-string token's payload
    fn write_bytes(&mut self, token: TokenId, payload: &[u8]) -> Result<()>;
}

impl<S: TokenStore + ?Sized> TokenStore for &mut S {
    fn is_active(&mut self, token: TokenId) -> Result<bool> {
        (**self).is_active(token)
    }

    fn activate(&mut self, token: TokenId) -> Result<()> {
        (**self).activate(token)
    }

    fn read_bytes(&mut self, token: TokenId, len: usize) -> Result<Vec<u8>> {
        (**self).read_bytes(token, len)
    }

    fn write_bytes(&mut self, token: TokenId, payload: &[u8]) -> Result<()> {
        (**self).write_bytes(token, payload)
    }
}

/// Where a token lives and which value selects it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenEntry {
    pub location: u16,
    pub value: u16,
}

/// Token id to location/value mapping from the platform tables
#[derive(Debug, Clone, Default)]
pub struct TokenTable {
    entries: HashMap<TokenId, TokenEntry>,
}

impl TokenTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, token: TokenId, entry: TokenEntry) {
        self.entries.insert(token, entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up a token, failing with [`SmbiosError::UnknownToken`]
    pub fn entry(&self, token: TokenId) -> Result<TokenEntry> {
        self.entries
            .get(&token)
            .copied()
            .ok_or(SmbiosError::UnknownToken { token })
    }

    /// Load the kernel's token export from [`SYSFS_TOKEN_DIR`]
    pub fn load_sysfs() -> Result<Self> {
        Self::load_dir(SYSFS_TOKEN_DIR)
    }

    /// Load a token export directory.
    ///
    /// Each token appears as a pair of files `<id>_location` and `<id>_value`,
    /// the id being four hex digits and the contents a hex number.
    pub fn load_dir<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        let mut table = TokenTable::new();

        for dirent in fs::read_dir(dir)? {
            let name = dirent?.file_name();
            let name = name.to_string_lossy();
            let Some(id) = name.strip_suffix("_location") else {
                continue;
            };
            let token = TokenId(parse_hex(id, &name)?);
            let location = read_hex_file(&dir.join(format!("{}_location", id)))?;
            let value = read_hex_file(&dir.join(format!("{}_value", id)))?;
            table.insert(token, TokenEntry { location, value });
        }

        info!("Loaded {} tokens from {}", table.len(), dir.display());
        Ok(table)
    }
}

fn parse_hex(text: &str, origin: &str) -> Result<u16> {
    let trimmed = text.trim();
    let digits = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    let wide = u32::from_str_radix(digits, 16)
        .map_err(|e| SmbiosError::MalformedTable(format!("{}: {:?} is not hex: {}", origin, trimmed, e)))?;
    u16::try_from(wide).map_err(|_| SmbiosError::MalformedTable(format!("{}: {:#x} does not fit 16 bits", origin, wide)))
}

fn read_hex_file(path: &Path) -> Result<u16> {
    let text = fs::read_to_string(path)?;
    parse_hex(&text, &path.display().to_string())
}

/// Token store that reads and writes tokens through the SMI calling interface
pub struct SmiTokenStore<T: SmiTransport> {
    table: TokenTable,
    transport: T,
}

impl<T: SmiTransport> SmiTokenStore<T> {
    pub fn new(table: TokenTable, transport: T) -> Self {
        SmiTokenStore { table, transport }
    }

    pub fn table(&self) -> &TokenTable {
        &self.table
    }

    /// Give back the transport
    pub fn into_transport(self) -> T {
        self.transport
    }

    fn read_location(&mut self, entry: TokenEntry) -> Result<u32> {
        let request = SmiRequest::new(SMI_CLASS_TOKEN_READ, SMI_SELECT_TOKEN_STD, entry.location.into(), 0);
        Ok(checked_call(&mut self.transport, request)?.reg2)
    }

    fn ensure_kind(token: TokenId, wanted: TokenKind) -> Result<()> {
        match token.kind() {
            Some(kind) if kind != wanted => Err(SmbiosError::ManipulationRejected {
                token,
                reason: format!("{:?} token cannot be written as {:?}", kind, wanted),
            }),
            _ => Ok(()),
        }
    }

    fn write_location(&mut self, token: TokenId, entry: TokenEntry, value: u32) -> Result<()> {
        let request = SmiRequest::new(SMI_CLASS_TOKEN_WRITE, SMI_SELECT_TOKEN_STD, entry.location.into(), value);
        checked_call(&mut self.transport, request).map_err(|e| match e {
            SmbiosError::Transport { status } => SmbiosError::ManipulationRejected {
                token,
                reason: format!("firmware refused write (status {})", status),
            },
            other => other,
        })?;
        Ok(())
    }
}

impl<T: SmiTransport> TokenStore for SmiTokenStore<T> {
    fn is_active(&mut self, token: TokenId) -> Result<bool> {
        let entry = self.table.entry(token)?;
        let current = self.read_location(entry)?;
        debug!("Token {} location {:#06x} holds {:#x}", token, entry.location, current);
        Ok(current == u32::from(entry.value))
    }

    fn activate(&mut self, token: TokenId) -> Result<()> {
        Self::ensure_kind(token, TokenKind::Boolean)?;
        let entry = self.table.entry(token)?;
        debug!("Activating token {}", token);
        self.write_location(token, entry, entry.value.into())
    }

    fn read_bytes(&mut self, token: TokenId, len: usize) -> Result<Vec<u8>> {
        let entry = self.table.entry(token)?;
        let raw = self.read_location(entry)?;
        payload_from_token_value(raw, len)
    }

    fn write_bytes(&mut self, token: TokenId, payload: &[u8]) -> Result<()> {
        Self::ensure_kind(token, TokenKind::ByteString)?;
        let entry = self.table.entry(token)?;
        let value = token_value_from_payload(payload)?;
        debug!("Writing {:02X?} to token {}", payload, token);
        self.write_location(token, entry, value)
    }
}
