use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::{
    error::{WalletError, WalletResult},
    eth::{erc20_retriver::TokenBalance, wallet::parse_address},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchlistEntry {
    pub address: String,
    #[serde(default)]
    pub label: Option<String>,
}

impl WatchlistEntry {
    pub fn new(address: String, label: Option<String>) -> Self {
        Self { address, label }
    }
}

/// Balance read for one watchlist entry. `outcome` is an error when the
/// token was skipped, which is distinct from a zero balance.
#[derive(Debug)]
pub struct WatchlistEntryBalance {
    pub entry: WatchlistEntry,
    pub outcome: WalletResult<TokenBalance>,
}

/// Missing file is an empty watchlist.
pub fn load(path: &Path) -> WalletResult<Vec<WatchlistEntry>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let raw = fs::read_to_string(path)?;
    serde_json::from_str(&raw)
        .map_err(|e| WalletError::Corrupt(format!("watchlist {}: {e}", path.display())))
}

pub fn save(path: &Path, entries: &[WatchlistEntry]) -> WalletResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let payload = serde_json::to_string_pretty(entries)
        .map_err(|e| WalletError::Corrupt(format!("failed to serialize watchlist: {e}")))?;
    fs::write(path, payload)?;
    Ok(())
}

/// Adds `address` unless a token with the same address is already tracked.
/// Returns whether the list changed.
pub fn track(
    entries: &mut Vec<WatchlistEntry>,
    address: &str,
    label: Option<String>,
) -> WalletResult<bool> {
    let parsed = parse_address(address)?;
    if entries
        .iter()
        .any(|e| parse_address(&e.address).is_ok_and(|a| a == parsed))
    {
        return Ok(false);
    }
    entries.push(WatchlistEntry::new(parsed.to_checksum(None), label));
    Ok(true)
}

pub fn untrack(entries: &mut Vec<WatchlistEntry>, address: &str) -> WalletResult<bool> {
    let parsed = parse_address(address)?;
    let before = entries.len();
    entries.retain(|e| parse_address(&e.address).map_or(true, |a| a != parsed));
    Ok(entries.len() != before)
}
