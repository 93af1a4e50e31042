//! Endpoint address sources.
//!
//! # Responsibilities
//! - Load the optional hosts file (JSON array of address strings)
//! - Normalize addresses lacking a scheme
//! - Merge custom, file and reference addresses without duplicates

use std::collections::HashSet;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Scheme prepended to addresses that carry none.
pub const DEFAULT_SCHEME: &str = "http://";

const KNOWN_SCHEMES: [&str; 4] = ["http://", "https://", "ws://", "wss://"];

#[derive(Debug, Error)]
pub enum HostsError {
    #[error("failed to read hosts file: {0}")]
    Io(#[from] std::io::Error),

    #[error("hosts file is not a JSON array of strings: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Prefix `http://` to addresses without a recognized scheme.
pub fn normalize_address(address: &str) -> String {
    let trimmed = address.trim();
    let lower = trimmed.to_ascii_lowercase();
    if KNOWN_SCHEMES.iter().any(|scheme| lower.starts_with(scheme)) {
        trimmed.to_string()
    } else {
        format!("{DEFAULT_SCHEME}{trimmed}")
    }
}

/// Read a hosts file and return its normalized addresses.
pub fn load_hosts_file(path: &Path) -> Result<Vec<String>, HostsError> {
    let content = fs::read_to_string(path)?;
    let hosts: Vec<String> = serde_json::from_str(&content)?;
    Ok(hosts
        .iter()
        .filter(|host| !host.trim().is_empty())
        .map(|host| normalize_address(host))
        .collect())
}

/// Like [`load_hosts_file`] but absorbs failures as an empty list.
pub fn load_hosts_or_empty(path: &Path) -> Vec<String> {
    match load_hosts_file(path) {
        Ok(hosts) => {
            tracing::info!(path = %path.display(), count = hosts.len(), "Loaded RPC hosts file");
            hosts
        }
        Err(e) => {
            tracing::error!(path = %path.display(), error = %e, "Failed to load RPC hosts file, ignoring it");
            Vec::new()
        }
    }
}

/// Union of custom, file-loaded and reference addresses.
///
/// Order follows first occurrence: custom, then file, then reference.
/// Only hosts-file entries get a default scheme; `from_file` is expected to
/// be normalized already.
pub fn merge_addresses(custom: &[String], from_file: &[String], reference: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut merged = Vec::new();

    let candidates = custom
        .iter()
        .map(|address| address.trim().to_string())
        .chain(from_file.iter().cloned())
        .chain(std::iter::once(reference.trim().to_string()));

    for address in candidates {
        if address.is_empty() || address == DEFAULT_SCHEME {
            continue;
        }
        if seen.insert(address.clone()) {
            merged.push(address);
        }
    }
    merged
}
