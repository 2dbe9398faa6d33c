//! Content-addressed memo of ingested tables.
//!
//! Identical bytes always map to the same [`LoadedTable`], so re-selecting a
//! file or re-rendering a view never re-parses it. Entries are keyed by the
//! SHA-256 of the file contents and live until [`TableCache::clear`] or
//! [`TableCache::evict`] is called. Failed ingestions are never stored.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use dash_core::error::IngestionError;
use dash_core::models::LoadedTable;
use sha2::{Digest, Sha256};

use crate::ingest;

// ── ContentKey ────────────────────────────────────────────────────────────────

/// SHA-256 digest of a file's bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentKey([u8; 32]);

impl ContentKey {
    pub fn of(bytes: &[u8]) -> Self {
        Self(Sha256::digest(bytes).into())
    }
}

impl fmt::Display for ContentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in &self.0[..6] {
            write!(f, "{:02x}", b)?;
        }
        Ok(())
    }
}

// ── CacheStats ────────────────────────────────────────────────────────────────

/// Hit and miss counters since the cache was created or last cleared.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

// ── TableCache ────────────────────────────────────────────────────────────────

/// Memo of `bytes -> LoadedTable`.
#[derive(Debug, Default)]
pub struct TableCache {
    entries: HashMap<ContentKey, Arc<LoadedTable>>,
    hits: u64,
    misses: u64,
}

impl TableCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached table for `bytes`, ingesting on first sight.
    pub fn get_or_load(&mut self, bytes: &[u8]) -> Result<Arc<LoadedTable>, IngestionError> {
        self.get_or_load_with(bytes, ingest::load)
    }

    /// Same as [`get_or_load`](Self::get_or_load) with a custom loader.
    pub fn get_or_load_with<F>(
        &mut self,
        bytes: &[u8],
        loader: F,
    ) -> Result<Arc<LoadedTable>, IngestionError>
    where
        F: FnOnce(&[u8]) -> Result<LoadedTable, IngestionError>,
    {
        let key = ContentKey::of(bytes);
        if let Some(hit) = self.entries.get(&key) {
            self.hits += 1;
            tracing::debug!(key = %key, "table cache hit");
            return Ok(Arc::clone(hit));
        }

        self.misses += 1;
        let table = Arc::new(loader(bytes)?);
        tracing::debug!(
            key = %key,
            rows = table.table.row_count(),
            "table cache miss; stored"
        );
        self.entries.insert(key, Arc::clone(&table));
        Ok(table)
    }

    pub fn contains(&self, bytes: &[u8]) -> bool {
        self.entries.contains_key(&ContentKey::of(bytes))
    }

    /// Drop the entry for `bytes`. Returns whether one existed.
    pub fn evict(&mut self, bytes: &[u8]) -> bool {
        self.entries.remove(&ContentKey::of(bytes)).is_some()
    }

    /// Discard every entry and reset the counters.
    pub fn clear(&mut self) {
        let dropped = self.entries.len();
        self.entries.clear();
        self.hits = 0;
        self.misses = 0;
        tracing::debug!(dropped, "table cache cleared");
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            entries: self.entries.len(),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
