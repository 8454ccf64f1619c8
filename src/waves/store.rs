//! In-memory store of all known waves.
//!
//! The store is the single delivery sink for both the initial bulk fetch and
//! the live push feed. The two can overlap within a session, so the store
//! keeps an idempotency index over (sender, timestamp, message) and suppresses
//! exact duplicates on append.

use crate::ledger::WaveRecord;
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

/// One recorded wave action. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaveEntry {
    /// Address of the account that sent the wave.
    pub sender: String,
    /// When the wave was mined.
    pub timestamp: DateTime<Utc>,
    /// Message attached to the wave. May be empty.
    pub message: String,
}

impl From<WaveRecord> for WaveEntry {
    fn from(record: WaveRecord) -> Self {
        // Ledger timestamps are Unix seconds; the entry carries an instant
        // built from the millisecond epoch.
        let timestamp =
            DateTime::from_timestamp_millis(record.timestamp * 1000).unwrap_or_default();
        Self {
            sender: record.waver,
            timestamp,
            message: record.message,
        }
    }
}

impl WaveEntry {
    /// Idempotency key for duplicate suppression.
    fn key(&self) -> (String, i64, String) {
        (
            self.sender.clone(),
            self.timestamp.timestamp_millis(),
            self.message.clone(),
        )
    }
}

/// Shared handle to the store, written by the subscription task and read by
/// presentation logic. No lock is held across an await point.
pub type SharedWaveStore = Arc<Mutex<WaveStore>>;

/// Ordered collection of wave entries, oldest known first.
///
/// Entries keep insertion order; push arrivals append regardless of their
/// timestamp value.
#[derive(Debug, Default)]
pub struct WaveStore {
    entries: Vec<WaveEntry>,
    seen: HashSet<(String, i64, String)>,
}

impl WaveStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store behind a shared handle.
    pub fn shared() -> SharedWaveStore {
        Arc::new(Mutex::new(Self::new()))
    }

    /// Bulk-replace the store's contents. Last writer wins; prior contents and
    /// the idempotency index are discarded entirely.
    pub fn replace_all(&mut self, entries: Vec<WaveEntry>) {
        self.entries.clear();
        self.seen.clear();
        for entry in entries {
            self.push_unique(entry);
        }
    }

    /// Append one entry at the end, preserving arrival order.
    ///
    /// Returns false when an exact duplicate was already present, in which
    /// case the store is left untouched.
    pub fn append(&mut self, entry: WaveEntry) -> bool {
        self.push_unique(entry)
    }

    fn push_unique(&mut self, entry: WaveEntry) -> bool {
        if self.seen.insert(entry.key()) {
            self.entries.push(entry);
            true
        } else {
            false
        }
    }

    /// All known waves in insertion order. The returned view cannot mutate
    /// the store.
    pub fn all(&self) -> &[WaveEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
