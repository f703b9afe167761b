//! Recent-search history.

use serde::{Deserialize, Serialize};

use super::VerificationMethod;

/// Most entries kept per user.
pub const MAX_HISTORY_ITEMS: usize = 5;

/// One remembered search. Identity is the (term, method) pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub term: String,
    pub method: VerificationMethod,
}

impl HistoryEntry {
    pub fn new(term: impl Into<String>, method: VerificationMethod) -> Self {
        Self {
            term: term.into(),
            method,
        }
    }
}

/// Bounded, de-duplicated search history, most recent first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHistory {
    entries: Vec<HistoryEntry>,
}

impl SearchHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from stored entries (most recent first), enforcing the
    /// uniqueness and size rules.
    pub fn from_entries(entries: Vec<HistoryEntry>) -> Self {
        let mut history = Self::new();
        for entry in entries.into_iter().rev() {
            history.record(entry);
        }
        history
    }

    /// Put `entry` at the front, dropping any earlier copy and the oldest
    /// entries past the cap.
    pub fn record(&mut self, entry: HistoryEntry) {
        self.entries.retain(|e| e != &entry);
        self.entries.insert(0, entry);
        self.entries.truncate(MAX_HISTORY_ITEMS);
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
