//! Volatile per-conversation message log.
//!
//! Each conversation key owns a bounded, insertion-ordered queue of entries.
//! Once a key holds more than [`MAX_ENTRIES_PER_KEY`] entries the oldest ones
//! are dropped. Nothing here is persisted.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::agent::Message;

pub const MAX_ENTRIES_PER_KEY: usize = 20;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: String,
    pub conversation_key: String,
    pub message: Message,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistoryStats {
    pub total_keys: usize,
    pub total_messages: usize,
    pub avg_per_key: f64,
}

#[derive(Debug)]
pub struct ConversationHistoryStore {
    entries: DashMap<String, VecDeque<HistoryEntry>>,
    max_entries: usize,
}

impl Default for ConversationHistoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversationHistoryStore {
    pub fn new() -> Self {
        Self::with_capacity(MAX_ENTRIES_PER_KEY)
    }

    /// Store with a custom per-key cap (at least one entry is always kept).
    pub fn with_capacity(max_entries: usize) -> Self {
        Self {
            entries: DashMap::new(),
            max_entries: max_entries.max(1),
        }
    }

    /// Append a message and return the id of the new entry.
    pub fn append(&self, key: &str, message: Message) -> String {
        let entry = HistoryEntry {
            id: Uuid::new_v4().to_string(),
            conversation_key: key.to_string(),
            message,
            timestamp: Utc::now(),
        };
        let id = entry.id.clone();

        let mut queue = self.entries.entry(key.to_string()).or_default();
        queue.push_back(entry);
        while queue.len() > self.max_entries {
            queue.pop_front();
        }

        log::debug!("[{}] History now holds {} entries", key, queue.len());
        id
    }

    /// The most recent `limit` messages for `key`, oldest first.
    pub fn recent(&self, key: &str, limit: usize) -> Vec<Message> {
        self.entries
            .get(key)
            .map(|queue| {
                let start = queue.len().saturating_sub(limit);
                queue
                    .iter()
                    .skip(start)
                    .map(|entry| entry.message.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Full entries (with ids and timestamps) for `key`, oldest first.
    pub fn entries(&self, key: &str) -> Vec<HistoryEntry> {
        self.entries
            .get(key)
            .map(|queue| queue.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn len(&self, key: &str) -> usize {
        self.entries.get(key).map(|queue| queue.len()).unwrap_or(0)
    }

    /// Drop every entry for `key`. Returns whether anything was removed.
    pub fn clear(&self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    pub fn stats(&self) -> HistoryStats {
        let total_keys = self.entries.len();
        let total_messages: usize = self.entries.iter().map(|queue| queue.len()).sum();
        let avg_per_key = if total_keys == 0 {
            0.0
        } else {
            total_messages as f64 / total_keys as f64
        };

        HistoryStats {
            total_keys,
            total_messages,
            avg_per_key,
        }
    }
}
