//! Bounded, linear undo/redo log of buffer snapshots

use crate::buffer::PixelBuffer;
use crate::config::DEFAULT_HISTORY_CAPACITY;
use crate::error::{EditorError, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::VecDeque;

/// One immutable snapshot in the history log
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    buffer: PixelBuffer,
    label: String,
    recorded_at: DateTime<Utc>,
}

impl HistoryEntry {
    fn new(buffer: PixelBuffer, label: impl Into<String>) -> Self {
        Self {
            buffer,
            label: label.into(),
            recorded_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn buffer(&self) -> &PixelBuffer {
        &self.buffer
    }

    /// Name of the action that produced this snapshot
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[must_use]
    pub fn recorded_at(&self) -> DateTime<Utc> {
        self.recorded_at
    }
}

/// Serializable summary of a history entry, without pixel data
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryEntryInfo {
    pub index: usize,
    pub label: String,
    pub recorded_at: DateTime<Utc>,
    pub width: u32,
    pub height: u32,
    pub is_current: bool,
}

/// Linear history with a cursor.
///
/// Entries after the cursor are the redo branch; committing from a non-tip
/// cursor discards them. When the log grows past `capacity`, the oldest
/// snapshot is evicted and the cursor shifts with it so it keeps pointing at
/// the same logical state.
#[derive(Debug, Clone)]
pub struct EditHistory {
    entries: VecDeque<HistoryEntry>,
    cursor: usize,
    capacity: usize,
}

impl Default for EditHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

impl EditHistory {
    /// Empty history holding at most `capacity` snapshots (minimum 1)
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            cursor: 0,
            capacity,
        }
    }

    /// Drop all entries and start over with `buffer` as the only state
    pub fn seed(&mut self, buffer: PixelBuffer) {
        self.entries.clear();
        self.entries.push_back(HistoryEntry::new(buffer, "original"));
        self.cursor = 0;
    }

    /// Append `buffer` as the new tip, discarding any redo branch
    pub fn commit(&mut self, buffer: PixelBuffer, label: impl Into<String>) {
        if !self.entries.is_empty() {
            self.entries.truncate(self.cursor + 1);
        }
        self.entries.push_back(HistoryEntry::new(buffer, label));
        self.cursor = self.entries.len() - 1;

        while self.entries.len() > self.capacity {
            if self.entries.pop_front().is_some() {
                self.cursor = self.cursor.saturating_sub(1);
            }
        }
    }

    /// Step back one snapshot
    ///
    /// # Errors
    /// - `NoOp` when already at the oldest snapshot
    pub fn undo(&mut self) -> Result<&PixelBuffer> {
        if self.entries.is_empty() || self.cursor == 0 {
            return Err(EditorError::no_op("undo"));
        }
        self.cursor -= 1;
        Ok(&self.entries[self.cursor].buffer)
    }

    /// Step forward one snapshot
    ///
    /// # Errors
    /// - `NoOp` when already at the newest snapshot
    pub fn redo(&mut self) -> Result<&PixelBuffer> {
        if self.cursor + 1 >= self.entries.len() {
            return Err(EditorError::no_op("redo"));
        }
        self.cursor += 1;
        Ok(&self.entries[self.cursor].buffer)
    }

    /// Snapshot under the cursor
    #[must_use]
    pub fn current(&self) -> Option<&PixelBuffer> {
        self.entries.get(self.cursor).map(HistoryEntry::buffer)
    }

    #[must_use]
    pub fn current_entry(&self) -> Option<&HistoryEntry> {
        self.entries.get(self.cursor)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.entries.is_empty() && self.cursor > 0
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    /// Labels of all snapshots, oldest first
    #[must_use]
    pub fn labels(&self) -> Vec<&str> {
        self.entries.iter().map(HistoryEntry::label).collect()
    }

    /// Per-entry summaries for display or serialization
    #[must_use]
    pub fn entries_info(&self) -> Vec<HistoryEntryInfo> {
        self.entries
            .iter()
            .enumerate()
            .map(|(index, entry)| HistoryEntryInfo {
                index,
                label: entry.label.clone(),
                recorded_at: entry.recorded_at,
                width: entry.buffer.width(),
                height: entry.buffer.height(),
                is_current: index == self.cursor,
            })
            .collect()
    }

    /// Approximate bytes held by stored pixel data
    #[must_use]
    pub fn memory_usage(&self) -> usize {
        self.entries.iter().map(|e| e.buffer.byte_len()).sum()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = 0;
    }
}
