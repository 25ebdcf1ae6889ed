//! Fixed-capacity, oldest-evicting diagnostic log.
//!
//! The log is a ring buffer: once full, each append overwrites the oldest
//! entry in place, so eviction is O(1) and memory is bounded by the capacity
//! chosen at construction.

use crate::LogEntry;

/// Default event log capacity.
pub const DEFAULT_EVENT_LOG_CAPACITY: usize = 1000;

/// Ring buffer of [`LogEntry`] values, iterated oldest to newest.
#[derive(Debug, Clone)]
pub struct EventLog {
    entries: Vec<LogEntry>,
    /// Index of the oldest entry once the buffer has wrapped; 0 before.
    head: usize,
    capacity: usize,
    total_appended: u64,
    evicted: u64,
}

impl Default for EventLog {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_EVENT_LOG_CAPACITY)
    }
}

impl EventLog {
    /// Create an empty log holding at most `capacity` entries.
    ///
    /// A capacity of zero is raised to one.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: Vec::with_capacity(capacity),
            head: 0,
            capacity,
            total_appended: 0,
            evicted: 0,
        }
    }

    /// Append an entry, returning the evicted oldest entry if the log was full.
    pub fn push(&mut self, entry: LogEntry) -> Option<LogEntry> {
        self.total_appended = self.total_appended.saturating_add(1);

        if self.entries.len() < self.capacity {
            self.entries.push(entry);
            return None;
        }

        let slot = self.entries.get_mut(self.head)?;
        let oldest = core::mem::replace(slot, entry);
        self.head = (self.head + 1) % self.capacity;
        self.evicted = self.evicted.saturating_add(1);
        Some(oldest)
    }

    /// Number of entries currently held.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the log is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Check if the next append will evict.
    pub fn is_full(&self) -> bool {
        self.entries.len() == self.capacity
    }

    /// Maximum number of entries held.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Total number of entries ever appended.
    pub fn total_appended(&self) -> u64 {
        self.total_appended
    }

    /// Number of entries dropped by eviction.
    pub fn evicted(&self) -> u64 {
        self.evicted
    }

    /// Iterate entries from oldest to newest.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &LogEntry> + '_ {
        let (newer, older) = self.entries.split_at(self.head);
        older.iter().chain(newer.iter())
    }

    /// Get the entry at logical position `index` (0 = oldest).
    pub fn get(&self, index: usize) -> Option<&LogEntry> {
        if index >= self.entries.len() {
            return None;
        }
        self.entries.get((self.head + index) % self.capacity)
    }

    /// Oldest retained entry.
    pub fn oldest(&self) -> Option<&LogEntry> {
        self.get(0)
    }

    /// Most recently appended entry.
    pub fn newest(&self) -> Option<&LogEntry> {
        self.iter().next_back()
    }

    /// The last `count` entries, oldest first.
    pub fn recent(&self, count: usize) -> impl Iterator<Item = &LogEntry> + '_ {
        self.iter().skip(self.entries.len().saturating_sub(count))
    }

    /// Remove all entries. Counters are kept.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.head = 0;
    }
}
