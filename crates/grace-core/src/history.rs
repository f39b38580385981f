//! Capped snapshot history.
//!
//! Appends until `cap` entries are held, then ignores further pushes. Not a
//! ring: entry `i` is always the snapshot taken after tick `i + 1`.

use serde::Serialize;

/// Append-until-full snapshot buffer.
#[derive(Debug, Clone, Serialize)]
pub struct History<T> {
    cap: usize,
    entries: Vec<T>,
}

impl<T> History<T> {
    /// History that keeps at most `cap` snapshots. A cap of 0 keeps none.
    pub fn with_cap(cap: usize) -> Self {
        Self {
            cap,
            entries: Vec::with_capacity(cap.min(1024)),
        }
    }

    /// Record a snapshot if there is room. Returns whether it was stored.
    pub fn record(&mut self, entry: T) -> bool {
        if self.is_full() {
            return false;
        }
        self.entries.push(entry);
        true
    }

    pub fn is_full(&self) -> bool {
        self.entries.len() >= self.cap
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.entries.get(index)
    }

    pub fn latest(&self) -> Option<&T> {
        self.entries.last()
    }

    pub fn entries(&self) -> &[T] {
        &self.entries
    }
}
