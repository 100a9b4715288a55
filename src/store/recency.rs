//! Recency Index Module
//!
//! Least-recently-used ordering for capacity eviction in the in-process store.

use std::collections::{BTreeMap, HashMap};

// == Recency Index ==
/// Orders keys by last access using a monotonically increasing stamp.
///
/// `stamps` maps key to its latest stamp and `order` maps stamp back to key,
/// so the smallest stamp in `order` is always the least recently used key.
#[derive(Debug, Default)]
pub struct RecencyIndex {
    clock: u64,
    stamps: HashMap<String, u64>,
    order: BTreeMap<u64, String>,
}

impl RecencyIndex {
    #[cfg(test)]
    pub fn new() -> Self {
        Self::default()
    }

    // == Touch ==
    /// Marks a key as the most recently used, inserting it if new.
    pub fn touch(&mut self, key: &str) {
        self.clock += 1;
        if let Some(previous) = self.stamps.insert(key.to_string(), self.clock) {
            self.order.remove(&previous);
        }
        self.order.insert(self.clock, key.to_string());
    }

    // == Remove ==
    pub fn remove(&mut self, key: &str) {
        if let Some(stamp) = self.stamps.remove(key) {
            self.order.remove(&stamp);
        }
    }

    // == Pop Oldest ==
    /// Removes and returns the least recently used key.
    pub fn pop_oldest(&mut self) -> Option<String> {
        let (_, key) = self.order.pop_first()?;
        self.stamps.remove(&key);
        Some(key)
    }

    #[cfg(test)]
    pub fn peek_oldest(&self) -> Option<&str> {
        self.order.first_key_value().map(|(_, key)| key.as_str())
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.stamps.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.stamps.is_empty()
    }
}
