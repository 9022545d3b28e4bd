use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Pair identifiers that have already been alerted, with the time of the
/// first alert. Lives for the process lifetime only and never evicts.
///
/// The store is owned by the scheduler and mutated through `&mut self`, so
/// the borrow checker is the serialization point: two cycles cannot both
/// see an identifier as unseen.
#[derive(Debug, Default, Clone)]
pub struct DedupStore {
    entries: HashMap<String, DateTime<Utc>>,
}

impl DedupStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seen(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// Records `id` as alerted now. Returns false if it was already present,
    /// in which case the original timestamp is kept.
    pub fn mark(&mut self, id: &str) -> bool {
        self.mark_at(id, Utc::now())
    }

    pub fn mark_at(&mut self, id: &str, at: DateTime<Utc>) -> bool {
        if self.entries.contains_key(id) {
            return false;
        }
        self.entries.insert(id.to_string(), at);
        true
    }

    pub fn first_alerted(&self, id: &str) -> Option<DateTime<Utc>> {
        self.entries.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
