//! Watch-later list: no duplicates, insertion order.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use cinevault_model::{Content, ContentId};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

#[derive(Debug, Clone, PartialEq)]
pub struct SavedItem {
    pub content: Content,
    pub saved_at: DateTime<Utc>,
    seq: u64,
}

#[derive(Debug, Default)]
pub struct WatchLaterStore {
    items: DashMap<ContentId, SavedItem>,
    next_seq: AtomicU64,
}

impl WatchLaterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Save `content`. Returns false if it was already saved.
    pub fn add(&self, content: Content) -> bool {
        match self.items.entry(content.id.clone()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
                slot.insert(SavedItem {
                    content,
                    saved_at: Utc::now(),
                    seq,
                });
                true
            }
        }
    }

    pub fn remove(&self, id: &ContentId) -> bool {
        self.items.remove(id).is_some()
    }

    pub fn contains(&self, id: &ContentId) -> bool {
        self.items.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Saved items, oldest first.
    pub fn list(&self) -> Vec<SavedItem> {
        let mut items: Vec<SavedItem> =
            self.items.iter().map(|entry| entry.value().clone()).collect();
        items.sort_by_key(|item| item.seq);
        items
    }
}
