//! Per-title likes.

use cinevault_model::prelude::{ContentId, ContentKind};
use dashmap::DashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct LikeEntry {
    kind: ContentKind,
    liked: bool,
    count: u32,
}

#[derive(Debug, Default)]
pub struct LikesStore {
    entries: DashMap<ContentId, LikeEntry>,
}

impl LikesStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip the like on `id`, adjusting its count. Returns the new state.
    pub fn toggle(&self, id: &ContentId, kind: ContentKind) -> bool {
        let mut entry = self.entries.entry(id.clone()).or_insert(LikeEntry {
            kind,
            liked: false,
            count: 0,
        });
        if entry.liked {
            entry.count = entry.count.saturating_sub(1);
        } else {
            entry.count += 1;
        }
        entry.liked = !entry.liked;
        entry.liked
    }

    pub fn is_liked(&self, id: &ContentId) -> bool {
        self.entries.get(id).is_some_and(|entry| entry.liked)
    }

    pub fn likes_count(&self, id: &ContentId) -> u32 {
        self.entries.get(id).map_or(0, |entry| entry.count)
    }

    /// Currently liked titles, ordered by id.
    pub fn liked(&self) -> Vec<(ContentId, ContentKind)> {
        let mut liked: Vec<_> = self
            .entries
            .iter()
            .filter(|entry| entry.liked)
            .map(|entry| (entry.key().clone(), entry.kind))
            .collect();
        liked.sort_by(|a, b| a.0.cmp(&b.0));
        liked
    }
}
