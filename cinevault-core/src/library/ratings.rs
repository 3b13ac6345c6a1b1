//! Star ratings with a running average per title.

use cinevault_model::prelude::{ContentId, ContentKind};
use dashmap::DashMap;

use crate::error::{LibraryError, LibraryResult};

const MIN_RATING: u8 = 1;
const MAX_RATING: u8 = 5;

/// Rating state for one title.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatingSummary {
    pub kind: ContentKind,
    pub user_rating: u8,
    pub average: f32,
    pub total: u32,
}

#[derive(Debug, Default)]
pub struct RatingsStore {
    entries: DashMap<ContentId, RatingSummary>,
}

impl RatingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `rating` for `id`. Every call counts as one more rating in the
    /// average, including re-rates.
    pub fn set_rating(
        &self,
        id: &ContentId,
        kind: ContentKind,
        rating: u8,
    ) -> LibraryResult<RatingSummary> {
        if !(MIN_RATING..=MAX_RATING).contains(&rating) {
            return Err(LibraryError::InvalidRating(rating));
        }

        let mut entry = self.entries.entry(id.clone()).or_insert(RatingSummary {
            kind,
            user_rating: 0,
            average: 0.0,
            total: 0,
        });
        let total = entry.total + 1;
        entry.average = (entry.average * entry.total as f32 + f32::from(rating)) / total as f32;
        entry.total = total;
        entry.user_rating = rating;
        Ok(*entry)
    }

    pub fn user_rating(&self, id: &ContentId) -> u8 {
        self.entries.get(id).map_or(0, |entry| entry.user_rating)
    }

    pub fn average_rating(&self, id: &ContentId) -> f32 {
        self.entries.get(id).map_or(0.0, |entry| entry.average)
    }

    pub fn total_ratings(&self, id: &ContentId) -> u32 {
        self.entries.get(id).map_or(0, |entry| entry.total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn running_average() {
        let ratings = RatingsStore::new();
        let id = ContentId::new("sr-1").unwrap();

        ratings.set_rating(&id, ContentKind::Series, 4).unwrap();
        let summary = ratings.set_rating(&id, ContentKind::Series, 2).unwrap();

        assert_eq!(summary.total, 2);
        assert_eq!(summary.user_rating, 2);
        assert!((summary.average - 3.0).abs() < f32::EPSILON);
        assert_eq!(ratings.total_ratings(&id), 2);
    }

    #[test]
    fn out_of_range_rejected() {
        let ratings = RatingsStore::new();
        let id = ContentId::new("sr-1").unwrap();

        assert_eq!(
            ratings.set_rating(&id, ContentKind::Series, 0),
            Err(LibraryError::InvalidRating(0))
        );
        assert!(ratings.set_rating(&id, ContentKind::Series, 6).is_err());
        assert_eq!(ratings.user_rating(&id), 0);
        assert_eq!(ratings.average_rating(&id), 0.0);
    }
}
