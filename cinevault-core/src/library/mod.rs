//! In-memory library collaborators: catalog, likes, ratings, watch-later
//! and profiles.

pub mod catalog;
pub mod fixtures;
pub mod likes;
pub mod profiles;
pub mod ratings;
pub mod watch_later;

pub use catalog::Catalog;
pub use likes::LikesStore;
pub use profiles::ProfileStore;
pub use ratings::{RatingSummary, RatingsStore};
pub use watch_later::{SavedItem, WatchLaterStore};

use crate::error::LibraryResult;

/// Every collaborator store behind one handle.
#[derive(Debug, Default)]
pub struct Library {
    pub catalog: Catalog,
    pub likes: LikesStore,
    pub ratings: RatingsStore,
    pub watch_later: WatchLaterStore,
    pub profiles: ProfileStore,
}

impl Library {
    /// Library with the built-in catalog and nothing else.
    pub fn seeded() -> LibraryResult<Self> {
        Ok(Self {
            catalog: Catalog::with_fixtures()?,
            ..Self::default()
        })
    }
}
