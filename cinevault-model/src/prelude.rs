//! Client focused snapshot of the types surface.
//! Prefer importing from this module instead of individual tree nodes when
//! working in cinevault-core or presentation layers.

pub use super::content::{Content, ContentKind};
pub use super::error::ModelError;
pub use super::filter_types::{KindFilter, SearchFilters};
pub use super::ids::{ContentId, ProfileId};
pub use super::profile::{Profile, ProfileDraft};
