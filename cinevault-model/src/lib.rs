//! Core data model definitions shared across CineVault crates.
#![allow(missing_docs)]

pub mod content;
pub mod error;
pub mod filter_types;
pub mod ids;
pub mod prelude;
pub mod profile;

// Intentionally curated re-exports for downstream consumers.
pub use content::{Content, ContentKind};
pub use error::{ModelError, Result};
pub use filter_types::{KindFilter, SearchFilters};
pub use ids::{ContentId, ProfileId};
pub use profile::{Profile, ProfileDraft};
