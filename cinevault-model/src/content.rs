use std::fmt;
use std::str::FromStr;

use crate::error::ModelError;
use crate::ids::ContentId;

/// Whether a catalog entry is a single film or an episodic series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ContentKind {
    Movie,
    Series,
}

impl ContentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Movie => "movie",
            ContentKind::Series => "series",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentKind {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "movie" => Ok(ContentKind::Movie),
            "series" => Ok(ContentKind::Series),
            other => Err(ModelError::UnknownKind(other.to_string())),
        }
    }
}

/// A browsable catalog entry.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Content {
    pub id: ContentId,
    pub title: String,
    pub description: String,
    pub poster: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub backdrop: Option<String>,
    pub year: u16,
    pub kind: ContentKind,
    pub genre: String,
    /// Runtime in minutes.
    pub duration: u32,
    pub rating: f32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub video_uri: Option<String>,
}

impl Content {
    pub fn is_playable(&self) -> bool {
        self.video_uri
            .as_deref()
            .is_some_and(|uri| !uri.trim().is_empty())
    }
}
