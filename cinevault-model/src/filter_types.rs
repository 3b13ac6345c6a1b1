use crate::content::{Content, ContentKind};

/// Kind restriction used by the search screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum KindFilter {
    #[default]
    All,
    Movie,
    Series,
}

impl KindFilter {
    pub fn admits(&self, kind: ContentKind) -> bool {
        match self {
            KindFilter::All => true,
            KindFilter::Movie => kind == ContentKind::Movie,
            KindFilter::Series => kind == ContentKind::Series,
        }
    }
}

/// Filters applied to catalog listings. Unset fields match everything.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SearchFilters {
    #[cfg_attr(feature = "serde", serde(default))]
    pub kind: KindFilter,
    #[cfg_attr(feature = "serde", serde(default))]
    pub genre: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub year: Option<u16>,
}

impl SearchFilters {
    pub fn matches(&self, content: &Content) -> bool {
        if !self.kind.admits(content.kind) {
            return false;
        }

        if let Some(genre) = self.genre.as_deref()
            && !content.genre.eq_ignore_ascii_case(genre.trim())
        {
            return false;
        }

        self.year.is_none_or(|year| content.year == year)
    }
}
