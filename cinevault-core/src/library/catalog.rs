//! Read-mostly content catalog.

use std::cmp::Reverse;

use cinevault_model::prelude::{Content, ContentId, SearchFilters};
use dashmap::DashMap;

use super::fixtures::catalog_fixtures;
use crate::error::{LibraryError, LibraryResult};

#[derive(Debug, Default)]
pub struct Catalog {
    items: DashMap<ContentId, Content>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog seeded with the built-in titles.
    pub fn with_fixtures() -> LibraryResult<Self> {
        let catalog = Self::new();
        for content in catalog_fixtures()? {
            catalog.insert(content);
        }
        Ok(catalog)
    }

    /// Insert or replace an entry.
    pub fn insert(&self, content: Content) {
        self.items.insert(content.id.clone(), content);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: &ContentId) -> LibraryResult<Content> {
        self.items
            .get(id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| LibraryError::NotFound(id.to_string()))
    }

    /// Everything, newest first, then by title.
    pub fn list(&self) -> Vec<Content> {
        self.collect(|_| true)
    }

    pub fn filter(&self, filters: &SearchFilters) -> Vec<Content> {
        self.collect(|content| filters.matches(content))
    }

    /// Case-insensitive title search. A blank query matches everything that
    /// passes `filters`.
    pub fn search(&self, query: &str, filters: &SearchFilters) -> Vec<Content> {
        let needle = query.trim().to_lowercase();
        self.collect(|content| {
            filters.matches(content)
                && (needle.is_empty() || content.title.to_lowercase().contains(&needle))
        })
    }

    /// Distinct genres, sorted.
    pub fn genres(&self) -> Vec<String> {
        let mut genres: Vec<String> = self
            .items
            .iter()
            .map(|entry| entry.value().genre.clone())
            .collect();
        genres.sort_by_key(|genre| genre.to_lowercase());
        genres.dedup_by(|a, b| a.eq_ignore_ascii_case(b));
        genres
    }

    fn collect<F>(&self, mut keep: F) -> Vec<Content>
    where
        F: FnMut(&Content) -> bool,
    {
        let mut items: Vec<Content> = self
            .items
            .iter()
            .filter(|entry| keep(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();
        items.sort_by(|a, b| {
            (Reverse(a.year), &a.title).cmp(&(Reverse(b.year), &b.title))
        });
        items
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cinevault_model::{ContentKind, KindFilter};

    #[test]
    fn filters_combine() {
        let catalog = Catalog::with_fixtures().unwrap();
        let filters = SearchFilters {
            kind: KindFilter::Series,
            genre: Some("sci-fi".into()),
            year: Some(2023),
        };
        let hits = catalog.filter(&filters);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "The Greenhouse");
        assert_eq!(hits[0].kind, ContentKind::Series);
    }

    #[test]
    fn title_search_ignores_case() {
        let catalog = Catalog::with_fixtures().unwrap();
        let hits = catalog.search("HARBOR", &SearchFilters::default());
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id.as_str(), "mv-1002");
        assert_eq!(catalog.search("  ", &SearchFilters::default()).len(), 8);
    }

    #[test]
    fn listing_is_newest_first() {
        let catalog = Catalog::with_fixtures().unwrap();
        let years: Vec<u16> = catalog.list().iter().map(|c| c.year).collect();
        let mut sorted = years.clone();
        sorted.sort_by(|a, b| b.cmp(a));
        assert_eq!(years, sorted);
    }

    #[test]
    fn missing_item_is_not_found() {
        let catalog = Catalog::new();
        let id = ContentId::new("nope").unwrap();
        assert_eq!(
            catalog.get(&id),
            Err(LibraryError::NotFound("nope".into()))
        );
    }

    #[test]
    fn genres_are_distinct() {
        let catalog = Catalog::with_fixtures().unwrap();
        assert_eq!(
            catalog.genres(),
            vec!["Comedy", "Family", "Sci-Fi", "Thriller"]
        );
    }
}
