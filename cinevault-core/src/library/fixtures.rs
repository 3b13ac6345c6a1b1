//! Built-in catalog used until a content service is wired up.

use cinevault_model::Content;

use crate::error::{LibraryError, LibraryResult};

const CATALOG_JSON: &str = r#"[
  {
    "id": "mv-1001",
    "title": "The Last Projectionist",
    "description": "A night-shift projectionist finds a reel that should not exist.",
    "poster": "posters/last-projectionist.jpg",
    "backdrop": "backdrops/last-projectionist.jpg",
    "year": 2023,
    "kind": "movie",
    "genre": "Thriller",
    "duration": 112,
    "rating": 7.8,
    "video_uri": "https://cdn.cinevault.app/trailers/mv-1001.m3u8"
  },
  {
    "id": "mv-1002",
    "title": "Harbor Lights",
    "description": "Two rival ferry captains are forced to share a route.",
    "poster": "posters/harbor-lights.jpg",
    "year": 2021,
    "kind": "movie",
    "genre": "Comedy",
    "duration": 98,
    "rating": 6.9,
    "video_uri": "https://cdn.cinevault.app/trailers/mv-1002.m3u8"
  },
  {
    "id": "mv-1003",
    "title": "Orbit of Ash",
    "description": "A salvage crew drifts into a dead colony's last broadcast.",
    "poster": "posters/orbit-of-ash.jpg",
    "backdrop": "backdrops/orbit-of-ash.jpg",
    "year": 2023,
    "kind": "movie",
    "genre": "Sci-Fi",
    "duration": 131,
    "rating": 8.1,
    "video_uri": "https://cdn.cinevault.app/trailers/mv-1003.m3u8"
  },
  {
    "id": "mv-1004",
    "title": "Paper Kites",
    "description": "A grandmother teaches her grandson to build kites one summer.",
    "poster": "posters/paper-kites.jpg",
    "year": 2019,
    "kind": "movie",
    "genre": "Family",
    "duration": 87,
    "rating": 7.2
  },
  {
    "id": "sr-2001",
    "title": "Cold Case Radio",
    "description": "A late-night host reopens unsolved cases live on air.",
    "poster": "posters/cold-case-radio.jpg",
    "backdrop": "backdrops/cold-case-radio.jpg",
    "year": 2022,
    "kind": "series",
    "genre": "Thriller",
    "duration": 45,
    "rating": 8.4,
    "video_uri": "https://cdn.cinevault.app/trailers/sr-2001.m3u8"
  },
  {
    "id": "sr-2002",
    "title": "The Greenhouse",
    "description": "Botanists on a remote island grow something they cannot name.",
    "poster": "posters/the-greenhouse.jpg",
    "year": 2023,
    "kind": "series",
    "genre": "Sci-Fi",
    "duration": 52,
    "rating": 7.6,
    "video_uri": "https://cdn.cinevault.app/trailers/sr-2002.m3u8"
  },
  {
    "id": "sr-2003",
    "title": "Kitchen Brigade",
    "description": "A chaotic restaurant crew chases its first star.",
    "poster": "posters/kitchen-brigade.jpg",
    "year": 2020,
    "kind": "series",
    "genre": "Comedy",
    "duration": 28,
    "rating": 7.0
  },
  {
    "id": "sr-2004",
    "title": "Little Lanterns",
    "description": "Friendly lantern creatures light up a sleepy village.",
    "poster": "posters/little-lanterns.jpg",
    "year": 2021,
    "kind": "series",
    "genre": "Family",
    "duration": 12,
    "rating": 6.8,
    "video_uri": "https://cdn.cinevault.app/trailers/sr-2004.m3u8"
  }
]"#;

pub fn catalog_fixtures() -> LibraryResult<Vec<Content>> {
    serde_json::from_str(CATALOG_JSON).map_err(|err| LibraryError::Fixture(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixtures_parse() {
        let items = catalog_fixtures().unwrap();
        assert_eq!(items.len(), 8);
        assert!(items.iter().all(|c| !c.id.as_str().is_empty()));
    }
}
