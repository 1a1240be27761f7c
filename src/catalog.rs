use std::collections::HashSet;

use serde::Deserialize;
use thiserror::Error;

use crate::models::Title;

/// Raw shape of the bundled catalog file.
#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    trending: Vec<Title>,
    #[serde(default)]
    movies: Vec<Title>,
    #[serde(default)]
    tvshows: Vec<Title>,
    #[serde(default)]
    new_popular: Vec<Title>,
    #[serde(default)]
    my_list: Vec<Title>,
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("invalid catalog data: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Immutable, in-memory collections of titles. Titles are unique by `title`
/// within the unified collection; lookups are by exact title string.
#[derive(Debug, Default)]
pub struct Catalog {
    pub trending: Vec<Title>,
    pub movies: Vec<Title>,
    pub tvshows: Vec<Title>,
    pub new_popular: Vec<Title>,
    pub my_list: Vec<Title>,
    all: Vec<Title>,
}

impl Catalog {
    pub fn from_json(data: &str) -> Result<Catalog, CatalogError> {
        let file: CatalogFile = serde_json::from_str(data)?;

        // Unified collection: concatenation in section order, first
        // occurrence of a title wins.
        let mut seen: HashSet<String> = HashSet::new();
        let mut all = Vec::new();
        for t in file
            .trending
            .iter()
            .chain(&file.movies)
            .chain(&file.tvshows)
            .chain(&file.new_popular)
            .chain(&file.my_list)
        {
            if seen.insert(t.title.clone()) {
                all.push(t.clone());
            }
        }

        Ok(Catalog {
            trending: file.trending,
            movies: file.movies,
            tvshows: file.tvshows,
            new_popular: file.new_popular,
            my_list: file.my_list,
            all,
        })
    }

    /// The catalog bundled with the binary.
    pub fn embedded() -> Result<Catalog, CatalogError> {
        Catalog::from_json(include_str!("../assets/catalog.json"))
    }

    /// Every distinct title across all collections, in section order.
    pub fn all(&self) -> &[Title] {
        &self.all
    }

    /// Exact title-string lookup against the unified collection.
    pub fn find(&self, title: &str) -> Option<&Title> {
        self.all.iter().find(|t| t.title == title)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_catalog_parses() {
        let cat = Catalog::embedded().unwrap();
        assert!(!cat.trending.is_empty());
        assert!(!cat.tvshows.is_empty());
        assert!(cat.tvshows.iter().all(|t| t.is_tv()));
        assert!(cat.movies.iter().all(|t| !t.is_tv()));
    }

    #[test]
    fn test_unified_collection_unique_by_title() {
        let cat = Catalog::embedded().unwrap();
        let mut seen = HashSet::new();
        for t in cat.all() {
            assert!(seen.insert(t.title.clone()), "duplicate title {}", t.title);
        }
        // Overlapping sections collapse into one entry.
        assert!(cat.all().len() < cat.trending.len() + cat.movies.len() + cat.tvshows.len() + cat.new_popular.len() + cat.my_list.len());
    }

    #[test]
    fn test_find_exact_match_only() {
        let cat = Catalog::embedded().unwrap();
        assert!(cat.find("Hollow Pines").is_some());
        assert!(cat.find("hollow pines").is_none());
        assert!(cat.find("Hollow").is_none());
    }

    #[test]
    fn test_bad_data_is_a_decode_error() {
        assert!(Catalog::from_json("{not json").is_err());
    }
}
