use crate::{Error, Result};
use ahash::AHashMap;
use serde::{Deserialize, Serialize};

/// A single record of the catalog dataset.
///
/// Only `title` is required; other columns of the source table are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieRecord {
    #[serde(default)]
    pub movie_id: Option<u64>,
    pub title: String,
}

impl MovieRecord {
    pub fn new(movie_id: Option<u64>, title: impl Into<String>) -> Self {
        Self {
            movie_id,
            title: title.into(),
        }
    }
}

/// A recommendable item with its fixed position in the catalog
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub index: usize,
    pub id: Option<u64>,
    pub name: String,
}

/// Ordered, immutable set of items.
///
/// `items[i].index == i` holds for every item. Names are not unique in the
/// source data; [`Catalog::resolve`] returns the first item carrying a name.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    items: Vec<Item>,
    // lowercased names, parallel to `items`
    folded: Vec<String>,
    by_name: AHashMap<String, usize>,
}

impl Catalog {
    pub fn from_records(records: Vec<MovieRecord>) -> Self {
        let mut items = Vec::with_capacity(records.len());
        let mut folded = Vec::with_capacity(records.len());
        let mut by_name = AHashMap::with_capacity(records.len());

        for (index, record) in records.into_iter().enumerate() {
            by_name.entry(record.title.clone()).or_insert(index);
            folded.push(record.title.to_lowercase());
            items.push(Item {
                index,
                id: record.movie_id,
                name: record.title,
            });
        }

        Self { items, folded, by_name }
    }

    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::from_records(
            names
                .into_iter()
                .map(|name| MovieRecord::new(None, name))
                .collect(),
        )
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Item> {
        self.items.get(index)
    }

    pub fn name(&self, index: usize) -> Option<&str> {
        self.items.get(index).map(|item| item.name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Item> {
        self.items.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(|item| item.name.as_str())
    }

    /// Exact, case-sensitive lookup of the first item named `name`
    pub fn resolve(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    /// All names containing `query` case-insensitively, in catalog order.
    ///
    /// The query is matched literally, not as a pattern.
    pub fn matches<'a>(&'a self, query: &str) -> impl Iterator<Item = &'a str> + 'a {
        let needle = query.to_lowercase();
        self.folded
            .iter()
            .zip(self.items.iter())
            .filter(move |(folded, _)| folded.contains(needle.as_str()))
            .map(|(_, item)| item.name.as_str())
    }

    /// Up to `limit` names containing `query`, see [`Catalog::matches`]
    pub fn search(&self, query: &str, limit: usize) -> Result<Vec<&str>> {
        if query.is_empty() {
            return Err(Error::InvalidInput("search query must not be empty".to_string()));
        }
        Ok(self.matches(query).take(limit).collect())
    }

    /// Names on 1-based page `page`, clipped to the catalog bounds
    pub fn page(&self, page: usize, per_page: usize) -> Vec<&str> {
        if page == 0 || per_page == 0 {
            return Vec::new();
        }
        let start = (page - 1).saturating_mul(per_page);
        if start >= self.items.len() {
            return Vec::new();
        }
        let end = start.saturating_add(per_page).min(self.items.len());
        self.items[start..end].iter().map(|item| item.name.as_str()).collect()
    }
}

impl FromIterator<MovieRecord> for Catalog {
    fn from_iter<T: IntoIterator<Item = MovieRecord>>(iter: T) -> Self {
        Self::from_records(iter.into_iter().collect())
    }
}
