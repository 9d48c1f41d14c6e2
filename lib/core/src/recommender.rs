use crate::{Catalog, Error, Result, SimilarityIndex};
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

/// Number of recommendations returned by [`Recommender::recommend`]
pub const DEFAULT_TOP_K: usize = 5;

/// Decimal places kept in reported scores
pub const SCORE_PRECISION: usize = 4;

/// A single ranked result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub title: String,
    pub similarity_score: f64,
}

/// Round a score to [`SCORE_PRECISION`] decimal places.
///
/// Rounds the exact binary value, ties to even, so dyadic scores such as
/// `0.03125` become `0.0312`. Non-finite scores are returned unchanged.
pub fn round_score(score: f64) -> f64 {
    if !score.is_finite() {
        return score;
    }
    format!("{:.*}", SCORE_PRECISION, score)
        .parse()
        .unwrap_or(score)
}

/// Content-based recommender over an immutable catalog and similarity index.
///
/// Built once at startup and shared read-only between request handlers.
#[derive(Debug, Clone)]
pub struct Recommender {
    catalog: Catalog,
    similarity: SimilarityIndex,
}

impl Recommender {
    /// Bind a catalog to its similarity index.
    ///
    /// Fails when the matrix dimension differs from the catalog length.
    pub fn new(catalog: Catalog, similarity: SimilarityIndex) -> Result<Self> {
        if similarity.dim() != catalog.len() {
            return Err(Error::InvalidDimension {
                expected: catalog.len(),
                actual: similarity.dim(),
            });
        }
        Ok(Self { catalog, similarity })
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn similarity(&self) -> &SimilarityIndex {
        &self.similarity
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.catalog.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.catalog.is_empty()
    }

    /// Top [`DEFAULT_TOP_K`] items similar to the item named `name`
    pub fn recommend(&self, name: &str) -> Result<Vec<Recommendation>> {
        self.recommend_top(name, DEFAULT_TOP_K)
    }

    /// Top `k` items similar to the item named `name`.
    ///
    /// The row is sorted by descending score with a stable sort, so tied
    /// scores keep ascending index order. The first ranked entry is always
    /// dropped, whichever item it is; it is not necessarily the query item.
    pub fn recommend_top(&self, name: &str, k: usize) -> Result<Vec<Recommendation>> {
        let index = self
            .catalog
            .resolve(name)
            .ok_or_else(|| Error::NotFound(name.to_string()))?;

        let ranked = self.rank(index)?;

        Ok(ranked
            .into_iter()
            .skip(1)
            .take(k)
            .filter_map(|(j, score)| {
                self.catalog.name(j).map(|title| Recommendation {
                    title: title.to_string(),
                    similarity_score: round_score(score),
                })
            })
            .collect())
    }

    /// Full row of `index` as `(column, score)` pairs, best first
    pub fn rank(&self, index: usize) -> Result<Vec<(usize, f64)>> {
        let row = self.similarity.row(index).ok_or_else(|| {
            Error::Integrity(format!(
                "no similarity row {} for catalog of {} items",
                index,
                self.catalog.len()
            ))
        })?;

        let mut ranked: Vec<(usize, f64)> = row.iter().copied().enumerate().collect();
        ranked.sort_by(|a, b| OrderedFloat(b.1).cmp(&OrderedFloat(a.1)));
        Ok(ranked)
    }
}
