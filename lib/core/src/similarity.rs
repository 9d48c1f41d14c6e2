use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Precomputed square matrix of pairwise similarity scores.
///
/// Stored row-major; `row(i)[j]` is the similarity of item `j` to item `i`.
/// No symmetry or diagonal value is assumed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityIndex {
    dim: usize,
    scores: Vec<f64>,
}

impl SimilarityIndex {
    /// Build from a flat row-major buffer of `dim * dim` scores
    pub fn from_flat(dim: usize, scores: Vec<f64>) -> Result<Self> {
        let expected = dim
            .checked_mul(dim)
            .ok_or_else(|| Error::Integrity(format!("similarity dimension {} overflows", dim)))?;
        if scores.len() != expected {
            return Err(Error::InvalidDimension {
                expected,
                actual: scores.len(),
            });
        }
        Ok(Self { dim, scores })
    }

    /// Build from nested rows; every row must have exactly `rows.len()` entries
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self> {
        let dim = rows.len();
        let mut scores = Vec::with_capacity(dim * dim);
        for row in rows {
            if row.len() != dim {
                return Err(Error::InvalidDimension {
                    expected: dim,
                    actual: row.len(),
                });
            }
            scores.extend(row);
        }
        Ok(Self { dim, scores })
    }

    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.dim == 0
    }

    #[inline]
    pub fn row(&self, index: usize) -> Option<&[f64]> {
        if index >= self.dim {
            return None;
        }
        let start = index * self.dim;
        Some(&self.scores[start..start + self.dim])
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if col >= self.dim {
            return None;
        }
        self.row(row).map(|r| r[col])
    }

    /// Flat row-major view of all scores
    pub fn as_slice(&self) -> &[f64] {
        &self.scores
    }

    pub fn into_flat(self) -> (usize, Vec<f64>) {
        (self.dim, self.scores)
    }
}
