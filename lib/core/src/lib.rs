//! # simrec Core
//!
//! Core library for the simrec recommendation service.
//!
//! This crate provides the in-memory structures and the ranking algorithm:
//!
//! - [`Catalog`] - Ordered, immutable set of items with name lookup and search
//! - [`SimilarityIndex`] - Precomputed N×N similarity matrix
//! - [`Recommender`] - Top-k selection over a similarity row
//!
//! ## Example
//!
//! ```rust
//! use simrec_core::{Catalog, Recommender, SimilarityIndex};
//!
//! let catalog = Catalog::from_names(["Avatar", "Titanic", "Inception"]);
//! let similarity = SimilarityIndex::from_rows(vec![
//!     vec![0.9, 0.95, 0.3],
//!     vec![0.95, 1.0, 0.2],
//!     vec![0.3, 0.2, 1.0],
//! ]).unwrap();
//!
//! let recommender = Recommender::new(catalog, similarity).unwrap();
//! let results = recommender.recommend("Avatar").unwrap();
//!
//! // "Titanic" holds rank 0 in this row and is skipped
//! assert_eq!(results[0].title, "Avatar");
//! assert_eq!(results[1].title, "Inception");
//! ```

pub mod catalog;
pub mod error;
pub mod recommender;
pub mod similarity;

pub use catalog::{Catalog, Item, MovieRecord};
pub use error::{Error, Result};
pub use recommender::{round_score, Recommendation, Recommender, DEFAULT_TOP_K, SCORE_PRECISION};
pub use similarity::SimilarityIndex;
