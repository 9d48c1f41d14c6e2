//! # simrec API
//!
//! HTTP shell around the [`simrec_core::Recommender`].

pub mod rest;

pub use rest::{RestApi, MAX_SEARCH_RESULTS};
