//! # simrec Storage
//!
//! Startup-time loading of the catalog and similarity datasets.

pub mod cache;
pub mod dataset;
pub mod manager;
pub mod remote;

pub use cache::{DatasetCache, SourceFingerprint};
pub use dataset::{read_catalog, read_similarity, write_catalog, write_similarity, DatasetFormat};
pub use manager::{DatasetConfig, DatasetManager};
pub use remote::{download, sha256_file, sha256_hex};
