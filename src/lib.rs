//! # simrec
//!
//! Content-based item recommendations served from a precomputed similarity
//! matrix.
//!
//! Given a movie title, simrec resolves it in the catalog, ranks its row of
//! the similarity matrix and returns the five best-scoring titles.
//!
//! ## Quick Start
//!
//! ### As a Server
//!
//! ```bash
//! simrec --data-dir ./data --http-port 5000
//! curl -X POST localhost:5000/api/recommend -H 'content-type: application/json' \
//!      -d '{"movie": "Avatar"}'
//! ```
//!
//! ### As a Library
//!
//! ```rust
//! use simrec::prelude::*;
//!
//! let catalog = Catalog::from_names(["Avatar", "Titanic", "Inception"]);
//! let similarity = SimilarityIndex::from_rows(vec![
//!     vec![1.0, 0.4, 0.2],
//!     vec![0.4, 1.0, 0.1],
//!     vec![0.2, 0.1, 1.0],
//! ]).unwrap();
//! let recommender = Recommender::new(catalog, similarity).unwrap();
//!
//! let results = recommender.recommend("Avatar").unwrap();
//! assert_eq!(results[0].title, "Titanic");
//! ```
//!
//! ## Crate Structure
//!
//! - [`simrec-core`](https://docs.rs/simrec-core) - Catalog, similarity index and ranking
//! - [`simrec-storage`](https://docs.rs/simrec-storage) - Dataset formats, download, startup cache
//! - [`simrec-api`](https://docs.rs/simrec-api) - REST API

// Re-export core types
pub use simrec_core::{
    Catalog, Item, MovieRecord,
    SimilarityIndex,
    Recommender, Recommendation, DEFAULT_TOP_K,
    Error, Result,
};

// Re-export storage
pub use simrec_storage::{DatasetConfig, DatasetManager};

// Re-export API
pub use simrec_api::RestApi;

use std::path::PathBuf;
use std::sync::Arc;
use std::thread::JoinHandle;

/// Run the REST API on a dedicated thread with its own actix system.
///
/// The handle yields the server's exit status, so a failed bind surfaces
/// as an `Err` when joined.
pub fn spawn_http_server(
    recommender: Arc<Recommender>,
    host: String,
    port: u16,
    static_dir: Option<PathBuf>,
) -> JoinHandle<std::io::Result<()>> {
    std::thread::spawn(move || {
        tracing::info!("Starting HTTP server on {}:{}", host, port);
        let sys = actix_web::rt::System::new();
        sys.block_on(RestApi::start(recommender, &host, port, static_dir))
    })
}

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        Catalog, Item, MovieRecord,
        SimilarityIndex,
        Recommender, Recommendation, DEFAULT_TOP_K,
        Error, Result,
        DatasetConfig, DatasetManager,
        RestApi, spawn_http_server,
    };
}
