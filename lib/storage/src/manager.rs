use crate::cache::{DatasetCache, SourceFingerprint};
use crate::dataset::{read_catalog, read_similarity};
use crate::remote;
use anyhow::{anyhow, Context, Result};
use simrec_core::{Catalog, Recommender};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Where the catalog and similarity datasets come from
#[derive(Debug, Clone)]
pub struct DatasetConfig {
    pub data_dir: PathBuf,
    pub catalog_file: String,
    pub similarity_file: String,
    pub catalog_url: Option<String>,
    pub similarity_url: Option<String>,
    pub catalog_sha256: Option<String>,
    pub similarity_sha256: Option<String>,
    pub use_cache: bool,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            catalog_file: "movie_list.json".to_string(),
            similarity_file: "similarity.json".to_string(),
            catalog_url: None,
            similarity_url: None,
            catalog_sha256: None,
            similarity_sha256: None,
            use_cache: true,
        }
    }
}

impl DatasetConfig {
    pub fn catalog_path(&self) -> PathBuf {
        self.data_dir.join(&self.catalog_file)
    }

    pub fn similarity_path(&self) -> PathBuf {
        self.data_dir.join(&self.similarity_file)
    }
}

/// Loads the datasets once at startup and builds the [`Recommender`].
///
/// Every error returned here is fatal: the service must not start serving
/// with a missing or inconsistent dataset.
pub struct DatasetManager {
    config: DatasetConfig,
    cache: DatasetCache,
}

impl DatasetManager {
    pub fn new(config: DatasetConfig) -> Result<Self> {
        std::fs::create_dir_all(&config.data_dir)
            .with_context(|| format!("Failed to create data directory {:?}", config.data_dir))?;
        let cache = DatasetCache::new(&config.data_dir);
        Ok(Self { config, cache })
    }

    pub fn config(&self) -> &DatasetConfig {
        &self.config
    }

    pub fn cache(&self) -> &DatasetCache {
        &self.cache
    }

    pub async fn load(&self) -> Result<Recommender> {
        let started = Instant::now();
        let catalog_path = self.config.catalog_path();
        let similarity_path = self.config.similarity_path();

        ensure_file(
            &catalog_path,
            self.config.catalog_url.as_deref(),
            self.config.catalog_sha256.as_deref(),
        )
        .await?;
        ensure_file(
            &similarity_path,
            self.config.similarity_url.as_deref(),
            self.config.similarity_sha256.as_deref(),
        )
        .await?;

        let sources = if self.config.use_cache {
            self.source_fingerprints()?
        } else {
            Vec::new()
        };

        if self.config.use_cache {
            match self.cache.load(&sources) {
                Ok(Some(recommender)) => {
                    info!(
                        "Loaded {} movies from cache {:?} in {:?}",
                        recommender.len(),
                        self.cache.path(),
                        started.elapsed()
                    );
                    return Ok(recommender);
                }
                Ok(None) => debug!("No cache matching the configured sources"),
                Err(e) => warn!("Ignoring unreadable cache {:?}: {}", self.cache.path(), e),
            }
        }

        let recommender = self.load_sources()?;
        info!(
            "Loaded {} movies and a {}x{} similarity matrix in {:?}",
            recommender.len(),
            recommender.similarity().dim(),
            recommender.similarity().dim(),
            started.elapsed()
        );

        if self.config.use_cache {
            if let Err(e) = self.cache.save(&recommender, &sources) {
                warn!("Failed to write cache {:?}: {}", self.cache.path(), e);
            }
        }

        Ok(recommender)
    }

    /// Names and content digests of the configured catalog and similarity files
    pub fn source_fingerprints(&self) -> Result<Vec<SourceFingerprint>> {
        Ok(vec![
            SourceFingerprint::of(&self.config.catalog_path())?,
            SourceFingerprint::of(&self.config.similarity_path())?,
        ])
    }

    /// Read both source files and check that they agree
    pub fn load_sources(&self) -> Result<Recommender> {
        let records = read_catalog(&self.config.catalog_path())?;
        let similarity = read_similarity(&self.config.similarity_path())?;

        let catalog = Catalog::from_records(records);
        Recommender::new(catalog, similarity).context("Catalog and similarity matrix do not match")
    }
}

async fn ensure_file(path: &Path, url: Option<&str>, checksum: Option<&str>) -> Result<()> {
    if path.exists() {
        return Ok(());
    }
    match url {
        Some(url) => {
            remote::download(url, path, checksum).await?;
            Ok(())
        }
        None => Err(anyhow!(
            "Dataset file {:?} not found and no download URL configured",
            path
        )),
    }
}
