// Startup cache: the validated dataset as a single bincode file
use crate::dataset::write_atomic;
use crate::remote::sha256_file;
use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use simrec_core::{Catalog, MovieRecord, Recommender, SimilarityIndex};
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const CACHE_FILE_NAME: &str = "dataset.bin";

/// Identity of a source file the cache was built from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFingerprint {
    pub file_name: String,
    pub sha256: String,
}

impl SourceFingerprint {
    pub fn of(path: &Path) -> Result<Self> {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| anyhow!("Invalid dataset path: {:?}", path))?
            .to_string();
        Ok(Self {
            file_name,
            sha256: sha256_file(path)?,
        })
    }
}

#[derive(Debug, Serialize)]
struct DatasetSnapshotRef<'a> {
    created_at: i64,
    sources: &'a [SourceFingerprint],
    records: Vec<MovieRecord>,
    dim: usize,
    scores: &'a [f64],
}

#[derive(Debug, Deserialize)]
struct DatasetSnapshot {
    created_at: i64,
    sources: Vec<SourceFingerprint>,
    records: Vec<MovieRecord>,
    dim: usize,
    scores: Vec<f64>,
}

pub struct DatasetCache {
    path: PathBuf,
}

impl DatasetCache {
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Self {
        Self {
            path: data_dir.as_ref().join(CACHE_FILE_NAME),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the cached dataset if it was built from exactly `sources`.
    ///
    /// Returns `Ok(None)` when there is no cache or it belongs to other files.
    pub fn load(&self, sources: &[SourceFingerprint]) -> Result<Option<Recommender>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let file = File::open(&self.path)?;
        let snapshot: DatasetSnapshot = bincode::deserialize_from(BufReader::new(file))
            .map_err(|e| anyhow!("Deserialization error: {}", e))?;

        if snapshot.sources != sources {
            debug!(
                "Cache {:?} was built from {:?}, not {:?}",
                self.path, snapshot.sources, sources
            );
            return Ok(None);
        }

        debug!(
            "Cache {:?} created at {}",
            self.path,
            DateTime::from_timestamp(snapshot.created_at, 0)
                .map(|dt| dt.format("%Y-%m-%dT%H:%M:%SZ").to_string())
                .unwrap_or_default()
        );

        let catalog = Catalog::from_records(snapshot.records);
        let similarity = SimilarityIndex::from_flat(snapshot.dim, snapshot.scores)?;
        Ok(Some(Recommender::new(catalog, similarity)?))
    }

    pub fn save(&self, recommender: &Recommender, sources: &[SourceFingerprint]) -> Result<()> {
        let snapshot = DatasetSnapshotRef {
            created_at: Utc::now().timestamp(),
            sources,
            records: recommender
                .catalog()
                .iter()
                .map(|item| MovieRecord::new(item.id, item.name.clone()))
                .collect(),
            dim: recommender.similarity().dim(),
            scores: recommender.similarity().as_slice(),
        };
        let data = bincode::serialize(&snapshot)
            .map_err(|e| anyhow!("Serialization error: {}", e))?;
        write_atomic(&self.path, &data)
    }

    pub fn remove(&self) -> Result<bool> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
            Ok(true)
        } else {
            Ok(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recommender() -> Recommender {
        Recommender::new(
            Catalog::from_records(vec![
                MovieRecord::new(Some(1), "Avatar"),
                MovieRecord::new(None, "Titanic"),
            ]),
            SimilarityIndex::from_rows(vec![vec![1.0, 0.4], vec![0.4, 1.0]]).unwrap(),
        )
        .unwrap()
    }

    fn sources(dir: &Path) -> Vec<SourceFingerprint> {
        let catalog = dir.join("movie_list.json");
        let similarity = dir.join("similarity.json");
        fs::write(&catalog, r#"[{"title": "Avatar"}, {"title": "Titanic"}]"#).unwrap();
        fs::write(&similarity, "[[1.0, 0.4], [0.4, 1.0]]").unwrap();
        vec![
            SourceFingerprint::of(&catalog).unwrap(),
            SourceFingerprint::of(&similarity).unwrap(),
        ]
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let cache = DatasetCache::new(dir.path());
        let sources = sources(dir.path());
        assert!(cache.load(&sources).unwrap().is_none());

        cache.save(&recommender(), &sources).unwrap();
        let loaded = cache.load(&sources).unwrap().unwrap();

        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.catalog().get(0).unwrap().id, Some(1));
        assert_eq!(loaded.similarity(), recommender().similarity());
        assert_eq!(loaded.recommend("Avatar").unwrap(), recommender().recommend("Avatar").unwrap());
    }

    #[test]
    fn test_fingerprint_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let cache = DatasetCache::new(dir.path());
        let sources = sources(dir.path());
        cache.save(&recommender(), &sources).unwrap();

        let mut renamed = sources.clone();
        renamed[0].file_name = "other.json".to_string();
        assert!(cache.load(&renamed).unwrap().is_none());

        let mut edited = sources.clone();
        edited[1].sha256 = "0".repeat(64);
        assert!(cache.load(&edited).unwrap().is_none());

        assert!(cache.load(&sources[..1]).unwrap().is_none());
    }

    #[test]
    fn test_fingerprint_follows_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("movie_list.json");
        fs::write(&path, "abc").unwrap();
        let first = SourceFingerprint::of(&path).unwrap();
        assert_eq!(first.file_name, "movie_list.json");
        assert_eq!(
            first.sha256,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );

        fs::write(&path, "abd").unwrap();
        assert_ne!(SourceFingerprint::of(&path).unwrap(), first);
    }

    #[test]
    fn test_corrupt_cache_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let cache = DatasetCache::new(dir.path());
        fs::write(cache.path(), b"garbage").unwrap();
        assert!(cache.load(&[]).is_err());
        assert!(cache.remove().unwrap());
        assert!(!cache.remove().unwrap());
    }
}
