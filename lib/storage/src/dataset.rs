// Dataset file formats for the catalog and the similarity matrix
use anyhow::{anyhow, Context, Result};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::de::DeserializeOwned;
use serde::Serialize;
use simrec_core::{MovieRecord, SimilarityIndex};
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// On-disk encoding, chosen from the file name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetFormat {
    Json,
    JsonGz,
    Bincode,
}

impl DatasetFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| anyhow!("Invalid dataset path: {:?}", path))?
            .to_ascii_lowercase();

        if name.ends_with(".json.gz") {
            Ok(DatasetFormat::JsonGz)
        } else if name.ends_with(".json") {
            Ok(DatasetFormat::Json)
        } else if name.ends_with(".bin") {
            Ok(DatasetFormat::Bincode)
        } else {
            Err(anyhow!(
                "Unsupported dataset format for {:?} (expected .json, .json.gz or .bin)",
                path
            ))
        }
    }
}

/// Read the catalog records, in file order
pub fn read_catalog(path: &Path) -> Result<Vec<MovieRecord>> {
    read_value(path).with_context(|| format!("Failed to read catalog {:?}", path))
}

/// Read a similarity matrix stored as a list of rows
pub fn read_similarity(path: &Path) -> Result<SimilarityIndex> {
    let rows: Vec<Vec<f64>> =
        read_value(path).with_context(|| format!("Failed to read similarity matrix {:?}", path))?;
    Ok(SimilarityIndex::from_rows(rows)?)
}

pub fn write_catalog(path: &Path, records: &[MovieRecord]) -> Result<()> {
    write_value(path, &records)
}

pub fn write_similarity(path: &Path, similarity: &SimilarityIndex) -> Result<()> {
    let rows: Vec<&[f64]> = (0..similarity.dim())
        .filter_map(|i| similarity.row(i))
        .collect();
    write_value(path, &rows)
}

fn read_value<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let format = DatasetFormat::from_path(path)?;
    let file = File::open(path)?;
    let reader = BufReader::new(file);

    match format {
        DatasetFormat::Json => Ok(serde_json::from_reader(reader)?),
        DatasetFormat::JsonGz => Ok(serde_json::from_reader(GzDecoder::new(reader))?),
        DatasetFormat::Bincode => bincode::deserialize_from(reader)
            .map_err(|e| anyhow!("Deserialization error: {}", e)),
    }
}

fn write_value<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let format = DatasetFormat::from_path(path)?;
    let data = match format {
        DatasetFormat::Json => serde_json::to_vec(value)?,
        DatasetFormat::JsonGz => {
            let json = serde_json::to_vec(value)?;
            let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
            encoder.write_all(&json)?;
            encoder.finish()?
        }
        DatasetFormat::Bincode => {
            bincode::serialize(value).map_err(|e| anyhow!("Serialization error: {}", e))?
        }
    };
    write_atomic(path, &data)
}

/// Sibling path used while a file is being written
pub(crate) fn temp_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}

/// Write to a temporary file first, then rename into place
pub(crate) fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let temp_file = temp_path(path);
    {
        let mut writer = BufWriter::new(File::create(&temp_file)?);
        writer.write_all(data)?;
        writer.flush()?;
    }
    fs::rename(&temp_file, path)?;
    Ok(())
}
