// Remote dataset fetch with optional checksum verification
use crate::dataset::write_atomic;
use anyhow::{anyhow, Result};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;
use tracing::info;

/// Lowercase hex SHA-256 of `data`
pub fn sha256_hex(data: &[u8]) -> String {
    format!("{:x}", Sha256::digest(data))
}

/// Lowercase hex SHA-256 of a file, streamed from disk
pub fn sha256_file(path: &Path) -> Result<String> {
    let mut reader = BufReader::new(File::open(path)?);
    let mut hasher = Sha256::new();
    io::copy(&mut reader, &mut hasher)?;
    Ok(format!("{:x}", hasher.finalize()))
}

/// Compare `data` against an expected hex digest (case-insensitive)
pub fn verify_checksum(data: &[u8], expected: &str) -> Result<()> {
    let actual = sha256_hex(data);
    if !actual.eq_ignore_ascii_case(expected.trim()) {
        return Err(anyhow!(
            "Checksum mismatch: expected {}, got {}",
            expected,
            actual
        ));
    }
    Ok(())
}

/// Download `url` into `dest`.
///
/// Nothing is written unless the response is a success and, when given,
/// the checksum matches. Returns the number of bytes written.
pub async fn download(url: &str, dest: &Path, expected_checksum: Option<&str>) -> Result<u64> {
    info!("Downloading {} to {:?}", url, dest);

    let response = reqwest::get(url)
        .await
        .map_err(|e| anyhow!("Failed to download {}: {}", url, e))?;

    if !response.status().is_success() {
        return Err(anyhow!(
            "Failed to download {}: HTTP {}",
            url,
            response.status()
        ));
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| anyhow!("Failed to read response body from {}: {}", url, e))?;

    if let Some(expected) = expected_checksum {
        verify_checksum(&bytes, expected)?;
    }

    write_atomic(dest, &bytes)?;
    info!("Downloaded {} bytes to {:?}", bytes.len(), dest);
    Ok(bytes.len() as u64)
}
