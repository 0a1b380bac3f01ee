//! Corpus directory scanning
//!
//! A corpus is a flat directory of `*.json` files, one sign per file. Listing
//! is sorted by file name so scans are reproducible across filesystems.

use nzsl_common::corpus::RawSignRecord;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

/// Extension of per-sign record files
pub const RECORD_EXTENSION: &str = "json";

/// Corpus access errors
#[derive(Debug, Error)]
pub enum CorpusError {
    /// Specified path does not exist
    #[error("Corpus directory not found: {0}")]
    PathNotFound(PathBuf),

    /// Path exists but is not a directory
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// Directory listing failed part way
    #[error("Failed to list {path}: {source}")]
    Listing {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to encode record for {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// List record files directly inside `dir`, sorted by file name
pub fn list_record_files(dir: &Path) -> Result<Vec<PathBuf>, CorpusError> {
    if !dir.exists() {
        return Err(CorpusError::PathNotFound(dir.to_path_buf()));
    }
    if !dir.is_dir() {
        return Err(CorpusError::NotADirectory(dir.to_path_buf()));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|source| CorpusError::Listing {
            path: dir.to_path_buf(),
            source,
        })?;

        // Symlinked records count; dangling links do not
        let is_file = entry.file_type().is_file()
            || (entry.path_is_symlink() && entry.path().is_file());
        if is_file && is_record_file(entry.path()) {
            files.push(entry.into_path());
        }
    }

    Ok(files)
}

fn is_record_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext == RECORD_EXTENSION)
}

/// Read and parse one record file
pub fn read_raw_record(path: &Path) -> Result<RawSignRecord, CorpusError> {
    let text = std::fs::read_to_string(path).map_err(|source| CorpusError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    RawSignRecord::from_json(&text).map_err(|source| CorpusError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
