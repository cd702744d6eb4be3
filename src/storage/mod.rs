//! Reading match statistics files and writing classified results.
//!
//! Two layouts are supported, chosen by file extension:
//! - `.json`: one `MatchStats` document in, one `ClassifiedMatch` document out
//! - `.jsonl`: one player per line in and out

pub mod jsonl;

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

pub use jsonl::{JsonlReader, JsonlWriter};

use crate::models::{ClassifiedMatch, MatchStats, PlayerStats};

/// Errors that can occur while reading or writing statistics files.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    #[error("Unsupported file format: {0} (expected .json or .jsonl)")]
    UnsupportedFormat(PathBuf),
}

/// Layout of a statistics file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Json,
    Jsonl,
}

impl FileFormat {
    /// Detect the format from a file extension.
    pub fn from_path(path: &Path) -> Result<Self, StorageError> {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("json") => Ok(FileFormat::Json),
            Some("jsonl") | Some("ndjson") => Ok(FileFormat::Jsonl),
            _ => Err(StorageError::UnsupportedFormat(path.to_path_buf())),
        }
    }
}

/// Read the statistics of one match.
///
/// JSONL files carry no match id; the file stem is used instead.
pub fn read_match(path: &Path) -> Result<MatchStats, StorageError> {
    let format = FileFormat::from_path(path)?;
    if !path.exists() {
        return Err(StorageError::PathNotFound(path.to_path_buf()));
    }

    let stats = match format {
        FileFormat::Json => {
            let reader = BufReader::new(File::open(path)?);
            serde_json::from_reader(reader)?
        }
        FileFormat::Jsonl => {
            let players = JsonlReader::<PlayerStats>::new(path.to_path_buf()).read_all()?;
            MatchStats {
                match_id: path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .map(|s| s.to_string()),
                players,
            }
        }
    };

    debug!("Read {} players from {:?}", stats.players.len(), path);
    Ok(stats)
}

/// Write a classified match in the given format.
pub fn write_classified<W: Write>(
    writer: &mut W,
    result: &ClassifiedMatch,
    format: FileFormat,
) -> Result<(), StorageError> {
    match format {
        FileFormat::Json => {
            serde_json::to_writer_pretty(&mut *writer, result)?;
            writeln!(writer)?;
            writer.flush()?;
        }
        FileFormat::Jsonl => {
            jsonl::write_lines(writer, &result.players)?;
        }
    }
    Ok(())
}

/// Write a classified match to a file, format chosen by extension.
pub fn write_classified_file(path: &Path, result: &ClassifiedMatch) -> Result<(), StorageError> {
    let format = FileFormat::from_path(path)?;
    if format == FileFormat::Jsonl {
        JsonlWriter::new(path.to_path_buf()).write_all(&result.players)?;
        return Ok(());
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut writer = BufWriter::new(File::create(path)?);
    write_classified(&mut writer, result, format)
}
