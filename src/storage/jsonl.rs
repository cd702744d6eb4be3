//! JSONL (JSON Lines) files.
//!
//! Each line is a valid JSON object representing one player.

use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::marker::PhantomData;
use std::path::PathBuf;

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, info, warn};

use super::StorageError;

/// Write entities one per line to any writer.
pub fn write_lines<T: Serialize, W: Write>(
    writer: &mut W,
    entities: &[T],
) -> Result<usize, StorageError> {
    let mut count = 0;
    for entity in entities {
        let json = serde_json::to_string(entity)?;
        writeln!(writer, "{}", json)?;
        count += 1;
    }
    writer.flush()?;
    Ok(count)
}

/// JSONL file writer.
pub struct JsonlWriter<T> {
    path: PathBuf,
    _marker: PhantomData<T>,
}

impl<T: Serialize> JsonlWriter<T> {
    /// Create a new JSONL writer for the given path.
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            _marker: PhantomData,
        }
    }

    /// Ensure the parent directory exists.
    fn ensure_dir(&self) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(())
    }

    /// Write entities, replacing the entire file.
    pub fn write_all(&self, entities: &[T]) -> Result<usize, StorageError> {
        self.ensure_dir()?;

        let file = File::create(&self.path)?;
        let mut writer = BufWriter::new(file);
        let count = write_lines(&mut writer, entities)?;

        info!("Wrote {} entities to {:?}", count, self.path);
        Ok(count)
    }
}

/// JSONL file reader.
pub struct JsonlReader<T> {
    path: PathBuf,
    _marker: PhantomData<T>,
}

impl<T: DeserializeOwned> JsonlReader<T> {
    /// Create a new JSONL reader for the given path.
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            _marker: PhantomData,
        }
    }

    /// Read all entities from the file.
    ///
    /// Lines that fail to parse, including lines that are not valid UTF-8,
    /// are skipped with a warning.
    pub fn read_all(&self) -> Result<Vec<T>, StorageError> {
        if !self.path.exists() {
            return Err(StorageError::PathNotFound(self.path.clone()));
        }

        let file = File::open(&self.path)?;
        let reader = BufReader::new(file);
        let mut entities = Vec::new();

        for (idx, line) in reader.split(b'\n').enumerate() {
            let line = line?;

            if line.iter().all(u8::is_ascii_whitespace) {
                continue;
            }

            match serde_json::from_slice(&line) {
                Ok(entity) => entities.push(entity),
                Err(e) => {
                    warn!(
                        "Failed to parse line {} in {:?}: {}",
                        idx + 1,
                        self.path,
                        e
                    );
                }
            }
        }

        debug!("Read {} entities from {:?}", entities.len(), self.path);
        Ok(entities)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PlayerKillRecord, PlayerStats};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn player(id: &str, kills: u32) -> PlayerStats {
        PlayerStats::new(
            id,
            PlayerKillRecord::new(kills, [("MP40", kills)].into_iter().collect()),
        )
    }

    #[test]
    fn test_write_and_read() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("out").join("players.jsonl");

        let players = vec![player("a", 3), player("b", 5)];
        let written = JsonlWriter::new(path.clone()).write_all(&players).unwrap();
        assert_eq!(written, 2);

        let read: Vec<PlayerStats> = JsonlReader::new(path).read_all().unwrap();
        assert_eq!(read, players);
    }

    #[test]
    fn test_read_skips_invalid_and_blank_lines() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("players.jsonl");
        std::fs::write(
            &path,
            "{\"playerId\":\"a\",\"totalKills\":1,\"weaponUsage\":{\"MP40\":1}}\n\
             not json\n\
             \n\
             {\"playerId\":\"b\"}\n",
        )
        .unwrap();

        let read: Vec<PlayerStats> = JsonlReader::new(path).read_all().unwrap();
        let ids: Vec<&str> = read.iter().map(|p| p.player_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_read_skips_invalid_utf8_line() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("players.jsonl");
        let mut bytes = b"{\"playerId\":\"a\"}\n".to_vec();
        bytes.extend_from_slice(b"\xff\xfe{\"playerId\":\"bad\"}\n");
        bytes.extend_from_slice(b"{\"playerId\":\"b\xc3\"}\n");
        bytes.extend_from_slice(b"{\"playerId\":\"c\"}\r\n");
        std::fs::write(&path, bytes).unwrap();

        let read: Vec<PlayerStats> = JsonlReader::new(path).read_all().unwrap();
        let ids: Vec<&str> = read.iter().map(|p| p.player_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
    }

    #[test]
    fn test_read_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let reader = JsonlReader::<PlayerStats>::new(temp_dir.path().join("missing.jsonl"));
        assert!(matches!(reader.read_all(), Err(StorageError::PathNotFound(_))));
    }

    #[test]
    fn test_write_lines_to_buffer() {
        let mut buf = Vec::new();
        let count = write_lines(&mut buf, &[player("a", 1)]).unwrap();

        assert_eq!(count, 1);
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text.lines().count(), 1);
        assert!(text.starts_with("{\"playerId\":\"a\""));
    }
}
