//! On-disk store for save and score documents.
//!
//! Each document is a single JSON file rewritten whole on every update.
//! Reads are forgiving: a missing or malformed file counts as "no document"
//! rather than an error, so a corrupt save degrades to a fresh start.

use crate::persistence::{SaveRecord, ScoreRecord};
use crate::{GameError, GameResult};
use log::warn;
use std::fs;
use std::io;
use std::path::Path;

fn load_document<T: serde::de::DeserializeOwned>(path: &Path, what: &str) -> Option<T> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return None,
        Err(err) => {
            warn!("could not read {what} file {}: {err}", path.display());
            return None;
        }
    };
    match serde_json::from_str(&text) {
        Ok(record) => Some(record),
        Err(err) => {
            warn!("ignoring malformed {what} file {}: {err}", path.display());
            None
        }
    }
}

fn write_document<T: serde::Serialize>(path: &Path, record: &T) -> GameResult<()> {
    let text = serde_json::to_string_pretty(record)?;
    fs::write(path, text).map_err(GameError::from)
}

/// Loads the save document, or `None` when absent or unreadable.
pub fn load_save(path: &Path) -> Option<SaveRecord> {
    load_document(path, "save")
}

/// Writes the save document, replacing any previous one.
pub fn write_save(path: &Path, record: &SaveRecord) -> GameResult<()> {
    write_document(path, record)
}

/// Deletes the save document. A missing file is not an error.
pub fn clear_save(path: &Path) -> GameResult<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(GameError::from(err)),
    }
}

/// Loads the best-run record, or `None` when absent or unreadable.
pub fn load_score(path: &Path) -> Option<ScoreRecord> {
    load_document(path, "score")
}

/// Writes the best-run record.
pub fn write_score(path: &Path, record: &ScoreRecord) -> GameResult<()> {
    write_document(path, record)
}

/// Records a finished run, keeping the better of the stored record and the
/// new result. Returns `true` when the stored record was improved.
pub fn update_score(path: &Path, level: u32, coins: u32) -> GameResult<bool> {
    let current = load_score(path).unwrap_or_default();
    if !current.beaten_by(level, coins) {
        return Ok(false);
    }
    write_score(
        path,
        &ScoreRecord {
            max_level: level,
            coins,
        },
    )?;
    Ok(true)
}
