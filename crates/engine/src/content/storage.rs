//! File-backed persistence for game documents.
//!
//! Named saves live together in one JSON object keyed by save name; the
//! auto-save slot is a separate document. Both are rewritten atomically.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use thiserror::Error;
use tracing::{info, warn};

use super::atomic_io::write_text_atomic;
use super::document::{DocumentError, GameDocument};

pub const SAVED_GAMES_FILE_NAME: &str = "saved_games.json";
pub const CURRENT_GAME_FILE_NAME: &str = "current_game.json";
pub const DEFAULT_EXPORT_STEM: &str = "emoji-rpg-game";
pub const DOCUMENT_EXTENSION: &str = "json";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to delete {path}: {source}")]
    Delete {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("save index {path} is not valid JSON: {source}")]
    CorruptIndex {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid game document in {origin}: {source}")]
    Document {
        origin: String,
        #[source]
        source: DocumentError,
    },
    #[error("failed to encode game document: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("no saved game named `{name}`")]
    NotFound { name: String },
    #[error("save name must not be empty")]
    EmptyName,
    #[error("{path} is not a .json file")]
    InvalidExtension { path: PathBuf },
    #[error("an import is already in progress")]
    ImportBusy,
    #[error("import worker stopped before reporting a result")]
    ImportWorkerLost,
}

#[derive(Debug, Clone)]
pub struct FileGameStore {
    root: PathBuf,
}

impl FileGameStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn index_path(&self) -> PathBuf {
        self.root.join(SAVED_GAMES_FILE_NAME)
    }

    fn current_path(&self) -> PathBuf {
        self.root.join(CURRENT_GAME_FILE_NAME)
    }

    /// Stores `document` under `name`, stamping `metadata.name` and
    /// `metadata.savedAt`. Returns the stamped copy.
    pub fn save_game(
        &self,
        name: &str,
        document: &GameDocument,
    ) -> Result<GameDocument, StorageError> {
        if name.trim().is_empty() {
            return Err(StorageError::EmptyName);
        }

        let mut stamped = document.clone();
        stamped.metadata.name = Some(name.to_string());
        stamped.metadata.saved_at = Some(format_utc_timestamp(SystemTime::now()));

        let mut index = self.read_index()?;
        let value = serde_json::to_value(&stamped).map_err(StorageError::Encode)?;
        index.insert(name.to_string(), value);
        self.write_index(&index)?;

        info!(name, entities = stamped.entity_count(), "game_saved");
        Ok(stamped)
    }

    pub fn load_game(&self, name: &str) -> Result<GameDocument, StorageError> {
        let mut index = self.read_index()?;
        let value = index.remove(name).ok_or_else(|| StorageError::NotFound {
            name: name.to_string(),
        })?;
        GameDocument::from_json_value(value).map_err(|source| StorageError::Document {
            origin: format!("saved game `{name}`"),
            source,
        })
    }

    pub fn delete_game(&self, name: &str) -> Result<(), StorageError> {
        let mut index = self.read_index()?;
        if index.remove(name).is_none() {
            return Err(StorageError::NotFound {
                name: name.to_string(),
            });
        }
        self.write_index(&index)?;
        info!(name, "game_deleted");
        Ok(())
    }

    /// Save names in sorted order.
    pub fn list_games(&self) -> Result<Vec<String>, StorageError> {
        Ok(self.read_index()?.into_keys().collect())
    }

    pub fn save_current(&self, document: &GameDocument) -> Result<(), StorageError> {
        let path = self.current_path();
        let text = document
            .to_json_pretty()
            .map_err(|source| StorageError::Document {
                origin: path.display().to_string(),
                source,
            })?;
        write_text_atomic(&path, &text).map_err(|source| StorageError::Write { path, source })
    }

    pub fn load_current(&self) -> Result<Option<GameDocument>, StorageError> {
        let path = self.current_path();
        let Some(raw) = read_optional(&path)? else {
            return Ok(None);
        };
        GameDocument::from_json_str(&raw)
            .map(Some)
            .map_err(|source| StorageError::Document {
                origin: path.display().to_string(),
                source,
            })
    }

    /// Returns whether there was a current game to clear.
    pub fn clear_current(&self) -> Result<bool, StorageError> {
        let path = self.current_path();
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(source) => Err(StorageError::Delete { path, source }),
        }
    }

    fn read_index(&self) -> Result<BTreeMap<String, serde_json::Value>, StorageError> {
        let path = self.index_path();
        let Some(raw) = read_optional(&path)? else {
            return Ok(BTreeMap::new());
        };
        serde_json::from_str(&raw).map_err(|source| StorageError::CorruptIndex { path, source })
    }

    fn write_index(
        &self,
        index: &BTreeMap<String, serde_json::Value>,
    ) -> Result<(), StorageError> {
        let path = self.index_path();
        let text = serde_json::to_string_pretty(index).map_err(StorageError::Encode)?;
        write_text_atomic(&path, &text).map_err(|source| StorageError::Write { path, source })
    }
}

fn read_optional(path: &Path) -> Result<Option<String>, StorageError> {
    match fs::read_to_string(path) {
        Ok(raw) => Ok(Some(raw)),
        Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(StorageError::Read {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// File name for an export: the explicit name, else the title, else a fixed
/// stem. Every character outside `[A-Za-z0-9]` becomes `-` (one per UTF-16
/// unit), then the result is lowercased.
pub fn export_file_name(document: &GameDocument, filename: Option<&str>) -> String {
    let stem = filename
        .filter(|name| !name.is_empty())
        .or_else(|| Some(document.metadata.title.as_str()).filter(|title| !title.is_empty()))
        .unwrap_or(DEFAULT_EXPORT_STEM);

    let mut sanitized = String::with_capacity(stem.len());
    for ch in stem.chars() {
        if ch.is_ascii_alphanumeric() {
            sanitized.push(ch.to_ascii_lowercase());
        } else {
            for _ in 0..ch.len_utf16() {
                sanitized.push('-');
            }
        }
    }
    format!("{sanitized}.{DOCUMENT_EXTENSION}")
}

/// Writes `document` as pretty JSON into `dir`; returns the written path.
pub fn export_to_file(
    document: &GameDocument,
    dir: &Path,
    filename: Option<&str>,
) -> Result<PathBuf, StorageError> {
    let path = dir.join(export_file_name(document, filename));
    let text = document
        .to_json_pretty()
        .map_err(|source| StorageError::Document {
            origin: path.display().to_string(),
            source,
        })?;
    write_text_atomic(&path, &text).map_err(|source| StorageError::Write {
        path: path.clone(),
        source,
    })?;
    info!(path = %path.display(), "game_exported");
    Ok(path)
}

pub fn import_from_file(path: &Path) -> Result<GameDocument, StorageError> {
    if !has_document_extension(path) {
        warn!(path = %path.display(), "import_rejected_extension");
        return Err(StorageError::InvalidExtension {
            path: path.to_path_buf(),
        });
    }

    let raw = fs::read_to_string(path).map_err(|source| StorageError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let document = GameDocument::from_json_str(&raw).map_err(|source| StorageError::Document {
        origin: path.display().to_string(),
        source,
    })?;
    info!(
        path = %path.display(),
        layers = document.layers.len(),
        entities = document.entity_count(),
        "game_imported"
    );
    Ok(document)
}

fn has_document_extension(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.ends_with(".json"))
}

/// `YYYY-MM-DDTHH:MM:SS.mmmZ` in UTC. Times before the epoch clamp to it.
pub fn format_utc_timestamp(time: SystemTime) -> String {
    let since_epoch = time.duration_since(UNIX_EPOCH).unwrap_or_default();
    let total_seconds = since_epoch.as_secs();
    let millis = since_epoch.subsec_millis();

    let days = (total_seconds / 86_400) as i64;
    let seconds_of_day = total_seconds % 86_400;
    let (year, month, day) = civil_from_days(days);

    format!(
        "{year:04}-{month:02}-{day:02}T{:02}:{:02}:{:02}.{millis:03}Z",
        seconds_of_day / 3_600,
        (seconds_of_day % 3_600) / 60,
        seconds_of_day % 60,
    )
}

// Proleptic Gregorian date from days since 1970-01-01.
fn civil_from_days(days: i64) -> (i64, u32, u32) {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z.rem_euclid(146_097);
    let yoe = (doe - doe / 1_460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let month = (if mp < 10 { mp + 3 } else { mp - 9 }) as u32;
    let year = yoe + era * 400 + i64::from(month <= 2);
    (year, month, day)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::json;
    use tempfile::TempDir;

    use super::*;

    fn document(title: &str) -> GameDocument {
        GameDocument::from_json_value(json!({
            "metadata": {"title": title},
            "layers": [{"id": "l", "name": "L", "entities": [
                {"id": "a", "emoji": "🌳", "x": 1, "y": 2, "width": 32, "height": 32}
            ]}]
        }))
        .expect("document")
    }

    #[test]
    fn save_load_and_list_named_games() {
        let temp = TempDir::new().expect("temp");
        let store = FileGameStore::new(temp.path());
        assert!(store.list_games().expect("empty list").is_empty());

        let stamped = store.save_game("beta", &document("B")).expect("save beta");
        store.save_game("alpha", &document("A")).expect("save alpha");
        assert_eq!(stamped.metadata.name.as_deref(), Some("beta"));
        assert!(stamped.metadata.saved_at.is_some());

        assert_eq!(
            store.list_games().expect("list"),
            vec!["alpha".to_string(), "beta".to_string()]
        );
        let loaded = store.load_game("beta").expect("load");
        assert_eq!(loaded, stamped);
    }

    #[test]
    fn saving_same_name_overwrites() {
        let temp = TempDir::new().expect("temp");
        let store = FileGameStore::new(temp.path());
        store.save_game("slot", &document("First")).expect("first");
        store.save_game("slot", &document("Second")).expect("second");
        assert_eq!(store.list_games().expect("list").len(), 1);
        assert_eq!(
            store.load_game("slot").expect("load").metadata.title,
            "Second"
        );
    }

    #[test]
    fn missing_and_deleted_games_report_not_found() {
        let temp = TempDir::new().expect("temp");
        let store = FileGameStore::new(temp.path());
        assert!(matches!(
            store.load_game("ghost"),
            Err(StorageError::NotFound { .. })
        ));
        store.save_game("x", &document("X")).expect("save");
        store.delete_game("x").expect("delete");
        assert!(matches!(
            store.delete_game("x"),
            Err(StorageError::NotFound { .. })
        ));
        assert!(store.list_games().expect("list").is_empty());
    }

    #[test]
    fn empty_name_is_rejected() {
        let temp = TempDir::new().expect("temp");
        let store = FileGameStore::new(temp.path());
        assert!(matches!(
            store.save_game("  ", &document("X")),
            Err(StorageError::EmptyName)
        ));
    }

    #[test]
    fn corrupt_index_fails_closed() {
        let temp = TempDir::new().expect("temp");
        fs::write(temp.path().join(SAVED_GAMES_FILE_NAME), "{not json").expect("write");
        let store = FileGameStore::new(temp.path());
        assert!(matches!(
            store.list_games(),
            Err(StorageError::CorruptIndex { .. })
        ));
    }

    #[test]
    fn current_slot_round_trip_and_clear() {
        let temp = TempDir::new().expect("temp");
        let store = FileGameStore::new(temp.path().join("nested"));
        assert_eq!(store.load_current().expect("empty"), None);
        assert!(!store.clear_current().expect("clear empty"));

        let doc = document("Current");
        store.save_current(&doc).expect("save current");
        assert_eq!(store.load_current().expect("load"), Some(doc));
        assert!(store.clear_current().expect("clear"));
        assert_eq!(store.load_current().expect("cleared"), None);
    }

    #[test]
    fn export_file_name_is_sanitized() {
        let doc = document("My Cool Game!");
        assert_eq!(export_file_name(&doc, None), "my-cool-game-.json");
        assert_eq!(export_file_name(&doc, Some("Level_2")), "level-2.json");
        assert_eq!(export_file_name(&doc, Some("🌳")), "--.json");
        assert_eq!(
            export_file_name(&document(""), None),
            "emoji-rpg-game.json"
        );
    }

    #[test]
    fn export_then_import_round_trips() {
        let temp = TempDir::new().expect("temp");
        let doc = document("Trip");
        let path = export_to_file(&doc, temp.path(), None).expect("export");
        assert_eq!(path.file_name().and_then(|n| n.to_str()), Some("trip.json"));
        let raw = fs::read_to_string(&path).expect("read");
        assert!(raw.contains("\n  \"metadata\""), "pretty printed");
        assert_eq!(import_from_file(&path).expect("import"), doc);
    }

    #[test]
    fn import_requires_json_extension() {
        let temp = TempDir::new().expect("temp");
        let path = temp.path().join("level.txt");
        fs::write(&path, "{}").expect("write");
        assert!(matches!(
            import_from_file(&path),
            Err(StorageError::InvalidExtension { .. })
        ));
    }

    #[test]
    fn import_reports_parse_errors() {
        let temp = TempDir::new().expect("temp");
        let path = temp.path().join("broken.json");
        fs::write(&path, "{\"layers\": 5}").expect("write");
        let error = import_from_file(&path).expect_err("bad layers");
        assert!(matches!(error, StorageError::Document { .. }));
    }

    #[test]
    fn utc_timestamps_format_known_instants() {
        assert_eq!(format_utc_timestamp(UNIX_EPOCH), "1970-01-01T00:00:00.000Z");
        assert_eq!(
            format_utc_timestamp(UNIX_EPOCH + Duration::from_secs(951_782_400)),
            "2000-02-29T00:00:00.000Z"
        );
        assert_eq!(
            format_utc_timestamp(UNIX_EPOCH + Duration::from_millis(1_700_000_000_250)),
            "2023-11-14T22:13:20.250Z"
        );
    }
}
