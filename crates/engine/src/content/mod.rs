mod atomic_io;
mod document;
mod import;
mod storage;

pub use document::{
    BehaviorRecord, DocumentError, EntityRecord, GameDocument, LayerRecord, Metadata,
    SettingsRecord, DEFAULT_AUTHOR, DEFAULT_DESCRIPTION, DEFAULT_TITLE, DEFAULT_VERSION,
};
pub use import::{ImportJob, ImportResult, ImportSlot};
pub use storage::{
    export_file_name, export_to_file, format_utc_timestamp, import_from_file, FileGameStore,
    StorageError, CURRENT_GAME_FILE_NAME, DEFAULT_EXPORT_STEM, DOCUMENT_EXTENSION,
    SAVED_GAMES_FILE_NAME,
};
