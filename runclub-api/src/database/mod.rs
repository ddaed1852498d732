//! JSON documents on disk. Every mutation reads the whole document, changes
//! it in memory and rewrites the file; there is no locking between requests.

pub mod event_config;
pub mod participants;

pub use event_config::EventConfigStore;
pub use participants::ParticipantStore;

use std::path::{Path, PathBuf};

pub const PARTICIPANTS_FILE: &str = "participants.json";
pub const EVENT_CONFIG_FILE: &str = "event-config.json";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Malformed JSON in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Failed to encode document: {0}")]
    Encode(#[from] serde_json::Error),
}

impl StoreError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

pub struct DataStore {
    pub participants: ParticipantStore,
    pub event_config: EventConfigStore,
}

impl DataStore {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            participants: ParticipantStore::new(data_dir.join(PARTICIPANTS_FILE)),
            event_config: EventConfigStore::new(data_dir.join(EVENT_CONFIG_FILE)),
        }
    }
}

/// Pretty-prints with two-space indentation, matching what the static site
/// and the backup repository already hold.
pub(crate) fn encode<T: serde::Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, StoreError> {
    Ok(serde_json::to_vec_pretty(value)?)
}

pub(crate) async fn write_file(path: &Path, contents: &[u8]) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| StoreError::io(parent, e))?;
    }

    tokio::fs::write(path, contents)
        .await
        .map_err(|e| StoreError::io(path, e))
}

/// Reads the file, mapping a missing file to `None`.
pub(crate) async fn read_file(path: &Path) -> Result<Option<Vec<u8>>, StoreError> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(StoreError::io(path, e)),
    }
}
