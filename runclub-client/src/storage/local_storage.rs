use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

#[derive(Debug, thiserror::Error)]
pub enum LocalStorageError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Malformed value under {key}: {source}")]
    Json {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// String key/value storage persisted to a single JSON file, with the same
/// contract as browser local storage: values are opaque strings and a missing
/// key reads as `None`.
pub struct LocalStorage {
    path: PathBuf,
    lock: Mutex<()>,
}

impl LocalStorage {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> LocalStorageError {
        LocalStorageError::Io {
            path: self.path.clone(),
            source,
        }
    }

    async fn read_all(&self) -> Result<BTreeMap<String, String>, LocalStorageError> {
        let text = match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(self.io_error(e)),
        };

        // A corrupt file is treated like cleared storage rather than locking
        // the user out of the page.
        Ok(serde_json::from_str(&text).unwrap_or_else(|e| {
            tracing::warn!("Discarding unreadable local storage {}: {}", self.path.display(), e);
            BTreeMap::new()
        }))
    }

    async fn write_all(&self, items: &BTreeMap<String, String>) -> Result<(), LocalStorageError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| self.io_error(e))?;
        }
        let text = serde_json::to_string_pretty(items).map_err(|source| LocalStorageError::Json {
            key: "*".to_string(),
            source,
        })?;
        tokio::fs::write(&self.path, text)
            .await
            .map_err(|e| self.io_error(e))
    }

    pub async fn get_item(&self, key: &str) -> Result<Option<String>, LocalStorageError> {
        let _guard = self.lock.lock().await;
        Ok(self.read_all().await?.remove(key))
    }

    pub async fn set_item(&self, key: &str, value: &str) -> Result<(), LocalStorageError> {
        let _guard = self.lock.lock().await;
        let mut items = self.read_all().await?;
        items.insert(key.to_string(), value.to_string());
        self.write_all(&items).await
    }

    pub async fn remove_item(&self, key: &str) -> Result<(), LocalStorageError> {
        let _guard = self.lock.lock().await;
        let mut items = self.read_all().await?;
        if items.remove(key).is_some() {
            self.write_all(&items).await?;
        }
        Ok(())
    }

    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, LocalStorageError> {
        match self.get_item(key).await? {
            Some(text) => serde_json::from_str(&text)
                .map(Some)
                .map_err(|source| LocalStorageError::Json {
                    key: key.to_string(),
                    source,
                }),
            None => Ok(None),
        }
    }

    pub async fn set_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), LocalStorageError> {
        let text = serde_json::to_string(value).map_err(|source| LocalStorageError::Json {
            key: key.to_string(),
            source,
        })?;
        self.set_item(key, &text).await
    }
}
