use super::{encode, read_file, write_file, StoreError};
use shared_types::{EventConfig, EventConfigPatch};
use std::path::{Path, PathBuf};

pub struct EventConfigStore {
    path: PathBuf,
}

impl EventConfigStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn exists(&self) -> bool {
        tokio::fs::try_exists(&self.path).await.unwrap_or(false)
    }

    /// The stored configuration merged over the defaults, or `None` if an
    /// admin never saved one. Partial documents are accepted.
    pub async fn read(&self) -> Result<Option<EventConfig>, StoreError> {
        let Some(bytes) = read_file(&self.path).await? else {
            return Ok(None);
        };

        serde_json::from_slice::<EventConfigPatch>(&bytes)
            .map(|patch| Some(EventConfig::resolve(patch)))
            .map_err(|source| StoreError::Parse {
                path: self.path.clone(),
                source,
            })
    }

    /// Writes every field, so a cleared location or announcement reads back
    /// as cleared rather than as the default.
    pub async fn write(&self, config: &EventConfig) -> Result<Vec<u8>, StoreError> {
        let bytes = encode(&EventConfigPatch::from(config.clone()))?;
        write_file(&self.path, &bytes).await?;
        Ok(bytes)
    }
}
