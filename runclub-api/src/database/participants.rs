use super::{encode, read_file, write_file, StoreError};
use shared_types::Participant;
use std::path::{Path, PathBuf};

pub struct ParticipantStore {
    path: PathBuf,
}

impl ParticipantStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn exists(&self) -> bool {
        tokio::fs::try_exists(&self.path).await.unwrap_or(false)
    }

    /// Writes an empty list if the document does not exist yet. Returns
    /// whether a new document was created.
    pub async fn initialize(&self) -> Result<bool, StoreError> {
        if self.exists().await {
            return Ok(false);
        }

        self.write(&[]).await?;
        tracing::info!("Initialized empty participant list at {}", self.path.display());
        Ok(true)
    }

    /// All stored records, including those outside the active window.
    pub async fn read(&self) -> Result<Vec<Participant>, StoreError> {
        let Some(bytes) = read_file(&self.path).await? else {
            return Ok(Vec::new());
        };

        serde_json::from_slice(&bytes).map_err(|source| StoreError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    /// Replaces the whole document. Returns the bytes written so callers can
    /// mirror them elsewhere.
    pub async fn write(&self, participants: &[Participant]) -> Result<Vec<u8>, StoreError> {
        let bytes = encode(participants)?;
        write_file(&self.path, &bytes).await?;
        Ok(bytes)
    }
}
