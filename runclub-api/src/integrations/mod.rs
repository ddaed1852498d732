pub mod github_backup;

pub use github_backup::GithubBackup;

use async_trait::async_trait;

/// The documents mirrored to the backup tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackupKind {
    Participants,
    EventConfig,
}

impl std::fmt::Display for BackupKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackupKind::Participants => write!(f, "participants"),
            BackupKind::EventConfig => write!(f, "event-config"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BackupError {
    #[error("Backup request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Backup service returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("Backup content is not valid base64: {0}")]
    Decode(#[from] base64::DecodeError),
}

/// A hosted-file service holding one file per [`BackupKind`].
#[async_trait]
pub trait RemoteBackup: Send + Sync {
    /// Current contents, or `None` when the file does not exist yet.
    async fn fetch(&self, kind: BackupKind) -> Result<Option<Vec<u8>>, BackupError>;

    async fn store(&self, kind: BackupKind, contents: Vec<u8>) -> Result<(), BackupError>;
}
