use crate::database::DataStore;
use crate::integrations::{BackupKind, RemoteBackup};
use chrono::{DateTime, Utc};
use shared_types::{EventConfig, EventConfigPatch, Participant};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;

const MAX_RECORDED_FAILURES: usize = 50;

#[derive(Debug, Clone)]
pub struct BackupFailure {
    pub kind: BackupKind,
    pub error: String,
    pub at: DateTime<Utc>,
}

/// Collects failed backup writes. Nothing upstream ever sees these errors;
/// they are logged and kept here for `/health` and tests.
#[derive(Clone, Default)]
pub struct BackupSink {
    failures: Arc<Mutex<VecDeque<BackupFailure>>>,
}

impl BackupSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, kind: BackupKind, error: impl std::fmt::Display) {
        let failure = BackupFailure {
            kind,
            error: error.to_string(),
            at: Utc::now(),
        };
        tracing::warn!("Backup of {} failed: {}", failure.kind, failure.error);

        let mut failures = self.failures.lock().unwrap_or_else(|e| e.into_inner());
        if failures.len() == MAX_RECORDED_FAILURES {
            failures.pop_front();
        }
        failures.push_back(failure);
    }

    pub fn failures(&self) -> Vec<BackupFailure> {
        self.failures
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .cloned()
            .collect()
    }
}

/// Fire-and-forget copies of each freshly written document.
pub struct BackupMirror {
    backup: Option<Arc<dyn RemoteBackup>>,
    sink: BackupSink,
}

impl BackupMirror {
    pub fn new(backup: Option<Arc<dyn RemoteBackup>>, sink: BackupSink) -> Self {
        Self { backup, sink }
    }

    pub fn disabled() -> Self {
        Self::new(None, BackupSink::new())
    }

    pub fn is_enabled(&self) -> bool {
        self.backup.is_some()
    }

    pub fn sink(&self) -> &BackupSink {
        &self.sink
    }

    /// Spawns the upload and returns immediately. Handlers drop the handle;
    /// failures surface only through the sink.
    pub fn mirror(&self, kind: BackupKind, contents: Vec<u8>) -> Option<JoinHandle<()>> {
        let backup = self.backup.clone()?;
        let sink = self.sink.clone();

        Some(tokio::spawn(async move {
            if let Err(e) = backup.store(kind, contents).await {
                sink.record(kind, e);
            }
        }))
    }
}

/// Restores documents missing on local disk from the backup tier. A missing
/// remote file means there is nothing to restore; every other failure is
/// logged and the local store starts empty.
pub async fn seed_from_backup(store: &DataStore, backup: &dyn RemoteBackup) {
    if !store.participants.exists().await {
        match backup.fetch(BackupKind::Participants).await {
            Ok(Some(bytes)) => match serde_json::from_slice::<Vec<Participant>>(&bytes) {
                Ok(participants) => match store.participants.write(&participants).await {
                    Ok(_) => tracing::info!(
                        "Restored {} participants from backup",
                        participants.len()
                    ),
                    Err(e) => tracing::warn!("Failed to write restored participants: {}", e),
                },
                Err(e) => tracing::warn!("Ignoring malformed participants backup: {}", e),
            },
            Ok(None) => tracing::info!("No participants backup found"),
            Err(e) => tracing::warn!("Failed to fetch participants backup: {}", e),
        }
    }

    if !store.event_config.exists().await {
        match backup.fetch(BackupKind::EventConfig).await {
            Ok(Some(bytes)) => match serde_json::from_slice::<EventConfigPatch>(&bytes) {
                Ok(patch) => match store.event_config.write(&EventConfig::resolve(patch)).await {
                    Ok(_) => tracing::info!("Restored event config from backup"),
                    Err(e) => tracing::warn!("Failed to write restored event config: {}", e),
                },
                Err(e) => tracing::warn!("Ignoring malformed event config backup: {}", e),
            },
            Ok(None) => tracing::info!("No event config backup found"),
            Err(e) => tracing::warn!("Failed to fetch event config backup: {}", e),
        }
    }
}
