pub mod api_backend;
pub mod local_backend;
pub mod local_storage;

pub use api_backend::ApiBackend;
pub use local_backend::LocalBackend;
pub use local_storage::{LocalStorage, LocalStorageError};

use anyhow::Result;
use async_trait::async_trait;
use futures::future::BoxFuture;
use shared_types::{EventConfig, Participant};
use std::sync::Arc;

/// One place participants and event details can be read from and written to.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    fn name(&self) -> &'static str;

    async fn load_participants(&self) -> Result<Vec<Participant>>;
    /// Registers or refreshes `name` and returns the resulting list.
    async fn register(&self, name: &str) -> Result<Vec<Participant>>;
    async fn remove(&self, participant: &Participant, admin_key: &str) -> Result<Vec<Participant>>;
    async fn clear(&self, admin_key: &str) -> Result<()>;

    async fn load_event_config(&self) -> Result<Option<EventConfig>>;
    async fn save_event_config(&self, config: &EventConfig, admin_key: &str) -> Result<EventConfig>;
}

/// A value together with the backend that produced it.
#[derive(Debug)]
pub struct Served<T> {
    pub value: T,
    pub backend: &'static str,
}

#[derive(Debug, thiserror::Error)]
#[error("All storage backends failed: {}", .failures.join("; "))]
pub struct ChainError {
    pub failures: Vec<String>,
}

/// Backends ranked by preference. Each operation is tried against them in
/// order and the first success wins; earlier failures are logged.
#[derive(Clone)]
pub struct FallbackChain {
    backends: Vec<Arc<dyn StorageBackend>>,
}

impl FallbackChain {
    pub fn new(backends: Vec<Arc<dyn StorageBackend>>) -> Self {
        Self { backends }
    }

    pub fn primary(&self) -> Option<&Arc<dyn StorageBackend>> {
        self.backends.first()
    }

    pub async fn run<T, F>(&self, operation: &str, mut op: F) -> Result<Served<T>, ChainError>
    where
        F: for<'a> FnMut(&'a dyn StorageBackend) -> BoxFuture<'a, Result<T>>,
    {
        let mut failures = Vec::new();

        for backend in &self.backends {
            match op(backend.as_ref()).await {
                Ok(value) => {
                    if !failures.is_empty() {
                        tracing::info!("{} served by {} fallback", operation, backend.name());
                    }
                    return Ok(Served {
                        value,
                        backend: backend.name(),
                    });
                }
                Err(e) => {
                    tracing::warn!("{} via {} failed: {:#}", operation, backend.name(), e);
                    failures.push(format!("{}: {:#}", backend.name(), e));
                }
            }
        }

        Err(ChainError { failures })
    }
}
