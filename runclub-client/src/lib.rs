pub mod admin;
pub mod config;
pub mod controller;
pub mod export;
pub mod schedule;
pub mod storage;
pub mod view;

pub use admin::AdminMode;
pub use config::ClientConfig;
pub use controller::{Controller, EventConfigForm};
pub use storage::{ApiBackend, FallbackChain, LocalBackend, LocalStorage, StorageBackend};
pub use view::{EventCard, NotificationKind, View};

use std::sync::Arc;

/// The standard tier order: the HTTP API first, local storage last.
pub fn default_chain(config: &ClientConfig) -> anyhow::Result<(FallbackChain, LocalBackend)> {
    let local = LocalBackend::new(Arc::new(LocalStorage::new(
        config.local_storage_path.clone(),
    )));
    let api = ApiBackend::new(&config.api_base_url)?;
    let chain = FallbackChain::new(vec![Arc::new(api), Arc::new(local.clone())]);
    Ok((chain, local))
}
