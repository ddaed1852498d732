use super::{LocalStorage, StorageBackend};
use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use shared_types::{register, EventConfig, EventConfigPatch, Participant};
use std::sync::Arc;

pub const PARTICIPANTS_KEY: &str = "saturday-run-participants";
pub const EVENT_CONFIG_KEY: &str = "saturday-run-event-config";

/// Last-resort tier backed by [`LocalStorage`]. Needs no admin key; the admin
/// gate for this tier is the UI itself.
#[derive(Clone)]
pub struct LocalBackend {
    storage: Arc<LocalStorage>,
}

impl LocalBackend {
    pub const NAME: &'static str = "local";

    pub fn new(storage: Arc<LocalStorage>) -> Self {
        Self { storage }
    }

    /// The raw stored list, `None` if the key was never written.
    pub async fn stored_participants(&self) -> Result<Option<Vec<Participant>>> {
        Ok(self.storage.get_json(PARTICIPANTS_KEY).await?)
    }

    pub async fn store_participants(&self, participants: &[Participant]) -> Result<()> {
        self.storage.set_json(PARTICIPANTS_KEY, participants).await?;
        Ok(())
    }

    /// Stored as a full patch so a cleared location or announcement reads
    /// back as cleared instead of falling back to the default.
    pub async fn store_event_config(&self, config: &EventConfig) -> Result<()> {
        let patch = EventConfigPatch::from(config.clone());
        self.storage.set_json(EVENT_CONFIG_KEY, &patch).await?;
        Ok(())
    }
}

#[async_trait]
impl StorageBackend for LocalBackend {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    async fn load_participants(&self) -> Result<Vec<Participant>> {
        Ok(self.stored_participants().await?.unwrap_or_default())
    }

    async fn register(&self, name: &str) -> Result<Vec<Participant>> {
        let mut participants = self.stored_participants().await?.unwrap_or_default();
        register(&mut participants, name, Utc::now());
        self.store_participants(&participants).await?;
        tracing::info!("Saved {} participants to local storage", participants.len());
        Ok(participants)
    }

    async fn remove(&self, participant: &Participant, _admin_key: &str) -> Result<Vec<Participant>> {
        let mut participants = self.stored_participants().await?.unwrap_or_default();
        participants.retain(|p| {
            if participant.id.is_empty() {
                !p.matches_name(&participant.name)
            } else {
                p.id != participant.id
            }
        });
        self.store_participants(&participants).await?;
        Ok(participants)
    }

    async fn clear(&self, _admin_key: &str) -> Result<()> {
        self.storage.remove_item(PARTICIPANTS_KEY).await?;
        Ok(())
    }

    async fn load_event_config(&self) -> Result<Option<EventConfig>> {
        let patch: Option<EventConfigPatch> = self.storage.get_json(EVENT_CONFIG_KEY).await?;
        Ok(patch.map(EventConfig::resolve))
    }

    async fn save_event_config(&self, config: &EventConfig, _admin_key: &str) -> Result<EventConfig> {
        self.store_event_config(config).await?;
        Ok(config.clone())
    }
}
