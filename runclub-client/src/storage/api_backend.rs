use super::StorageBackend;
use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use shared_types::{
    AdminKeyRequest, ErrorResponse, EventConfig, EventConfigResponse, Participant,
    ParticipantsResponse, RegisterParticipantRequest, SaveEventConfigRequest,
};

/// The sign-up HTTP API.
pub struct ApiBackend {
    client: reqwest::Client,
    base_url: String,
}

impl ApiBackend {
    pub const NAME: &'static str = "api";

    pub fn new(base_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn admin_body(admin_key: &str) -> AdminKeyRequest {
        AdminKeyRequest {
            admin_key: Some(admin_key.to_string()),
        }
    }
}

/// Decodes a success body, or turns `{ success: false, error }` and non-2xx
/// statuses into errors.
async fn parse<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        let message = match response.json::<ErrorResponse>().await {
            Ok(body) => body.error,
            Err(_) => status.to_string(),
        };
        bail!("API returned {}: {}", status, message);
    }

    Ok(response.json().await?)
}

fn participants_from(body: ParticipantsResponse) -> Result<Vec<Participant>> {
    if !body.success {
        bail!("API reported failure");
    }
    tracing::debug!("API returned {} participants", body.count);
    Ok(body.participants)
}

#[async_trait]
impl StorageBackend for ApiBackend {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    async fn load_participants(&self) -> Result<Vec<Participant>> {
        let response = self.client.get(self.url("/api/participants")).send().await?;
        participants_from(parse(response).await?)
    }

    async fn register(&self, name: &str) -> Result<Vec<Participant>> {
        let body = RegisterParticipantRequest {
            name: Some(name.to_string()),
        };
        let response = self
            .client
            .post(self.url("/api/participants"))
            .json(&body)
            .send()
            .await?;
        participants_from(parse(response).await?)
    }

    async fn remove(&self, participant: &Participant, admin_key: &str) -> Result<Vec<Participant>> {
        if participant.id.is_empty() {
            bail!("{} has no id known to the API", participant.name);
        }

        let response = self
            .client
            .delete(self.url(&format!("/api/participants/{}", participant.id)))
            .json(&Self::admin_body(admin_key))
            .send()
            .await?;
        participants_from(parse(response).await?)
    }

    async fn clear(&self, admin_key: &str) -> Result<()> {
        let response = self
            .client
            .delete(self.url("/api/participants"))
            .json(&Self::admin_body(admin_key))
            .send()
            .await?;
        participants_from(parse(response).await?)?;
        Ok(())
    }

    async fn load_event_config(&self) -> Result<Option<EventConfig>> {
        let response = self.client.get(self.url("/api/event-config")).send().await?;
        let body: EventConfigResponse = parse(response).await?;
        Ok(body.config)
    }

    async fn save_event_config(&self, config: &EventConfig, admin_key: &str) -> Result<EventConfig> {
        let body = SaveEventConfigRequest {
            admin_key: Some(admin_key.to_string()),
            config: Some(config.clone().into()),
        };
        let response = self
            .client
            .post(self.url("/api/event-config"))
            .json(&body)
            .send()
            .await?;
        let body: EventConfigResponse = parse(response).await?;
        body.config
            .ok_or_else(|| anyhow!("API accepted the event config but returned none"))
    }
}
