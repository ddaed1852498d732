use super::{BackupError, BackupKind, RemoteBackup};
use crate::config::BackupConfig;
use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::Mutex;

const USER_AGENT: &str = concat!("runclub-api/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Deserialize)]
struct ContentsResponse {
    sha: String,
    #[serde(default)]
    content: String,
}

#[derive(Debug, Serialize)]
struct PutContentsRequest<'a> {
    message: String,
    content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<String>,
    branch: &'a str,
}

#[derive(Debug, Deserialize)]
struct PutContentsResponse {
    content: FileRef,
}

#[derive(Debug, Deserialize)]
struct FileRef {
    sha: String,
}

/// Mirrors documents into a GitHub repository through the contents API.
///
/// GitHub rejects a write to an existing file unless it carries the file's
/// current blob `sha`, so the last seen sha per file is kept in memory and
/// refreshed from the API when unknown.
pub struct GithubBackup {
    client: reqwest::Client,
    api_url: String,
    owner: String,
    repo: String,
    branch: String,
    token: Option<String>,
    participants_path: String,
    event_config_path: String,
    versions: Mutex<HashMap<BackupKind, String>>,
}

impl GithubBackup {
    pub fn from_config(config: &BackupConfig) -> Result<Self, BackupError> {
        let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;

        Ok(Self {
            client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            owner: config.owner.clone(),
            repo: config.repo.clone(),
            branch: config.branch.clone(),
            token: config.token.clone().filter(|t| !t.is_empty()),
            participants_path: config.participants_path.clone(),
            event_config_path: config.event_config_path.clone(),
            versions: Mutex::new(HashMap::new()),
        })
    }

    fn file_path(&self, kind: BackupKind) -> &str {
        match kind {
            BackupKind::Participants => &self.participants_path,
            BackupKind::EventConfig => &self.event_config_path,
        }
    }

    fn contents_url(&self, kind: BackupKind) -> String {
        format!(
            "{}/repos/{}/{}/contents/{}",
            self.api_url,
            self.owner,
            self.repo,
            self.file_path(kind).trim_start_matches('/')
        )
    }

    fn request(&self, method: Method, kind: BackupKind) -> RequestBuilder {
        let builder = self
            .client
            .request(method, self.contents_url(kind))
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28");

        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn get_contents(&self, kind: BackupKind) -> Result<Option<ContentsResponse>, BackupError> {
        let response = self
            .request(Method::GET, kind)
            .query(&[("ref", self.branch.as_str())])
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(status_error(response).await);
        }

        let contents: ContentsResponse = response.json().await?;
        self.versions
            .lock()
            .await
            .insert(kind, contents.sha.clone());

        Ok(Some(contents))
    }

    async fn current_version(&self, kind: BackupKind) -> Result<Option<String>, BackupError> {
        if let Some(sha) = self.versions.lock().await.get(&kind).cloned() {
            return Ok(Some(sha));
        }

        Ok(self.get_contents(kind).await?.map(|c| c.sha))
    }
}

async fn status_error(response: reqwest::Response) -> BackupError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    BackupError::Status { status, body }
}

/// GitHub wraps base64 payloads at 60 columns.
fn decode_content(content: &str) -> Result<Vec<u8>, BackupError> {
    let compact: String = content.chars().filter(|c| !c.is_whitespace()).collect();
    Ok(general_purpose::STANDARD.decode(compact)?)
}

#[async_trait]
impl RemoteBackup for GithubBackup {
    async fn fetch(&self, kind: BackupKind) -> Result<Option<Vec<u8>>, BackupError> {
        match self.get_contents(kind).await? {
            Some(contents) => Ok(Some(decode_content(&contents.content)?)),
            None => Ok(None),
        }
    }

    async fn store(&self, kind: BackupKind, contents: Vec<u8>) -> Result<(), BackupError> {
        let sha = self.current_version(kind).await?;

        let body = PutContentsRequest {
            message: format!("Update {} backup", kind),
            content: general_purpose::STANDARD.encode(&contents),
            sha,
            branch: &self.branch,
        };

        let response = self.request(Method::PUT, kind).json(&body).send().await?;

        if matches!(
            response.status(),
            StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY
        ) {
            // Someone else moved the file; the next write refetches its sha.
            self.versions.lock().await.remove(&kind);
            return Err(status_error(response).await);
        }
        if !response.status().is_success() {
            return Err(status_error(response).await);
        }

        let written: PutContentsResponse = response.json().await?;
        self.versions.lock().await.insert(kind, written.content.sha);

        tracing::debug!("Mirrored {} to {}", kind, self.file_path(kind));
        Ok(())
    }
}
