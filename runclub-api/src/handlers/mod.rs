pub mod event_config;
pub mod participants;

use crate::database::{DataStore, StoreError};
use crate::integrations::BackupKind;
use crate::jobs::BackupMirror;
use actix_web::{http::StatusCode, web, HttpResponse, ResponseError};
use shared_types::ErrorResponse;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<DataStore>,
    pub mirror: Arc<BackupMirror>,
    pub admin_key: Arc<str>,
}

impl AppState {
    pub fn new(store: DataStore, mirror: BackupMirror, admin_key: &str) -> Self {
        Self {
            store: Arc::new(store),
            mirror: Arc::new(mirror),
            admin_key: Arc::from(admin_key),
        }
    }

    /// Exact match against the shared admin secret.
    pub fn authorize(&self, admin_key: Option<&str>) -> Result<(), ApiError> {
        match admin_key {
            Some(key) if key == &*self.admin_key => Ok(()),
            _ => Err(ApiError::Unauthorized),
        }
    }

    /// Hands freshly written bytes to the backup mirror without waiting.
    pub fn mirror(&self, kind: BackupKind, contents: Vec<u8>) {
        let _ = self.mirror.mirror(kind, contents);
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("{0}")]
    NotFound(String),
    #[error("{context}")]
    Storage {
        context: &'static str,
        #[source]
        source: StoreError,
    },
}

impl ApiError {
    pub fn storage(context: &'static str) -> impl FnOnce(StoreError) -> ApiError {
        move |source| {
            tracing::error!("{}: {}", context, source);
            ApiError::Storage { context, source }
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Storage { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorResponse::new(self.to_string()))
    }
}

/// Malformed JSON bodies become the same `{ success, error }` 400 as
/// validation failures.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, _req| ApiError::Validation(err.to_string()).into())
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .route("/api/participants", web::get().to(participants::list_participants))
        .route("/api/participants", web::post().to(participants::register_participant))
        .route("/api/participants", web::delete().to(participants::clear_participants))
        .route("/api/participants/{id}", web::delete().to(participants::remove_participant))
        .route("/api/event-config", web::get().to(event_config::get_event_config))
        .route("/api/event-config", web::post().to(event_config::save_event_config));
}
