use actix_web::{web, HttpResponse};
use shared_types::{EventConfig, EventConfigResponse, SaveEventConfigRequest};

use super::{ApiError, AppState};
use crate::integrations::BackupKind;

pub async fn get_event_config(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let config = state
        .store
        .event_config
        .read()
        .await
        .map_err(ApiError::storage("Failed to fetch event config"))?;

    Ok(HttpResponse::Ok().json(EventConfigResponse {
        success: true,
        config,
    }))
}

pub async fn save_event_config(
    state: web::Data<AppState>,
    request: Option<web::Json<SaveEventConfigRequest>>,
) -> Result<HttpResponse, ApiError> {
    let req = request.map(web::Json::into_inner).unwrap_or_default();
    state.authorize(req.admin_key.as_deref())?;

    let patch = req
        .config
        .ok_or_else(|| ApiError::Validation("Config is required".to_string()))?;
    let config = EventConfig::resolve(patch);

    let bytes = state
        .store
        .event_config
        .write(&config)
        .await
        .map_err(ApiError::storage("Failed to save event config"))?;
    state.mirror(BackupKind::EventConfig, bytes);

    tracing::info!("Event config updated: {}", config.title);

    Ok(HttpResponse::Ok().json(EventConfigResponse {
        success: true,
        config: Some(config),
    }))
}
