use actix_web::{web, HttpResponse};
use chrono::Utc;
use shared_types::{
    active_window, normalize_name, register, AdminKeyRequest, Participant, ParticipantsResponse,
    RegisterParticipantRequest, Registration,
};

use super::{ApiError, AppState};
use crate::integrations::BackupKind;

async fn save(state: &AppState, participants: &[Participant], context: &'static str) -> Result<(), ApiError> {
    let bytes = state
        .store
        .participants
        .write(participants)
        .await
        .map_err(ApiError::storage(context))?;

    state.mirror(BackupKind::Participants, bytes);
    Ok(())
}

pub async fn list_participants(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let participants = state
        .store
        .participants
        .read()
        .await
        .map_err(ApiError::storage("Failed to fetch participants"))?;

    let active = active_window(&participants, Utc::now());
    tracing::info!("Listing {} active participants", active.len());

    Ok(HttpResponse::Ok().json(ParticipantsResponse::new(active)))
}

pub async fn register_participant(
    state: web::Data<AppState>,
    request: web::Json<RegisterParticipantRequest>,
) -> Result<HttpResponse, ApiError> {
    let req = request.into_inner();
    let name = req
        .name
        .as_deref()
        .and_then(normalize_name)
        .ok_or_else(|| ApiError::Validation("Name is required".to_string()))?;

    let mut participants = state
        .store
        .participants
        .read()
        .await
        .map_err(ApiError::storage("Failed to register participant"))?;

    let now = Utc::now();
    match register(&mut participants, name, now) {
        Registration::Created => tracing::info!("Registered new participant: {}", name),
        Registration::Refreshed => tracing::info!("Refreshed registration for: {}", name),
    }

    save(&state, &participants, "Failed to save participant").await?;

    Ok(HttpResponse::Ok().json(
        ParticipantsResponse::new(active_window(&participants, now))
            .with_message("Participant registered successfully"),
    ))
}

pub async fn clear_participants(
    state: web::Data<AppState>,
    request: Option<web::Json<AdminKeyRequest>>,
) -> Result<HttpResponse, ApiError> {
    let req = request.map(web::Json::into_inner).unwrap_or_default();
    state.authorize(req.admin_key.as_deref())?;

    save(&state, &[], "Failed to clear participants").await?;
    tracing::info!("All participants cleared by admin");

    Ok(HttpResponse::Ok().json(
        ParticipantsResponse::new(Vec::new()).with_message("All participants cleared"),
    ))
}

pub async fn remove_participant(
    state: web::Data<AppState>,
    path: web::Path<String>,
    request: Option<web::Json<AdminKeyRequest>>,
) -> Result<HttpResponse, ApiError> {
    let req = request.map(web::Json::into_inner).unwrap_or_default();
    state.authorize(req.admin_key.as_deref())?;

    let id = path.into_inner();
    let mut participants = state
        .store
        .participants
        .read()
        .await
        .map_err(ApiError::storage("Failed to remove participant"))?;

    let index = participants
        .iter()
        .position(|p| p.id == id)
        .ok_or_else(|| ApiError::NotFound("Participant not found".to_string()))?;
    let removed = participants.remove(index);

    save(&state, &participants, "Failed to remove participant").await?;
    tracing::info!("Participant removed by admin: {}", removed.name);

    Ok(HttpResponse::Ok().json(
        ParticipantsResponse::new(active_window(&participants, Utc::now()))
            .with_message("Participant removed"),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::configure;
    use crate::handlers::test_support::{state_in, state_with_backup, ADMIN_KEY};
    use crate::jobs::backup_mirror::tests::MemoryBackup;
    use actix_web::{http::StatusCode, test, App};
    use chrono::Duration;
    use serde_json::json;
    use std::sync::Arc;

    macro_rules! app {
        ($state:expr) => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new($state.clone()))
                    .configure(configure),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn test_register_twice_keeps_one_record() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_in(&dir);
        let app = app!(state);

        let req = test::TestRequest::post()
            .uri("/api/participants")
            .set_json(json!({ "name": "Mina" }))
            .to_request();
        let first: ParticipantsResponse = test::call_and_read_body_json(&app, req).await;

        let req = test::TestRequest::post()
            .uri("/api/participants")
            .set_json(json!({ "name": "  mINA " }))
            .to_request();
        let second: ParticipantsResponse = test::call_and_read_body_json(&app, req).await;

        assert_eq!(second.count, 1);
        assert_eq!(second.participants[0].name, "Mina");
        assert_eq!(second.participants[0].id, first.participants[0].id);
        assert!(second.participants[0].timestamp >= first.participants[0].timestamp);
        assert_eq!(second.message.as_deref(), Some("Participant registered successfully"));

        let stored = state.store.participants.read().await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].timestamp, second.participants[0].timestamp);
    }

    #[actix_web::test]
    async fn test_blank_name_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_in(&dir);
        let app = app!(state);

        for body in [json!({ "name": "   " }), json!({ "name": "" }), json!({})] {
            let req = test::TestRequest::post()
                .uri("/api/participants")
                .set_json(body)
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

            let body: serde_json::Value = test::read_body_json(resp).await;
            assert_eq!(body["success"], false);
            assert_eq!(body["error"], "Name is required");
        }

        assert!(state.store.participants.read().await.unwrap().is_empty());
    }

    #[actix_web::test]
    async fn test_list_hides_stale_records_but_keeps_them_stored() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_in(&dir);
        let now = Utc::now();
        state
            .store
            .participants
            .write(&[
                Participant::new("Stale", now - Duration::days(8)),
                Participant::new("Fresh", now - Duration::hours(3)),
            ])
            .await
            .unwrap();
        let app = app!(state);

        let req = test::TestRequest::get().uri("/api/participants").to_request();
        let body: ParticipantsResponse = test::call_and_read_body_json(&app, req).await;

        assert!(body.success);
        assert_eq!(body.count, 1);
        assert_eq!(body.participants[0].name, "Fresh");
        assert_eq!(state.store.participants.read().await.unwrap().len(), 2);
    }

    #[actix_web::test]
    async fn test_clear_requires_admin_key() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_in(&dir);
        state
            .store
            .participants
            .write(&[Participant::new("Mina", Utc::now())])
            .await
            .unwrap();
        let before = std::fs::read_to_string(state.store.participants.path()).unwrap();
        let app = app!(state);

        let req = test::TestRequest::delete()
            .uri("/api/participants")
            .set_json(json!({ "admin_key": "guess" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Unauthorized");
        assert_eq!(
            std::fs::read_to_string(state.store.participants.path()).unwrap(),
            before
        );

        let req = test::TestRequest::delete().uri("/api/participants").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);

        let req = test::TestRequest::delete()
            .uri("/api/participants")
            .set_json(json!({ "admin_key": ADMIN_KEY }))
            .to_request();
        let body: ParticipantsResponse = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.count, 0);
        assert_eq!(
            std::fs::read_to_string(state.store.participants.path()).unwrap(),
            "[]"
        );
    }

    #[actix_web::test]
    async fn test_remove_single_participant() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_in(&dir);
        let keep = Participant::new("Keep", Utc::now());
        let gone = Participant::new("Gone", Utc::now());
        state
            .store
            .participants
            .write(&[keep.clone(), gone.clone()])
            .await
            .unwrap();
        let app = app!(state);

        let req = test::TestRequest::delete()
            .uri(&format!("/api/participants/{}", gone.id))
            .set_json(json!({ "admin_key": "nope" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

        let req = test::TestRequest::delete()
            .uri(&format!("/api/participants/{}", gone.id))
            .set_json(json!({ "admin_key": ADMIN_KEY }))
            .to_request();
        let body: ParticipantsResponse = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.participants, vec![keep]);

        let req = test::TestRequest::delete()
            .uri(&format!("/api/participants/{}", gone.id))
            .set_json(json!({ "admin_key": ADMIN_KEY }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_backup_failure_does_not_fail_registration() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_with_backup(&dir, Arc::new(MemoryBackup::failing()));
        let app = app!(state);

        let req = test::TestRequest::post()
            .uri("/api/participants")
            .set_json(json!({ "name": "Mina" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(state.store.participants.read().await.unwrap().len(), 1);

        for _ in 0..50 {
            if !state.mirror.sink().failures().is_empty() {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        assert_eq!(state.mirror.sink().failures().len(), 1);
    }

    #[actix_web::test]
    async fn test_registration_is_mirrored() {
        let dir = tempfile::tempdir().unwrap();
        let backup = Arc::new(MemoryBackup::default());
        let state = state_with_backup(&dir, backup.clone());
        let app = app!(state);

        let req = test::TestRequest::post()
            .uri("/api/participants")
            .set_json(json!({ "name": "Mina" }))
            .to_request();
        test::call_service(&app, req).await;

        let mut mirrored = None;
        for _ in 0..50 {
            mirrored = backup.files.lock().await.get(&BackupKind::Participants).cloned();
            if mirrored.is_some() {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }

        let on_disk = std::fs::read(state.store.participants.path()).unwrap();
        assert_eq!(mirrored, Some(on_disk));
    }
}
