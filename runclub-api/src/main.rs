use actix_cors::Cors;
use actix_web::{get, web, App, HttpResponse, HttpServer, Responder};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;

use runclub_api::config::ApiConfig;
use runclub_api::integrations::{GithubBackup, RemoteBackup};
use runclub_api::jobs::{seed_from_backup, BackupMirror, BackupSink};
use runclub_api::{handlers, helpers, AppState, DataStore};

#[get("/health")]
async fn health(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "backup": {
            "enabled": state.mirror.is_enabled(),
            "recent_failures": state.mirror.sink().failures().len(),
        }
    }))
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Saturday Run Club sign-up API", long_about = None)]
struct Args {
    /// Path to api.toml (defaults to the user config directory)
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long)]
    log_file_path: Option<PathBuf>,
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let args = Args::parse();
    helpers::logging::init(args.log_file_path.as_deref());

    let (config, config_path) =
        ApiConfig::load(args.config.as_deref()).expect("Failed to load config");
    tracing::info!("Loaded config from {}", config_path.display());

    let data_dir = config.data_dir().expect("Failed to resolve data directory");
    let store = DataStore::new(&data_dir);
    tracing::info!("Storing participants at {}", store.participants.path().display());

    let backup: Option<Arc<dyn RemoteBackup>> = match config.active_backup() {
        Some(backup_config) => match GithubBackup::from_config(backup_config) {
            Ok(backup) => {
                tracing::info!(
                    "Mirroring documents to {}/{} ({})",
                    backup_config.owner,
                    backup_config.repo,
                    backup_config.branch
                );
                Some(Arc::new(backup))
            }
            Err(e) => {
                tracing::warn!("Backup disabled, failed to build client: {}", e);
                None
            }
        },
        None => None,
    };

    if let Some(backup) = &backup {
        seed_from_backup(&store, backup.as_ref()).await;
    }

    store
        .participants
        .initialize()
        .await
        .expect("Failed to initialize participant store");

    let state = AppState::new(
        store,
        BackupMirror::new(backup, BackupSink::new()),
        &config.admin_key(),
    );

    let server_config = config.server();
    tracing::info!(
        "Server will listen on {}:{}",
        server_config.host,
        server_config.port
    );
    tracing::info!("  GET    /api/participants       list this week's participants");
    tracing::info!("  POST   /api/participants       register a participant");
    tracing::info!("  DELETE /api/participants       clear all participants (admin)");
    tracing::info!("  DELETE /api/participants/{{id}}  remove one participant (admin)");
    tracing::info!("  GET    /api/event-config       current event details");
    tracing::info!("  POST   /api/event-config       update event details (admin)");

    let cors_config = config.cors.clone();
    HttpServer::new(move || {
        let cors = if let Some(cors_config) = &cors_config {
            let mut cors_builder = Cors::default();
            for origin in &cors_config.allowed_origins {
                cors_builder = cors_builder.allowed_origin(origin);
            }
            cors_builder
                .allowed_methods(vec!["GET", "POST", "DELETE", "OPTIONS"])
                .allowed_headers(vec!["Accept", "Content-Type"])
                .max_age(3600)
        } else {
            Cors::default()
                .allow_any_origin()
                .allowed_methods(vec!["GET", "POST", "DELETE", "OPTIONS"])
                .allowed_headers(vec!["Accept", "Content-Type"])
                .max_age(3600)
        };

        App::new()
            .wrap(cors)
            .app_data(web::Data::new(state.clone()))
            .service(health)
            .configure(handlers::configure)
    })
    .bind((server_config.host.as_str(), server_config.port))?
    .run()
    .await
}
