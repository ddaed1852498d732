pub mod config;
pub mod database;
pub mod handlers;
pub mod helpers;
pub mod integrations;
pub mod jobs;

pub use database::DataStore;
pub use handlers::AppState;
