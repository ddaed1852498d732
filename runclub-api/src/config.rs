use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_ADMIN_KEY: &str = "runclub2024";

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct ApiConfig {
    pub server: Option<ServerConfig>,
    pub cors: Option<CorsConfig>,
    pub admin: Option<AdminConfig>,
    pub storage: Option<StorageConfig>,
    pub backup: Option<BackupConfig>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AdminConfig {
    pub key: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct StorageConfig {
    /// Directory holding participants.json and event-config.json
    pub data_dir: PathBuf,
}

/// Remote mirror of the JSON documents in a GitHub repository.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct BackupConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_backup_api_url")]
    pub api_url: String,
    pub owner: String,
    pub repo: String,
    #[serde(default = "default_backup_branch")]
    pub branch: String,
    pub token: Option<String>,
    #[serde(default = "default_participants_path")]
    pub participants_path: String,
    #[serde(default = "default_event_config_path")]
    pub event_config_path: String,
}

fn default_backup_api_url() -> String {
    "https://api.github.com".to_string()
}

fn default_backup_branch() -> String {
    "main".to_string()
}

fn default_participants_path() -> String {
    "data/participants.json".to_string()
}

fn default_event_config_path() -> String {
    "data/event-config.json".to_string()
}

const DEFAULT_CONFIG: &str = r#"
[server]
host = "127.0.0.1"
port = 3000

[cors]
allowed_origins = ["http://localhost:3000"]

[admin]
key = "runclub2024"

# [storage]
# data_dir = "/var/lib/runclub"

# [backup]
# enabled = true
# owner = "your-github-user"
# repo = "your-data-repo"
# branch = "main"
# token = "github_pat_..."
"#;

impl ApiConfig {
    /// Loads the TOML config at `path` (or the default location), writing a
    /// commented default file first if none exists. `RUNCLUB__SECTION__KEY`
    /// environment variables and `PORT` override file values.
    pub fn load(path: Option<&Path>) -> Result<(Self, PathBuf), ConfigError> {
        let config_path = path.map(Path::to_path_buf).unwrap_or_else(get_config_path);

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                ConfigError::Message(format!("Failed to create config directory: {e}"))
            })?;
        }

        if !config_path.exists() {
            std::fs::write(&config_path, DEFAULT_CONFIG).map_err(|e| {
                ConfigError::Message(format!("Failed to write default config: {e}"))
            })?;
        }

        let builder = Config::builder()
            .add_source(File::from(config_path.clone()))
            .add_source(
                Environment::with_prefix("RUNCLUB")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("server.port", std::env::var("PORT").ok())?
            .build()?;

        let config: ApiConfig = builder.try_deserialize()?;

        Ok((config, config_path))
    }

    pub fn server(&self) -> ServerConfig {
        self.server.clone().unwrap_or_default()
    }

    pub fn admin_key(&self) -> String {
        self.admin
            .as_ref()
            .map(|a| a.key.clone())
            .unwrap_or_else(|| DEFAULT_ADMIN_KEY.to_string())
    }

    pub fn data_dir(&self) -> anyhow::Result<PathBuf> {
        match &self.storage {
            Some(storage) => Ok(storage.data_dir.clone()),
            None => crate::helpers::data_dir::default_data_dir(),
        }
    }

    /// The backup section, only when it is switched on.
    pub fn active_backup(&self) -> Option<&BackupConfig> {
        self.backup.as_ref().filter(|b| b.enabled)
    }
}

pub fn get_config_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        config_dir.join("runclub").join("api.toml")
    } else {
        PathBuf::from("api.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_writes_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("api.toml");

        let (config, written) = ApiConfig::load(Some(&path)).unwrap();

        assert_eq!(written, path);
        assert!(path.exists());
        assert_eq!(config.admin_key(), DEFAULT_ADMIN_KEY);
        assert!(config.active_backup().is_none());
        assert_eq!(
            config.cors.unwrap().allowed_origins,
            vec!["http://localhost:3000".to_string()]
        );
    }

    #[test]
    fn test_backup_section_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("api.toml");
        std::fs::write(
            &path,
            r#"
[backup]
enabled = true
owner = "club"
repo = "data"
"#,
        )
        .unwrap();

        let (config, _) = ApiConfig::load(Some(&path)).unwrap();
        let backup = config.active_backup().unwrap();

        assert_eq!(backup.api_url, "https://api.github.com");
        assert_eq!(backup.branch, "main");
        assert_eq!(backup.participants_path, "data/participants.json");
        assert_eq!(backup.event_config_path, "data/event-config.json");
        assert!(backup.token.is_none());
    }
}
