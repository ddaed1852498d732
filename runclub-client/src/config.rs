use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Must match the server's admin key for admin actions to succeed remotely.
    #[serde(default = "default_admin_secret")]
    pub admin_secret: String,
    #[serde(default = "default_local_storage_path")]
    pub local_storage_path: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            admin_secret: default_admin_secret(),
            local_storage_path: default_local_storage_path(),
        }
    }
}

fn default_api_base_url() -> String {
    "http://127.0.0.1:3000".to_string()
}

fn default_admin_secret() -> String {
    "runclub2024".to_string()
}

fn default_local_storage_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("runclub")
        .join("local-storage.json")
}

impl ClientConfig {
    /// Reads the optional TOML file, then `RUNCLUB_CLIENT_*` overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config_path = path.map(Path::to_path_buf).unwrap_or_else(get_config_path);

        Config::builder()
            .add_source(File::from(config_path).required(false))
            .add_source(Environment::with_prefix("RUNCLUB_CLIENT"))
            .build()?
            .try_deserialize()
    }
}

pub fn get_config_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        config_dir.join("runclub").join("client.toml")
    } else {
        PathBuf::from("client.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = ClientConfig::load(Some(&dir.path().join("client.toml"))).unwrap();

        assert_eq!(config.api_base_url, "http://127.0.0.1:3000");
        assert_eq!(config.admin_secret, "runclub2024");
        assert!(config.local_storage_path.ends_with("local-storage.json"));
    }

    #[test]
    fn test_file_values_override_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("client.toml");
        std::fs::write(
            &path,
            "api_base_url = \"https://run.example.com\"\nlocal_storage_path = \"/tmp/run.json\"\n",
        )
        .unwrap();

        let config = ClientConfig::load(Some(&path)).unwrap();

        assert_eq!(config.api_base_url, "https://run.example.com");
        assert_eq!(config.local_storage_path, PathBuf::from("/tmp/run.json"));
        assert_eq!(config.admin_secret, "runclub2024");
    }
}
