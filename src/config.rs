use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: String,
}

/// Blob store backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlobBackend {
    Local,
    Remote,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_backend")]
    pub backend: BlobBackend,
    #[serde(default = "default_local_path")]
    pub local_path: String,
    /// Remote backend endpoint, e.g. https://blobs.example.com
    #[serde(default)]
    pub endpoint: String,
    #[serde(default)]
    pub project: String,
    #[serde(default)]
    pub api_key: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "default_auth_secret")]
    pub secret: String,
}

// Default values
fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    4720
}

fn default_db_path() -> String {
    "data/tabvault.db".to_string()
}

fn default_backend() -> BlobBackend {
    BlobBackend::Local
}

fn default_local_path() -> String {
    "data/blobs".to_string()
}

fn default_auth_secret() -> String {
    "change-me".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            local_path: default_local_path(),
            endpoint: String::new(),
            project: String::new(),
            api_key: String::new(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret: default_auth_secret(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            storage: StorageConfig::default(),
            auth: AuthConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file and environment variables
    pub fn load() -> anyhow::Result<Self> {
        let mut config = Self::load_from_file()?;
        config.apply_env_overrides();
        config.ensure_directories()?;
        config.ensure_auth_secret()?;
        Ok(config)
    }

    /// Load configuration from config.toml
    fn load_from_file() -> anyhow::Result<Self> {
        let config_paths = ["config.toml", "data/config.toml"];

        for path in config_paths {
            if Path::new(path).exists() {
                let content = fs::read_to_string(path)?;
                let config: Config = toml::from_str(&content)?;
                tracing::info!("Loaded configuration from {}", path);
                return Ok(config);
            }
        }

        tracing::info!("No configuration file found, using defaults");
        Ok(Config::default())
    }

    /// Apply environment variable overrides
    /// Format: TV_CONF_<SECTION>_<KEY>
    fn apply_env_overrides(&mut self) {
        // Server overrides
        if let Ok(val) = env::var("TV_CONF_SERVER_HOST") {
            self.server.host = val;
        }
        if let Ok(val) = env::var("TV_CONF_SERVER_PORT") {
            if let Ok(port) = val.parse() {
                self.server.port = port;
            }
        }

        // Database overrides
        if let Ok(val) = env::var("TV_CONF_DATABASE_PATH") {
            self.database.path = val;
        }

        // Storage overrides
        if let Ok(val) = env::var("TV_CONF_STORAGE_BACKEND") {
            match val.to_lowercase().as_str() {
                "local" => self.storage.backend = BlobBackend::Local,
                "remote" => self.storage.backend = BlobBackend::Remote,
                other => {
                    tracing::warn!("Unknown storage backend '{}', keeping configured value", other)
                }
            }
        }
        if let Ok(val) = env::var("TV_CONF_STORAGE_LOCAL_PATH") {
            self.storage.local_path = val;
        }
        if let Ok(val) = env::var("TV_CONF_STORAGE_ENDPOINT") {
            self.storage.endpoint = val;
        }
        if let Ok(val) = env::var("TV_CONF_STORAGE_PROJECT") {
            self.storage.project = val;
        }
        if let Ok(val) = env::var("TV_CONF_STORAGE_API_KEY") {
            self.storage.api_key = val;
        }

        // Auth overrides
        if let Ok(val) = env::var("TV_CONF_AUTH_SECRET") {
            self.auth.secret = val;
        }
    }

    /// Ensure required directories exist
    fn ensure_directories(&self) -> anyhow::Result<()> {
        if let Some(parent) = Path::new(&self.database.path).parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        if self.storage.backend == BlobBackend::Local {
            fs::create_dir_all(&self.storage.local_path)?;
        }
        Ok(())
    }

    /// Ensure the auth secret is non-default and persisted
    fn ensure_auth_secret(&mut self) -> anyhow::Result<()> {
        if self.auth.secret == default_auth_secret() || self.auth.secret.is_empty() {
            let secret_path = Path::new("data/.auth_secret");

            if secret_path.exists() {
                let secret = fs::read_to_string(secret_path)?;
                self.auth.secret = secret.trim().to_string();
                tracing::info!("Loaded persisted auth secret from data/.auth_secret");
            } else {
                let secret = uuid::Uuid::new_v4().to_string();

                if let Some(parent) = secret_path.parent() {
                    fs::create_dir_all(parent)?;
                }

                fs::write(secret_path, &secret)?;
                self.auth.secret = secret;
                tracing::info!("Generated and persisted new auth secret to data/.auth_secret");
            }
        }
        Ok(())
    }
}
