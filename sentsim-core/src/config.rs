use serde::{Deserialize, Serialize};
use std::path::Path;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 5003;
const DEFAULT_ENDPOINT: &str = "https://api.upstage.ai/v1/solar";
const DEFAULT_MODEL: &str = "embedding-query";
const DEFAULT_API_KEY_ENV: &str = "UPSTAGE_API_KEY";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_STORAGE_PATH: &str = "sentences_db.json";
const DEFAULT_INDEX: &str = "index.html";

#[derive(Debug, Deserialize, Serialize, PartialEq, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub frontend: FrontendConfig,
}

#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

/// Settings for the OpenAI-compatible embedding endpoint.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct ProviderConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            model: default_model(),
            api_key: None,
            api_key_env: default_api_key_env(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ProviderConfig {
    /// Literal `api_key` wins; otherwise the variable named by `api_key_env` is read.
    pub fn resolve_api_key(&self) -> Result<String, String> {
        if let Some(ref key) = self.api_key {
            if !key.is_empty() {
                return Ok(key.clone());
            }
        }
        match std::env::var(&self.api_key_env) {
            Ok(key) if !key.is_empty() => Ok(key),
            _ => Err(format!(
                "no API key configured: set provider.api_key or the '{}' environment variable",
                self.api_key_env
            )),
        }
    }
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_api_key_env() -> String {
    DEFAULT_API_KEY_ENV.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct StorageConfig {
    #[serde(default = "default_storage_path")]
    pub path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_storage_path(),
        }
    }
}

fn default_storage_path() -> String {
    DEFAULT_STORAGE_PATH.to_string()
}

#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct FrontendConfig {
    #[serde(default = "default_index")]
    pub index: String,
}

impl Default for FrontendConfig {
    fn default() -> Self {
        Self {
            index: default_index(),
        }
    }
}

fn default_index() -> String {
    DEFAULT_INDEX.to_string()
}

impl Config {
    pub fn from_file(path: &Path) -> Result<Self, String> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| format!("failed to read config file '{}': {e}", path.display()))?;
        Self::parse(&contents)
    }

    /// Like [`Config::from_file`], but a missing file yields the defaults.
    pub fn from_file_or_default(path: &Path) -> Result<Self, String> {
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn parse(contents: &str) -> Result<Self, String> {
        let config: Config =
            toml::from_str(contents).map_err(|e| format!("invalid config: {e}"))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), String> {
        if self.provider.endpoint.trim().is_empty() {
            return Err("invalid config: provider.endpoint must not be empty".to_string());
        }
        if self.provider.model.trim().is_empty() {
            return Err("invalid config: provider.model must not be empty".to_string());
        }
        if self.provider.timeout_secs == 0 {
            return Err("invalid config: provider.timeout_secs must be positive".to_string());
        }
        if self.storage.path.trim().is_empty() {
            return Err("invalid config: storage.path must not be empty".to_string());
        }
        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
