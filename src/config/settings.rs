use config::{Config, ConfigError, Environment};
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub application: ApplicationSettings,
    #[serde(default)]
    pub provider: ProviderSettings,
    #[serde(default)]
    pub explorer: ExplorerSettings,
    #[serde(default)]
    pub storage: StorageSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApplicationSettings {
    pub port: u16,
    pub host: String,
    #[serde(default = "default_cors_origin")]
    pub cors_allow_origin: String,
    #[serde(default = "default_cors_methods")]
    pub cors_allow_methods: String,
    #[serde(default = "default_cors_headers")]
    pub cors_allow_headers: String,
}

// Default functions for CORS settings
fn default_cors_origin() -> String {
    "*".to_string()
}

fn default_cors_methods() -> String {
    "GET, POST, OPTIONS".to_string()
}

fn default_cors_headers() -> String {
    "Content-Type, Authorization".to_string()
}

/// The wallet's JSON-RPC endpoint. Without a URL the service runs with no
/// provider and every wallet action reports it as unavailable.
#[derive(Debug, Deserialize, Clone)]
pub struct ProviderSettings {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_poll_interval_ms() -> u64 {
    4000
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            url: None,
            poll_interval_ms: default_poll_interval_ms(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl ProviderSettings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ExplorerSettings {
    #[serde(default = "default_explorer_api_url")]
    pub api_url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_explorer_web_url")]
    pub web_url: String,
}

fn default_explorer_api_url() -> String {
    "https://api.etherscan.io/api".to_string()
}

fn default_explorer_web_url() -> String {
    "https://etherscan.io".to_string()
}

impl Default for ExplorerSettings {
    fn default() -> Self {
        Self {
            api_url: default_explorer_api_url(),
            api_key: String::new(),
            web_url: default_explorer_web_url(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageSettings {
    #[serde(default = "default_storage_path")]
    pub path: String,
    /// Keep everything in memory; nothing survives a restart.
    #[serde(default)]
    pub in_memory: bool,
}

fn default_storage_path() -> String {
    "paydesk-state.json".to_string()
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            path: default_storage_path(),
            in_memory: false,
        }
    }
}

impl Settings {
    /// Defaults, then the config file, then `SECTION__KEY` environment
    /// variables.
    pub fn new(config_file: Option<&str>) -> Result<Self, ConfigError> {
        let file = match config_file {
            Some(path) => config::File::with_name(path).required(true),
            None => config::File::with_name("config").required(false),
        };

        let config = Config::builder()
            .set_default("application.host", "0.0.0.0")?
            .set_default("application.port", 8080)?
            .add_source(file)
            .add_source(Environment::default().separator("__"))
            .build()?;

        config.try_deserialize()
    }

    /// Settings with every default applied, for tests and embedding.
    pub fn defaults() -> Self {
        Self {
            application: ApplicationSettings {
                port: 8080,
                host: "0.0.0.0".to_string(),
                cors_allow_origin: default_cors_origin(),
                cors_allow_methods: default_cors_methods(),
                cors_allow_headers: default_cors_headers(),
            },
            provider: ProviderSettings::default(),
            explorer: ExplorerSettings::default(),
            storage: StorageSettings::default(),
        }
    }
}
