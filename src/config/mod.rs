use serde::Deserialize;
use config::{Config, ConfigError, Environment, File};

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub server: ServerConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub pagination: PaginationConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Memory,
    Rest,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,
    /// Base URL of the realtime database, e.g. `https://example-rtdb.firebaseio.com`
    pub url: Option<String>,
    /// Passed as the `auth` query parameter on every request
    pub auth_token: Option<String>,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Memory,
            url: None,
            auth_token: None,
            request_timeout_secs: default_request_timeout(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct PaginationConfig {
    pub page_size: usize,
    pub window: usize,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            page_size: 8,
            window: 5,
        }
    }
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        // Pick up a local .env before reading the environment
        dotenvy::dotenv().ok();

        let config = Config::builder()
            // Start with default values
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("store.backend", "memory")?
            .set_default("store.request_timeout_secs", 30)?
            .set_default("pagination.page_size", 8)?
            .set_default("pagination.window", 5)?

            // Add config file if it exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))

            // Add environment variables (with TRAINHUB__ prefix, double underscore separates levels)
            .add_source(Environment::with_prefix("TRAINHUB").separator("__"))

            .build()?;

        config.try_deserialize()
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            store: StoreConfig::default(),
            pagination: PaginationConfig::default(),
        }
    }
}
