use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("Configuration loading error: {0}")]
    ConfigLoad(#[from] ConfigError),
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

pub type Result<T> = std::result::Result<T, ConfigurationError>;

/// Storage backends understood by the persistence layer
pub const STORAGE_BACKENDS: &[&str] = &["memory", "redis"];

/// Accepted spellings of the token list defaults, compared after trimming and lowercasing
pub const SORT_FIELDS: &[&str] = &[
    "name",
    "price",
    "marketcap",
    "market_cap",
    "pricechange24h",
    "price_change_24h",
];
pub const SORT_ORDERS: &[&str] = &["asc", "ascending", "desc", "descending"];
pub const CATEGORIES: &[&str] = &["all", "tracked", "untracked"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// General system settings
    pub system: SystemSettings,

    /// API server configuration
    pub api: ApiConfig,

    /// Key-value storage configuration (wallet list, preferences)
    pub storage: StorageConfig,

    /// Token list defaults and refresh behaviour
    pub tokens: TokenViewConfig,

    /// Simulated account backend settings
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemSettings {
    /// Enable debug mode
    pub debug_mode: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// API server host
    pub host: String,

    /// API server port
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Backend name: "memory" or "redis"
    pub backend: String,

    /// Redis connection URL (only read when backend = "redis")
    pub redis_url: String,

    /// Namespace prepended to every key written to Redis
    pub key_prefix: String,

    /// Key holding the persisted wallet list
    pub wallet_key: String,

    /// Key holding the persisted user preferences
    pub preferences_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenViewConfig {
    /// Initial sort column: name, price, marketCap or priceChange24h
    pub default_sort_field: String,

    /// Initial sort direction: asc or desc
    pub default_sort_order: String,

    /// Initial category filter: all, tracked or untracked
    pub default_category: String,

    /// Whether hidden tokens are listed before the user asks for them
    pub show_hidden_by_default: bool,

    /// Delay of the sample token source, in milliseconds
    pub refresh_delay_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Delay of the simulated sign-in / registration call, in milliseconds
    pub simulated_delay_ms: u64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            system: SystemSettings { debug_mode: false },
            api: ApiConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
            },
            storage: StorageConfig {
                backend: "memory".to_string(),
                redis_url: "redis://127.0.0.1:6379".to_string(),
                key_prefix: "dashboard".to_string(),
                wallet_key: "wallet-storage".to_string(),
                preferences_key: "userPreferences".to_string(),
            },
            tokens: TokenViewConfig {
                default_sort_field: "marketCap".to_string(),
                default_sort_order: "desc".to_string(),
                default_category: "all".to_string(),
                show_hidden_by_default: false,
                refresh_delay_ms: 1000,
            },
            auth: AuthConfig {
                simulated_delay_ms: 1000,
            },
        }
    }
}

impl StorageConfig {
    /// Validate storage configuration
    pub fn validate(&self) -> Result<()> {
        let backend = self.backend.trim().to_lowercase();
        if !STORAGE_BACKENDS.contains(&backend.as_str()) {
            return Err(ConfigurationError::InvalidValue(format!(
                "Unsupported storage backend: '{}' (expected one of {:?})",
                self.backend, STORAGE_BACKENDS
            )));
        }

        if backend == "redis" && self.redis_url.trim().is_empty() {
            return Err(ConfigurationError::InvalidValue(
                "Redis URL is required when the redis backend is selected".to_string(),
            ));
        }

        if self.wallet_key.trim().is_empty() || self.preferences_key.trim().is_empty() {
            return Err(ConfigurationError::InvalidValue(
                "Storage keys cannot be empty".to_string(),
            ));
        }

        Ok(())
    }

    pub fn uses_redis(&self) -> bool {
        self.backend.trim().eq_ignore_ascii_case("redis")
    }
}

impl TokenViewConfig {
    pub fn validate(&self) -> Result<()> {
        check_choice("token sort field", &self.default_sort_field, SORT_FIELDS)?;
        check_choice("token sort order", &self.default_sort_order, SORT_ORDERS)?;
        check_choice("token category", &self.default_category, CATEGORIES)?;
        Ok(())
    }
}

fn check_choice(what: &str, value: &str, allowed: &[&str]) -> Result<()> {
    let normalized = value.trim().to_lowercase();
    if allowed.contains(&normalized.as_str()) {
        Ok(())
    } else {
        Err(ConfigurationError::InvalidValue(format!(
            "Unsupported {}: '{}' (expected one of {:?})",
            what, value, allowed
        )))
    }
}

impl DashboardConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path("config.toml")
    }

    /// Load configuration from a specific file path
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        let mut config_builder = Config::builder()
            // Start with defaults
            .add_source(Config::try_from(&DashboardConfig::default())?);

        if config_path.as_ref().exists() {
            info!(
                "Loading configuration from: {}",
                config_path.as_ref().display()
            );
            config_builder = config_builder.add_source(File::from(config_path.as_ref()));
        } else {
            debug!("Config file not found, using defaults and environment variables");
        }

        config_builder = config_builder.add_source(
            Environment::with_prefix("DASHBOARD")
                .try_parsing(true)
                .separator("__"),
        );

        let mut dashboard_config: DashboardConfig = config_builder.build()?.try_deserialize()?;
        dashboard_config.storage.backend = dashboard_config.storage.backend.trim().to_lowercase();

        dashboard_config.validate()?;

        Ok(dashboard_config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        self.storage.validate()?;
        self.tokens.validate()?;

        if self.api.port == 0 {
            return Err(ConfigurationError::InvalidValue(
                "API port cannot be 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Get configuration as a JSON value for API responses
    pub fn to_json_value(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

/// Configuration manager for loading and managing dashboard configuration
#[derive(Debug)]
pub struct ConfigManager {
    config: DashboardConfig,
}

impl ConfigManager {
    /// Create a new configuration manager
    pub fn new() -> Result<Self> {
        let config = DashboardConfig::load()?;
        info!("Configuration loaded successfully");
        debug!("Configuration: {:#?}", config);

        Ok(Self { config })
    }

    /// Create configuration manager from a specific file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = DashboardConfig::load_from_path(path)?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }
}
