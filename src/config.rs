//! Configuration management for F1 Dashboard
//!
//! Settings come from, in increasing precedence: built-in defaults, a TOML
//! config file, the `F1_DASHBOARD_BASE_URL` environment variable, and CLI
//! flags applied by the caller.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use url::Url;

use crate::app::api::ApiConfig;
use crate::app::client::ClientConfig;
use crate::app::query::QueryConfig;
use crate::constants::{api, config, env, http, limits, logging, query};
use crate::errors::{ConfigError, ConfigResult, Result};

/// Unified application configuration for TOML serialization
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP client settings
    pub client: ClientConfigToml,
    /// Data access settings
    pub api: ApiConfig,
    /// Query cache settings
    pub query: QueryConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// TOML-friendly client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfigToml {
    /// Statistics API root
    pub base_url: String,
    /// TCP keep-alive timeout in seconds (None = disabled)
    pub tcp_keepalive_secs: Option<u64>,
    /// Connection pool idle timeout in seconds (None = no timeout)
    pub pool_idle_timeout_secs: Option<u64>,
    pub pool_max_per_host: usize,
    pub request_timeout_secs: u64,
    pub connect_timeout_secs: u64,
    /// Rate limit (requests per second)
    pub rate_limit_rps: u32,
    pub max_retries: u32,
    pub retry_base_delay_ms: u64,
}

impl Default for ClientConfigToml {
    fn default() -> Self {
        Self {
            base_url: api::BASE_URL.to_string(),
            tcp_keepalive_secs: Some(30),
            pool_idle_timeout_secs: Some(http::POOL_IDLE_TIMEOUT.as_secs()),
            pool_max_per_host: http::POOL_MAX_PER_HOST,
            request_timeout_secs: http::DEFAULT_TIMEOUT.as_secs(),
            connect_timeout_secs: http::CONNECT_TIMEOUT.as_secs(),
            rate_limit_rps: limits::DEFAULT_RATE_LIMIT_RPS,
            max_retries: limits::MAX_RETRIES,
            retry_base_delay_ms: limits::RETRY_BASE_DELAY_MS,
        }
    }
}

impl ClientConfigToml {
    /// Convert to runtime ClientConfig
    pub fn to_runtime_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.base_url.clone(),
            tcp_keepalive: self.tcp_keepalive_secs.map(Duration::from_secs),
            pool_idle_timeout: self.pool_idle_timeout_secs.map(Duration::from_secs),
            pool_max_per_host: self.pool_max_per_host,
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            rate_limit_rps: self.rate_limit_rps,
            max_retries: self.max_retries,
            retry_base_delay: Duration::from_millis(self.retry_base_delay_ms),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level used when no verbosity flag is given
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: logging::DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

const LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

impl AppConfig {
    /// Convert to the runtime client, data access and cache configurations
    pub fn to_runtime_config(&self) -> (ClientConfig, ApiConfig, QueryConfig) {
        (
            self.client.to_runtime_config(),
            self.api.clone(),
            self.query.clone(),
        )
    }

    /// Load configuration with multi-source precedence:
    /// 1. Default values
    /// 2. Config file (explicit, else the first found in standard locations)
    /// 3. Environment variables
    ///
    /// An explicitly given file that does not exist is an error.
    pub async fn load(config_file_override: Option<PathBuf>) -> Result<Self> {
        let mut config = Self::default();

        let config_path = match config_file_override {
            Some(path) if path.exists() => Some(path),
            Some(path) => return Err(ConfigError::NotFound { path }.into()),
            None => Self::find_config_file(),
        };

        if let Some(path) = config_path {
            config = Self::load_from_file(&path).await?;
        }

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) {
        self.override_base_url(std::env::var(env::BASE_URL).ok());
    }

    /// Replace the base URL when `base_url` is set and non-empty
    pub fn override_base_url(&mut self, base_url: Option<String>) {
        if let Some(base_url) = base_url.filter(|url| !url.trim().is_empty()) {
            debug!("Base URL overridden: {}", base_url);
            self.client.base_url = base_url;
        }
    }

    /// Check values that would otherwise fail later at runtime
    pub fn validate(&self) -> ConfigResult<()> {
        if let Err(e) = Url::parse(&self.client.base_url) {
            return Err(ConfigError::InvalidValue {
                field: "client.base_url".to_string(),
                value: self.client.base_url.clone(),
                reason: e.to_string(),
            });
        }

        if self.client.rate_limit_rps == 0 {
            return Err(ConfigError::InvalidValue {
                field: "client.rate_limit_rps".to_string(),
                value: "0".to_string(),
                reason: "Rate limit must be at least 1 request per second".to_string(),
            });
        }

        if self.api.fetch_timeout >= self.query.load_timeout {
            return Err(ConfigError::InvalidValue {
                field: "api.fetch_timeout".to_string(),
                value: format!("{:?}", self.api.fetch_timeout),
                reason: format!(
                    "Must be shorter than query.load_timeout ({:?}) so slow remote calls fall back instead of failing the query",
                    self.query.load_timeout
                ),
            });
        }

        if !LOG_LEVELS.contains(&self.logging.level.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "logging.level".to_string(),
                value: self.logging.level.clone(),
                reason: format!("Expected one of: {}", LOG_LEVELS.join(", ")),
            });
        }

        Ok(())
    }

    /// Write the default config file to the user config directory unless
    /// one already exists. Returns its path.
    pub async fn initialize_default_file() -> Result<PathBuf> {
        let config_path = Self::default_config_path()?;

        if config_path.exists() {
            return Ok(config_path);
        }

        if let Some(parent) = config_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&config_path, Self::generate_default_config_content()).await?;

        info!("Created default configuration file: {}", config_path.display());
        Ok(config_path)
    }

    /// Find configuration file in standard locations
    fn find_config_file() -> Option<PathBuf> {
        let mut search_paths = vec![PathBuf::from(format!("./{}", config::LOCAL_FILE_NAME))];
        if let Ok(path) = Self::default_config_path() {
            search_paths.push(path);
        }

        let found = search_paths.into_iter().find(|path| path.exists());
        match &found {
            Some(path) => debug!("Found config file: {}", path.display()),
            None => debug!("No config file found in standard locations"),
        }
        found
    }

    /// Get the default config file path for the current user
    pub fn default_config_path() -> ConfigResult<PathBuf> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join(config::APP_DIR_NAME).join(config::FILE_NAME))
    }

    /// Load configuration from a TOML file
    async fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;

        let config: AppConfig = toml::from_str(&content)?;
        info!("Loaded configuration from: {}", path.display());
        Ok(config)
    }

    /// Generate default configuration content with comments
    pub fn generate_default_config_content() -> String {
        format!(
            r#"# F1 Dashboard Configuration
# Every setting is optional; omitted values use the defaults shown here.

[client]
# Statistics API root (overridden by {env_var} and --base-url)
base_url = "{base_url}"
tcp_keepalive_secs = 30
pool_idle_timeout_secs = {pool_idle}
pool_max_per_host = {pool_max}
request_timeout_secs = {request_timeout}
connect_timeout_secs = {connect_timeout}
rate_limit_rps = {rps}
# Retries on connection errors, HTTP 429 and HTTP 503
max_retries = {retries}
retry_base_delay_ms = {retry_delay}

[api]
# Upper bound on one remote operation before fallback data is used
fetch_timeout = "{fetch_timeout}s"

[query]
# Cached data younger than this is served without refetching
stale_time = "{stale_time}s"
# Unused entries are dropped after this long
gc_time = "{gc_time}s"
# Loads running longer than this are reported as failed
load_timeout = "{load_timeout}s"

[logging]
level = "{level}"  # error, warn, info, debug, trace
"#,
            env_var = env::BASE_URL,
            base_url = api::BASE_URL,
            pool_idle = http::POOL_IDLE_TIMEOUT.as_secs(),
            pool_max = http::POOL_MAX_PER_HOST,
            request_timeout = http::DEFAULT_TIMEOUT.as_secs(),
            connect_timeout = http::CONNECT_TIMEOUT.as_secs(),
            rps = limits::DEFAULT_RATE_LIMIT_RPS,
            retries = limits::MAX_RETRIES,
            retry_delay = limits::RETRY_BASE_DELAY_MS,
            fetch_timeout = api::FETCH_TIMEOUT.as_secs(),
            stale_time = query::STALE_TIME.as_secs(),
            gc_time = query::GC_TIME.as_secs(),
            load_timeout = query::LOAD_TIMEOUT.as_secs(),
            level = logging::DEFAULT_LOG_LEVEL,
        )
    }
}
