//! Configuration loading and constants.
//!
//! `AppConfig` is built once at startup: defaults, optionally overlaid by a TOML
//! file, then overridden by environment variables. Handlers only ever see the
//! resolved values through `AppState`.

use serde::Deserialize;
use std::path::Path;

// =============================================================================
// HTTP Response Cache Control
// =============================================================================

/// Probe responses must never be served from an intermediate cache
pub const CACHE_CONTROL_PROBE: &str = "no-store";

// =============================================================================
// Defaults
// =============================================================================

/// Default listen address
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default listen port when PORT is not set
pub const DEFAULT_PORT: u16 = 3000;

/// Default deployment environment label
pub const DEFAULT_ENVIRONMENT: &str = "development";

/// Default service version
pub const DEFAULT_VERSION: &str = "1.0.0";

/// Default hostname reported by the welcome endpoint
pub const DEFAULT_HOSTNAME: &str = "unknown";

/// Default log filter when RUST_LOG is not set
pub const DEFAULT_LOG_FILTER: &str = "vigil=info,tower_http=info";

/// Default log format (text or json)
pub const DEFAULT_LOG_FORMAT: &str = "text";

// =============================================================================
// Environment Variables
// =============================================================================

pub const ENV_PORT: &str = "PORT";
pub const ENV_APP_ENV: &str = "APP_ENV";
pub const ENV_NODE_ENV: &str = "NODE_ENV";
pub const ENV_APP_VERSION: &str = "APP_VERSION";
pub const ENV_HOSTNAME: &str = "HOSTNAME";
pub const ENV_SHUTDOWN_TIMEOUT: &str = "SHUTDOWN_TIMEOUT_SECONDS";
pub const ENV_LOG_FORMAT: &str = "LOG_FORMAT";

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct AppConfig {
    /// HTTP listener configuration
    #[serde(default)]
    pub http: HttpServerConfig,
    /// Values reported by the endpoints
    #[serde(default)]
    pub service: ServiceConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct HttpServerConfig {
    #[serde(default = "HttpServerConfig::default_host")]
    pub host: String,
    #[serde(default = "HttpServerConfig::default_port")]
    pub port: u16,
    /// Upper bound on the shutdown drain. `None` waits for every in-flight
    /// request, however long it takes.
    #[serde(default)]
    pub drain_timeout_seconds: Option<u64>,
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            host: Self::default_host(),
            port: Self::default_port(),
            drain_timeout_seconds: None,
        }
    }
}

impl HttpServerConfig {
    fn default_host() -> String {
        DEFAULT_HOST.to_string()
    }

    fn default_port() -> u16 {
        DEFAULT_PORT
    }
}

/// Identity of the running deployment
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ServiceConfig {
    #[serde(default = "ServiceConfig::default_environment")]
    pub environment: String,
    #[serde(default = "ServiceConfig::default_version")]
    pub version: String,
    #[serde(default = "ServiceConfig::default_hostname")]
    pub hostname: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            environment: Self::default_environment(),
            version: Self::default_version(),
            hostname: Self::default_hostname(),
        }
    }
}

impl ServiceConfig {
    fn default_environment() -> String {
        DEFAULT_ENVIRONMENT.to_string()
    }

    fn default_version() -> String {
        DEFAULT_VERSION.to_string()
    }

    fn default_hostname() -> String {
        DEFAULT_HOSTNAME.to_string()
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Log format: "text" (human-readable, default) or "json" (structured)
    #[serde(default = "LoggingConfig::default_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: DEFAULT_LOG_FORMAT.to_string(),
        }
    }
}

impl LoggingConfig {
    fn default_format() -> String {
        DEFAULT_LOG_FORMAT.to_string()
    }

    pub fn is_json(&self) -> bool {
        self.format == "json"
    }
}

impl AppConfig {
    /// Load configuration from an optional TOML file plus the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Apply environment overrides using `lookup` to resolve variable names.
    ///
    /// Empty values count as unset. `APP_ENV` takes precedence over `NODE_ENV`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.is_empty());

        if let Some(port) = get(ENV_PORT) {
            self.http.port = port.trim().parse::<u16>().map_err(|_| {
                ConfigError::Validation(format!("{ENV_PORT} must be a port number, got {port:?}"))
            })?;
        }

        if let Some(timeout) = get(ENV_SHUTDOWN_TIMEOUT) {
            let seconds = timeout.trim().parse::<u64>().map_err(|_| {
                ConfigError::Validation(format!(
                    "{ENV_SHUTDOWN_TIMEOUT} must be a number of seconds, got {timeout:?}"
                ))
            })?;
            self.http.drain_timeout_seconds = Some(seconds);
        }

        if let Some(environment) = get(ENV_APP_ENV).or_else(|| get(ENV_NODE_ENV)) {
            self.service.environment = environment;
        }
        if let Some(version) = get(ENV_APP_VERSION) {
            self.service.version = version;
        }
        if let Some(hostname) = get(ENV_HOSTNAME) {
            self.service.hostname = hostname;
        }
        if let Some(format) = get(ENV_LOG_FORMAT) {
            self.logging.format = format;
        }

        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.logging.format.as_str() {
            "text" | "json" => Ok(()),
            other => Err(ConfigError::Validation(format!(
                "logging.format must be \"text\" or \"json\", got {other:?}"
            ))),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Configuration error: {0}")]
    Validation(String),
}
