use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use crate::quota::DEFAULT_DAILY_LIMIT;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub assistant: Option<AssistantConfig>,
    pub quota: QuotaConfig,
    pub jobs: JobConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let assistant = match env::var("APP_ASSIST_URL") {
            Ok(endpoint) if !endpoint.trim().is_empty() => Some(AssistantConfig {
                endpoint: endpoint.trim().to_string(),
                api_key: env::var("APP_ASSIST_API_KEY").ok(),
                model: env::var("APP_ASSIST_MODEL")
                    .unwrap_or_else(|_| DEFAULT_ASSIST_MODEL.to_string()),
                timeout: Duration::from_secs(parse_number(
                    "APP_ASSIST_TIMEOUT_SECS",
                    DEFAULT_ASSIST_TIMEOUT_SECS,
                )?),
            }),
            _ => None,
        };

        let daily_limit = parse_number("APP_ASSIST_DAILY_LIMIT", u64::from(DEFAULT_DAILY_LIMIT))?;
        let daily_limit =
            u32::try_from(daily_limit).map_err(|_| ConfigError::InvalidNumber {
                key: "APP_ASSIST_DAILY_LIMIT",
                value: daily_limit.to_string(),
            })?;
        let courtesy_delay_ms = parse_number("APP_BATCH_DELAY_MS", DEFAULT_BATCH_DELAY_MS)?;
        let target_timeout = match env::var("APP_BATCH_TARGET_TIMEOUT_SECS") {
            Ok(raw) => Some(Duration::from_secs(raw.trim().parse::<u64>().map_err(|_| {
                ConfigError::InvalidNumber {
                    key: "APP_BATCH_TARGET_TIMEOUT_SECS",
                    value: raw.clone(),
                }
            })?)),
            Err(_) => None,
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig {
                log_level,
                ansi: environment == AppEnvironment::Development,
            },
            assistant,
            quota: QuotaConfig { daily_limit },
            jobs: JobConfig {
                courtesy_delay: Duration::from_millis(courtesy_delay_ms),
                target_timeout,
            },
        })
    }
}

const DEFAULT_ASSIST_MODEL: &str = "gpt-4o-mini";
const DEFAULT_ASSIST_TIMEOUT_SECS: u64 = 20;
const DEFAULT_BATCH_DELAY_MS: u64 = 1_500;

fn parse_number(key: &'static str, default: u64) -> Result<u64, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .map_err(|_| ConfigError::InvalidNumber { key, value: raw }),
        Err(_) => Ok(default),
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
    /// Colored output; only enabled for local development.
    pub ansi: bool,
}

/// Connection details for the external scoring assistant.
#[derive(Clone)]
pub struct AssistantConfig {
    pub endpoint: String,
    pub api_key: Option<String>,
    pub model: String,
    pub timeout: Duration,
}

impl fmt::Debug for AssistantConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssistantConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Daily allowance for assisted scoring calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaConfig {
    pub daily_limit: u32,
}

/// Pacing controls for batch jobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobConfig {
    pub courtesy_delay: Duration,
    pub target_timeout: Option<Duration>,
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            courtesy_delay: Duration::from_millis(DEFAULT_BATCH_DELAY_MS),
            target_timeout: None,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidNumber { key: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidNumber { key, value } => {
                write!(f, "{key} must be a non-negative integer (got '{value}')")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::InvalidNumber { .. } => None,
            ConfigError::InvalidHost { source } => Some(source),
        }
    }
}
