use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use crate::recommendations::TieBreakPolicy;

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
    pub recommendations: RecommendationConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "5000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        let log_format = match env::var("APP_LOG_FORMAT") {
            Ok(value) => value
                .parse::<LogFormat>()
                .map_err(|_| ConfigError::InvalidLogFormat(value))?,
            Err(_) => LogFormat::Compact,
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig {
                log_level,
                log_format,
            },
            recommendations: RecommendationConfig::from_env()?,
        })
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

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" | "text" => Ok(Self::Compact),
            "json" => Ok(Self::Json),
            _ => Err(()),
        }
    }
}

/// Artifact locations and resolution policy for the recommendation engine.
#[derive(Debug, Clone)]
pub struct RecommendationConfig {
    pub dataset_path: PathBuf,
    pub model_path: PathBuf,
    pub transformer_path: PathBuf,
    pub labels_path: PathBuf,
    /// Falls back to the built-in city table when unset.
    pub coordinates_path: Option<PathBuf>,
    pub tie_break: TieBreakPolicy,
}

impl RecommendationConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let path = |key: &str, default: &str| {
            PathBuf::from(env::var(key).unwrap_or_else(|_| default.to_string()))
        };

        let coordinates_path = env::var("PACKAGING_COORDINATES_PATH")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from);

        let tie_break = match env::var("PACKAGING_TIE_BREAK") {
            Ok(value) => value
                .parse::<TieBreakPolicy>()
                .map_err(|_| ConfigError::InvalidTieBreak(value))?,
            Err(_) => TieBreakPolicy::default(),
        };

        Ok(Self {
            dataset_path: path("PACKAGING_DATASET_PATH", "artifacts/packaging_records.csv"),
            model_path: path("PACKAGING_MODEL_PATH", "artifacts/packaging_model.json"),
            transformer_path: path(
                "PACKAGING_TRANSFORMER_PATH",
                "artifacts/column_transformer.json",
            ),
            labels_path: path("PACKAGING_LABELS_PATH", "artifacts/label_encoder.json"),
            coordinates_path,
            tie_break,
        })
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidLogFormat(String),
    InvalidTieBreak(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidLogFormat(value) => write!(
                f,
                "APP_LOG_FORMAT must be 'compact' or 'json', got '{}'",
                value
            ),
            ConfigError::InvalidTieBreak(value) => write!(
                f,
                "PACKAGING_TIE_BREAK must be 'first_encountered' or 'lexicographic', got '{}'",
                value
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort
            | ConfigError::InvalidLogFormat(_)
            | ConfigError::InvalidTieBreak(_) => None,
            ConfigError::InvalidHost { source } => Some(source),
        }
    }
}
