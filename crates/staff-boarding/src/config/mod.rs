use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use crate::workflows::boarding::{ClientId, StaffTypeRule};

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
    pub boarding: BoardingConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let port = var_or("APP_PORT", "3000")
            .trim()
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        Ok(Self {
            environment: AppEnvironment::from_str(&var_or("APP_ENV", "development")),
            server: ServerConfig {
                host: var_or("APP_HOST", "127.0.0.1"),
                port,
            },
            telemetry: TelemetryConfig {
                log_level: var_or("APP_LOG_LEVEL", "info"),
            },
            boarding: BoardingConfig::from_env()?,
        })
    }
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
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
}

/// Boarding workflow settings.
#[derive(Debug, Clone)]
pub struct BoardingConfig {
    /// Client whose staff are classified as professionals.
    pub primary_client_id: ClientId,
    /// Optional JSON file with tickets, pay grades, and existing staff.
    pub fixtures_path: Option<PathBuf>,
}

impl BoardingConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let primary_client_id = match env::var("BOARDING_PRIMARY_CLIENT_ID") {
            Ok(raw) => raw
                .trim()
                .parse::<u64>()
                .map(ClientId)
                .map_err(|_| ConfigError::InvalidPrimaryClient { value: raw })?,
            Err(_) => StaffTypeRule::default().primary_client_id,
        };

        let fixtures_path = match var_or("BOARDING_FIXTURES", "").trim() {
            "" => None,
            path => Some(PathBuf::from(path)),
        };

        Ok(Self {
            primary_client_id,
            fixtures_path,
        })
    }

    pub fn staff_type_rule(&self) -> StaffTypeRule {
        StaffTypeRule {
            primary_client_id: self.primary_client_id,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidPrimaryClient { value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidPrimaryClient { value } => write!(
                f,
                "BOARDING_PRIMARY_CLIENT_ID must be a client id, got '{value}'"
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::InvalidPrimaryClient { .. } => None,
            ConfigError::InvalidHost { source } => Some(source),
        }
    }
}
