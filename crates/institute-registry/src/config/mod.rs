use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use crate::registrations::EmptyExportPolicy;

const DEVELOPMENT_SESSION_SECRET: &str = "institute-registry-development-session-secret";
const MIN_SESSION_SECRET_BYTES: usize = 32;
const DEFAULT_LOCKOUT_MINUTES: u32 = 15;

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

    /// Session cookies carry the `Secure` attribute only in production.
    pub const fn secure_cookies(self) -> bool {
        matches!(self, Self::Production)
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub session: SessionConfig,
    pub store: StoreConfig,
    pub export: ExportConfig,
    pub officers: Vec<OfficerAccount>,
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

        let secret = match env::var("APP_SESSION_SECRET") {
            Ok(secret) => secret,
            Err(_) if environment == AppEnvironment::Production => {
                return Err(ConfigError::MissingSessionSecret)
            }
            Err(_) => DEVELOPMENT_SESSION_SECRET.to_string(),
        };
        if secret.len() < MIN_SESSION_SECRET_BYTES {
            return Err(ConfigError::WeakSessionSecret);
        }

        let lockout_minutes = match env::var("APP_LOCKOUT_MINUTES") {
            Ok(raw) => raw
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|minutes| *minutes > 0)
                .ok_or(ConfigError::InvalidLockoutWindow { value: raw })?,
            Err(_) => DEFAULT_LOCKOUT_MINUTES,
        };

        let snapshot_path = env::var("APP_DATA_PATH")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from);

        let empty_policy = match env::var("APP_EXPORT_EMPTY") {
            Ok(raw) => EmptyExportPolicy::parse(&raw)
                .ok_or(ConfigError::InvalidExportPolicy { value: raw })?,
            Err(_) => EmptyExportPolicy::default(),
        };

        let officers = match env::var("APP_OFFICERS") {
            Ok(raw) => parse_officers(&raw)?,
            Err(_) => Vec::new(),
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            session: SessionConfig {
                secret,
                secure_cookies: environment.secure_cookies(),
                lockout_minutes,
            },
            store: StoreConfig { snapshot_path },
            export: ExportConfig { empty_policy },
            officers,
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

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Signing secret and cookie attributes for officer sessions, plus how long a
/// locked-out officer account stays locked.
#[derive(Clone)]
pub struct SessionConfig {
    pub secret: String,
    pub secure_cookies: bool,
    pub lockout_minutes: u32,
}

impl fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionConfig")
            .field("secret", &"<redacted>")
            .field("secure_cookies", &self.secure_cookies)
            .field("lockout_minutes", &self.lockout_minutes)
            .finish()
    }
}

/// Where the bundled document store keeps its snapshot, if anywhere.
#[derive(Debug, Clone, Default)]
pub struct StoreConfig {
    pub snapshot_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ExportConfig {
    pub empty_policy: EmptyExportPolicy,
}

/// Officer credentials accepted by the bundled identity provider.
#[derive(Clone, PartialEq, Eq)]
pub struct OfficerAccount {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for OfficerAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OfficerAccount")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

fn parse_officers(raw: &str) -> Result<Vec<OfficerAccount>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let (email, password) = entry
                .split_once(':')
                .ok_or_else(|| ConfigError::InvalidOfficerEntry {
                    entry: redact_entry(entry),
                })?;
            let email = email.trim();
            if email.is_empty() || password.is_empty() {
                return Err(ConfigError::InvalidOfficerEntry {
                    entry: redact_entry(entry),
                });
            }
            Ok(OfficerAccount {
                email: email.to_ascii_lowercase(),
                password: password.to_string(),
            })
        })
        .collect()
}

fn redact_entry(entry: &str) -> String {
    match entry.split_once(':') {
        Some((email, _)) => format!("{email}:***"),
        None => entry.to_string(),
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    MissingSessionSecret,
    WeakSessionSecret,
    InvalidExportPolicy { value: String },
    InvalidOfficerEntry { entry: String },
    InvalidLockoutWindow { value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::MissingSessionSecret => {
                write!(f, "APP_SESSION_SECRET must be set in production")
            }
            ConfigError::WeakSessionSecret => write!(
                f,
                "APP_SESSION_SECRET must be at least {MIN_SESSION_SECRET_BYTES} bytes"
            ),
            ConfigError::InvalidExportPolicy { value } => write!(
                f,
                "APP_EXPORT_EMPTY must be 'refuse' or 'header' (found '{value}')"
            ),
            ConfigError::InvalidOfficerEntry { entry } => write!(
                f,
                "APP_OFFICERS entries must look like email:password (found '{entry}')"
            ),
            ConfigError::InvalidLockoutWindow { value } => write!(
                f,
                "APP_LOCKOUT_MINUTES must be a positive number of minutes (found '{value}')"
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            _ => None,
        }
    }
}
