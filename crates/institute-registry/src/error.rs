use crate::auth::AuthError;
use crate::config::ConfigError;
use crate::registrations::RegistryServiceError;
use crate::store::StoreError;
use crate::telemetry::TelemetryError;
use std::fmt;

/// Failure of a binary entry point (`serve` or `export`).
#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Store(StoreError),
    Registry(RegistryServiceError),
    Auth(AuthError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Store(err) => write!(f, "store error: {}", err),
            AppError::Registry(err) => write!(f, "{}", err),
            AppError::Auth(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Store(err) => Some(err),
            AppError::Registry(err) => Some(err),
            AppError::Auth(err) => Some(err),
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<StoreError> for AppError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<RegistryServiceError> for AppError {
    fn from(value: RegistryServiceError) -> Self {
        Self::Registry(value)
    }
}

impl From<AuthError> for AppError {
    fn from(value: AuthError) -> Self {
        Self::Auth(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn user_facing_errors_print_their_own_message() {
        let err = AppError::from(RegistryServiceError::NothingToExport);
        assert_eq!(err.to_string(), "No registrations to export.");

        let err = AppError::from(AuthError::TooManyAttempts);
        assert_eq!(
            err.to_string(),
            "Too many failed attempts. Please try again later."
        );
    }

    #[test]
    fn infrastructure_errors_are_prefixed_and_chained() {
        let err = AppError::from(StoreError::Unavailable("snapshot locked".to_string()));
        assert_eq!(
            err.to_string(),
            "store error: store unavailable: snapshot locked"
        );
        let source = err.source().expect("store cause");
        assert_eq!(source.to_string(), "store unavailable: snapshot locked");
    }
}
