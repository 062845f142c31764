use std::fmt;

use concierge::api::ApiError;
use concierge::config::ConfigError;
use concierge::session::SessionError;
use concierge::workflows::application::{FileError, SubmitError};

use crate::telemetry::TelemetryError;

#[derive(Debug)]
pub enum CliError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Session(SessionError),
    Api(ApiError),
    Document(FileError),
    Submit(SubmitError),
    Io(std::io::Error),
    UnknownService(u64),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(err) => write!(f, "configuration error: {}", err),
            CliError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            CliError::Session(err) => write!(f, "{}", err),
            CliError::Api(err) => write!(f, "api error: {}", err),
            CliError::Document(err) => write!(f, "{}", err),
            CliError::Submit(err) => write!(f, "{}", err),
            CliError::Io(err) => write!(f, "io error: {}", err),
            CliError::UnknownService(id) => {
                write!(f, "no service with id {} exists in the catalog", id)
            }
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Config(err) => Some(err),
            CliError::Telemetry(err) => Some(err),
            CliError::Session(err) => Some(err),
            CliError::Api(err) => Some(err),
            CliError::Document(err) => Some(err),
            CliError::Submit(err) => Some(err),
            CliError::Io(err) => Some(err),
            CliError::UnknownService(_) => None,
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for CliError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<SessionError> for CliError {
    fn from(value: SessionError) -> Self {
        Self::Session(value)
    }
}

impl From<ApiError> for CliError {
    fn from(value: ApiError) -> Self {
        Self::Api(value)
    }
}

impl From<FileError> for CliError {
    fn from(value: FileError) -> Self {
        Self::Document(value)
    }
}

impl From<SubmitError> for CliError {
    fn from(value: SubmitError) -> Self {
        Self::Submit(value)
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}
