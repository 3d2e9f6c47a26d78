use crate::config::ConfigError;
use crate::jobs::forms::FormError;
use crate::jobs::newsletter::NewsletterError;
use crate::jobs::revisions::RevisionError;
use crate::telemetry::TelemetryError;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Revision(RevisionError),
    Form(FormError),
    Newsletter(NewsletterError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Revision(err) => write!(f, "revision error: {}", err),
            AppError::Form(err) => write!(f, "form validation error: {}", err),
            AppError::Newsletter(err) => write!(f, "newsletter error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Revision(err) => Some(err),
            AppError::Form(err) => Some(err),
            AppError::Newsletter(err) => Some(err),
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

impl From<RevisionError> for AppError {
    fn from(value: RevisionError) -> Self {
        Self::Revision(value)
    }
}

impl From<FormError> for AppError {
    fn from(value: FormError) -> Self {
        Self::Form(value)
    }
}

impl From<NewsletterError> for AppError {
    fn from(value: NewsletterError) -> Self {
        Self::Newsletter(value)
    }
}
