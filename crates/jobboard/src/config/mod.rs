use std::env;
use std::fmt;

use crate::jobs::domain::LanguageCode;

/// Distinguishes runtime behavior for different stages of the tooling.
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

/// Top-level configuration for the job-board tooling.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub board: BoardConfig,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let default_language = parse_language(
            &env::var("JOBS_DEFAULT_LANGUAGE").unwrap_or_else(|_| "en".to_string()),
        )?;
        let languages = env::var("JOBS_LANGUAGES")
            .unwrap_or_else(|_| "en,de".to_string())
            .split(',')
            .map(parse_language)
            .collect::<Result<Vec<_>, _>>()?;

        if !languages.contains(&default_language) {
            return Err(ConfigError::DefaultLanguageNotOffered {
                value: default_language.as_str().to_string(),
            });
        }

        Ok(Self {
            environment,
            board: BoardConfig {
                default_language,
                languages,
            },
            telemetry: TelemetryConfig { log_level },
        })
    }
}

/// Language settings for the content module.
#[derive(Debug, Clone)]
pub struct BoardConfig {
    pub default_language: LanguageCode,
    pub languages: Vec<LanguageCode>,
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

pub fn parse_language(value: &str) -> Result<LanguageCode, ConfigError> {
    let trimmed = value.trim();
    let valid = (2..=8).contains(&trimmed.len())
        && trimmed.chars().all(|ch| ch.is_ascii_alphabetic());
    if !valid {
        return Err(ConfigError::InvalidLanguage {
            value: value.to_string(),
        });
    }
    Ok(LanguageCode::new(trimmed))
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidLanguage { value: String },
    DefaultLanguageNotOffered { value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidLanguage { value } => {
                write!(f, "'{}' is not a usable language code", value)
            }
            ConfigError::DefaultLanguageNotOffered { value } => {
                write!(f, "JOBS_LANGUAGES must include the default language '{}'", value)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        env::remove_var("APP_ENV");
        env::remove_var("APP_LOG_LEVEL");
        env::remove_var("JOBS_DEFAULT_LANGUAGE");
        env::remove_var("JOBS_LANGUAGES");
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.board.default_language, LanguageCode::new("en"));
        assert_eq!(
            config.board.languages,
            vec![LanguageCode::new("en"), LanguageCode::new("de")]
        );
        assert_eq!(config.telemetry.log_level, "info");
    }

    #[test]
    fn rejects_numeric_language_code() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("JOBS_DEFAULT_LANGUAGE", "e1");
        let error = AppConfig::load().expect_err("numeric code rejected");
        assert!(matches!(error, ConfigError::InvalidLanguage { .. }));
        reset_env();
    }

    #[test]
    fn default_language_must_be_offered() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("JOBS_DEFAULT_LANGUAGE", "fr");
        env::set_var("JOBS_LANGUAGES", "en,de");
        let error = AppConfig::load().expect_err("missing default rejected");
        assert!(matches!(error, ConfigError::DefaultLanguageNotOffered { .. }));
        reset_env();
    }
}
