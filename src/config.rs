//! Configuration module
//!
//! Loads configuration from environment variables.

use std::env;
use std::time::Duration;

/// Default referral lookup quiet period in milliseconds
pub const DEFAULT_REFERRAL_DEBOUNCE_MS: u64 = 500;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Backend base URL, e.g. `https://host/api/v1`
    pub api_base_url: String,

    /// Quiet period before a referral lookup is issued
    pub referral_debounce: Duration,

    /// Optional transport timeout; `None` leaves requests unbounded
    pub http_timeout: Option<Duration>,

    /// Environment (development, production)
    pub environment: String,
}

impl Config {
    /// Load `.env` if present, then read the environment
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_env()
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_base_url = env::var("ENROLLMENT_API_URL")
            .map_err(|_| ConfigError::MissingEnv("ENROLLMENT_API_URL"))?;
        if !(api_base_url.starts_with("http://") || api_base_url.starts_with("https://")) {
            return Err(ConfigError::InvalidValue("ENROLLMENT_API_URL"));
        }
        let api_base_url = api_base_url.trim_end_matches('/').to_string();

        let referral_debounce_ms: u64 = env::var("REFERRAL_DEBOUNCE_MS")
            .unwrap_or_else(|_| DEFAULT_REFERRAL_DEBOUNCE_MS.to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("REFERRAL_DEBOUNCE_MS"))?;

        let http_timeout = match env::var("HTTP_TIMEOUT_SECS") {
            Ok(value) => {
                let secs: u64 = value
                    .parse()
                    .map_err(|_| ConfigError::InvalidValue("HTTP_TIMEOUT_SECS"))?;
                Some(Duration::from_secs(secs))
            }
            Err(_) => None,
        };

        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        Ok(Self {
            api_base_url,
            referral_debounce: Duration::from_millis(referral_debounce_ms),
            http_timeout,
            environment,
        })
    }

    /// Configuration pointing at an explicit base URL with defaults elsewhere
    pub fn with_base_url(api_base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: api_base_url.into().trim_end_matches('/').to_string(),
            referral_debounce: Duration::from_millis(DEFAULT_REFERRAL_DEBOUNCE_MS),
            http_timeout: None,
            environment: "development".to_string(),
        }
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnv(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Mutex, MutexGuard};

    /// Process environment is shared across test threads
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    const VARS: [&str; 4] = [
        "ENROLLMENT_API_URL",
        "REFERRAL_DEBOUNCE_MS",
        "HTTP_TIMEOUT_SECS",
        "ENVIRONMENT",
    ];

    /// Lock the environment and set exactly the given variables
    fn with_env(vars: &[(&str, &str)]) -> MutexGuard<'static, ()> {
        let guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        for name in VARS {
            env::remove_var(name);
        }
        for (name, value) in vars {
            env::set_var(name, value);
        }
        guard
    }

    #[test]
    fn test_from_env_requires_api_url() {
        let _env = with_env(&[]);
        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::MissingEnv("ENROLLMENT_API_URL"))
        ));
    }

    #[test]
    fn test_from_env_rejects_non_http_url() {
        let _env = with_env(&[("ENROLLMENT_API_URL", "ftp://example.com/api")]);
        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::InvalidValue("ENROLLMENT_API_URL"))
        ));
    }

    #[test]
    fn test_from_env_defaults() {
        let _env = with_env(&[("ENROLLMENT_API_URL", "https://gym.example.com/api/v1/")]);
        let config = Config::from_env().unwrap();

        assert_eq!(config.api_base_url, "https://gym.example.com/api/v1");
        assert_eq!(config.referral_debounce, Duration::from_millis(500));
        assert!(config.http_timeout.is_none());
        assert_eq!(config.environment, "development");
    }

    #[test]
    fn test_from_env_reads_overrides() {
        let _env = with_env(&[
            ("ENROLLMENT_API_URL", "http://localhost:8000/api/v1"),
            ("REFERRAL_DEBOUNCE_MS", "250"),
            ("HTTP_TIMEOUT_SECS", "15"),
            ("ENVIRONMENT", "production"),
        ]);
        let config = Config::from_env().unwrap();

        assert_eq!(config.referral_debounce, Duration::from_millis(250));
        assert_eq!(config.http_timeout, Some(Duration::from_secs(15)));
        assert!(config.is_production());
    }

    #[test]
    fn test_from_env_rejects_bad_numbers() {
        let _env = with_env(&[
            ("ENROLLMENT_API_URL", "http://localhost:8000"),
            ("REFERRAL_DEBOUNCE_MS", "abc"),
        ]);
        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::InvalidValue("REFERRAL_DEBOUNCE_MS"))
        ));

        env::remove_var("REFERRAL_DEBOUNCE_MS");
        env::set_var("HTTP_TIMEOUT_SECS", "soon");
        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::InvalidValue("HTTP_TIMEOUT_SECS"))
        ));
    }

    #[test]
    fn test_with_base_url_defaults() {
        let config = Config::with_base_url("http://localhost:8000/api/v1/");
        assert_eq!(config.api_base_url, "http://localhost:8000/api/v1");
        assert_eq!(config.referral_debounce, Duration::from_millis(500));
        assert!(config.http_timeout.is_none());
        assert!(!config.is_production());
    }
}
