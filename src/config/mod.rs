use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub api: ApiConfig,
    pub list: ListConfig,
    pub feedback: FeedbackConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    /// No timeout when absent; a hung request leaves the list in `Fetching`.
    pub request_timeout_secs: Option<u64>,
    pub enable_request_logging: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListConfig {
    /// Fixed by the server; only used for row numbering.
    pub page_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackConfig {
    pub success_ms: u64,
    pub error_ms: u64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        if let Ok(v) = env::var("TASKDESK_API_URL") {
            if !v.trim().is_empty() {
                self.api.base_url = v;
            }
        }
        if let Ok(v) = env::var("TASKDESK_REQUEST_TIMEOUT_SECS") {
            self.api.request_timeout_secs = v.parse().ok();
        }
        if let Ok(v) = env::var("TASKDESK_REQUEST_LOGGING") {
            self.api.enable_request_logging = v.parse().unwrap_or(self.api.enable_request_logging);
        }
        if let Ok(v) = env::var("TASKDESK_PAGE_SIZE") {
            self.list.page_size = v
                .parse()
                .ok()
                .filter(|size| *size > 0)
                .unwrap_or(self.list.page_size);
        }
        if let Ok(v) = env::var("TASKDESK_SUCCESS_MS") {
            self.feedback.success_ms = v.parse().unwrap_or(self.feedback.success_ms);
        }
        if let Ok(v) = env::var("TASKDESK_ERROR_MS") {
            self.feedback.error_ms = v.parse().unwrap_or(self.feedback.error_ms);
        }
        self
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            api: ApiConfig {
                base_url: "http://localhost:5000/api".to_string(),
                request_timeout_secs: None,
                enable_request_logging: true,
            },
            list: ListConfig { page_size: 10 },
            feedback: FeedbackConfig {
                success_ms: 2000,
                error_ms: 2500,
            },
        }
    }

    pub fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            api: ApiConfig {
                base_url: "https://staging.example.com/api".to_string(),
                request_timeout_secs: Some(30),
                enable_request_logging: true,
            },
            list: ListConfig { page_size: 10 },
            feedback: FeedbackConfig {
                success_ms: 2000,
                error_ms: 2500,
            },
        }
    }

    pub fn production() -> Self {
        Self {
            environment: Environment::Production,
            api: ApiConfig {
                base_url: "https://app.example.com/api".to_string(),
                request_timeout_secs: Some(15),
                enable_request_logging: false,
            },
            list: ListConfig { page_size: 10 },
            feedback: FeedbackConfig {
                success_ms: 2000,
                error_ms: 2500,
            },
        }
    }

    /// Config with zero feedback delays, for embedding in tests.
    pub fn instant() -> Self {
        let mut config = Self::development();
        config.feedback = FeedbackConfig {
            success_ms: 0,
            error_ms: 0,
        };
        config
    }
}

impl ApiConfig {
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[macro_export]
macro_rules! is_development {
    () => {
        matches!($crate::config::CONFIG.environment, $crate::config::Environment::Development)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::development();
        assert_eq!(config.api.base_url, "http://localhost:5000/api");
        assert_eq!(config.list.page_size, 10);
        assert!(config.api.request_timeout().is_none());
        assert_eq!(config.feedback.success_ms, 2000);
        assert_eq!(config.feedback.error_ms, 2500);
    }

    #[test]
    fn test_default_production_config() {
        let config = AppConfig::production();
        assert_eq!(config.api.request_timeout(), Some(Duration::from_secs(15)));
        assert!(!config.api.enable_request_logging);
    }

    #[test]
    fn test_instant_config_has_no_delays() {
        let config = AppConfig::instant();
        assert_eq!(config.feedback.success_ms, 0);
        assert_eq!(config.feedback.error_ms, 0);
    }
}
