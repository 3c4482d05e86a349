use serde::Serialize;
use std::time::Duration;

use crate::config::FeedbackConfig;

/// Transient indicator shown after a mutation settles. Dismisses itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "message", rename_all = "lowercase")]
pub enum Feedback {
    Success,
    Error(String),
}

impl Feedback {
    pub fn duration(&self, config: &FeedbackConfig) -> Duration {
        match self {
            Feedback::Success => Duration::from_millis(config.success_ms),
            Feedback::Error(_) => Duration::from_millis(config.error_ms),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Feedback::Success => "Success",
            Feedback::Error(message) => message,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Feedback::Error(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    #[test]
    fn error_feedback_lingers_longer() {
        let config = AppConfig::development().feedback;
        assert_eq!(Feedback::Success.duration(&config), Duration::from_millis(2000));
        assert_eq!(Feedback::Error("x".into()).duration(&config), Duration::from_millis(2500));
    }
}
