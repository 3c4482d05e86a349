// Client error taxonomy
use serde_json::{json, Value};
use thiserror::Error;

use crate::mutation::MutationKind;

/// Errors raised by the client core. None of them is fatal to the process;
/// callers degrade to their previous state and log.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("{0}")]
    LoginFailed(String),

    #[error("Failed to fetch {resource}: {reason}")]
    FetchFailed { resource: String, reason: String },

    #[error("Failed to {kind} {resource}: {reason}")]
    MutationFailed {
        kind: MutationKind,
        resource: String,
        reason: String,
    },

    #[error("Not authenticated")]
    Unauthenticated,

    #[error("A submission is already in progress")]
    Busy,

    #[error("{field}: {message}")]
    Validation { field: String, message: String },

    #[error("Field '{0}' cannot be edited by the current role")]
    FieldNotEditable(String),

    #[error("Invalid response payload: {0}")]
    Decode(String),

    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Invalid endpoint URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl ClientError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        ClientError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn fetch_failed(resource: impl Into<String>, reason: impl Into<String>) -> Self {
        ClientError::FetchFailed {
            resource: resource.into(),
            reason: reason.into(),
        }
    }

    pub fn mutation_failed(
        kind: MutationKind,
        resource: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        ClientError::MutationFailed {
            kind,
            resource: resource.into(),
            reason: reason.into(),
        }
    }

    /// Get error code for machine-readable output
    pub fn error_code(&self) -> &'static str {
        match self {
            ClientError::LoginFailed(_) => "LOGIN_FAILED",
            ClientError::FetchFailed { .. } => "FETCH_FAILED",
            ClientError::MutationFailed { .. } => "MUTATION_FAILED",
            ClientError::Unauthenticated => "UNAUTHENTICATED",
            ClientError::Busy => "BUSY",
            ClientError::Validation { .. } => "VALIDATION_ERROR",
            ClientError::FieldNotEditable(_) => "FIELD_NOT_EDITABLE",
            ClientError::Decode(_) => "INVALID_RESPONSE",
            ClientError::Transport(_) => "TRANSPORT_ERROR",
            ClientError::InvalidUrl(_) => "INVALID_URL",
        }
    }

    /// Convert to JSON body for `--json` output
    pub fn to_json(&self) -> Value {
        let mut response = json!({
            "success": false,
            "error": self.to_string(),
            "error_code": self.error_code(),
        });

        if let ClientError::Validation { field, .. } = self {
            response["field"] = json!(field);
        }

        response
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Decode(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mutation_failed_message_names_kind_and_resource() {
        let err = ClientError::mutation_failed(MutationKind::Delete, "task", "HTTP 500");
        assert_eq!(err.to_string(), "Failed to delete task: HTTP 500");
        assert_eq!(err.error_code(), "MUTATION_FAILED");
    }

    #[test]
    fn validation_json_carries_field() {
        let err = ClientError::validation("email", "Email is required");
        let body = err.to_json();
        assert_eq!(body["success"], false);
        assert_eq!(body["field"], "email");
        assert_eq!(body["error"], "email: Email is required");
    }
}
