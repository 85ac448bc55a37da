//! Error types for chanchito-core
//!
//! Three families: `CoreError` for local storage and configuration,
//! `ApiError` for remote calls, `ValidationError` for form input that never
//! reaches the network.

use std::path::PathBuf;
use thiserror::Error;

/// Local (non-network) error type for chanchito operations
#[derive(Error, Debug)]
pub enum CoreError {
    // ===================
    // IO Errors
    // ===================
    #[error("Failed to read file: {path}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file: {path}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ===================
    // Parse Errors
    // ===================
    #[error("Failed to parse JSON in {path}: {message}")]
    JsonParse {
        path: PathBuf,
        message: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to parse TOML in {path}")]
    TomlParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    // ===================
    // Config Errors
    // ===================
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("Config directory not found")]
    ConfigDirNotFound,

    // ===================
    // Session Errors
    // ===================
    #[error("Invalid session: {message}")]
    InvalidSession { message: String },
}

/// Client-side validation failure, raised before any call is issued
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{field} is required")]
    MissingField { field: &'static str },

    #[error("{field} must be a number (got '{value}')")]
    InvalidNumber { field: &'static str, value: String },

    #[error("{field} must not be negative")]
    Negative { field: &'static str },

    #[error("'{value}' is not a valid option for {field}")]
    InvalidChoice { field: &'static str, value: String },
}

/// Error returned by the remote call wrapper
#[derive(Error, Debug)]
pub enum ApiError {
    /// A call was attempted without an active session. Local precondition.
    #[error("No active session")]
    NotAuthenticated,

    /// The server rejected the bearer token (401/403). The session has been cleared.
    #[error("Session rejected by the server (HTTP {status})")]
    SessionExpired { status: u16 },

    /// Login was refused by the server
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Network error calling {endpoint}")]
    Network {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Server returned HTTP {status} for {endpoint}")]
    Http {
        endpoint: String,
        status: u16,
        body: Option<String>,
    },

    #[error("Malformed response from {endpoint}: {message}")]
    MalformedPayload { endpoint: String, message: String },

    #[error("Failed to build HTTP client")]
    Client(#[source] reqwest::Error),

    #[error(transparent)]
    Storage(#[from] CoreError),
}

/// What the user should see for a failed call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserOutcome {
    /// Credentials are gone or were rejected: go back to the login view
    RedirectToLogin,
    /// Transient notification (toast); the current view keeps its state
    Notify(String),
    /// Message shown next to the form that triggered the call
    Inline(String),
}

impl ApiError {
    /// Map this error to the user-facing outcome
    pub fn outcome(&self) -> UserOutcome {
        match self {
            ApiError::NotAuthenticated | ApiError::SessionExpired { .. } => {
                UserOutcome::RedirectToLogin
            }
            ApiError::InvalidCredentials => {
                UserOutcome::Inline("Invalid credentials. Try again!".to_string())
            }
            ApiError::Validation(e) => UserOutcome::Inline(e.to_string()),
            ApiError::Network { .. } => {
                UserOutcome::Notify("Could not reach the server".to_string())
            }
            ApiError::Http { status, body, .. } => match body {
                Some(body) => UserOutcome::Notify(format!("Server error {}: {}", status, body)),
                None => UserOutcome::Notify(format!("Server error {}", status)),
            },
            other => UserOutcome::Notify(other.to_string()),
        }
    }

    /// True when the server rejected the credentials of an authenticated call
    pub fn is_session_expired(&self) -> bool {
        matches!(self, ApiError::SessionExpired { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_failures_redirect() {
        assert_eq!(
            ApiError::NotAuthenticated.outcome(),
            UserOutcome::RedirectToLogin
        );
        assert_eq!(
            ApiError::SessionExpired { status: 401 }.outcome(),
            UserOutcome::RedirectToLogin
        );
    }

    #[test]
    fn test_login_and_validation_failures_are_inline() {
        assert!(matches!(
            ApiError::InvalidCredentials.outcome(),
            UserOutcome::Inline(_)
        ));

        let err = ApiError::from(ValidationError::MissingField { field: "Username" });
        assert_eq!(
            err.outcome(),
            UserOutcome::Inline("Username is required".to_string())
        );
    }

    #[test]
    fn test_resource_failures_notify() {
        let err = ApiError::Http {
            endpoint: "GET productos/listar".to_string(),
            status: 500,
            body: None,
        };
        assert_eq!(err.outcome(), UserOutcome::Notify("Server error 500".to_string()));

        let err = ApiError::MalformedPayload {
            endpoint: "GET productos/listar".to_string(),
            message: "expected array".to_string(),
        };
        assert!(matches!(err.outcome(), UserOutcome::Notify(_)));
        assert!(!err.is_session_expired());
    }
}
