//! Error types for the gateway.

use std::time::Duration;

/// Top-level error type for the gateway binary.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Server error: {0}")]
    Server(#[from] ServerError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A setting an operation needs was never provided.
    #[error("{key} not configured in .env file")]
    MissingRequired { key: String, hint: String },

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

impl ConfigError {
    /// Operator-facing remedy, when there is one.
    pub fn hint(&self) -> Option<&str> {
        match self {
            Self::MissingRequired { hint, .. } => Some(hint),
            Self::InvalidValue { .. } => None,
        }
    }
}

/// Failures talking to the messaging provider.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The provider answered with a non-success status.
    #[error("Request failed with status code {status}")]
    Status {
        status: u16,
        body: Option<serde_json::Value>,
    },

    /// The provider refused the connection or could not be resolved.
    #[error("Cannot connect to provider: {reason}")]
    Unreachable { reason: String },

    #[error("Provider did not respond within {}s", .after.as_secs())]
    Timeout { after: Duration },

    #[error("Provider request failed: {0}")]
    Transport(String),

    #[error("Invalid provider response: {0}")]
    InvalidResponse(String),

    /// The active provider does not implement this operation.
    #[error("{reason}")]
    Unsupported {
        reason: &'static str,
        hint: &'static str,
    },
}

impl ProviderError {
    /// Upstream HTTP status, when the provider answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Upstream response body, when one was captured.
    pub fn body(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Status { body, .. } => body.as_ref(),
            _ => None,
        }
    }

    pub fn is_unreachable(&self) -> bool {
        matches!(self, Self::Unreachable { .. })
    }
}

/// HTTP server lifecycle errors.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Gateway failed to start: {reason}")]
    StartupFailed { reason: String },

    #[error("Gateway stopped unexpectedly: {0}")]
    Serve(#[from] std::io::Error),
}

/// Result type alias for the gateway.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_mimics_upstream_message() {
        let err = ProviderError::Status {
            status: 404,
            body: None,
        };
        assert_eq!(err.to_string(), "Request failed with status code 404");
        assert_eq!(err.status(), Some(404));
    }

    #[test]
    fn timeout_reports_whole_seconds() {
        let err = ProviderError::Timeout {
            after: Duration::from_secs(30),
        };
        assert_eq!(err.to_string(), "Provider did not respond within 30s");
        assert!(err.status().is_none());
        assert!(!err.is_unreachable());
    }

    #[test]
    fn missing_setting_names_key_and_hint() {
        let err = ConfigError::MissingRequired {
            key: "SIGNAL_NUMBER".to_string(),
            hint: "Configure SIGNAL_NUMBER in .env file".to_string(),
        };
        assert_eq!(err.to_string(), "SIGNAL_NUMBER not configured in .env file");
        assert_eq!(err.hint(), Some("Configure SIGNAL_NUMBER in .env file"));

        let err: Error = err.into();
        assert!(matches!(err, Error::Config(ConfigError::MissingRequired { .. })));
    }

    #[test]
    fn invalid_value_has_no_hint() {
        let err = ConfigError::InvalidValue {
            key: "PORT".to_string(),
            message: "not a number".to_string(),
        };
        assert!(err.hint().is_none());
    }
}
