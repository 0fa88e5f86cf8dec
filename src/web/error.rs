//! Translation of gateway failures into HTTP responses.

use axum::{
    Json,
    extract::rejection::{BytesRejection, JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::error::{ConfigError, ProviderError};
use crate::web::types::ErrorResponse;

const UNREACHABLE_ERROR: &str = "Cannot connect to Signal API";
const UNREACHABLE_HINT: &str = "Ensure Signal API Docker container is running";
const TIMEOUT_HINT: &str = "Signal API did not respond in time";
const NOT_FOUND_ERROR: &str = "Signal account not found";
const BAD_REQUEST_ERROR: &str = "Invalid request";

/// Gateway operation a failure happened in. Drives log context and the
/// user-facing error/hint strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Health,
    ListGroups,
    SendToGroup,
    SendTest,
    SendToPhone,
    Broadcast,
    Sync,
    UpdateProfile,
    LinkDevice,
}

impl Operation {
    /// Label used in logs and diagnostics.
    pub fn context(self) -> &'static str {
        match self {
            Self::Health => "Health Check",
            Self::ListGroups => "Fetch Groups",
            Self::SendToGroup => "Send Message",
            Self::SendTest => "Send Test Message",
            Self::SendToPhone => "Send Message to Phone",
            Self::Broadcast => "Broadcast Message",
            Self::Sync => "Sync",
            Self::UpdateProfile => "Update Profile",
            Self::LinkDevice => "Generate QR Code",
        }
    }

    fn failure_message(self) -> &'static str {
        match self {
            Self::Health => "Health check failed",
            Self::ListGroups => "Failed to fetch groups",
            Self::SendToGroup => "Failed to send message",
            Self::SendTest => "Failed to send test message",
            Self::SendToPhone => "Failed to send message to phone number",
            Self::Broadcast => "Failed to broadcast message",
            Self::Sync => "Sync failed",
            Self::UpdateProfile => "Failed to update profile",
            Self::LinkDevice => "Failed to generate QR code",
        }
    }

    /// Hint for an upstream 404 (sender not registered).
    fn not_found_hint(self) -> Option<&'static str> {
        match self {
            Self::SendToGroup => Some("Register your number with Signal first"),
            Self::SendToPhone => {
                Some("Make sure your number is registered and the recipient has Signal")
            }
            Self::Broadcast => {
                Some("Make sure your number is registered and recipients have Signal")
            }
            Self::UpdateProfile => Some("Make sure your number is registered or linked"),
            _ => None,
        }
    }

    /// Hint for an upstream 400 (malformed request).
    fn bad_request_hint(self) -> Option<&'static str> {
        match self {
            Self::SendToGroup => Some("Check group ID and message format"),
            Self::SendToPhone => {
                Some("Check phone number format (should include country code, e.g., +1234567890)")
            }
            Self::Broadcast => Some(
                "Check phone number formats (should include country code, e.g., +1234567890)",
            ),
            Self::UpdateProfile => Some("Check profile data format"),
            _ => None,
        }
    }

    /// Hint when nothing more specific applies.
    fn default_hint(self) -> Option<&'static str> {
        match self {
            Self::ListGroups => Some("Ensure Signal API is running and number is registered"),
            Self::LinkDevice => Some("Make sure Signal API is running"),
            _ => None,
        }
    }
}

/// Diagnostic record for a provider failure.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorInfo {
    pub timestamp: DateTime<Utc>,
    pub context: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

/// Log a provider failure with its context and return the diagnostic record.
pub fn log_provider_error(operation: Operation, error: &ProviderError) -> ErrorInfo {
    let info = ErrorInfo {
        timestamp: Utc::now(),
        context: operation.context(),
        message: error.to_string(),
        response: error.body().cloned(),
        status: error.status(),
    };
    tracing::error!(
        context = info.context,
        timestamp = %info.timestamp.to_rfc3339(),
        status = ?info.status,
        response = ?info.response,
        "{}",
        info.message
    );
    info
}

/// An error response: HTTP status plus `{success:false, error, details, hint?}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorResponse,
}

impl ApiError {
    fn new(
        status: StatusCode,
        error: impl Into<String>,
        details: Option<String>,
        hint: Option<&str>,
    ) -> Self {
        Self {
            status,
            body: ErrorResponse {
                success: false,
                error: error.into(),
                details,
                hint: hint.map(str::to_string),
            },
        }
    }

    /// Rejected input. Raised before any outbound call.
    pub fn validation(message: &'static str) -> Self {
        tracing::debug!(error = message, "Rejected request");
        Self::new(StatusCode::BAD_REQUEST, message, None, None)
    }

    /// A setting the operation needs is missing or invalid.
    pub fn configuration(operation: Operation, error: &ConfigError) -> Self {
        tracing::error!(context = operation.context(), "{}", error);
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            operation.failure_message(),
            Some(error.to_string()),
            error.hint(),
        )
    }

    /// Translate a provider failure. The upstream status is passed through
    /// when there is one; everything else is a 500.
    pub fn provider(operation: Operation, error: ProviderError) -> Self {
        if let ProviderError::Unsupported { reason, hint } = error {
            tracing::info!(context = operation.context(), "{}", reason);
            return Self::new(StatusCode::NOT_IMPLEMENTED, reason, None, Some(hint));
        }

        let info = log_provider_error(operation, &error);
        let status = info
            .status
            .and_then(|code| StatusCode::from_u16(code).ok())
            .filter(|code| code.is_client_error() || code.is_server_error())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let (message, hint) = match (&error, info.status) {
            (ProviderError::Unreachable { .. }, _) => (UNREACHABLE_ERROR, Some(UNREACHABLE_HINT)),
            (ProviderError::Timeout { .. }, _) => (operation.failure_message(), Some(TIMEOUT_HINT)),
            (_, Some(404)) if operation.not_found_hint().is_some() => {
                (NOT_FOUND_ERROR, operation.not_found_hint())
            }
            (_, Some(400)) if operation.bad_request_hint().is_some() => {
                (BAD_REQUEST_ERROR, operation.bad_request_hint())
            }
            _ => (operation.failure_message(), operation.default_hint()),
        };

        Self::new(status, message, Some(info.message), hint)
    }

    /// Catch-all for failures outside the provider taxonomy.
    pub fn internal(details: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal server error",
            Some(details.into()),
            None,
        )
    }

    pub fn not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, "Not found", None, None)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn body(&self) -> &ErrorResponse {
        &self.body
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(error = %rejection.body_text(), "Rejected request body");
        Self::new(
            StatusCode::BAD_REQUEST,
            "Invalid request body",
            Some(rejection.body_text()),
            None,
        )
    }
}

impl From<BytesRejection> for ApiError {
    fn from(rejection: BytesRejection) -> Self {
        tracing::debug!(error = %rejection.body_text(), "Unreadable request body");
        Self::new(
            rejection.status(),
            "Invalid request body",
            Some(rejection.body_text()),
            None,
        )
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        tracing::debug!(error = %rejection.body_text(), "Rejected query string");
        Self::new(
            StatusCode::BAD_REQUEST,
            "Invalid query string",
            Some(rejection.body_text()),
            None,
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
