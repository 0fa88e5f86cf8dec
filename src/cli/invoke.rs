//! HTTP client the CLI invokers use to reach a running gateway.

use std::time::Duration;

use serde::Deserialize;
use serde_json::{Value, json};

use crate::signal::{error_chain, is_connection_refused};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Gateway reply, success or failure. Every field is optional because the
/// shape depends on the endpoint and outcome.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayReply {
    #[serde(default)]
    pub success: bool,
    pub message: Option<String>,
    pub timestamp: Option<Value>,
    pub recipient: Option<String>,
    #[serde(default)]
    pub recipients: Vec<String>,
    pub recipient_count: Option<usize>,
    pub error: Option<String>,
    pub details: Option<String>,
    pub hint: Option<String>,
}

impl GatewayReply {
    pub fn timestamp_display(&self) -> String {
        match &self.timestamp {
            Some(Value::String(text)) => text.clone(),
            Some(other) => other.to_string(),
            None => "-".to_string(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum InvokeError {
    /// The gateway answered with `success: false`.
    #[error("{error}")]
    Rejected {
        status: u16,
        error: String,
        details: Option<String>,
        hint: Option<String>,
    },

    #[error("Cannot connect to backend server at {url}")]
    Unreachable { url: String },

    #[error("Request to backend failed: {0}")]
    Transport(String),

    #[error("Unexpected response from backend (HTTP {status}): {body}")]
    InvalidResponse { status: u16, body: String },
}

/// Calls the gateway's own HTTP API.
#[derive(Debug, Clone)]
pub struct GatewayClient {
    http: reqwest::Client,
    base_url: String,
}

impl GatewayClient {
    pub fn new(base_url: &str) -> Result<Self, InvokeError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| InvokeError::Transport(format!("HTTP client init failed: {e}")))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub async fn send_to_phone(
        &self,
        phone_number: &str,
        message: &str,
    ) -> Result<GatewayReply, InvokeError> {
        self.post(
            "/api/send-to-phone",
            json!({ "phoneNumber": phone_number, "message": message }),
        )
        .await
    }

    pub async fn broadcast(
        &self,
        phone_numbers: &[String],
        message: &str,
    ) -> Result<GatewayReply, InvokeError> {
        self.post(
            "/api/broadcast",
            json!({ "phoneNumbers": phone_numbers, "message": message }),
        )
        .await
    }

    async fn post(&self, path: &str, body: Value) -> Result<GatewayReply, InvokeError> {
        let response = self
            .http
            .post(format!("{}{}", self.base_url, path))
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() || is_connection_refused(&e) {
                    InvokeError::Unreachable {
                        url: self.base_url.clone(),
                    }
                } else {
                    InvokeError::Transport(error_chain(&e))
                }
            })?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| InvokeError::Transport(error_chain(&e)))?;
        let reply: GatewayReply =
            serde_json::from_str(&text).map_err(|_| InvokeError::InvalidResponse {
                status,
                body: text.clone(),
            })?;

        if reply.success {
            Ok(reply)
        } else {
            Err(InvokeError::Rejected {
                status,
                error: reply
                    .error
                    .unwrap_or_else(|| format!("Request failed with status code {status}")),
                details: reply.details,
                hint: reply.hint,
            })
        }
    }
}

/// Split a recipient argument on commas and whitespace, dropping empty pieces.
pub fn split_recipients(raw: &str) -> Vec<String> {
    raw.split(|c: char| c == ',' || c.is_whitespace())
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .map(str::to_string)
        .collect()
}
