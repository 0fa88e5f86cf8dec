//! Request and response DTOs for the gateway API.
//!
//! Field names follow the UI's camelCase JSON. Request fields are all
//! optional so that a missing field reaches validation (HTTP 400 with a
//! specific message) instead of failing deserialization.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::signal::{Group, ProfileUpdate};
use crate::web::error::ErrorInfo;

fn is_false(value: &bool) -> bool {
    !*value
}

// --- Health ---

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub backend: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<&'static str>,
    pub signal_api: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorInfo>,
}

// --- Groups ---

#[derive(Debug, Serialize)]
pub struct GroupsResponse {
    pub success: bool,
    pub groups: Vec<Group>,
    pub count: usize,
    #[serde(skip_serializing_if = "is_false")]
    pub demo: bool,
}

// --- Sending ---

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendToGroupRequest {
    pub group_id: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SendTestRequest {
    pub recipients: Option<Vec<String>>,
    pub message: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendToPhoneRequest {
    pub phone_number: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BroadcastRequest {
    pub phone_numbers: Option<Vec<String>>,
    pub message: Option<String>,
}

/// Success body shared by every send endpoint. Each endpoint fills the
/// optional fields that belong to its documented shape.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipient: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipients: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipient_count: Option<usize>,
    pub data: Value,
    #[serde(skip_serializing_if = "is_false")]
    pub demo: bool,
}

impl SendResponse {
    pub fn new(message: String, data: Value, demo: bool) -> Self {
        Self {
            success: true,
            message,
            timestamp: None,
            recipient: None,
            recipients: None,
            recipient_count: None,
            data,
            demo,
        }
    }

    /// Copy the provider's `timestamp` out of the payload, if it has one.
    pub fn with_provider_timestamp(mut self) -> Self {
        self.timestamp = self.data.get("timestamp").cloned();
        self
    }
}

// --- Sync ---

#[derive(Debug, Serialize)]
pub struct SyncResponse {
    pub success: bool,
    pub message: &'static str,
    #[serde(skip_serializing_if = "is_false")]
    pub demo: bool,
}

// --- Profile ---

#[derive(Debug, Default, Deserialize)]
pub struct ProfileRequest {
    pub name: Option<String>,
    pub about: Option<String>,
    pub emoji: Option<String>,
    pub avatar: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub success: bool,
    pub message: &'static str,
    pub profile: ProfileUpdate,
    #[serde(skip_serializing_if = "is_false")]
    pub demo: bool,
}

// --- Device linking ---

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkDeviceQuery {
    pub device_name: Option<String>,
}

// --- Config ---

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigResponse {
    pub signal_api_url: String,
    pub signal_number_configured: bool,
    /// Always present; `null` when no sender is configured.
    pub signal_number_masked: Option<String>,
    #[serde(skip_serializing_if = "is_false")]
    pub demo: bool,
}

// --- Errors ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}
