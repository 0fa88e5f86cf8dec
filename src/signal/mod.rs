//! Messaging provider seam.
//!
//! The gateway never talks to signal-cli-rest-api directly from a handler.
//! Handlers call a [`MessagingProvider`]; [`SignalClient`] forwards over HTTP
//! and [`DemoProvider`] answers from memory.

mod client;
mod demo;

pub use self::client::SignalClient;
pub(crate) use self::client::{error_chain, is_connection_refused};
pub use self::demo::{DEMO_API_URL, DEMO_SENDER, DemoProvider, mock_groups};

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ProviderError;

const UNNAMED_GROUP: &str = "Unnamed Group";

/// A provider group, reshaped for the UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub internal_id: Option<String>,
    pub name: String,
    pub members: Vec<String>,
    pub member_count: usize,
    pub is_admin: bool,
    pub is_member: bool,
    pub is_blocked: bool,
}

/// Group record as the provider returns it. Every field may be absent.
#[derive(Debug, Default, Deserialize)]
struct RawGroup {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    internal_id: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    members: Option<Vec<String>>,
    #[serde(default, rename = "isAdmin")]
    is_admin: Option<bool>,
    #[serde(default, rename = "isMember")]
    is_member: Option<bool>,
    #[serde(default, rename = "isBlocked", alias = "blocked")]
    is_blocked: Option<bool>,
}

impl From<RawGroup> for Group {
    fn from(raw: RawGroup) -> Self {
        let members = raw.members.unwrap_or_default();
        Self {
            id: raw.id.unwrap_or_default(),
            internal_id: raw.internal_id,
            name: raw
                .name
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| UNNAMED_GROUP.to_string()),
            member_count: members.len(),
            members,
            is_admin: raw.is_admin.unwrap_or(false),
            is_member: raw.is_member.unwrap_or(false),
            is_blocked: raw.is_blocked.unwrap_or(false),
        }
    }
}

/// Normalize a groups payload that is either a bare array or an object with a
/// `groups` field. Anything else yields no groups.
pub fn normalize_groups(payload: Value) -> Result<Vec<Group>, ProviderError> {
    let list = match payload {
        Value::Array(items) => Value::Array(items),
        Value::Object(mut map) => match map.remove("groups") {
            Some(Value::Null) | None => return Ok(Vec::new()),
            Some(groups) => groups,
        },
        _ => return Ok(Vec::new()),
    };
    let raw: Vec<RawGroup> = serde_json::from_value(list)
        .map_err(|e| ProviderError::InvalidResponse(format!("malformed group list: {e}")))?;
    Ok(raw.into_iter().map(Group::from).collect())
}

/// Body of a provider send call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SendRequest {
    pub message: String,
    pub number: String,
    pub recipients: Vec<String>,
}

/// Profile fields to update. Absent fields are left untouched by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileUpdate {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub about: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emoji: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

/// Operations the gateway needs from the messaging backend.
#[async_trait]
pub trait MessagingProvider: Send + Sync {
    /// Provider health payload.
    async fn health(&self) -> Result<Value, ProviderError>;

    /// Groups the sender belongs to.
    async fn list_groups(&self, sender: &str) -> Result<Vec<Group>, ProviderError>;

    /// Deliver one message to every recipient in a single call. Returns the
    /// provider's raw response payload.
    async fn send(&self, request: &SendRequest) -> Result<Value, ProviderError>;

    /// Trigger a receive cycle so the provider refreshes groups and contacts.
    async fn receive(&self, sender: &str) -> Result<(), ProviderError>;

    async fn update_profile(&self, sender: &str, profile: &ProfileUpdate)
    -> Result<(), ProviderError>;

    /// PNG QR code for linking a new device.
    async fn link_device_qr(&self, device_name: &str) -> Result<Bytes, ProviderError>;
}
