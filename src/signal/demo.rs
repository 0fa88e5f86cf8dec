//! In-process stand-in for the provider.
//!
//! Serves a fixed group list and simulates sends without any network I/O, so
//! the UI can be exercised without a registered Signal number.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use serde_json::{Value, json};

use crate::error::ProviderError;
use crate::signal::{Group, MessagingProvider, ProfileUpdate, SendRequest};

/// Sender number reported in demo mode.
pub const DEMO_SENDER: &str = "+40751770274";
/// Provider URL reported in demo mode.
pub const DEMO_API_URL: &str = "DEMO MODE";

const SEND_DELAY: Duration = Duration::from_millis(500);

/// The fixed demo group list.
pub fn mock_groups() -> Vec<Group> {
    [
        (
            "mock-group-1",
            "Project Team",
            &["+40751770274", "+40123456789", "+40987654321"][..],
            true,
        ),
        (
            "mock-group-2",
            "Family",
            &["+40751770274", "+40111222333"][..],
            false,
        ),
        (
            "mock-group-3",
            "Safe Wallet Alerts",
            &["+40751770274", "+40555666777", "+40888999000"][..],
            true,
        ),
    ]
    .into_iter()
    .map(|(id, name, members, is_admin)| Group {
        id: id.to_string(),
        internal_id: None,
        name: name.to_string(),
        members: members.iter().map(|m| m.to_string()).collect(),
        member_count: members.len(),
        is_admin,
        is_member: true,
        is_blocked: false,
    })
    .collect()
}

#[derive(Debug, Clone)]
pub struct DemoProvider {
    send_delay: Duration,
}

impl DemoProvider {
    pub fn new() -> Self {
        Self {
            send_delay: SEND_DELAY,
        }
    }
}

impl Default for DemoProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MessagingProvider for DemoProvider {
    async fn health(&self) -> Result<Value, ProviderError> {
        Ok(json!({ "status": "mocked" }))
    }

    async fn list_groups(&self, _sender: &str) -> Result<Vec<Group>, ProviderError> {
        tracing::info!("Returning mock groups");
        Ok(mock_groups())
    }

    async fn send(&self, request: &SendRequest) -> Result<Value, ProviderError> {
        let group_name = match request.recipients.as_slice() {
            [single] => mock_groups()
                .into_iter()
                .find(|group| &group.id == single)
                .map(|group| group.name),
            _ => None,
        };

        tracing::info!(
            recipients = ?request.recipients,
            group = group_name.as_deref().unwrap_or("-"),
            message = %request.message,
            "DEMO send (not delivered)"
        );

        tokio::time::sleep(self.send_delay).await;

        let mut payload = json!({
            "timestamp": chrono::Utc::now().timestamp_millis(),
            "message": request.message,
            "number": request.number,
            "recipients": request.recipients,
        });
        if let Some(name) = group_name {
            payload["groupName"] = Value::String(name);
        }
        Ok(payload)
    }

    async fn receive(&self, _sender: &str) -> Result<(), ProviderError> {
        Ok(())
    }

    async fn update_profile(
        &self,
        _sender: &str,
        profile: &ProfileUpdate,
    ) -> Result<(), ProviderError> {
        tracing::info!(name = %profile.name, "DEMO profile update (not applied)");
        Ok(())
    }

    async fn link_device_qr(&self, _device_name: &str) -> Result<Bytes, ProviderError> {
        Err(ProviderError::Unsupported {
            reason: "Not available in demo mode",
            hint: "Connect real Signal API to use device linking",
        })
    }
}
