//! Message sending API handlers.

use std::sync::Arc;

use axum::{Json, extract::State};

use crate::signal::SendRequest;
use crate::web::error::{ApiError, Operation};
use crate::web::extract::JsonBody;
use crate::web::server::GatewayState;
use crate::web::types::*;
use crate::web::validate::{normalize_phone, preview, require_list, require_text};

const EMPTY_MESSAGE: &str = "Message cannot be empty";
const DEMO_SUFFIX: &str = " (DEMO MODE - not actually sent)";

/// Success text, marked when nothing was actually delivered.
fn success_message(state: &GatewayState, message: impl Into<String>) -> String {
    let mut message = message.into();
    if state.demo {
        message.push_str(DEMO_SUFFIX);
    }
    message
}

/// Forward one send to the provider.
async fn deliver(
    state: &GatewayState,
    operation: Operation,
    sender: &str,
    message: &str,
    recipients: Vec<String>,
) -> Result<serde_json::Value, ApiError> {
    let request = SendRequest {
        message: message.to_string(),
        number: sender.to_string(),
        recipients,
    };
    let payload = state
        .provider
        .send(&request)
        .await
        .map_err(|e| ApiError::provider(operation, e))?;
    tracing::info!(
        context = operation.context(),
        recipients = request.recipients.len(),
        "Message sent successfully"
    );
    Ok(payload)
}

pub async fn send_to_group_handler(
    State(state): State<Arc<GatewayState>>,
    JsonBody(req): JsonBody<SendToGroupRequest>,
) -> Result<Json<SendResponse>, ApiError> {
    let group_id = require_text(req.group_id.as_deref(), "Group ID is required")?;
    let message = require_text(req.message.as_deref(), EMPTY_MESSAGE)?;
    let sender = state.sender(Operation::SendToGroup)?;

    tracing::info!(group_id = %group_id, message = %preview(message), "Sending message to group");

    let data = deliver(
        &state,
        Operation::SendToGroup,
        sender,
        message,
        vec![group_id.to_string()],
    )
    .await?;

    Ok(Json(
        SendResponse::new(
            success_message(&state, "Message sent successfully"),
            data,
            state.demo,
        )
        .with_provider_timestamp(),
    ))
}

pub async fn send_test_handler(
    State(state): State<Arc<GatewayState>>,
    JsonBody(req): JsonBody<SendTestRequest>,
) -> Result<Json<SendResponse>, ApiError> {
    let recipients = require_list(
        req.recipients.as_deref(),
        "At least one recipient is required",
        "Recipients cannot be empty",
    )?;
    let message = require_text(req.message.as_deref(), EMPTY_MESSAGE)?;
    let sender = state.sender(Operation::SendTest)?;

    tracing::info!(recipients = %recipients.join(", "), "Sending test message");

    let data = deliver(&state, Operation::SendTest, sender, message, recipients).await?;

    Ok(Json(SendResponse::new(
        success_message(&state, "Test message sent successfully"),
        data,
        state.demo,
    )))
}

pub async fn send_to_phone_handler(
    State(state): State<Arc<GatewayState>>,
    JsonBody(req): JsonBody<SendToPhoneRequest>,
) -> Result<Json<SendResponse>, ApiError> {
    let phone = require_text(req.phone_number.as_deref(), "Phone number is required")?;
    let message = require_text(req.message.as_deref(), EMPTY_MESSAGE)?;
    let sender = state.sender(Operation::SendToPhone)?;

    let recipient = normalize_phone(phone);
    tracing::info!(recipient = %recipient, message = %preview(message), "Sending message to phone");

    let data = deliver(
        &state,
        Operation::SendToPhone,
        sender,
        message,
        vec![recipient.clone()],
    )
    .await?;

    let mut response = SendResponse::new(
        success_message(&state, "Message sent successfully to phone number"),
        data,
        state.demo,
    )
    .with_provider_timestamp();
    response.recipient = Some(recipient);
    Ok(Json(response))
}

pub async fn broadcast_handler(
    State(state): State<Arc<GatewayState>>,
    JsonBody(req): JsonBody<BroadcastRequest>,
) -> Result<Json<SendResponse>, ApiError> {
    let numbers = require_list(
        req.phone_numbers.as_deref(),
        "At least one phone number is required (phoneNumbers array)",
        "Phone numbers cannot be empty",
    )?;
    let message = require_text(req.message.as_deref(), EMPTY_MESSAGE)?;
    let sender = state.sender(Operation::Broadcast)?;

    let recipients: Vec<String> = numbers.iter().map(|n| normalize_phone(n)).collect();
    tracing::info!(
        count = recipients.len(),
        recipients = %recipients.join(", "),
        message = %preview(message),
        "Broadcasting message"
    );

    let data = deliver(
        &state,
        Operation::Broadcast,
        sender,
        message,
        recipients.clone(),
    )
    .await?;

    let count = recipients.len();
    let mut response = SendResponse::new(
        success_message(&state, format!("Message broadcast to {count} recipients")),
        data,
        state.demo,
    )
    .with_provider_timestamp();
    response.recipients = Some(recipients);
    response.recipient_count = Some(count);
    Ok(Json(response))
}
