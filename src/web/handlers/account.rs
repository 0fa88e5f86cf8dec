//! Account, provider status and device linking API handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::Value;

use crate::signal::ProfileUpdate;
use crate::web::error::{ApiError, Operation, log_provider_error};
use crate::web::extract::JsonBody;
use crate::web::server::GatewayState;
use crate::web::types::*;
use crate::web::validate::{mask_number, require_text};

const DEFAULT_DEVICE_NAME: &str = "SignalPoC";

// --- Health ---

pub async fn health_handler(State(state): State<Arc<GatewayState>>) -> Response {
    let mode = state.demo.then_some("demo");
    match state.provider.health().await {
        Ok(signal_api) => Json(HealthResponse {
            status: "ok",
            backend: "running",
            mode,
            signal_api,
            error: None,
        })
        .into_response(),
        Err(e) => {
            let info = log_provider_error(Operation::Health, &e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(HealthResponse {
                    status: "error",
                    backend: "running",
                    mode,
                    signal_api: Value::String("unreachable".to_string()),
                    error: Some(info),
                }),
            )
                .into_response()
        }
    }
}

// --- Groups ---

pub async fn groups_handler(
    State(state): State<Arc<GatewayState>>,
) -> Result<Json<GroupsResponse>, ApiError> {
    let sender = state.sender(Operation::ListGroups)?;
    tracing::info!(sender = %mask_number(sender), "Fetching groups");

    let groups = state
        .provider
        .list_groups(sender)
        .await
        .map_err(|e| ApiError::provider(Operation::ListGroups, e))?;

    tracing::info!(count = groups.len(), "Groups fetched successfully");
    Ok(Json(GroupsResponse {
        success: true,
        count: groups.len(),
        groups,
        demo: state.demo,
    }))
}

// --- Sync ---

pub async fn sync_handler(
    State(state): State<Arc<GatewayState>>,
) -> Result<Json<SyncResponse>, ApiError> {
    let sender = state.sender(Operation::Sync)?;
    tracing::info!("Syncing with Signal API");

    state
        .provider
        .receive(sender)
        .await
        .map_err(|e| ApiError::provider(Operation::Sync, e))?;

    tracing::info!("Sync completed");
    Ok(Json(SyncResponse {
        success: true,
        message: "Synced successfully",
        demo: state.demo,
    }))
}

// --- Profile ---

/// Build the provider profile body: name trimmed, optional text fields trimmed
/// and dropped when blank, avatar passed through untouched.
fn profile_update(req: &ProfileRequest) -> Result<ProfileUpdate, ApiError> {
    let name = require_text(req.name.as_deref(), "Profile name is required")?;
    let optional_text = |value: &Option<String>| {
        value
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(str::to_string)
    };
    Ok(ProfileUpdate {
        name: name.to_string(),
        about: optional_text(&req.about),
        emoji: optional_text(&req.emoji),
        avatar: req.avatar.clone().filter(|avatar| !avatar.is_empty()),
    })
}

pub async fn profile_handler(
    State(state): State<Arc<GatewayState>>,
    JsonBody(req): JsonBody<ProfileRequest>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let profile = profile_update(&req)?;
    let sender = state.sender(Operation::UpdateProfile)?;

    tracing::info!(
        sender = %mask_number(sender),
        name = %profile.name,
        avatar = profile.avatar.is_some(),
        "Updating profile"
    );

    state
        .provider
        .update_profile(sender, &profile)
        .await
        .map_err(|e| ApiError::provider(Operation::UpdateProfile, e))?;

    tracing::info!("Profile updated successfully");
    Ok(Json(ProfileResponse {
        success: true,
        message: "Profile updated successfully",
        profile,
        demo: state.demo,
    }))
}

// --- Device linking ---

pub async fn link_device_handler(
    State(state): State<Arc<GatewayState>>,
    query: Result<Query<LinkDeviceQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(query) = query?;
    let device_name = query
        .device_name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or(DEFAULT_DEVICE_NAME);
    tracing::info!(device_name = %device_name, "Generating QR code for device linking");

    let image = state
        .provider
        .link_device_qr(device_name)
        .await
        .map_err(|e| ApiError::provider(Operation::LinkDevice, e))?;

    Ok(([(header::CONTENT_TYPE, "image/png")], image).into_response())
}

// --- Config ---

pub async fn config_handler(State(state): State<Arc<GatewayState>>) -> Json<ConfigResponse> {
    Json(ConfigResponse {
        signal_api_url: state.api_url.clone(),
        signal_number_configured: state.sender.is_some(),
        signal_number_masked: state.sender.as_deref().map(mask_number),
        demo: state.demo,
    })
}
