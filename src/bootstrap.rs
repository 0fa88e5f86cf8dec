//! Startup helpers: logging setup and the provider connectivity probe.

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::config::{Config, LogFormat};
use crate::web::GatewayState;
use crate::web::validate::mask_number;

const DEFAULT_LOG_FILTER: &str = "signal_gateway=info,tower_http=info";

/// Install the global tracing subscriber. `RUST_LOG` overrides the default
/// filter. Safe to call more than once; later calls are no-ops.
pub fn init_tracing(format: LogFormat) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let _ = match format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Pretty => builder.try_init(),
    };
}

/// Log what the gateway is about to serve. Never logs the full sender number.
pub fn log_startup(config: &Config, state: &GatewayState) {
    if state.demo {
        tracing::warn!("DEMO MODE: running without Signal API, messages are not actually sent");
    }
    tracing::info!(
        addr = %config.gateway.bind_addr(),
        signal_api = %state.api_url,
        sender_configured = state.sender.is_some(),
        sender = %state.sender.as_deref().map(mask_number).unwrap_or_default(),
        "Signal gateway starting"
    );
    if !state.demo && state.sender.is_none() {
        tracing::warn!("SIGNAL_NUMBER is not set; group, send, sync and profile calls will fail");
    }
}

/// Probe provider health in the background and log the outcome. Never blocks
/// startup and never fails it.
pub fn spawn_provider_probe(state: Arc<GatewayState>) {
    if state.demo {
        return;
    }
    tokio::spawn(async move {
        match state.provider.health().await {
            Ok(_) => tracing::info!(signal_api = %state.api_url, "Signal API connection successful"),
            Err(e) => tracing::warn!(
                signal_api = %state.api_url,
                "Cannot connect to Signal API ({}); make sure signal-cli-rest-api is running",
                e
            ),
        }
    });
}
