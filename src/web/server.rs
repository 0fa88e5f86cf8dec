//! Axum HTTP server for the gateway.
//!
//! One router serves both live and demo mode; the difference is the
//! [`MessagingProvider`] held in [`GatewayState`].

use std::any::Any;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method, header},
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::{SignalConfig, missing_number};
use crate::error::{ProviderError, ServerError};
use crate::signal::{DEMO_API_URL, DEMO_SENDER, DemoProvider, MessagingProvider, SignalClient};
use crate::web::error::{ApiError, Operation};
use crate::web::handlers::account::*;
use crate::web::handlers::messages::*;

/// Avatars travel base64-encoded in the profile body.
const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Shared state for all gateway handlers. Immutable after startup.
pub struct GatewayState {
    pub provider: Arc<dyn MessagingProvider>,
    /// Provider URL as reported by `/api/config`.
    pub api_url: String,
    /// Number provider requests are attributed to.
    pub sender: Option<String>,
    pub demo: bool,
}

impl GatewayState {
    /// State that forwards to a real provider.
    pub fn live(config: &SignalConfig) -> Result<Self, ProviderError> {
        let client = SignalClient::new(config.api_url.clone())?;
        Ok(Self {
            provider: Arc::new(client),
            api_url: config.api_url.clone(),
            sender: config.number.clone(),
            demo: false,
        })
    }

    /// State backed by the in-memory demo provider.
    pub fn demo() -> Self {
        Self {
            provider: Arc::new(DemoProvider::new()),
            api_url: DEMO_API_URL.to_string(),
            sender: Some(DEMO_SENDER.to_string()),
            demo: true,
        }
    }

    /// The configured sender, or a configuration error for `operation`.
    pub fn sender(&self, operation: Operation) -> Result<&str, ApiError> {
        self.sender
            .as_deref()
            .ok_or_else(|| ApiError::configuration(operation, &missing_number()))
    }
}

/// Build the gateway router. Exposed separately from [`start_server`] so tests
/// can drive it without binding a socket.
pub fn build_router(state: Arc<GatewayState>, cors_origins: &[String]) -> Router {
    let api = Router::new()
        .route("/api/health", get(health_handler))
        .route("/api/groups", get(groups_handler))
        .route("/api/send", post(send_to_group_handler))
        .route("/api/send-test", post(send_test_handler))
        .route("/api/send-to-phone", post(send_to_phone_handler))
        .route("/api/broadcast", post(broadcast_handler))
        .route("/api/sync", post(sync_handler))
        .route("/api/config", get(config_handler))
        .route("/api/profile", put(profile_handler))
        .route("/api/link-device", get(link_device_handler));

    api.fallback(fallback_handler)
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(cors_layer(cors_origins))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// CORS: any origin unless an allow-list is configured. The UI is served from
/// its own dev server on a different port.
fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin: {}", e);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}

async fn fallback_handler() -> ApiError {
    ApiError::not_found()
}

fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let details = if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else {
        "unknown panic".to_string()
    };
    tracing::error!(context = "Unhandled Error", "{}", details);
    ApiError::internal(details).into_response()
}

/// A gateway server running on a background task.
pub struct RunningServer {
    pub addr: SocketAddr,
    shutdown_tx: oneshot::Sender<()>,
    handle: JoinHandle<Result<(), std::io::Error>>,
}

impl RunningServer {
    /// Stop accepting connections and wait for in-flight requests to finish.
    pub async fn shutdown(self) -> Result<(), ServerError> {
        let _ = self.shutdown_tx.send(());
        match self.handle.await {
            Ok(result) => result.map_err(ServerError::from),
            Err(e) => Err(ServerError::Serve(std::io::Error::other(e))),
        }
    }
}

/// Start the gateway HTTP server.
///
/// Returns once the listener is bound; the actual bound address is available
/// as [`RunningServer::addr`] (useful when binding to port 0).
pub async fn start_server(
    addr: &str,
    state: Arc<GatewayState>,
    cors_origins: &[String],
) -> Result<RunningServer, ServerError> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ServerError::StartupFailed {
            reason: format!("Failed to bind to {}: {}", addr, e),
        })?;
    let bound_addr = listener
        .local_addr()
        .map_err(|e| ServerError::StartupFailed {
            reason: format!("Failed to get local addr: {}", e),
        })?;

    let app = build_router(state, cors_origins);
    let (shutdown_tx, shutdown_rx) = oneshot::channel();

    let handle = tokio::spawn(async move {
        let result = axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
                tracing::info!("Gateway shutting down");
            })
            .await;
        if let Err(e) = &result {
            tracing::error!("Gateway server error: {}", e);
        }
        result
    });

    Ok(RunningServer {
        addr: bound_addr,
        shutdown_tx,
        handle,
    })
}

