//! HTTP client for signal-cli-rest-api.

use std::error::Error as _;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use serde_json::Value;

use crate::error::ProviderError;
use crate::signal::{Group, MessagingProvider, ProfileUpdate, SendRequest, normalize_groups};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const HEALTH_TIMEOUT: Duration = Duration::from_secs(5);
const GROUPS_TIMEOUT: Duration = Duration::from_secs(10);
const SEND_TIMEOUT: Duration = Duration::from_secs(30);
const PROFILE_TIMEOUT: Duration = Duration::from_secs(10);
const QR_TIMEOUT: Duration = Duration::from_secs(10);
/// Client-side limit for a receive call; must exceed the server-side wait.
const RECEIVE_TIMEOUT: Duration = Duration::from_secs(20);
const RECEIVE_WAIT_SECS: u64 = 15;

/// Forwards gateway operations to a signal-cli-rest-api instance.
///
/// One attempt per call, no retries. Each call carries its own timeout.
#[derive(Debug, Clone)]
pub struct SignalClient {
    http: reqwest::Client,
    base_url: String,
}

impl SignalClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ProviderError> {
        let http = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| ProviderError::Transport(format!("HTTP client init failed: {e}")))?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send a request and turn non-success statuses into [`ProviderError::Status`].
    async fn execute(
        &self,
        request: reqwest::RequestBuilder,
        timeout: Duration,
    ) -> Result<reqwest::Response, ProviderError> {
        let response = request
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| classify_transport_error(e, timeout))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response
            .bytes()
            .await
            .ok()
            .filter(|bytes| !bytes.is_empty())
            .map(|bytes| parse_payload(&bytes));
        Err(ProviderError::Status {
            status: status.as_u16(),
            body,
        })
    }

    async fn read_payload(
        response: reqwest::Response,
        timeout: Duration,
    ) -> Result<Value, ProviderError> {
        let bytes = response
            .bytes()
            .await
            .map_err(|e| classify_transport_error(e, timeout))?;
        Ok(parse_payload(&bytes))
    }
}

#[async_trait]
impl MessagingProvider for SignalClient {
    async fn health(&self) -> Result<Value, ProviderError> {
        let response = self
            .execute(self.http.get(self.url("/v1/health")), HEALTH_TIMEOUT)
            .await?;
        Self::read_payload(response, HEALTH_TIMEOUT).await
    }

    async fn list_groups(&self, sender: &str) -> Result<Vec<Group>, ProviderError> {
        let url = self.url(&format!("/v1/groups/{sender}"));
        let response = self.execute(self.http.get(url), GROUPS_TIMEOUT).await?;
        let payload = Self::read_payload(response, GROUPS_TIMEOUT).await?;
        normalize_groups(payload)
    }

    async fn send(&self, request: &SendRequest) -> Result<Value, ProviderError> {
        let response = self
            .execute(
                self.http.post(self.url("/v2/send")).json(request),
                SEND_TIMEOUT,
            )
            .await?;
        Self::read_payload(response, SEND_TIMEOUT).await
    }

    async fn receive(&self, sender: &str) -> Result<(), ProviderError> {
        let url = self.url(&format!("/v1/receive/{sender}"));
        let request = self
            .http
            .get(url)
            .query(&[("timeout", RECEIVE_WAIT_SECS)]);
        let response = self.execute(request, RECEIVE_TIMEOUT).await?;
        // Contents are not needed, but the receive only counts once fully read.
        response
            .bytes()
            .await
            .map_err(|e| classify_transport_error(e, RECEIVE_TIMEOUT))?;
        Ok(())
    }

    async fn update_profile(
        &self,
        sender: &str,
        profile: &ProfileUpdate,
    ) -> Result<(), ProviderError> {
        let url = self.url(&format!("/v1/profiles/{sender}"));
        let response = self
            .execute(self.http.put(url).json(profile), PROFILE_TIMEOUT)
            .await?;
        response
            .bytes()
            .await
            .map_err(|e| classify_transport_error(e, PROFILE_TIMEOUT))?;
        Ok(())
    }

    async fn link_device_qr(&self, device_name: &str) -> Result<Bytes, ProviderError> {
        let request = self
            .http
            .get(self.url("/v1/qrcodelink"))
            .query(&[("device_name", device_name)]);
        let response = self.execute(request, QR_TIMEOUT).await?;
        response
            .bytes()
            .await
            .map_err(|e| classify_transport_error(e, QR_TIMEOUT))
    }
}

/// Parse a provider body as JSON, falling back to text. An empty body (the
/// provider answers health checks with 204) becomes an empty string.
fn parse_payload(bytes: &[u8]) -> Value {
    if bytes.is_empty() {
        return Value::String(String::new());
    }
    serde_json::from_slice(bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned()))
}

/// Map a transport failure onto the provider error taxonomy.
///
/// The request URL is stripped first: provider paths embed the sender number.
fn classify_transport_error(error: reqwest::Error, timeout: Duration) -> ProviderError {
    let error = error.without_url();
    if error.is_timeout() {
        return ProviderError::Timeout { after: timeout };
    }

    let reason = error_chain(&error);
    if error.is_connect() || is_connection_refused(&error) {
        ProviderError::Unreachable { reason }
    } else {
        ProviderError::Transport(reason)
    }
}

/// True when any error in the source chain is an io connection refusal.
pub(crate) fn is_connection_refused(error: &reqwest::Error) -> bool {
    let mut source = error.source();
    while let Some(err) = source {
        if let Some(io_error) = err.downcast_ref::<std::io::Error>() {
            return matches!(
                io_error.kind(),
                std::io::ErrorKind::ConnectionRefused
                    | std::io::ErrorKind::ConnectionAborted
                    | std::io::ErrorKind::ConnectionReset
                    | std::io::ErrorKind::AddrNotAvailable
            );
        }
        source = err.source();
    }
    false
}

/// Flatten an error and its sources into one line.
pub(crate) fn error_chain(error: &dyn std::error::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(err) = source {
        let text = err.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = err.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_payload_becomes_empty_string() {
        assert_eq!(parse_payload(b""), Value::String(String::new()));
    }

    #[test]
    fn json_payload_is_parsed() {
        let value = parse_payload(br#"{"timestamp":"1700000000000"}"#);
        assert_eq!(value["timestamp"], "1700000000000");
    }

    #[test]
    fn text_payload_is_kept_verbatim() {
        assert_eq!(
            parse_payload(b"Service Unavailable"),
            Value::String("Service Unavailable".to_string())
        );
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let client = SignalClient::new("http://localhost:8080/").unwrap();
        assert_eq!(client.base_url(), "http://localhost:8080");
        assert_eq!(client.url("/v1/health"), "http://localhost:8080/v1/health");
    }

    /// Serve one connection that answers 200 but closes before the declared
    /// body length arrives.
    async fn truncated_body_server() -> Option<String> {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.ok()?;
        let addr = listener.local_addr().ok()?;
        tokio::spawn(async move {
            if let Ok((mut socket, _)) = listener.accept().await {
                let mut buf = [0u8; 4096];
                let _ = socket.read(&mut buf).await;
                let _ = socket
                    .write_all(b"HTTP/1.1 200 OK\r\ncontent-length: 100\r\n\r\n[]")
                    .await;
                let _ = socket.shutdown().await;
            }
        });
        Some(format!("http://{addr}"))
    }

    #[tokio::test]
    async fn receive_fails_when_body_is_cut_short() {
        let Some(url) = truncated_body_server().await else {
            return;
        };
        let client = SignalClient::new(url).unwrap();
        let err = client.receive("+40751770274").await.unwrap_err();
        assert!(
            matches!(
                err,
                ProviderError::Transport(_) | ProviderError::Unreachable { .. }
            ),
            "unexpected error: {err:?}"
        );
    }

    #[tokio::test]
    async fn profile_update_fails_when_body_is_cut_short() {
        let Some(url) = truncated_body_server().await else {
            return;
        };
        let client = SignalClient::new(url).unwrap();
        let profile = ProfileUpdate {
            name: "Alerts".to_string(),
            about: None,
            emoji: None,
            avatar: None,
        };
        assert!(client.update_profile("+40751770274", &profile).await.is_err());
    }

    #[tokio::test]
    async fn closed_port_is_reported_as_unreachable() {
        let listener = match std::net::TcpListener::bind("127.0.0.1:0") {
            Ok(listener) => listener,
            Err(_) => return,
        };
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let client = SignalClient::new(format!("http://127.0.0.1:{port}")).unwrap();
        let err = client.health().await.unwrap_err();
        assert!(err.is_unreachable(), "unexpected error: {err:?}");
    }
}
