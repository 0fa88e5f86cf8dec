//! Request body extraction for the JSON endpoints.

use axum::{
    Json,
    body::Bytes,
    extract::{FromRequest, Request},
    http::{HeaderMap, header},
};
use serde::de::DeserializeOwned;

use crate::web::error::ApiError;

/// A JSON request body that reads as `T::default()` when the body is empty or
/// not declared as JSON, so that field validation names what is missing.
/// Declared JSON that fails to parse is still rejected.
#[derive(Debug)]
pub struct JsonBody<T>(pub T);

impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned + Default,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let declared_json = is_json_content(req.headers());
        let bytes = Bytes::from_request(req, state).await?;
        if !declared_json || bytes.is_empty() {
            return Ok(Self(T::default()));
        }
        let Json(value) = Json::<T>::from_bytes(&bytes)?;
        Ok(Self(value))
    }
}

/// `application/json` or any `+json` media type, parameters ignored.
fn is_json_content(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .map(|mime| {
            let mime = mime.trim().to_ascii_lowercase();
            mime == "application/json" || mime.ends_with("+json")
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::StatusCode;

    use crate::web::types::SendToGroupRequest;

    async fn extract(content_type: Option<&str>, body: &'static str) -> Result<SendToGroupRequest, ApiError> {
        let mut builder = Request::builder().method("POST").uri("/api/send");
        if let Some(content_type) = content_type {
            builder = builder.header(header::CONTENT_TYPE, content_type);
        }
        let req = builder.body(Body::from(body)).unwrap();
        JsonBody::<SendToGroupRequest>::from_request(req, &())
            .await
            .map(|JsonBody(value)| value)
    }

    #[tokio::test]
    async fn json_body_is_parsed() {
        let req = extract(
            Some("application/json; charset=utf-8"),
            r#"{"groupId":"group.x","message":"hi"}"#,
        )
        .await
        .unwrap();
        assert_eq!(req.group_id.as_deref(), Some("group.x"));
        assert_eq!(req.message.as_deref(), Some("hi"));
    }

    #[tokio::test]
    async fn missing_or_foreign_content_reads_as_empty() {
        let req = extract(None, "").await.unwrap();
        assert!(req.group_id.is_none());

        let req = extract(Some("text/plain"), "groupId=group.x").await.unwrap();
        assert!(req.group_id.is_none() && req.message.is_none());

        let req = extract(Some("application/json"), "").await.unwrap();
        assert!(req.message.is_none());
    }

    #[tokio::test]
    async fn malformed_json_is_rejected() {
        let err = extract(Some("application/json"), "{not json").await.unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.body().error, "Invalid request body");
        assert!(err.body().details.is_some());
    }

    #[test]
    fn vendor_json_types_count_as_json() {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, "application/vnd.api+json".parse().unwrap());
        assert!(is_json_content(&headers));
        headers.insert(header::CONTENT_TYPE, "text/html".parse().unwrap());
        assert!(!is_json_content(&headers));
    }
}
