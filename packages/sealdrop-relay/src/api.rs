//! Secret API handlers.
//!
//! - `POST /api/create`     : Store an envelope, returns its id
//! - `GET  /api/secret/:id` : Fetch an envelope (burns read-once secrets)

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use sealdrop_core::api::{CreateSecretResponse, ErrorResponse, FetchSecretResponse};
use sealdrop_core::expiry::ExpiryOption;
use serde::Deserialize;
use serde_json::Value;

use crate::error::SecretError;
use crate::state::RelayState;

// ── Request Types ────────────────────────────────────────────────────────────

/// `POST /api/create` body as it arrives. Fields stay untyped; a bad field
/// type never rejects the whole body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCreateRequest {
    #[serde(default)]
    pub encrypted_payload: Value,
    #[serde(default)]
    pub expiry_option: Value,
    #[serde(default)]
    pub read_once: Value,
}

impl RawCreateRequest {
    /// Strings parse normally; any other non-null value is kept verbatim as
    /// an unrecognized option.
    pub fn expiry_option(&self) -> Option<ExpiryOption> {
        match &self.expiry_option {
            Value::Null => None,
            Value::String(option) => Some(ExpiryOption::parse(option)),
            other => Some(ExpiryOption::Unrecognized(other.to_string())),
        }
    }

    pub fn read_once(&self) -> bool {
        is_truthy(&self.read_once)
    }
}

/// JavaScript truthiness of a JSON value.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: msg.to_string(),
            details: None,
        }),
    )
        .into_response()
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /api/create
///
/// Returns `{secretId}`.
pub async fn create_secret(
    State(state): State<RelayState>,
    body: Result<Json<RawCreateRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match body {
        Ok(body) => body,
        Err(rejection) => {
            tracing::debug!(reason = %rejection.body_text(), "Rejected create body");
            return error_response(StatusCode::BAD_REQUEST, "Invalid request body");
        }
    };

    let read_once = request.read_once();
    let expiry_option = request.expiry_option();
    let payload = match request.encrypted_payload {
        Value::Null => return SecretError::PayloadRequired.into_response(),
        Value::String(payload) => payload,
        _ => return SecretError::InvalidPayload.into_response(),
    };

    match state.store.create(&payload, read_once, expiry_option).await
    {
        Ok(secret_id) => Json(CreateSecretResponse { secret_id }).into_response(),
        Err(e) => e.into_response(),
    }
}

/// GET /api/secret/:id
///
/// Returns `{encryptedPayload, metadata}`. A read-once secret is gone for
/// every later request.
pub async fn get_secret(State(state): State<RelayState>, Path(id): Path<String>) -> Response {
    match state.store.fetch(&id).await {
        Ok(secret) => Json(FetchSecretResponse::from(secret)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Fallback for unmatched routes.
pub async fn not_found(uri: Uri) -> Response {
    if uri.path().starts_with("/api/") {
        error_response(StatusCode::NOT_FOUND, "API endpoint not found")
    } else {
        (StatusCode::NOT_FOUND, "Not Found").into_response()
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request};
    use axum::Router;
    use serde_json::json;
    use tower::ServiceExt;

    use super::*;
    use crate::state::RelayConfig;
    use crate::store::kv::{KvEntry, KvStore, PutOptions, StoreError};
    use crate::store::memory::MemoryKv;
    use crate::store::SecretStore;

    fn app_with(kv: Arc<dyn KvStore>) -> Router {
        let state = RelayState::with_store(RelayConfig::default(), SecretStore::new(kv));
        crate::build_router(state)
    }

    fn app() -> (Router, MemoryKv) {
        let kv = MemoryKv::new();
        (app_with(Arc::new(kv.clone())), kv)
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, bytes.to_vec())
    }

    fn post_create(body: impl Into<Body>) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri("/api/create")
            .header(header::CONTENT_TYPE, "application/json")
            .body(body.into())
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn create(app: &Router, body: Value) -> String {
        let (status, bytes) = send(app, post_create(body.to_string())).await;
        assert_eq!(status, StatusCode::OK);
        let created: CreateSecretResponse = serde_json::from_slice(&bytes).unwrap();
        created.secret_id
    }

    #[tokio::test]
    async fn test_create_and_fetch() {
        let (app, _) = app();
        let id = create(
            &app,
            json!({ "encryptedPayload": "a.b.c.d", "expiryOption": "5min" }),
        )
        .await;
        assert_eq!(id.len(), 16);

        let (status, bytes) = send(&app, get(&format!("/api/secret/{id}"))).await;
        assert_eq!(status, StatusCode::OK);
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["encryptedPayload"], "a.b.c.d");
        assert_eq!(body["metadata"]["readOnce"], false);
        assert_eq!(body["metadata"]["userExpiryOption"], "5min");
        assert!(body["metadata"]["creationTime"].as_i64().unwrap() > 0);
    }

    #[tokio::test]
    async fn test_read_once_second_fetch_is_404() {
        let (app, _) = app();
        let id = create(&app, json!({ "encryptedPayload": "a.b.c.d", "readOnce": true })).await;

        let uri = format!("/api/secret/{id}");
        let (status, _) = send(&app, get(&uri)).await;
        assert_eq!(status, StatusCode::OK);

        let (status, bytes) = send(&app, get(&uri)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let body: ErrorResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body.error, "Secret not found or expired");
    }

    #[tokio::test]
    async fn test_unknown_id_is_404_json() {
        let (app, _) = app();
        let (status, bytes) = send(&app, get("/api/secret/doesnotexist")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let body: ErrorResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body.error, "Secret not found or expired");
        assert_eq!(body.details, None);
    }

    #[tokio::test]
    async fn test_overlong_id_is_400() {
        let (app, _) = app();
        let uri = format!("/api/secret/{}", "a".repeat(33));
        let (status, bytes) = send(&app, get(&uri)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let body: ErrorResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body.error, "Invalid secret ID format");
    }

    #[tokio::test]
    async fn test_create_validation() {
        let (app, kv) = app();

        for body in [
            json!({}),
            json!({ "encryptedPayload": "" }),
            json!({ "encryptedPayload": null }),
        ] {
            let (status, bytes) = send(&app, post_create(body.to_string())).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            let err: ErrorResponse = serde_json::from_slice(&bytes).unwrap();
            assert_eq!(err.error, "Encrypted payload is required");
        }

        let (status, bytes) =
            send(&app, post_create(json!({ "encryptedPayload": 42 }).to_string())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let err: ErrorResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(err.error, "Invalid payload or payload too large");

        assert!(kv.is_empty());
    }

    #[tokio::test]
    async fn test_non_string_expiry_falls_back_to_default() {
        let (app, _) = app();
        let id = create(&app, json!({ "encryptedPayload": "a.b.c.d", "expiryOption": 5 })).await;

        let (status, bytes) = send(&app, get(&format!("/api/secret/{id}"))).await;
        assert_eq!(status, StatusCode::OK);
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["metadata"]["userExpiryOption"], "5");
        assert_eq!(body["metadata"]["readOnce"], false);
    }

    #[tokio::test]
    async fn test_read_once_follows_truthiness() {
        let (app, _) = app();

        for (flag, burns) in [
            (json!(null), false),
            (json!(0), false),
            (json!(""), false),
            (json!("true"), true),
            (json!(1), true),
        ] {
            let id = create(&app, json!({ "encryptedPayload": "a.b.c.d", "readOnce": flag })).await;
            let uri = format!("/api/secret/{id}");

            let (status, _) = send(&app, get(&uri)).await;
            assert_eq!(status, StatusCode::OK);

            let (status, _) = send(&app, get(&uri)).await;
            let expected = if burns {
                StatusCode::NOT_FOUND
            } else {
                StatusCode::OK
            };
            assert_eq!(status, expected, "readOnce = {flag}");
        }
    }

    #[test]
    fn test_raw_request_expiry_mapping() {
        let raw: RawCreateRequest =
            serde_json::from_str(r#"{"encryptedPayload":"p","expiryOption":"1hour"}"#).unwrap();
        assert_eq!(raw.expiry_option(), Some(ExpiryOption::OneHour));

        let raw: RawCreateRequest =
            serde_json::from_str(r#"{"encryptedPayload":"p","expiryOption":null}"#).unwrap();
        assert_eq!(raw.expiry_option(), None);
        assert!(!raw.read_once());

        let raw: RawCreateRequest =
            serde_json::from_str(r#"{"encryptedPayload":"p","expiryOption":true}"#).unwrap();
        assert_eq!(
            raw.expiry_option(),
            Some(ExpiryOption::Unrecognized("true".into()))
        );
    }

    #[tokio::test]
    async fn test_oversized_payload_never_written() {
        let (app, kv) = app();
        let body = json!({ "encryptedPayload": "x".repeat(2_000_001) });
        let (status, _) = send(&app, post_create(body.to_string())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(kv.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_json_is_400() {
        let (app, _) = app();
        let (status, bytes) = send(&app, post_create("{not json")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let err: ErrorResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(err.error, "Invalid request body");
    }

    #[tokio::test]
    async fn test_api_fallback() {
        let (app, _) = app();

        let (status, bytes) = send(&app, get("/api/nope")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let err: ErrorResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(err.error, "API endpoint not found");

        let (status, bytes) = send(&app, get("/somewhere")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(bytes, b"Not Found");
    }

    #[tokio::test]
    async fn test_cors_preflight() {
        let (app, _) = app();
        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri("/api/create")
            .header(header::ORIGIN, "http://localhost:5173")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        let headers = response.headers();
        assert_eq!(
            headers[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "http://localhost:5173"
        );
        assert_eq!(headers[header::ACCESS_CONTROL_MAX_AGE], "600");
    }

    #[tokio::test]
    async fn test_cors_rejects_unknown_origin() {
        let (app, _) = app();
        let request = Request::builder()
            .uri("/api/secret/abc")
            .header(header::ORIGIN, "https://evil.example")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert!(response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .is_none());
    }

    /// Backend that is always down.
    struct DownKv;

    #[async_trait]
    impl KvStore for DownKv {
        async fn put(&self, _: &str, _: String, _: PutOptions) -> Result<(), StoreError> {
            Err(StoreError::Backend("connection refused".into()))
        }

        async fn get_with_metadata(&self, _: &str) -> Result<Option<KvEntry>, StoreError> {
            Err(StoreError::Backend("connection refused".into()))
        }

        async fn delete(&self, _: &str) -> Result<(), StoreError> {
            Err(StoreError::Backend("connection refused".into()))
        }
    }

    #[tokio::test]
    async fn test_storage_failure_is_500_with_details() {
        let app = app_with(Arc::new(DownKv));

        let (status, bytes) =
            send(&app, post_create(json!({ "encryptedPayload": "p" }).to_string())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let err: ErrorResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(err.error, "Internal server error");
        assert_eq!(
            err.details.as_deref(),
            Some("Storage backend error: connection refused")
        );

        let (status, _) = send(&app, get("/api/secret/abc")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
