//! JSON bodies exchanged between clients and the relay.
//!
//! - `POST /api/create`      : [`CreateSecretRequest`] → [`CreateSecretResponse`]
//! - `GET  /api/secret/:id`  → [`FetchSecretResponse`]
//! - any failure             : [`ErrorResponse`]

use serde::{Deserialize, Serialize};

use crate::expiry::ExpiryOption;

/// Body of `POST /api/create`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSecretRequest {
    /// Envelope string produced by [`crate::crypto::encrypt`]
    pub encrypted_payload: String,
    /// Requested lifetime; the relay defaults to one day when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_option: Option<ExpiryOption>,
    /// Burn after the first successful fetch
    #[serde(default)]
    pub read_once: bool,
}

/// Response of `POST /api/create`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSecretResponse {
    /// Identifier the receiver needs to fetch the secret
    pub secret_id: String,
}

/// Relay-side metadata stored beside each envelope
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecretMetadata {
    /// Burn after the first successful fetch
    pub read_once: bool,
    /// Unix milliseconds when the relay accepted the secret
    pub creation_time: i64,
    /// Option the sender asked for, echoed back for display
    pub user_expiry_option: Option<ExpiryOption>,
}

/// Response of `GET /api/secret/:id`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchSecretResponse {
    /// Envelope exactly as submitted
    pub encrypted_payload: String,
    /// Relay metadata
    pub metadata: SecretMetadata,
}

/// Error body for every non-2xx response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Short, user-presentable message
    pub error: String,
    /// Underlying cause, only for server-side failures
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_request_camel_case() {
        let json = r#"{"encryptedPayload":"a.b.c.d","expiryOption":"5min","readOnce":true}"#;
        let req: CreateSecretRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.encrypted_payload, "a.b.c.d");
        assert_eq!(req.expiry_option, Some(ExpiryOption::FiveMinutes));
        assert!(req.read_once);
    }

    #[test]
    fn test_create_request_defaults() {
        let req: CreateSecretRequest =
            serde_json::from_str(r#"{"encryptedPayload":"x"}"#).unwrap();
        assert_eq!(req.expiry_option, None);
        assert!(!req.read_once);
    }

    #[test]
    fn test_fetch_response_shape() {
        let resp = FetchSecretResponse {
            encrypted_payload: "a.b.c.d".into(),
            metadata: SecretMetadata {
                read_once: false,
                creation_time: 42,
                user_expiry_option: Some(ExpiryOption::OneHour),
            },
        };
        let value = serde_json::to_value(&resp).unwrap();
        assert_eq!(value["encryptedPayload"], "a.b.c.d");
        assert_eq!(value["metadata"]["readOnce"], false);
        assert_eq!(value["metadata"]["creationTime"], 42);
        assert_eq!(value["metadata"]["userExpiryOption"], "1hour");
    }

    #[test]
    fn test_error_response_omits_empty_details() {
        let body = ErrorResponse {
            error: "Secret not found or expired".into(),
            details: None,
        };
        let json = serde_json::to_string(&body).unwrap();
        assert_eq!(json, r#"{"error":"Secret not found or expired"}"#);
    }
}
