//! HTTP client for the relay API.

use color_eyre::eyre::{eyre, Result, WrapErr};
use reqwest::{Client, Response};
use sealdrop_core::api::{
    CreateSecretRequest, CreateSecretResponse, ErrorResponse, FetchSecretResponse,
};

pub struct RelayClient {
    http: Client,
    base_url: String,
}

impl RelayClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// `POST /api/create`, returns the secret id.
    pub async fn create(&self, request: &CreateSecretRequest) -> Result<String> {
        let response = self
            .http
            .post(format!("{}/api/create", self.base_url))
            .json(request)
            .send()
            .await
            .wrap_err_with(|| format!("Failed to reach relay at {}", self.base_url))?;

        let created: CreateSecretResponse = check(response)
            .await?
            .json()
            .await
            .wrap_err("Relay sent an unreadable create response")?;
        Ok(created.secret_id)
    }

    /// `GET /api/secret/:id`
    pub async fn fetch(&self, id: &str) -> Result<FetchSecretResponse> {
        let response = self
            .http
            .get(self.secret_url(id))
            .send()
            .await
            .wrap_err_with(|| format!("Failed to reach relay at {}", self.base_url))?;

        check(response)
            .await?
            .json()
            .await
            .wrap_err("Relay sent an unreadable secret")
    }

    pub fn secret_url(&self, id: &str) -> String {
        format!("{}/api/secret/{}", self.base_url, id)
    }
}

/// Turn a non-2xx response into an error carrying the relay's message.
async fn check(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = match response.json::<ErrorResponse>().await {
        Ok(ErrorResponse {
            error,
            details: Some(details),
        }) => format!("{error}: {details}"),
        Ok(ErrorResponse { error, .. }) => error,
        Err(_) => status.to_string(),
    };
    Err(eyre!("Relay returned {status}: {message}"))
}
