//! SealDrop Relay Server
//!
//! Stores password-sealed envelopes for one-time sharing:
//!
//! 1. **Create**: a client posts an envelope it sealed locally and gets back
//!    a short random id to share.
//!
//! 2. **Fetch**: whoever holds the id downloads the envelope. Read-once
//!    secrets are burned by the first fetch.
//!
//! 3. **Expiry**: every secret has a storage TTL; a periodic sweep retires
//!    what nobody fetched in time.
//!
//! **Privacy**: The relay never sees plaintext, passwords, or the expiry
//! sealed inside the envelope. It only handles opaque strings.

mod api;
mod error;
mod state;
mod store;

use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use clap::Parser;
use serde_json::json;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use state::{LogFormat, RelayConfig, RelayState};

/// Request body cap; comfortably above the largest accepted envelope.
const MAX_BODY_BYTES: usize = 4 * 1024 * 1024;

/// How long browsers may cache a CORS preflight.
const CORS_MAX_AGE: Duration = Duration::from_secs(600);

// ── CLI Arguments ─────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "sealdrop-relay", version, about = "SealDrop secret relay server")]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value_t = 8080, env = "RELAY_PORT")]
    port: u16,

    /// Address to bind
    #[arg(long, default_value = "0.0.0.0", env = "RELAY_BIND")]
    bind: String,

    /// Browser origins allowed to call the API (comma-separated)
    #[arg(
        long,
        default_value = "http://localhost:5173",
        env = "ALLOWED_ORIGINS",
        value_delimiter = ','
    )]
    allowed_origins: Vec<String>,

    /// Expired-secret sweep interval in seconds
    #[arg(long, default_value_t = 300, env = "SWEEP_INTERVAL_SECS")]
    sweep_interval_secs: u64,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Pretty, env = "LOG_FORMAT")]
    log_format: LogFormat,
}

impl From<Args> for RelayConfig {
    fn from(args: Args) -> Self {
        RelayConfig {
            port: args.port,
            bind: args.bind,
            allowed_origins: args
                .allowed_origins
                .into_iter()
                .map(|origin| origin.trim().to_string())
                .filter(|origin| !origin.is_empty())
                .collect(),
            sweep_interval_secs: args.sweep_interval_secs.max(1),
            log_format: args.log_format,
        }
    }
}

// ── Entry Point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let config = RelayConfig::from(Args::parse());

    init_tracing(config.log_format);

    let state = RelayState::new(config.clone());

    // Spawn periodic sweep task
    let sweep_state = state.clone();
    let sweep_interval = config.sweep_interval_secs;
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(sweep_interval));
        loop {
            interval.tick().await;
            if let Err(e) = sweep_state.store.sweep().await {
                tracing::warn!(error = %e, "Sweep failed");
            }
        }
    });

    let app = build_router(state);

    let addr = config.listen_addr();
    tracing::info!("SealDrop relay starting on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("SealDrop relay stopped");
    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "sealdrop_relay=info,tower_http=info".into());

    match format {
        LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(filter).init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

// ── Router ────────────────────────────────────────────────────────────────────

/// CORS for the `/api/*` routes, restricted to the configured origins.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = origin.as_str(), "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .max_age(CORS_MAX_AGE)
}

pub(crate) fn build_router(state: RelayState) -> Router {
    let api = Router::new()
        .route("/api/create", post(api::create_secret))
        .route("/api/secret/:id", get(api::get_secret))
        .layer(cors_layer(&state.config.allowed_origins));

    Router::new()
        .route("/health", get(health_handler))
        .merge(api)
        .fallback(api::not_found)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_handler() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "sealdrop-relay",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;

    fn parse(args: &[&str]) -> RelayConfig {
        let argv = std::iter::once("sealdrop-relay").chain(args.iter().copied());
        RelayConfig::from(Args::try_parse_from(argv).unwrap())
    }

    #[test]
    fn test_args_defaults_match_config_defaults() {
        let parsed = parse(&[]);
        let defaults = RelayConfig::default();
        assert_eq!(parsed.port, defaults.port);
        assert_eq!(parsed.bind, defaults.bind);
        assert_eq!(parsed.allowed_origins, defaults.allowed_origins);
        assert_eq!(parsed.sweep_interval_secs, defaults.sweep_interval_secs);
        assert_eq!(parsed.log_format, defaults.log_format);
    }

    #[test]
    fn test_origin_list_is_split_and_trimmed() {
        let config = parse(&[
            "--allowed-origins",
            "https://a.example, https://b.example,",
            "--log-format",
            "json",
        ]);
        assert_eq!(
            config.allowed_origins,
            vec!["https://a.example", "https://b.example"]
        );
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[tokio::test]
    async fn test_health() {
        let app = build_router(RelayState::new(RelayConfig::default()));
        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "sealdrop-relay");
    }
}
