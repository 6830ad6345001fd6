//! Server state management.
//!
//! Holds the relay configuration and the shared [`SecretStore`] handle that
//! every request handler and the sweep task clone.

use std::sync::Arc;

use crate::store::memory::MemoryKv;
use crate::store::SecretStore;

/// Default listen port.
const DEFAULT_PORT: u16 = 8080;

/// Default bind address.
const DEFAULT_BIND: &str = "0.0.0.0";

/// Default browser origin allowed by CORS (the web client's dev server).
const DEFAULT_ALLOWED_ORIGIN: &str = "http://localhost:5173";

/// Default sweep interval in seconds (5 minutes).
const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 300;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub port: u16,
    pub bind: String,
    /// Origins allowed to call `/api/*` from a browser.
    pub allowed_origins: Vec<String>,
    pub sweep_interval_secs: u64,
    pub log_format: LogFormat,
}

impl RelayConfig {
    /// `bind:port`, ready for `TcpListener::bind`.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            bind: DEFAULT_BIND.to_string(),
            allowed_origins: vec![DEFAULT_ALLOWED_ORIGIN.to_string()],
            sweep_interval_secs: DEFAULT_SWEEP_INTERVAL_SECS,
            log_format: LogFormat::default(),
        }
    }
}

/// Shared server state.
#[derive(Clone)]
pub struct RelayState {
    pub store: SecretStore,
    pub config: Arc<RelayConfig>,
}

impl RelayState {
    /// State backed by the in-process key-value store.
    pub fn new(config: RelayConfig) -> Self {
        Self::with_store(config, SecretStore::new(Arc::new(MemoryKv::new())))
    }

    pub fn with_store(config: RelayConfig, store: SecretStore) -> Self {
        tracing::info!(
            allowed_origins = ?config.allowed_origins,
            sweep_interval_secs = config.sweep_interval_secs,
            "Relay state initialized"
        );
        Self {
            store,
            config: Arc::new(config),
        }
    }
}
