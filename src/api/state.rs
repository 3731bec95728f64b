//! Application State
//!
//! Shared state accessible by all API handlers.
//! Wrapped in Arc for thread-safe sharing across async tasks.

use crate::api::rps::RequestCounter;
use crate::store::EntityStore;
use std::sync::Arc;

/// Shared application state for all handlers
#[derive(Clone)]
pub struct AppState {
    /// Entity store, shared with the archive loader
    pub store: Arc<EntityStore>,
    /// API configuration
    pub config: Arc<ApiConfig>,
    /// Requests served so far
    pub requests: Arc<RequestCounter>,
}

impl AppState {
    pub fn new(store: Arc<EntityStore>, config: ApiConfig) -> Self {
        Self {
            store,
            config: Arc::new(config),
            requests: Arc::new(RequestCounter::default()),
        }
    }
}

/// Default request body limit
pub const DEFAULT_MAX_BODY_SIZE: usize = 64 * 1024 * 1024; // 64MB

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Log every request through the HTTP trace layer
    pub access_log: bool,
    /// Log requests served per second
    pub rps_watcher: bool,
    /// Maximum request body size in bytes
    pub max_body_size: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 80,
            access_log: false,
            rps_watcher: true,
            max_body_size: DEFAULT_MAX_BODY_SIZE,
        }
    }
}

impl ApiConfig {
    /// Create config with custom host and port
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    /// Get the socket address string
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
