use std::sync::Arc;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already
/// `Clone`). The database pool and the outbound HTTP client are
/// process-wide services constructed once at startup.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: opsdesk_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Outbound HTTP client for OAuth code exchange.
    pub http: reqwest::Client,
}
