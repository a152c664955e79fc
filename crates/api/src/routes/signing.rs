//! Route definitions for signing sessions.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::signing;
use crate::state::AppState;

/// Signing routes — mounted at `/sign`. Fetch and complete are public
/// (the token is the capability); minting lives under `/admin`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{token}", get(signing::get_signing_session))
        .route("/{token}/complete", post(signing::complete_signing))
}
