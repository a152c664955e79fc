//! Route definitions for the onboarding session lifecycle.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::session;
use crate::state::AppState;

/// Session routes — mounted at `/session`. The single-use access cookie
/// is scoped to this prefix.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{token}", get(session::read_session))
        .route("/{token}/answers", put(session::update_answers))
        .route("/{token}/submit", post(session::submit_session))
        .route("/{token}/renew", post(session::renew_session))
}
