//! Route definitions for platform OAuth connections.

use axum::routing::get;
use axum::Router;

use crate::handlers::oauth;
use crate::state::AppState;

/// OAuth routes — mounted at `/oauth`. Both onboarding and logged-in
/// flows share the callback; the handlers disambiguate.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{platform}/connect", get(oauth::connect))
        .route("/{platform}/callback", get(oauth::callback))
}
