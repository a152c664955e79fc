//! Route definitions for the operator/admin panel.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{admin, signing};
use crate::state::AppState;

/// Admin routes — mounted at `/admin`. RBAC is enforced per-handler via
/// the `RequireAdmin` / `RequireOperator` extractors.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", post(admin::create_user))
        .route(
            "/clients",
            get(admin::list_clients).post(admin::create_client),
        )
        .route(
            "/clients/{id}/onboarding-sessions",
            post(admin::create_onboarding_session),
        )
        .route(
            "/presets/{preset_id}/signing-sessions",
            post(signing::generate_from_preset),
        )
}
