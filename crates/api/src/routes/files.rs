//! Route definitions for stored files.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::files;
use crate::state::AppState;

/// Stored-file routes — mounted at `/files`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(files::save_to_files))
        .route(
            "/{recipient_type}/{recipient_id}",
            get(files::list_for_recipient),
        )
}
