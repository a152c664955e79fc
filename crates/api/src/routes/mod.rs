//! Route definitions.
//!
//! Route hierarchy under `/api`:
//!
//! ```text
//! /auth/login                                   operator login (public)
//!
//! /admin/users                                  create operator (admin)
//! /admin/clients                                register / list clients (operator)
//! /admin/clients/{id}/onboarding-sessions       mint onboarding link (operator)
//! /admin/presets/{preset_id}/signing-sessions   mint signing link (operator)
//!
//! /session/{token}                              read session (single-use gated)
//! /session/{token}/answers                      merge answers (PUT)
//! /session/{token}/submit                       final submission (POST)
//! /session/{token}/renew                        operator renewal (POST)
//!
//! /oauth/{platform}/connect                     start OAuth (either flow)
//! /oauth/{platform}/callback                    shared provider callback
//!
//! /sign/{token}                                 fetch signing session
//! /sign/{token}/complete                        complete signing (POST)
//!
//! /files                                        file a document (POST, operator)
//! /files/{recipient_type}/{recipient_id}        list filed documents (operator)
//! ```

pub mod admin;
pub mod auth;
pub mod files;
pub mod health;
pub mod oauth;
pub mod session;
pub mod signing;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/admin", admin::router())
        .nest("/session", session::router())
        .nest("/oauth", oauth::router())
        .nest("/sign", signing::router())
        .nest("/files", files::router())
}
