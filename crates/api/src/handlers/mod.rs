//! Request handlers.
//!
//! Each submodule provides async handler functions for one area of the
//! API. Handlers delegate to the repositories in `opsdesk_db` and to the
//! pure transition logic in `opsdesk_core`, mapping errors via
//! [`crate::error::AppError`].

pub mod admin;
pub mod auth;
pub mod files;
pub mod oauth;
pub mod session;
pub mod signing;
