//! Onboarding session entity model.

use serde::Serialize;
use sqlx::FromRow;

use opsdesk_core::types::{DbId, SessionToken, Timestamp};

/// A row from the `onboarding_sessions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct OnboardingSession {
    pub token: SessionToken,
    pub client_id: DbId,
    pub status: String,
    pub answers: serde_json::Value,
    pub created_at: Timestamp,
    pub first_accessed_at: Option<Timestamp>,
    pub expires_at: Option<Timestamp>,
    pub submitted_at: Option<Timestamp>,
}
