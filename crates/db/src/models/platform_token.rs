//! Encrypted OAuth token models for both flows.
//!
//! The `access_token_sealed` column holds an AES-GCM blob produced by
//! `opsdesk_core::crypto::seal_token`; plaintext tokens never reach the
//! database.

use serde::Serialize;
use sqlx::FromRow;

use opsdesk_core::types::{DbId, SessionToken, Timestamp};

/// A row from `onboarding_platform_tokens`, keyed `(session_token, platform)`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct OnboardingPlatformToken {
    pub session_token: SessionToken,
    pub platform: String,
    #[serde(skip_serializing)]
    pub access_token_sealed: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from `user_platform_tokens`, keyed `(user_id, platform)`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UserPlatformToken {
    pub user_id: DbId,
    pub platform: String,
    #[serde(skip_serializing)]
    pub access_token_sealed: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
