//! Repository for the encrypted OAuth token tables.
//!
//! Both tables have upsert semantics: re-authorizing a platform
//! replaces the sealed token in place, keeping exactly one row per
//! key pair.

use sqlx::PgPool;

use opsdesk_core::types::{DbId, SessionToken};

use crate::models::platform_token::{OnboardingPlatformToken, UserPlatformToken};

const ONBOARDING_COLUMNS: &str =
    "session_token, platform, access_token_sealed, created_at, updated_at";

const USER_COLUMNS: &str = "user_id, platform, access_token_sealed, created_at, updated_at";

/// Provides upsert and lookup for platform tokens in both flows.
pub struct PlatformTokenRepo;

impl PlatformTokenRepo {
    /// Upsert a token for the anonymous onboarding flow, keyed
    /// `(session_token, platform)`.
    pub async fn upsert_for_session(
        pool: &PgPool,
        session_token: SessionToken,
        platform: &str,
        access_token_sealed: &str,
    ) -> Result<OnboardingPlatformToken, sqlx::Error> {
        let query = format!(
            "INSERT INTO onboarding_platform_tokens (session_token, platform, access_token_sealed) \
             VALUES ($1, $2, $3) \
             ON CONFLICT (session_token, platform) \
             DO UPDATE SET access_token_sealed = EXCLUDED.access_token_sealed, updated_at = now() \
             RETURNING {ONBOARDING_COLUMNS}"
        );
        sqlx::query_as::<_, OnboardingPlatformToken>(&query)
            .bind(session_token)
            .bind(platform)
            .bind(access_token_sealed)
            .fetch_one(pool)
            .await
    }

    /// Upsert a token for the logged-in flow, keyed `(user_id, platform)`.
    pub async fn upsert_for_user(
        pool: &PgPool,
        user_id: DbId,
        platform: &str,
        access_token_sealed: &str,
    ) -> Result<UserPlatformToken, sqlx::Error> {
        let query = format!(
            "INSERT INTO user_platform_tokens (user_id, platform, access_token_sealed) \
             VALUES ($1, $2, $3) \
             ON CONFLICT (user_id, platform) \
             DO UPDATE SET access_token_sealed = EXCLUDED.access_token_sealed, updated_at = now() \
             RETURNING {USER_COLUMNS}"
        );
        sqlx::query_as::<_, UserPlatformToken>(&query)
            .bind(user_id)
            .bind(platform)
            .bind(access_token_sealed)
            .fetch_one(pool)
            .await
    }

    /// Fetch the sealed token for an onboarding session and platform.
    pub async fn find_for_session(
        pool: &PgPool,
        session_token: SessionToken,
        platform: &str,
    ) -> Result<Option<OnboardingPlatformToken>, sqlx::Error> {
        let query = format!(
            "SELECT {ONBOARDING_COLUMNS} FROM onboarding_platform_tokens \
             WHERE session_token = $1 AND platform = $2"
        );
        sqlx::query_as::<_, OnboardingPlatformToken>(&query)
            .bind(session_token)
            .bind(platform)
            .fetch_optional(pool)
            .await
    }

    /// Fetch the sealed token for an operator and platform.
    pub async fn find_for_user(
        pool: &PgPool,
        user_id: DbId,
        platform: &str,
    ) -> Result<Option<UserPlatformToken>, sqlx::Error> {
        let query = format!(
            "SELECT {USER_COLUMNS} FROM user_platform_tokens \
             WHERE user_id = $1 AND platform = $2"
        );
        sqlx::query_as::<_, UserPlatformToken>(&query)
            .bind(user_id)
            .bind(platform)
            .fetch_optional(pool)
            .await
    }
}
