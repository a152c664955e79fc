//! Repository for the `onboarding_sessions` table.
//!
//! The first-access transition is a single conditional UPDATE so two
//! near-simultaneous first reads have exactly one winner; callers branch
//! on the returned row.

use sqlx::PgPool;

use opsdesk_core::types::{DbId, SessionToken, Timestamp};

use crate::models::onboarding_session::OnboardingSession;

/// Column list for `onboarding_sessions` queries.
const COLUMNS: &str = "token, client_id, status, answers, created_at, \
     first_accessed_at, expires_at, submitted_at";

/// Provides lifecycle operations for onboarding sessions.
pub struct OnboardingSessionRepo;

impl OnboardingSessionRepo {
    /// Insert a new pending session with the given token and deadline.
    pub async fn create(
        pool: &PgPool,
        token: SessionToken,
        client_id: DbId,
        expires_at: Timestamp,
    ) -> Result<OnboardingSession, sqlx::Error> {
        let query = format!(
            "INSERT INTO onboarding_sessions (token, client_id, expires_at) \
             VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, OnboardingSession>(&query)
            .bind(token)
            .bind(client_id)
            .bind(expires_at)
            .fetch_one(pool)
            .await
    }

    /// Find a session by token.
    pub async fn find_by_token(
        pool: &PgPool,
        token: SessionToken,
    ) -> Result<Option<OnboardingSession>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM onboarding_sessions WHERE token = $1");
        sqlx::query_as::<_, OnboardingSession>(&query)
            .bind(token)
            .fetch_optional(pool)
            .await
    }

    /// First-access transition: set `first_accessed_at` and move to
    /// `in_progress`, but only if no request has won the race yet.
    ///
    /// Returns the updated row for the winner, `None` for everyone else.
    pub async fn mark_first_access(
        pool: &PgPool,
        token: SessionToken,
        now: Timestamp,
    ) -> Result<Option<OnboardingSession>, sqlx::Error> {
        let query = format!(
            "UPDATE onboarding_sessions \
             SET first_accessed_at = $2, status = 'in_progress' \
             WHERE token = $1 AND first_accessed_at IS NULL \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, OnboardingSession>(&query)
            .bind(token)
            .bind(now)
            .fetch_optional(pool)
            .await
    }

    /// Persist a status change. Returns `true` if a row was updated.
    pub async fn set_status(
        pool: &PgPool,
        token: SessionToken,
        status: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE onboarding_sessions SET status = $2 WHERE token = $1")
            .bind(token)
            .bind(status)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Merge new answers into the session's answers object
    /// (new keys win over existing ones).
    pub async fn merge_answers(
        pool: &PgPool,
        token: SessionToken,
        answers: &serde_json::Value,
    ) -> Result<Option<OnboardingSession>, sqlx::Error> {
        let query = format!(
            "UPDATE onboarding_sessions SET answers = answers || $2 \
             WHERE token = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, OnboardingSession>(&query)
            .bind(token)
            .bind(answers)
            .fetch_optional(pool)
            .await
    }

    /// Final submission: set `submitted_at` and complete the session.
    pub async fn submit(
        pool: &PgPool,
        token: SessionToken,
        now: Timestamp,
    ) -> Result<Option<OnboardingSession>, sqlx::Error> {
        let query = format!(
            "UPDATE onboarding_sessions \
             SET submitted_at = $2, status = 'completed' \
             WHERE token = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, OnboardingSession>(&query)
            .bind(token)
            .bind(now)
            .fetch_optional(pool)
            .await
    }

    /// Operator renewal: unconditionally reset to a fresh pending state
    /// with a new deadline, defeating single-use and expiry.
    pub async fn renew(
        pool: &PgPool,
        token: SessionToken,
        expires_at: Timestamp,
    ) -> Result<Option<OnboardingSession>, sqlx::Error> {
        let query = format!(
            "UPDATE onboarding_sessions \
             SET status = 'pending', expires_at = $2, \
                 first_accessed_at = NULL, submitted_at = NULL \
             WHERE token = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, OnboardingSession>(&query)
            .bind(token)
            .bind(expires_at)
            .fetch_optional(pool)
            .await
    }

    /// Mark all overdue non-terminal sessions expired (periodic sweep).
    /// Returns the number of rows transitioned.
    pub async fn expire_due(pool: &PgPool, now: Timestamp) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE onboarding_sessions SET status = 'expired' \
             WHERE expires_at < $1 AND status IN ('pending', 'in_progress')",
        )
        .bind(now)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Force a session's deadline (test support for expiry scenarios).
    pub async fn set_expires_at(
        pool: &PgPool,
        token: SessionToken,
        expires_at: Option<Timestamp>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE onboarding_sessions SET expires_at = $2 WHERE token = $1")
            .bind(token)
            .bind(expires_at)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
