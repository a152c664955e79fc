//! Repository for the `signing_sessions` table.

use sqlx::PgPool;

use opsdesk_core::types::{SessionToken, Timestamp};

use crate::models::signing_session::SigningSession;

/// Column list for `signing_sessions` queries.
const COLUMNS: &str = "token, original_filename, pdf_base64, fields, status, \
     signer_email, created_at, signed_at";

/// Provides lifecycle operations for signing sessions.
pub struct SigningSessionRepo;

impl SigningSessionRepo {
    /// Insert a new pending signing session with the embedded PDF and
    /// ordered field list.
    pub async fn create(
        pool: &PgPool,
        token: SessionToken,
        original_filename: &str,
        pdf_base64: &str,
        fields: &serde_json::Value,
    ) -> Result<SigningSession, sqlx::Error> {
        let query = format!(
            "INSERT INTO signing_sessions (token, original_filename, pdf_base64, fields) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SigningSession>(&query)
            .bind(token)
            .bind(original_filename)
            .bind(pdf_base64)
            .bind(fields)
            .fetch_one(pool)
            .await
    }

    /// Find a signing session by token.
    pub async fn find_by_token(
        pool: &PgPool,
        token: SessionToken,
    ) -> Result<Option<SigningSession>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM signing_sessions WHERE token = $1");
        sqlx::query_as::<_, SigningSession>(&query)
            .bind(token)
            .fetch_optional(pool)
            .await
    }

    /// Complete signing: replace the PDF with the final rendered bytes,
    /// attach the signer email, and move to `signed`. Conditional on the
    /// session still being pending so the transition is single-shot.
    ///
    /// Returns the updated row, or `None` when the session was not
    /// pending (already signed or expired).
    pub async fn complete(
        pool: &PgPool,
        token: SessionToken,
        signer_email: &str,
        final_pdf_base64: &str,
        now: Timestamp,
    ) -> Result<Option<SigningSession>, sqlx::Error> {
        let query = format!(
            "UPDATE signing_sessions \
             SET status = 'signed', signer_email = $2, pdf_base64 = $3, signed_at = $4 \
             WHERE token = $1 AND status = 'pending' \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SigningSession>(&query)
            .bind(token)
            .bind(signer_email)
            .bind(final_pdf_base64)
            .bind(now)
            .fetch_optional(pool)
            .await
    }
}
