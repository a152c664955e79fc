//! Repository for the `stored_files` table.
//!
//! Idempotency contract: callers check [`StoredFileRepo::exists`] before
//! inserting and treat a re-save as a no-op success.

use sqlx::PgPool;

use opsdesk_core::types::{DbId, SessionToken};

use crate::models::stored_file::StoredFile;

/// Column list for `stored_files` queries.
const COLUMNS: &str = "id, signing_token, owner_type, owner_id, created_at";

/// Provides the stored-file association operations.
pub struct StoredFileRepo;

impl StoredFileRepo {
    /// True when an association already exists for this exact key.
    pub async fn exists(
        pool: &PgPool,
        signing_token: SessionToken,
        owner_type: &str,
        owner_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let row: (bool,) = sqlx::query_as(
            "SELECT EXISTS( \
                SELECT 1 FROM stored_files \
                WHERE signing_token = $1 AND owner_type = $2 AND owner_id = $3)",
        )
        .bind(signing_token)
        .bind(owner_type)
        .bind(owner_id)
        .fetch_one(pool)
        .await?;
        Ok(row.0)
    }

    /// Insert a new association, returning the created row.
    pub async fn create(
        pool: &PgPool,
        signing_token: SessionToken,
        owner_type: &str,
        owner_id: DbId,
    ) -> Result<StoredFile, sqlx::Error> {
        let query = format!(
            "INSERT INTO stored_files (signing_token, owner_type, owner_id) \
             VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, StoredFile>(&query)
            .bind(signing_token)
            .bind(owner_type)
            .bind(owner_id)
            .fetch_one(pool)
            .await
    }

    /// List files filed for one owner, newest first.
    pub async fn list_for_owner(
        pool: &PgPool,
        owner_type: &str,
        owner_id: DbId,
    ) -> Result<Vec<StoredFile>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM stored_files \
             WHERE owner_type = $1 AND owner_id = $2 \
             ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, StoredFile>(&query)
            .bind(owner_type)
            .bind(owner_id)
            .fetch_all(pool)
            .await
    }
}
