//! Stored-file association model.

use serde::Serialize;
use sqlx::FromRow;

use opsdesk_core::types::{DbId, SessionToken, Timestamp};

/// Owner discriminator for a stored file.
pub const OWNER_STAFF: &str = "staff";
pub const OWNER_CLIENT: &str = "client";

/// A row from the `stored_files` table: this signing session's document
/// has been filed for this staff member or client.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct StoredFile {
    pub id: DbId,
    pub signing_token: SessionToken,
    pub owner_type: String,
    pub owner_id: DbId,
    pub created_at: Timestamp,
}
