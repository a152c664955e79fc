//! Client model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use opsdesk_core::types::{DbId, Timestamp};

/// A row from the `clients` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Client {
    pub id: DbId,
    pub name: String,
    pub email: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for registering a client.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateClient {
    pub name: String,
    pub email: String,
}
