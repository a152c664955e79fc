//! Signing session entity model.

use serde::Serialize;
use sqlx::FromRow;

use opsdesk_core::types::{SessionToken, Timestamp};

/// A row from the `signing_sessions` table.
///
/// `fields` is the ordered JSONB placement list; deserialize it with
/// `opsdesk_core::signing::FieldPlacement` when geometry is needed.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SigningSession {
    pub token: SessionToken,
    pub original_filename: String,
    pub pdf_base64: String,
    pub fields: serde_json::Value,
    pub status: String,
    pub signer_email: Option<String>,
    pub created_at: Timestamp,
    pub signed_at: Option<Timestamp>,
}
