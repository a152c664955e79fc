//! Stored-file handlers: filing a signed document for a staff member or
//! client, and listing what has been filed for them.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use opsdesk_core::error::CoreError;
use opsdesk_core::types::{DbId, SessionToken};
use opsdesk_db::models::stored_file::{StoredFile, OWNER_CLIENT, OWNER_STAFF};
use opsdesk_db::repositories::{ClientRepo, SigningSessionRepo, StoredFileRepo, UserRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireOperator;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// POST /files  (operator)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct SaveToFilesRequest {
    pub signing_token: SessionToken,
    /// `"staff"` or `"client"`.
    pub recipient_type: String,
    pub recipient_id: DbId,
}

#[derive(Debug, Serialize)]
pub struct SaveToFilesResponse {
    /// True when an identical association already existed and the save
    /// was a no-op.
    pub already_saved: bool,
    pub file: StoredFile,
}

/// File a signing session's document for a recipient.
///
/// Idempotent by design: re-saving the same `(signing_token, recipient)`
/// pair reports `already_saved: true` instead of erroring or creating a
/// duplicate row.
pub async fn save_to_files(
    RequireOperator(operator): RequireOperator,
    State(state): State<AppState>,
    Json(input): Json<SaveToFilesRequest>,
) -> AppResult<impl IntoResponse> {
    if input.recipient_type != OWNER_STAFF && input.recipient_type != OWNER_CLIENT {
        return Err(AppError::Core(CoreError::Validation(format!(
            "recipient_type must be '{OWNER_STAFF}' or '{OWNER_CLIENT}'"
        ))));
    }

    SigningSessionRepo::find_by_token(&state.pool, input.signing_token)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "Signing session",
                id: input.signing_token.to_string(),
            })
        })?;

    ensure_recipient_exists(&state, &input.recipient_type, input.recipient_id).await?;

    if StoredFileRepo::exists(
        &state.pool,
        input.signing_token,
        &input.recipient_type,
        input.recipient_id,
    )
    .await?
    {
        let existing = StoredFileRepo::list_for_owner(
            &state.pool,
            &input.recipient_type,
            input.recipient_id,
        )
        .await?
        .into_iter()
        .find(|f| f.signing_token == input.signing_token)
        .ok_or_else(|| AppError::InternalError("Stored file vanished between checks".into()))?;

        tracing::debug!(signing_token = %input.signing_token, "Document already filed; no-op");

        return Ok(Json(DataResponse {
            data: SaveToFilesResponse {
                already_saved: true,
                file: existing,
            },
        }));
    }

    let file = StoredFileRepo::create(
        &state.pool,
        input.signing_token,
        &input.recipient_type,
        input.recipient_id,
    )
    .await?;

    tracing::info!(
        signing_token = %input.signing_token,
        recipient_type = %input.recipient_type,
        recipient_id = input.recipient_id,
        user_id = operator.user_id,
        "Document filed"
    );

    Ok(Json(DataResponse {
        data: SaveToFilesResponse {
            already_saved: false,
            file,
        },
    }))
}

async fn ensure_recipient_exists(
    state: &AppState,
    recipient_type: &str,
    recipient_id: DbId,
) -> AppResult<()> {
    let found = if recipient_type == OWNER_STAFF {
        UserRepo::find_by_id(&state.pool, recipient_id).await?.is_some()
    } else {
        ClientRepo::find_by_id(&state.pool, recipient_id).await?.is_some()
    };

    if found {
        Ok(())
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "Recipient",
            id: recipient_id.to_string(),
        }))
    }
}

// ---------------------------------------------------------------------------
// GET /files/{recipient_type}/{recipient_id}  (operator)
// ---------------------------------------------------------------------------

/// List documents filed for one recipient, newest first.
pub async fn list_for_recipient(
    RequireOperator(_operator): RequireOperator,
    State(state): State<AppState>,
    Path((recipient_type, recipient_id)): Path<(String, DbId)>,
) -> AppResult<impl IntoResponse> {
    if recipient_type != OWNER_STAFF && recipient_type != OWNER_CLIENT {
        return Err(AppError::Core(CoreError::Validation(format!(
            "recipient_type must be '{OWNER_STAFF}' or '{OWNER_CLIENT}'"
        ))));
    }

    let files = StoredFileRepo::list_for_owner(&state.pool, &recipient_type, recipient_id).await?;
    Ok(Json(DataResponse { data: files }))
}
