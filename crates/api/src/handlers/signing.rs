//! Signing session handlers: materializing a session from a document
//! preset, read-only retrieval for the signing UI, and completion.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use opsdesk_core::error::CoreError;
use opsdesk_core::preset::{asset_path, find as find_preset, PlacementStore};
use opsdesk_core::signing::{validate_placements, SigningStatus};
use opsdesk_core::types::{SessionToken, Timestamp};
use opsdesk_db::repositories::SigningSessionRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireOperator;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// POST /admin/presets/{preset_id}/signing-sessions  (operator)
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct SigningLink {
    pub token: SessionToken,
    pub original_filename: String,
    pub status: String,
    pub created_at: Timestamp,
    /// Shareable signing link.
    pub link: String,
}

/// Materialize a signing session from a named document preset.
///
/// Distinguishes misconfigured data (no placements: 400) from a missing
/// binary asset (PDF absent from the deployment: 503). On success the
/// session embeds the PDF and the ordered field list and is independent
/// of any onboarding session.
pub async fn generate_from_preset(
    RequireOperator(operator): RequireOperator,
    State(state): State<AppState>,
    Path(preset_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let preset = find_preset(&preset_id).ok_or_else(|| {
        AppError::Core(CoreError::NotFound {
            entity: "Document preset",
            id: preset_id.clone(),
        })
    })?;

    let placements = PlacementStore::new(&state.config.placements_path)
        .placements_for(preset.id)
        .map_err(AppError::Core)?;
    validate_placements(&placements).map_err(AppError::Core)?;

    let pdf_path = asset_path(&state.config.assets_dir, preset);
    let pdf_bytes = match tokio::fs::read(&pdf_path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(AppError::Core(CoreError::ServiceUnavailable(format!(
                "Document asset for '{}' is not deployed",
                preset.id
            ))));
        }
        Err(e) => {
            return Err(AppError::InternalError(format!(
                "Failed to read document asset {}: {e}",
                pdf_path.display()
            )));
        }
    };

    let token = Uuid::new_v4();
    let fields = serde_json::to_value(&placements)
        .map_err(|e| AppError::InternalError(format!("Failed to serialize placements: {e}")))?;

    let session = SigningSessionRepo::create(
        &state.pool,
        token,
        preset.canonical_filename,
        &BASE64.encode(&pdf_bytes),
        &fields,
    )
    .await?;

    tracing::info!(token = %token, preset = preset.id, user_id = operator.user_id, "Signing session created");

    let link = format!("{}/sign/{token}", state.config.public_base_url);
    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: SigningLink {
                token: session.token,
                original_filename: session.original_filename,
                status: session.status,
                created_at: session.created_at,
                link,
            },
        }),
    ))
}

// ---------------------------------------------------------------------------
// GET /sign/{token}
// ---------------------------------------------------------------------------

/// Read-only fetch of a signing session for the signing UI.
pub async fn get_signing_session(
    State(state): State<AppState>,
    Path(token): Path<SessionToken>,
) -> AppResult<impl IntoResponse> {
    let session = SigningSessionRepo::find_by_token(&state.pool, token)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "Signing session",
                id: token.to_string(),
            })
        })?;

    Ok(Json(DataResponse { data: session }))
}

// ---------------------------------------------------------------------------
// POST /sign/{token}/complete
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct CompleteRequest {
    pub signer_email: String,
    /// Final rendered PDF with fields flattened in, from the signing
    /// collaborator.
    pub pdf_base64: String,
}

/// Complete signing: attach the signer email, replace the PDF with the
/// final artifact, and transition `pending → signed`. `signed` is
/// terminal for the signing half of the lifecycle.
pub async fn complete_signing(
    State(state): State<AppState>,
    Path(token): Path<SessionToken>,
    Json(input): Json<CompleteRequest>,
) -> AppResult<impl IntoResponse> {
    if input.signer_email.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "signer_email must not be empty".into(),
        )));
    }
    if BASE64.decode(&input.pdf_base64).is_err() {
        return Err(AppError::Core(CoreError::Validation(
            "pdf_base64 is not valid base64".into(),
        )));
    }

    let session = SigningSessionRepo::find_by_token(&state.pool, token)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "Signing session",
                id: token.to_string(),
            })
        })?;

    match SigningStatus::parse(&session.status)? {
        SigningStatus::Signed => {
            return Err(AppError::Core(CoreError::Gone(
                "This document has already been signed".into(),
            )))
        }
        SigningStatus::Expired => {
            return Err(AppError::Core(CoreError::Gone(
                "This signing link has expired".into(),
            )))
        }
        SigningStatus::Pending => {}
    }

    // Conditional on `pending` so a concurrent completion has one winner.
    let signed = SigningSessionRepo::complete(
        &state.pool,
        token,
        &input.signer_email,
        &input.pdf_base64,
        Utc::now(),
    )
    .await?
    .ok_or_else(|| {
        AppError::Core(CoreError::Gone(
            "This document has already been signed".into(),
        ))
    })?;

    tracing::info!(token = %token, "Signing session completed");

    Ok(Json(DataResponse { data: signed }))
}
