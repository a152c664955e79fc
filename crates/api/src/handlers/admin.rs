//! Operator-facing management endpoints: account provisioning, client
//! registry, and onboarding link minting.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use opsdesk_core::error::CoreError;
use opsdesk_core::roles::{ROLE_ADMIN, ROLE_STAFF};
use opsdesk_core::session::new_deadline;
use opsdesk_core::types::DbId;
use opsdesk_db::models::client::CreateClient;
use opsdesk_db::models::onboarding_session::OnboardingSession;
use opsdesk_db::models::user::CreateUser;
use opsdesk_db::repositories::{ClientRepo, OnboardingSessionRepo, UserRepo};

use crate::auth::password::hash_password;
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{RequireAdmin, RequireOperator};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// POST /admin/users  (admin)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: String,
}

/// Provision an operator account.
pub async fn create_user(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreateUserRequest>,
) -> AppResult<impl IntoResponse> {
    if input.role != ROLE_ADMIN && input.role != ROLE_STAFF {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Role must be '{ROLE_ADMIN}' or '{ROLE_STAFF}'"
        ))));
    }

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing failed: {e}")))?;

    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            username: input.username,
            email: input.email,
            password_hash,
            role: input.role,
        },
    )
    .await?;

    tracing::info!(user_id = user.id, created_by = admin.user_id, "Operator account created");

    Ok((StatusCode::CREATED, Json(DataResponse { data: user })))
}

// ---------------------------------------------------------------------------
// POST /admin/clients  (operator)
// ---------------------------------------------------------------------------

/// Register a client.
pub async fn create_client(
    RequireOperator(operator): RequireOperator,
    State(state): State<AppState>,
    Json(input): Json<CreateClient>,
) -> AppResult<impl IntoResponse> {
    let client = ClientRepo::create(&state.pool, &input).await?;

    tracing::info!(client_id = client.id, user_id = operator.user_id, "Client registered");

    Ok((StatusCode::CREATED, Json(DataResponse { data: client })))
}

// ---------------------------------------------------------------------------
// GET /admin/clients  (operator)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// List registered clients, most recent first.
pub async fn list_clients(
    RequireOperator(_operator): RequireOperator,
    State(state): State<AppState>,
    axum::extract::Query(params): axum::extract::Query<ListParams>,
) -> AppResult<impl IntoResponse> {
    let clients = ClientRepo::list(
        &state.pool,
        params.limit.unwrap_or(50),
        params.offset.unwrap_or(0),
    )
    .await?;

    Ok(Json(DataResponse { data: clients }))
}

// ---------------------------------------------------------------------------
// POST /admin/clients/{id}/onboarding-sessions  (operator)
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct MintedSession {
    #[serde(flatten)]
    pub session: OnboardingSession,
    /// Shareable single-use link.
    pub link: String,
}

/// Mint a fresh onboarding session for a client: new random token,
/// status pending, deadline one hour out.
pub async fn create_onboarding_session(
    RequireOperator(operator): RequireOperator,
    State(state): State<AppState>,
    Path(client_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    ClientRepo::find_by_id(&state.pool, client_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "Client",
                id: client_id.to_string(),
            })
        })?;

    let token = Uuid::new_v4();
    let session =
        OnboardingSessionRepo::create(&state.pool, token, client_id, new_deadline(Utc::now()))
            .await?;

    tracing::info!(token = %token, client_id, user_id = operator.user_id, "Onboarding session minted");

    let link = format!("{}/onboarding/{token}", state.config.public_base_url);
    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: MintedSession { session, link },
        }),
    ))
}
