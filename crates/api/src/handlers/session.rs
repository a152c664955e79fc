//! Handlers for the onboarding session lifecycle.
//!
//! The read path implements the single-use gate: the first-ever read
//! wins a conditional update, receives the `onb_<token>` access cookie,
//! and every later read must present that cookie. Expiry is checked
//! lazily on every read and persisted best-effort; the response reflects
//! expiry even when that write fails.

use axum::extract::{Path, State};
use axum::http::header::SET_COOKIE;
use axum::http::HeaderMap;
use axum::response::{AppendHeaders, IntoResponse};
use axum::Json;
use chrono::Utc;

use opsdesk_core::error::CoreError;
use opsdesk_core::session::{
    access_cookie_name, evaluate_read, remaining_ttl_secs, ReadAccess, SessionStatus,
    CORRELATION_COOKIE_TTL_SECS, DEFAULT_SESSION_TTL_SECS,
};
use opsdesk_core::types::SessionToken;
use opsdesk_db::models::onboarding_session::OnboardingSession;
use opsdesk_db::repositories::OnboardingSessionRepo;

use crate::cookies::build_cookie;
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireOperator;
use crate::response::DataResponse;
use crate::state::AppState;

/// Path prefix the single-use access cookie is scoped to.
const ACCESS_COOKIE_PATH: &str = "/api/session";

/// Name of the cookie correlating later requests (OAuth initiation in
/// particular) to the active onboarding session.
pub const CORRELATION_COOKIE: &str = "ob_session";

fn session_not_found(token: SessionToken) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Onboarding session",
        id: token.to_string(),
    })
}

/// Load a session and classify this request against the single-use gate.
async fn load_and_classify(
    state: &AppState,
    token: SessionToken,
    headers: &HeaderMap,
) -> AppResult<(OnboardingSession, ReadAccess)> {
    let session = OnboardingSessionRepo::find_by_token(&state.pool, token)
        .await?
        .ok_or_else(|| session_not_found(token))?;

    let status = SessionStatus::parse(&session.status)?;
    let cookie_present =
        crate::cookies::get_cookie(headers, &access_cookie_name(&token)).is_some();

    let access = evaluate_read(
        status,
        session.expires_at,
        session.submitted_at,
        session.first_accessed_at,
        cookie_present,
        Utc::now(),
    );

    Ok((session, access))
}

/// Persist the lazily detected expiry. Best-effort: a failure here is
/// logged and must never change the response.
async fn persist_expiry(state: &AppState, session: &OnboardingSession) {
    if session.status == SessionStatus::Expired.as_str() {
        return;
    }
    if let Err(e) =
        OnboardingSessionRepo::set_status(&state.pool, session.token, SessionStatus::Expired.as_str())
            .await
    {
        tracing::warn!(token = %session.token, error = %e, "Failed to persist lazy expiry");
    }
}

// ---------------------------------------------------------------------------
// GET /session/{token}
// ---------------------------------------------------------------------------

/// Read an onboarding session through the single-use gate.
///
/// First access mutates the session (`first_accessed_at`, status
/// `in_progress`) via a conditional update so concurrent first reads
/// have exactly one winner, and issues the access + correlation cookies
/// with max-age equal to the session's remaining lifetime.
pub async fn read_session(
    State(state): State<AppState>,
    Path(token): Path<SessionToken>,
    headers: HeaderMap,
) -> AppResult<axum::response::Response> {
    let (session, access) = load_and_classify(&state, token, &headers).await?;

    match access {
        ReadAccess::Expired => {
            persist_expiry(&state, &session).await;
            Err(AppError::Core(CoreError::Gone(
                "This link has expired".into(),
            )))
        }
        ReadAccess::AlreadySubmitted => Err(AppError::Core(CoreError::Gone(
            "This session has already been submitted".into(),
        ))),
        ReadAccess::FirstAccess => {
            let now = Utc::now();
            match OnboardingSessionRepo::mark_first_access(&state.pool, token, now).await? {
                Some(updated) => {
                    let ttl =
                        remaining_ttl_secs(updated.expires_at, now, DEFAULT_SESSION_TTL_SECS);
                    let correlation_ttl = remaining_ttl_secs(
                        updated.expires_at,
                        now,
                        CORRELATION_COOKIE_TTL_SECS,
                    );

                    tracing::info!(token = %token, "Onboarding session first access");

                    Ok((
                        AppendHeaders([
                            (
                                SET_COOKIE,
                                build_cookie(
                                    &access_cookie_name(&token),
                                    "1",
                                    ACCESS_COOKIE_PATH,
                                    ttl,
                                ),
                            ),
                            (
                                SET_COOKIE,
                                build_cookie(
                                    CORRELATION_COOKIE,
                                    &token.to_string(),
                                    "/",
                                    correlation_ttl,
                                ),
                            ),
                        ]),
                        Json(DataResponse { data: updated }),
                    )
                        .into_response())
                }
                // Lost the first-access race: another request owns the
                // cookie now, so this one is a consumed link.
                None => Err(AppError::Core(CoreError::Gone(
                    "This link has already been used".into(),
                ))),
            }
        }
        ReadAccess::Valid => Ok(Json(DataResponse { data: session }).into_response()),
        ReadAccess::LinkConsumed => Err(AppError::Core(CoreError::Gone(
            "This link has already been used".into(),
        ))),
    }
}

// ---------------------------------------------------------------------------
// PUT /session/{token}/answers
// ---------------------------------------------------------------------------

/// Merge intake answers into the session. Requires the access cookie.
pub async fn update_answers(
    State(state): State<AppState>,
    Path(token): Path<SessionToken>,
    headers: HeaderMap,
    Json(answers): Json<serde_json::Value>,
) -> AppResult<impl IntoResponse> {
    if !answers.is_object() {
        return Err(AppError::BadRequest("Answers must be a JSON object".into()));
    }

    let (session, access) = load_and_classify(&state, token, &headers).await?;
    require_open(&state, &session, access).await?;

    let updated = OnboardingSessionRepo::merge_answers(&state.pool, token, &answers)
        .await?
        .ok_or_else(|| session_not_found(token))?;

    tracing::debug!(token = %token, "Onboarding answers updated");

    Ok(Json(DataResponse { data: updated }))
}

// ---------------------------------------------------------------------------
// POST /session/{token}/submit
// ---------------------------------------------------------------------------

/// Final submission: marks the session completed. Requires the access
/// cookie. Terminal; later reads respond Gone.
pub async fn submit_session(
    State(state): State<AppState>,
    Path(token): Path<SessionToken>,
    headers: HeaderMap,
) -> AppResult<impl IntoResponse> {
    let (session, access) = load_and_classify(&state, token, &headers).await?;
    require_open(&state, &session, access).await?;

    let submitted = OnboardingSessionRepo::submit(&state.pool, token, Utc::now())
        .await?
        .ok_or_else(|| session_not_found(token))?;

    tracing::info!(token = %token, client_id = submitted.client_id, "Onboarding session submitted");

    Ok(Json(DataResponse { data: submitted }))
}

/// Gate a mutating request: the session must be open and this browser
/// must hold the access cookie (first access happens on read, not here).
async fn require_open(
    state: &AppState,
    session: &OnboardingSession,
    access: ReadAccess,
) -> AppResult<()> {
    match access {
        ReadAccess::Valid => Ok(()),
        ReadAccess::Expired => {
            persist_expiry(state, session).await;
            Err(AppError::Core(CoreError::Gone(
                "This link has expired".into(),
            )))
        }
        ReadAccess::AlreadySubmitted => Err(AppError::Core(CoreError::Gone(
            "This session has already been submitted".into(),
        ))),
        ReadAccess::FirstAccess | ReadAccess::LinkConsumed => Err(AppError::Core(
            CoreError::Gone("This link has already been used".into()),
        )),
    }
}

// ---------------------------------------------------------------------------
// POST /session/{token}/renew  (operator)
// ---------------------------------------------------------------------------

/// Operator override: reset the session to pending with a fresh one-hour
/// deadline, regardless of current state. Re-shares the link by
/// defeating single-use and expiry.
pub async fn renew_session(
    RequireOperator(operator): RequireOperator,
    State(state): State<AppState>,
    Path(token): Path<SessionToken>,
) -> AppResult<impl IntoResponse> {
    let expires_at = opsdesk_core::session::new_deadline(Utc::now());

    let renewed = OnboardingSessionRepo::renew(&state.pool, token, expires_at)
        .await?
        .ok_or_else(|| session_not_found(token))?;

    tracing::info!(token = %token, user_id = operator.user_id, "Onboarding session renewed");

    Ok(Json(DataResponse { data: renewed }))
}
