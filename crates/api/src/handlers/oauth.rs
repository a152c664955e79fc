//! Platform OAuth connect and callback handlers.
//!
//! Two flows share each platform's callback route and are told apart by
//! which state-carrying evidence the request presents (see
//! `opsdesk_core::oauth`):
//!
//! - a request from an active onboarding session (identified by the
//!   `ob_session` cookie) initiates with the session token as `state`;
//! - a logged-in operator initiates with a random CSRF state stored in a
//!   short-lived path-scoped cookie.
//!
//! Exchanged access tokens are sealed with AES-GCM before storage and
//! upserted, so re-authorizing a platform replaces the previous token.

use axum::extract::{Path, Query, State};
use axum::http::header::SET_COOKIE;
use axum::http::HeaderMap;
use axum::response::{AppendHeaders, IntoResponse};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use opsdesk_core::error::CoreError;
use opsdesk_core::oauth::{
    generate_state, resolve_callback, state_cookie_name, validate_platform, CallbackFlow,
    STATE_COOKIE_TTL_SECS,
};
use opsdesk_core::session::{expire_if_due, SessionStatus};
use opsdesk_core::types::SessionToken;
use opsdesk_core::crypto;
use opsdesk_db::repositories::{OnboardingSessionRepo, PlatformTokenRepo};

use crate::config::OAuthProvider;
use crate::cookies::{build_cookie, clear_cookie, get_cookie};
use crate::error::{AppError, AppResult};
use crate::handlers::session::CORRELATION_COOKIE;
use crate::middleware::auth::user_from_headers;
use crate::state::AppState;

fn provider_for<'a>(state: &'a AppState, platform: &str) -> AppResult<&'a OAuthProvider> {
    validate_platform(platform).map_err(AppError::Core)?;
    state.config.oauth_providers.get(platform).ok_or_else(|| {
        AppError::Core(CoreError::ServiceUnavailable(format!(
            "OAuth is not configured for {platform}"
        )))
    })
}

/// Path the CSRF state cookie is scoped to: the platform's callback only.
fn callback_path(platform: &str) -> String {
    format!("/api/oauth/{platform}/callback")
}

// ---------------------------------------------------------------------------
// GET /oauth/{platform}/connect
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct ConnectResponse {
    /// Provider URL the caller should send the user to.
    pub authorize_url: String,
}

/// Begin an OAuth connect.
///
/// A request carrying the `ob_session` cookie for a live onboarding
/// session starts the anonymous flow (session token as `state`, no CSRF
/// cookie). Anything else requires an authenticated operator and starts
/// the logged-in flow (random `state`, CSRF cookie scoped to the
/// callback path).
pub async fn connect(
    State(state): State<AppState>,
    Path(platform): Path<String>,
    headers: HeaderMap,
) -> AppResult<axum::response::Response> {
    let provider = provider_for(&state, &platform)?;
    let redirect_uri = state.config.oauth_redirect_uri(&platform);

    if let Some(token) = active_onboarding_session(&state, &headers).await? {
        let authorize_url =
            build_authorize_url(provider, &redirect_uri, &token.to_string())?;

        tracing::debug!(%platform, token = %token, "OAuth connect (onboarding flow)");

        return Ok(Json(ConnectResponse { authorize_url }).into_response());
    }

    let operator = user_from_headers(&headers, &state.config.jwt).ok_or_else(|| {
        AppError::Core(CoreError::Unauthorized(
            "Connecting a platform requires an onboarding session or a logged-in operator".into(),
        ))
    })?;

    let csrf_state = generate_state();
    let authorize_url = build_authorize_url(provider, &redirect_uri, &csrf_state)?;

    tracing::debug!(%platform, user_id = operator.user_id, "OAuth connect (logged-in flow)");

    Ok((
        AppendHeaders([(
            SET_COOKIE,
            build_cookie(
                &state_cookie_name(&platform),
                &csrf_state,
                &callback_path(&platform),
                STATE_COOKIE_TTL_SECS,
            ),
        )]),
        Json(ConnectResponse { authorize_url }),
    )
        .into_response())
}

/// Resolve the `ob_session` cookie to a live onboarding session token,
/// if the cookie is present and the session is still usable. A stale
/// cookie is ignored rather than rejected so a logged-in operator with
/// a leftover cookie still gets the CSRF flow.
async fn active_onboarding_session(
    state: &AppState,
    headers: &HeaderMap,
) -> AppResult<Option<SessionToken>> {
    let Some(raw) = get_cookie(headers, CORRELATION_COOKIE) else {
        return Ok(None);
    };
    let Ok(token) = raw.parse::<SessionToken>() else {
        return Ok(None);
    };
    let Some(session) = OnboardingSessionRepo::find_by_token(&state.pool, token).await? else {
        return Ok(None);
    };

    let status = SessionStatus::parse(&session.status)?;
    if status.is_terminal() || expire_if_due(status, session.expires_at, Utc::now()).is_some() {
        return Ok(None);
    }
    Ok(Some(token))
}

fn build_authorize_url(
    provider: &OAuthProvider,
    redirect_uri: &str,
    state_value: &str,
) -> AppResult<String> {
    let url = reqwest::Url::parse_with_params(
        &provider.authorize_url,
        &[
            ("client_id", provider.client_id.as_str()),
            ("redirect_uri", redirect_uri),
            ("response_type", "code"),
            ("state", state_value),
        ],
    )
    .map_err(|e| AppError::InternalError(format!("Invalid authorize URL: {e}")))?;
    Ok(url.into())
}

// ---------------------------------------------------------------------------
// GET /oauth/{platform}/callback
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub code: String,
    pub state: String,
}

#[derive(Debug, Serialize)]
pub struct CallbackResponse {
    pub platform: String,
    /// `"user"` for the logged-in flow, `"onboarding"` otherwise.
    pub connected_as: &'static str,
}

/// Shared provider callback for both flows.
///
/// The CSRF cookie is checked first: when present the returned `state`
/// must match it exactly and the request must be authenticated. Its
/// absence implies the onboarding flow, in which case `state` must
/// resolve to a real onboarding session.
pub async fn callback(
    State(state): State<AppState>,
    Path(platform): Path<String>,
    Query(params): Query<CallbackParams>,
    headers: HeaderMap,
) -> AppResult<axum::response::Response> {
    let provider = provider_for(&state, &platform)?;

    let cookie_name = state_cookie_name(&platform);
    let state_cookie = get_cookie(&headers, &cookie_name);

    match resolve_callback(state_cookie, &params.state).map_err(AppError::Core)? {
        CallbackFlow::LoggedIn => {
            let operator = user_from_headers(&headers, &state.config.jwt).ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized(
                    "OAuth callback requires an authenticated operator".into(),
                ))
            })?;

            let access_token =
                exchange_code(&state, provider, &platform, &params.code).await?;
            let sealed = crypto::seal_token(&state.config.token_encryption_key, &access_token)
                .map_err(AppError::Core)?;

            PlatformTokenRepo::upsert_for_user(
                &state.pool,
                operator.user_id,
                &platform,
                &sealed,
            )
            .await?;

            tracing::info!(%platform, user_id = operator.user_id, "Platform connected (logged-in flow)");

            Ok((
                AppendHeaders([(
                    SET_COOKIE,
                    clear_cookie(&cookie_name, &callback_path(&platform)),
                )]),
                Json(CallbackResponse {
                    platform,
                    connected_as: "user",
                }),
            )
                .into_response())
        }
        CallbackFlow::Onboarding(token) => {
            // The state value must resolve to a real session; an
            // unguessable token is the only binding here.
            OnboardingSessionRepo::find_by_token(&state.pool, token)
                .await?
                .ok_or_else(|| {
                    AppError::BadRequest(
                        "OAuth state does not correspond to an onboarding session".into(),
                    )
                })?;

            let access_token =
                exchange_code(&state, provider, &platform, &params.code).await?;
            let sealed = crypto::seal_token(&state.config.token_encryption_key, &access_token)
                .map_err(AppError::Core)?;

            PlatformTokenRepo::upsert_for_session(&state.pool, token, &platform, &sealed)
                .await?;

            tracing::info!(%platform, token = %token, "Platform connected (onboarding flow)");

            Ok(Json(CallbackResponse {
                platform,
                connected_as: "onboarding",
            })
            .into_response())
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenExchangeResponse {
    access_token: String,
}

/// Exchange an authorization code for an access token.
///
/// One outbound call, no retry: a failure surfaces to the caller as an
/// internal error (per the resource model, resilience is the caller's
/// concern).
async fn exchange_code(
    state: &AppState,
    provider: &OAuthProvider,
    platform: &str,
    code: &str,
) -> AppResult<String> {
    let redirect_uri = state.config.oauth_redirect_uri(platform);

    let response = state
        .http
        .post(&provider.token_url)
        .form(&[
            ("grant_type", "authorization_code"),
            ("code", code),
            ("client_id", provider.client_id.as_str()),
            ("client_secret", provider.client_secret.as_str()),
            ("redirect_uri", redirect_uri.as_str()),
        ])
        .send()
        .await
        .map_err(|e| {
            tracing::error!(%platform, error = %e, "OAuth token exchange request failed");
            AppError::InternalError("OAuth token exchange failed".into())
        })?;

    if !response.status().is_success() {
        tracing::error!(%platform, status = %response.status(), "OAuth token exchange rejected");
        return Err(AppError::InternalError("OAuth token exchange failed".into()));
    }

    let body: TokenExchangeResponse = response.json().await.map_err(|e| {
        tracing::error!(%platform, error = %e, "OAuth token exchange returned malformed JSON");
        AppError::InternalError("OAuth token exchange failed".into())
    })?;

    Ok(body.access_token)
}
