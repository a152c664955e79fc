//! OAuth state correlation for the shared provider callback.
//!
//! Two mutually exclusive flows share one callback route per platform:
//!
//! - **Anonymous onboarding**: initiation uses the onboarding session
//!   token itself as the `state` parameter and sets no CSRF cookie.
//! - **Logged-in connect**: initiation generates a random state, stores
//!   it in a short-lived path-scoped cookie, and passes it as `state`.
//!
//! The callback decides which flow it is serving from which evidence is
//! present, CSRF cookie first. There is deliberately no cryptographic
//! binding on the onboarding path beyond the unguessability of the
//! session token; see DESIGN.md for the recorded weakness.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::RngCore;
use uuid::Uuid;

use crate::error::CoreError;
use crate::types::SessionToken;

/// Platforms a client or operator may connect.
pub const PLATFORMS: &[&str] = &["facebook", "instagram", "linkedin"];

/// Lifetime of the `<platform>_oauth_state` CSRF cookie: 10 minutes.
pub const STATE_COOKIE_TTL_SECS: i64 = 600;

/// Validate that a platform name is one we integrate with.
pub fn validate_platform(platform: &str) -> Result<(), CoreError> {
    if PLATFORMS.contains(&platform) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Unknown platform '{platform}'. Must be one of: {PLATFORMS:?}"
        )))
    }
}

/// Name of the CSRF state cookie for a platform.
pub fn state_cookie_name(platform: &str) -> String {
    format!("{platform}_oauth_state")
}

/// Generate a random CSRF `state` value for the logged-in connect flow.
pub fn generate_state() -> String {
    let mut bytes = [0u8; 32];
    rand::rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Which flow a provider callback belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackFlow {
    /// CSRF cookie matched the returned `state`: a logged-in operator
    /// connecting their own account. Token is keyed `(user_id, platform)`.
    LoggedIn,
    /// No CSRF cookie; `state` carries an onboarding session token. The
    /// caller must still verify the token resolves to a real session.
    Onboarding(SessionToken),
}

/// Resolve a callback to its flow.
///
/// The CSRF cookie is checked **first**: when present, the returned
/// `state` must match it exactly (fails closed on mismatch). Its absence
/// implies the onboarding flow, in which case `state` must parse as a
/// session token.
pub fn resolve_callback(
    state_cookie: Option<&str>,
    state_param: &str,
) -> Result<CallbackFlow, CoreError> {
    if let Some(expected) = state_cookie {
        if expected == state_param {
            return Ok(CallbackFlow::LoggedIn);
        }
        return Err(CoreError::Forbidden(
            "OAuth state does not match the stored value".into(),
        ));
    }

    match Uuid::parse_str(state_param) {
        Ok(token) => Ok(CallbackFlow::Onboarding(token)),
        Err(_) => Err(CoreError::Validation(
            "OAuth state matches no known flow".into(),
        )),
    }
}
