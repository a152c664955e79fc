//! Onboarding session state machine.
//!
//! States: `pending → in_progress → completed`, with `expired` reachable
//! from either non-terminal state once the deadline passes. The deadline
//! is checked lazily on every read (see [`expire_if_due`]) and by the
//! periodic sweep in the API crate.
//!
//! Everything here is a pure function over session fields so the
//! read/write coupling of the lazy expiry stays visible and testable
//! without a database.

use chrono::Duration;

use crate::error::CoreError;
use crate::types::{SessionToken, Timestamp};

/// Default session lifetime when no explicit deadline is set: one hour.
pub const DEFAULT_SESSION_TTL_SECS: i64 = 3600;

/// Lifetime of the `ob_session` correlation cookie when the session has
/// no explicit deadline: 24 hours.
pub const CORRELATION_COOKIE_TTL_SECS: i64 = 86_400;

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Lifecycle status of an onboarding session, stored as text in the
/// `onboarding_sessions.status` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Pending,
    InProgress,
    Completed,
    Expired,
}

impl SessionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SessionStatus::Pending => "pending",
            SessionStatus::InProgress => "in_progress",
            SessionStatus::Completed => "completed",
            SessionStatus::Expired => "expired",
        }
    }

    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            "pending" => Ok(SessionStatus::Pending),
            "in_progress" => Ok(SessionStatus::InProgress),
            "completed" => Ok(SessionStatus::Completed),
            "expired" => Ok(SessionStatus::Expired),
            other => Err(CoreError::Internal(format!(
                "Unknown onboarding session status '{other}'"
            ))),
        }
    }

    /// A terminal session never transitions again.
    pub fn is_terminal(self) -> bool {
        matches!(self, SessionStatus::Completed | SessionStatus::Expired)
    }
}

// ---------------------------------------------------------------------------
// Transitions
// ---------------------------------------------------------------------------

/// Explicit idempotent expiry transition.
///
/// Returns `Some(Expired)` exactly when the session has a deadline, the
/// deadline has passed, and the session is not already in a terminal
/// state. Callers persist the returned status best-effort; the HTTP
/// response must reflect expiry even if that write fails.
pub fn expire_if_due(
    status: SessionStatus,
    expires_at: Option<Timestamp>,
    now: Timestamp,
) -> Option<SessionStatus> {
    let deadline = expires_at?;
    if now > deadline && !status.is_terminal() {
        Some(SessionStatus::Expired)
    } else {
        None
    }
}

/// Seconds until the deadline, clamped to zero, or `default_secs` when
/// no deadline is set. Used for cookie max-age.
pub fn remaining_ttl_secs(
    expires_at: Option<Timestamp>,
    now: Timestamp,
    default_secs: i64,
) -> i64 {
    match expires_at {
        Some(deadline) => (deadline - now).num_seconds().max(0),
        None => default_secs,
    }
}

/// The deadline of a freshly minted or renewed session.
pub fn new_deadline(now: Timestamp) -> Timestamp {
    now + Duration::seconds(DEFAULT_SESSION_TTL_SECS)
}

// ---------------------------------------------------------------------------
// Read gating
// ---------------------------------------------------------------------------

/// Outcome of evaluating a session read against the single-use gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadAccess {
    /// Deadline has passed. Persist `expired` best-effort, respond Gone.
    Expired,
    /// Session was already submitted or completed. Respond Gone.
    AlreadySubmitted,
    /// First-ever read: perform the first-access transition and issue
    /// the single-use cookie.
    FirstAccess,
    /// Subsequent read presenting the single-use cookie. Return the
    /// session without mutation.
    Valid,
    /// Subsequent read without the cookie: the link has already been
    /// opened once elsewhere. Respond Gone.
    LinkConsumed,
}

/// Classify a read of an onboarding session.
///
/// Order of checks mirrors the handler contract: expiry first, then
/// completion, then the first-access / single-use-cookie branch.
pub fn evaluate_read(
    status: SessionStatus,
    expires_at: Option<Timestamp>,
    submitted_at: Option<Timestamp>,
    first_accessed_at: Option<Timestamp>,
    cookie_present: bool,
    now: Timestamp,
) -> ReadAccess {
    if status == SessionStatus::Expired || expire_if_due(status, expires_at, now).is_some() {
        return ReadAccess::Expired;
    }
    if status == SessionStatus::Completed || submitted_at.is_some() {
        return ReadAccess::AlreadySubmitted;
    }
    if first_accessed_at.is_none() {
        return ReadAccess::FirstAccess;
    }
    if cookie_present {
        ReadAccess::Valid
    } else {
        ReadAccess::LinkConsumed
    }
}

/// Name of the single-use access cookie for a session token.
pub fn access_cookie_name(token: &SessionToken) -> String {
    format!("onb_{token}")
}
