//! Periodic expiry sweep for onboarding sessions.
//!
//! Sessions are expired lazily whenever they are read, so this sweep is a
//! catch-up pass for sessions nobody touches again. It marks overdue
//! `pending` / `in_progress` rows as `expired` on a fixed interval using
//! `tokio::time::interval`.

use std::time::Duration;

use chrono::Utc;
use opsdesk_db::repositories::OnboardingSessionRepo;
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

/// How often the sweep runs by default: 10 minutes.
const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 600;

/// Run the session expiry sweep loop.
///
/// The interval can be overridden with `SESSION_SWEEP_INTERVAL_SECS`.
/// Runs until `cancel` is triggered.
pub async fn run(pool: PgPool, cancel: CancellationToken) {
    let interval_secs: u64 = std::env::var("SESSION_SWEEP_INTERVAL_SECS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_SWEEP_INTERVAL_SECS);

    tracing::info!(interval_secs, "Session expiry sweep started");

    let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Session expiry sweep stopping");
                break;
            }
            _ = interval.tick() => {
                match OnboardingSessionRepo::expire_due(&pool, Utc::now()).await {
                    Ok(expired) => {
                        if expired > 0 {
                            tracing::info!(expired, "Session sweep: marked overdue sessions expired");
                        } else {
                            tracing::debug!("Session sweep: nothing overdue");
                        }
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Session sweep: update failed");
                    }
                }
            }
        }
    }
}
