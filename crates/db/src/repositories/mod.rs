//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod client_repo;
pub mod onboarding_session_repo;
pub mod platform_token_repo;
pub mod signing_session_repo;
pub mod stored_file_repo;
pub mod user_repo;

pub use client_repo::ClientRepo;
pub use onboarding_session_repo::OnboardingSessionRepo;
pub use platform_token_repo::PlatformTokenRepo;
pub use signing_session_repo::SigningSessionRepo;
pub use stored_file_repo::StoredFileRepo;
pub use user_repo::UserRepo;
