//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts where the API accepts one

pub mod client;
pub mod onboarding_session;
pub mod platform_token;
pub mod signing_session;
pub mod stored_file;
pub mod user;
