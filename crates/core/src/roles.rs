//! Operator role names.
//!
//! Roles are stored as plain strings on the `users` table and embedded
//! in JWT claims. The RBAC extractors in the API crate compare against
//! these constants.

/// Full administrative access, including operator provisioning.
pub const ROLE_ADMIN: &str = "admin";

/// Day-to-day staff: can manage clients, mint onboarding and signing
/// links, and file documents.
pub const ROLE_STAFF: &str = "staff";

/// True for any role allowed to perform operator actions.
pub fn is_operator(role: &str) -> bool {
    role == ROLE_ADMIN || role == ROLE_STAFF
}
