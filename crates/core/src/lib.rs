//! Domain logic for the opsdesk backend.
//!
//! Pure types and transition functions shared by the database and API
//! layers: the onboarding-session state machine, the OAuth callback
//! correlator, provider-token encryption, signing-field types, the
//! document preset registry, and the error taxonomy. Nothing in this
//! crate performs I/O except [`preset`], which reads the file-backed
//! placement store.

pub mod crypto;
pub mod error;
pub mod oauth;
pub mod preset;
pub mod roles;
pub mod session;
pub mod signing;
pub mod types;
