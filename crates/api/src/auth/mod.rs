//! Operator authentication primitives: JWT access tokens and Argon2id
//! password hashing.

pub mod jwt;
pub mod password;
