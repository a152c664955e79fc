//! Signing session field types and status.
//!
//! A signing session holds one PDF (base64) plus an ordered list of
//! field placements. Placement coordinates are PDF points relative to
//! the page's lower-left corner. Once a session is `signed` it is
//! read-only for signing purposes.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Kind of field the signer fills in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Signature,
    Date,
    Text,
}

/// One field to place on the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldPlacement {
    pub field_type: FieldType,
    /// 1-based page number.
    pub page: u32,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Lifecycle status of a signing session, stored as text in the
/// `signing_sessions.status` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SigningStatus {
    Pending,
    Signed,
    Expired,
}

impl SigningStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SigningStatus::Pending => "pending",
            SigningStatus::Signed => "signed",
            SigningStatus::Expired => "expired",
        }
    }

    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            "pending" => Ok(SigningStatus::Pending),
            "signed" => Ok(SigningStatus::Signed),
            "expired" => Ok(SigningStatus::Expired),
            other => Err(CoreError::Internal(format!(
                "Unknown signing session status '{other}'"
            ))),
        }
    }
}

/// Validate a placement list before minting a signing session.
///
/// A document with zero fields cannot be signed, and malformed
/// geometry would render unusable overlays.
pub fn validate_placements(fields: &[FieldPlacement]) -> Result<(), CoreError> {
    if fields.is_empty() {
        return Err(CoreError::Validation(
            "No signature fields are configured for this document".into(),
        ));
    }
    for (i, f) in fields.iter().enumerate() {
        if f.page == 0 {
            return Err(CoreError::Validation(format!(
                "Field {i}: page numbers are 1-based"
            )));
        }
        if f.width <= 0.0 || f.height <= 0.0 {
            return Err(CoreError::Validation(format!(
                "Field {i}: width and height must be positive"
            )));
        }
    }
    Ok(())
}
