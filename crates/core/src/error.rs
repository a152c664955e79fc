#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} {id}")]
    NotFound { entity: &'static str, id: String },

    /// The identifier was valid once but the resource is no longer
    /// usable: expired, already submitted, or a single-use link that
    /// has already been consumed. Maps to HTTP 410.
    #[error("Gone: {0}")]
    Gone(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Configuration references a backing asset that is missing from
    /// the deployment. Maps to HTTP 503.
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
