//! Error types for the Medgate domain.
//!
//! Uses `thiserror` for ergonomic error definitions. The taxonomy is fixed:
//! every component reports the most specific kind it can determine, and the
//! tool server wraps kinds with the operation name without masking them.

use thiserror::Error;

/// The top-level error type for all gateway operations.
#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    /// The presented credential did not match the shared secret.
    /// No record data is touched when this is returned.
    #[error("Unauthorized: credential rejected")]
    Unauthorized,

    /// The patient identifier does not exist in the record store.
    #[error("Patient not found: {patient_id}")]
    NotFound { patient_id: String },

    /// A category string outside {demographics, vitals, medications, history}.
    #[error("Invalid record category: {category}")]
    InvalidCategory { category: String },

    /// Malformed operation parameters (missing/mistyped arguments).
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The remote model call failed after bounded retries.
    #[error("Assistant provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// A record could not be classified field-by-field. Fatal to the
    /// request: unscrubbed data is never returned in its place.
    #[error("Scrub failure: {0}")]
    ScrubFailure(String),

    /// Record store backend failure (I/O, corrupt row, pool exhausted).
    #[error("Store error: {0}")]
    Store(String),
}

impl GatewayError {
    /// Stable machine-readable kind, used in audit entries and HTTP bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Unauthorized => "unauthorized",
            Self::NotFound { .. } => "not_found",
            Self::InvalidCategory { .. } => "invalid_category",
            Self::InvalidRequest(_) => "invalid_request",
            Self::ProviderUnavailable(_) => "provider_unavailable",
            Self::ScrubFailure(_) => "scrub_failure",
            Self::Store(_) => "store_error",
        }
    }
}

/// Result type alias using our error.
pub type Result<T> = std::result::Result<T, GatewayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_displays_patient_id() {
        let err = GatewayError::NotFound {
            patient_id: "P999".into(),
        };
        assert!(err.to_string().contains("P999"));
        assert_eq!(err.kind(), "not_found");
    }

    #[test]
    fn unauthorized_is_distinct_from_invalid_request() {
        let unauthorized = GatewayError::Unauthorized;
        let invalid = GatewayError::InvalidRequest("missing patient_id".into());
        assert_ne!(unauthorized.kind(), invalid.kind());
    }

    #[test]
    fn scrub_failure_kind() {
        let err = GatewayError::ScrubFailure("vitals entry is not an object".into());
        assert_eq!(err.kind(), "scrub_failure");
        assert!(err.to_string().contains("vitals entry"));
    }
}
