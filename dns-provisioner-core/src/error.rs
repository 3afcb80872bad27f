//! Unified error type definition

use serde::Serialize;
use thiserror::Error;

// Re-export library error types
pub use dns_provisioner_provider::{ProviderError, RecordValidationError};
pub use dns_provisioner_resolver::ResolverError;

/// Core layer error type
#[derive(Error, Debug, Serialize)]
#[serde(tag = "code", content = "details")]
pub enum CoreError {
    /// Desired-state document absent, malformed or missing required keys
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Record rejected before any network call
    #[error("Validation error: {0}")]
    Validation(#[from] RecordValidationError),

    /// Public resolver query could not be issued
    #[error("Resolver error: {0}")]
    Resolver(#[from] ResolverError),

    /// The old record was deleted but its replacement was not created.
    ///
    /// The zone is left without the record; `deleted_id` names what was removed.
    #[error("Replace incomplete: record {deleted_id} was deleted but the new record was not created: {cause}")]
    IncompleteReplace {
        deleted_id: String,
        #[source]
        cause: ProviderError,
    },

    /// Provider error (converting from library)
    #[error("{0}")]
    Provider(#[from] ProviderError),
}

impl CoreError {
    /// Whether it is expected behavior (user input, resource does not exist, etc.) is used for log classification.
    ///
    /// Level `warn` should be used when returning `true` and level `error` when returning `false`.
    /// **Please update this method simultaneously when new variants are added. **
    #[must_use]
    pub fn is_expected(&self) -> bool {
        match self {
            Self::ParseError(_) | Self::Validation(_) => true,
            Self::Resolver(e) => matches!(e, ResolverError::ValidationError(_)),
            Self::Provider(e) => e.is_expected(),
            Self::IncompleteReplace { .. } => false,
        }
    }
}

/// Core layer Result type alias
pub type CoreResult<T> = std::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn not_found() -> ProviderError {
        ProviderError::RecordNotFound {
            provider: "cloudflare".into(),
            record_id: "abc".into(),
            raw_message: None,
        }
    }

    #[test]
    fn provider_errors_keep_their_classification() {
        assert!(CoreError::from(not_found()).is_expected());
        let network = ProviderError::NetworkError {
            provider: "cloudflare".into(),
            detail: "connection reset".into(),
        };
        assert!(!CoreError::from(network).is_expected());
    }

    #[test]
    fn incomplete_replace_names_the_deleted_record() {
        let err = CoreError::IncompleteReplace {
            deleted_id: "rec-1".into(),
            cause: not_found(),
        };
        assert!(!err.is_expected());
        assert!(err.to_string().contains("rec-1"));
        let json = serde_json::to_value(&err).unwrap_or_default();
        assert_eq!(json["code"], "IncompleteReplace");
        assert_eq!(json["details"]["deleted_id"], "rec-1");
    }

    #[test]
    fn parse_errors_are_expected() {
        assert!(CoreError::ParseError("no JSON block".into()).is_expected());
    }
}
