//! Unified error type definition

use serde::Serialize;
use thiserror::Error;

// Re-export library error type
pub use iam_console_gateway::GatewayError;

use crate::validation::FieldError;

/// Console layer error type
#[derive(Error, Debug, Serialize)]
#[serde(tag = "code", content = "details")]
pub enum ConsoleError {
    /// Gateway error (converting from library)
    #[error("{0}")]
    Gateway(#[from] GatewayError),

    /// One or more form fields failed validation; nothing was sent
    #[error("Validation failed for {} field(s)", .0.len())]
    Validation(Vec<FieldError>),

    /// A submission for this form is already in flight
    #[error("A submission is already in progress")]
    Busy,

    /// The form has no open record
    #[error("No record is open")]
    NoSelection,

    /// The record has no value in its identifier field
    #[error("Record has no identifier in field '{field}'")]
    MissingIdentifier { field: String },

    /// The operation is not allowed for this record or mode
    #[error("Read-only: {0}")]
    ReadOnly(String),

    /// Configuration could not be loaded or is invalid
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ConsoleError {
    /// Whether it is expected behavior (user input, backend refusal, etc.), used for log classification.
    ///
    /// Level `warn` should be used when returning `true` and level `error` when returning `false`.
    #[must_use]
    pub fn is_expected(&self) -> bool {
        match self {
            Self::Validation(_)
            | Self::Busy
            | Self::NoSelection
            | Self::MissingIdentifier { .. }
            | Self::ReadOnly(_) => true,
            Self::Gateway(e) => e.is_expected(),
            Self::Config(_) => false,
        }
    }

    /// Text suitable for a notification. Backend messages pass through verbatim.
    pub fn user_message(&self) -> String {
        match self {
            Self::Gateway(e) => e.user_message(),
            other => other.to_string(),
        }
    }
}

/// Console layer Result type alias
pub type ConsoleResult<T> = std::result::Result<T, ConsoleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gateway_rejections_keep_backend_message() {
        let err: ConsoleError = GatewayError::Rejected {
            collection: "announcements".to_string(),
            code: Some("error.notice.time".to_string()),
            message: "发送时间不能早于当前时间".to_string(),
        }
        .into();
        assert!(err.is_expected());
        assert_eq!(err.user_message(), "发送时间不能早于当前时间");
    }

    #[test]
    fn transport_failures_are_unexpected() {
        let err: ConsoleError = GatewayError::NetworkError {
            collection: "announcements".to_string(),
            detail: "connection refused".to_string(),
        }
        .into();
        assert!(!err.is_expected());
        assert!(!ConsoleError::Config("bad".to_string()).is_expected());
    }

    #[test]
    fn validation_errors_serialize_with_details() {
        let err = ConsoleError::Validation(vec![FieldError::new("title", "required")]);
        assert_eq!(err.to_string(), "Validation failed for 1 field(s)");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "Validation");
        assert_eq!(json["details"][0]["field"], "title");
    }
}
