use serde::{Deserialize, Serialize};

/// Unified error type for all gateway operations.
///
/// Each variant names the collection that produced it, plus variant-specific context.
/// All variants are serializable for structured error reporting.
///
/// Gateway calls are never retried: every variant is terminal for the operation
/// that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "code")]
pub enum GatewayError {
    /// A network-level error occurred (DNS resolution failure, connection refused, etc.).
    NetworkError {
        /// Collection that produced the error.
        collection: String,
        /// Error details.
        detail: String,
    },

    /// The HTTP request timed out.
    Timeout {
        /// Collection that produced the error.
        collection: String,
        /// Error details.
        detail: String,
    },

    /// The backend answered with a failure envelope (`failed: true`).
    ///
    /// The message is meant for the user and is shown verbatim.
    Rejected {
        /// Collection that produced the error.
        collection: String,
        /// Backend error code, if provided.
        #[serde(rename = "rawCode")]
        code: Option<String>,
        /// Human-readable message from the backend.
        message: String,
    },

    /// The requested record does not exist.
    NotFound {
        /// Collection that produced the error.
        collection: String,
        /// Identifier that was looked up.
        id: String,
        /// Original response body, if available.
        raw_message: Option<String>,
    },

    /// The update conflicts with the stored version of the record.
    Conflict {
        /// Collection that produced the error.
        collection: String,
        /// Original response body, if available.
        raw_message: Option<String>,
    },

    /// The backend refused the request payload (HTTP 400/422 without an envelope).
    InvalidParameter {
        /// Collection that produced the error.
        collection: String,
        /// Name of the invalid parameter, or `body` when unknown.
        param: String,
        /// Description of what's wrong.
        detail: String,
    },

    /// The access token is missing or expired.
    Unauthenticated {
        /// Collection that produced the error.
        collection: String,
        /// Original response body, if available.
        raw_message: Option<String>,
    },

    /// The authenticated user lacks permission for the requested operation.
    PermissionDenied {
        /// Collection that produced the error.
        collection: String,
        /// Original response body, if available.
        raw_message: Option<String>,
    },

    /// Failed to parse the backend's response.
    ParseError {
        /// Collection that produced the error.
        collection: String,
        /// Details about the parse failure.
        detail: String,
    },

    /// Failed to serialize a request body.
    SerializationError {
        /// Collection that produced the error.
        collection: String,
        /// Details about the serialization failure.
        detail: String,
    },

    /// An unrecognized failure.
    Unknown {
        /// Collection that produced the error.
        collection: String,
        /// HTTP status, if the request reached the backend.
        status: Option<u16>,
        /// Raw error message.
        raw_message: String,
    },
}

impl GatewayError {
    /// Collection that produced the error.
    pub fn collection(&self) -> &str {
        match self {
            Self::NetworkError { collection, .. }
            | Self::Timeout { collection, .. }
            | Self::Rejected { collection, .. }
            | Self::NotFound { collection, .. }
            | Self::Conflict { collection, .. }
            | Self::InvalidParameter { collection, .. }
            | Self::Unauthenticated { collection, .. }
            | Self::PermissionDenied { collection, .. }
            | Self::ParseError { collection, .. }
            | Self::SerializationError { collection, .. }
            | Self::Unknown { collection, .. } => collection,
        }
    }

    /// Whether the failure is expected behavior (user input, missing resource, etc.),
    /// used for log classification.
    ///
    /// Level `warn` should be used when returning `true` and level `error` when returning `false`.
    /// **Update this method when new variants are added.**
    #[must_use]
    pub fn is_expected(&self) -> bool {
        matches!(
            self,
            Self::Rejected { .. }
                | Self::NotFound { .. }
                | Self::Conflict { .. }
                | Self::InvalidParameter { .. }
                | Self::Unauthenticated { .. }
                | Self::PermissionDenied { .. }
        )
    }

    /// Transport-level failure (the request never produced a usable response).
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::NetworkError { .. } | Self::Timeout { .. })
    }

    /// Text surfaced to the user.
    ///
    /// Backend failure envelopes are propagated verbatim; everything else uses the
    /// generic rendering of [`Display`](std::fmt::Display).
    pub fn user_message(&self) -> String {
        match self {
            Self::Rejected { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

impl std::fmt::Display for GatewayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NetworkError { collection, detail } => {
                write!(f, "[{collection}] Network error: {detail}")
            }
            Self::Timeout { collection, detail } => {
                write!(f, "[{collection}] Request timeout: {detail}")
            }
            Self::Rejected {
                collection,
                message,
                ..
            } => write!(f, "[{collection}] {message}"),
            Self::NotFound { collection, id, .. } => {
                write!(f, "[{collection}] Record '{id}' not found")
            }
            Self::Conflict {
                collection,
                raw_message,
            } => {
                if let Some(msg) = raw_message {
                    write!(f, "[{collection}] Conflicting update: {msg}")
                } else {
                    write!(f, "[{collection}] Conflicting update")
                }
            }
            Self::InvalidParameter {
                collection,
                param,
                detail,
            } => write!(f, "[{collection}] Invalid parameter '{param}': {detail}"),
            Self::Unauthenticated { collection, .. } => {
                write!(f, "[{collection}] Not signed in or session expired")
            }
            Self::PermissionDenied { collection, .. } => {
                write!(f, "[{collection}] Permission denied")
            }
            Self::ParseError { collection, detail } => {
                write!(f, "[{collection}] Failed to parse response: {detail}")
            }
            Self::SerializationError { collection, detail } => {
                write!(f, "[{collection}] Failed to serialize request: {detail}")
            }
            Self::Unknown {
                collection,
                status,
                raw_message,
            } => {
                if let Some(status) = status {
                    write!(f, "[{collection}] HTTP {status}: {raw_message}")
                } else {
                    write!(f, "[{collection}] {raw_message}")
                }
            }
        }
    }
}

impl std::error::Error for GatewayError {}

/// Gateway Result type alias
pub type Result<T> = std::result::Result<T, GatewayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejected_message_is_verbatim() {
        let e = GatewayError::Rejected {
            collection: "mail-templates".into(),
            code: Some("error.code.exist".into()),
            message: "Template code already exists".into(),
        };
        assert_eq!(e.user_message(), "Template code already exists");
        assert!(e.is_expected());
        assert!(!e.is_transport());
    }

    #[test]
    fn transport_errors_are_not_expected() {
        let e = GatewayError::NetworkError {
            collection: "announcements".into(),
            detail: "connection refused".into(),
        };
        assert!(e.is_transport());
        assert!(!e.is_expected());
        assert_eq!(
            e.user_message(),
            "[announcements] Network error: connection refused"
        );
    }

    #[test]
    fn collection_accessor() {
        let e = GatewayError::NotFound {
            collection: "projects".into(),
            id: "9".into(),
            raw_message: None,
        };
        assert_eq!(e.collection(), "projects");
        assert_eq!(e.to_string(), "[projects] Record '9' not found");
    }

    #[test]
    fn unknown_display_with_and_without_status() {
        let with_status = GatewayError::Unknown {
            collection: "c".into(),
            status: Some(500),
            raw_message: "boom".into(),
        };
        assert_eq!(with_status.to_string(), "[c] HTTP 500: boom");
        let without = GatewayError::Unknown {
            collection: "c".into(),
            status: None,
            raw_message: "boom".into(),
        };
        assert_eq!(without.to_string(), "[c] boom");
    }

    #[test]
    fn serializes_with_code_tag() {
        let e = GatewayError::Timeout {
            collection: "c".into(),
            detail: "30s".into(),
        };
        let json = serde_json::to_value(&e).unwrap();
        assert_eq!(json["code"], "Timeout");
        assert_eq!(json["collection"], "c");
    }
}
