//! Error types for GitHub publishing operations.

use thiserror::Error;

/// The main error type for publishing operations.
///
/// Every variant that stems from an API call names the operation that
/// produced it so the failure can be rendered without extra context.
#[derive(Error, Debug)]
pub enum PublishError {
    #[error("{operation}: invalid GitHub token (unauthorized)")]
    Credential { operation: String },

    #[error("{operation}: insufficient permissions for the GitHub token")]
    Permission { operation: String },

    #[error("{operation}: {message}")]
    NotFound { operation: String, message: String },

    #[error("{operation}: conflict ({message})")]
    Conflict { operation: String, message: String },

    #[error("{operation}: validation failed: {body}")]
    Validation { operation: String, body: String },

    #[error("{operation}: {resource} already exists")]
    Duplicate { operation: String, resource: String },

    #[error("{operation}: unexpected response (HTTP {status}): {body}")]
    UnexpectedStatus {
        operation: String,
        status: u16,
        body: String,
    },

    #[error("{operation}: request failed: {message}")]
    Transport { operation: String, message: String },

    #[error("{operation}: malformed response: {message}")]
    Parse { operation: String, message: String },

    #[error("{operation}: declined by user")]
    UserDeclined { operation: String },

    #[error("No repositories found for the authenticated user")]
    EmptyRepositoryList,

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PublishError {
    /// Returns the HTTP status carried by this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            PublishError::Credential { .. } => Some(401),
            PublishError::Permission { .. } => Some(403),
            PublishError::UnexpectedStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the error reflects a user decision rather than a fault.
    pub fn is_user_declined(&self) -> bool {
        matches!(self, PublishError::UserDeclined { .. })
    }
}

/// A specialized Result type for publishing operations.
pub type Result<T> = std::result::Result<T, PublishError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names_operation_and_status() {
        let err = PublishError::UnexpectedStatus {
            operation: "create branch".into(),
            status: 500,
            body: "boom".into(),
        };

        assert_eq!(
            err.to_string(),
            "create branch: unexpected response (HTTP 500): boom"
        );
        assert_eq!(err.status(), Some(500));
    }

    #[test]
    fn test_user_declined_is_not_a_fault() {
        let err = PublishError::UserDeclined {
            operation: "publish file".into(),
        };

        assert!(err.is_user_declined());
        assert_eq!(err.status(), None);
    }
}
