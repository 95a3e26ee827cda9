//! Client error types

use serde::Deserialize;
use shared::FieldErrors;
use thiserror::Error;

/// Client error type
#[derive(Debug, Error)]
pub enum ClientError {
    /// Network failure or transport-level HTTP error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status
    #[error("API error {status}: {}", .message.as_deref().unwrap_or("no details"))]
    Api {
        status: u16,
        message: Option<String>,
    },

    /// The response body did not match its schema
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// The payload failed validation; nothing was sent
    #[error("Validation error: {0}")]
    Validation(FieldErrors),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A cache entry held a value of another type than requested
    #[error("Cached value for {0} has an unexpected type")]
    CacheTypeMismatch(String),
}

impl ClientError {
    /// The server's own explanation, when it sent one
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ClientError::Api { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, ClientError::Validation(_))
    }

    /// HTTP status of an API rejection
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

impl From<FieldErrors> for ClientError {
    fn from(errors: FieldErrors) -> Self {
        ClientError::Validation(errors)
    }
}

/// Error body of the API: `{"detail": "..."}`. Request validation
/// failures carry a list instead of a string.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    detail: serde_json::Value,
}

impl ErrorBody {
    pub(crate) fn message(self) -> Option<String> {
        match self.detail {
            serde_json::Value::String(text) => Some(text),
            serde_json::Value::Array(items) => {
                let messages: Vec<String> = items
                    .iter()
                    .filter_map(|item| item.get("msg").and_then(|m| m.as_str()))
                    .map(str::to_string)
                    .collect();
                (!messages.is_empty()).then(|| messages.join("; "))
            }
            _ => None,
        }
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detail_string() {
        let body: ErrorBody = serde_json::from_str(r#"{"detail":"Wine not found"}"#).unwrap();
        assert_eq!(body.message().as_deref(), Some("Wine not found"));
    }

    #[test]
    fn test_detail_list() {
        let body: ErrorBody = serde_json::from_str(
            r#"{"detail":[{"loc":["body","price"],"msg":"ensure this value is greater than 0"}]}"#,
        )
        .unwrap();
        assert_eq!(
            body.message().as_deref(),
            Some("ensure this value is greater than 0")
        );
    }

    #[test]
    fn test_server_message() {
        let error = ClientError::Api {
            status: 404,
            message: Some("Restaurant not found".to_string()),
        };
        assert_eq!(error.server_message(), Some("Restaurant not found"));
        assert_eq!(error.status(), Some(404));
        assert_eq!(error.to_string(), "API error 404: Restaurant not found");

        let error = ClientError::Api {
            status: 500,
            message: None,
        };
        assert_eq!(error.server_message(), None);
        assert_eq!(error.to_string(), "API error 500: no details");
    }

    #[test]
    fn test_validation_is_flagged() {
        let mut errors = FieldErrors::new();
        errors.add("price", "Price must be greater than 0");
        let error = ClientError::from(errors);
        assert!(error.is_validation());
        assert_eq!(error.server_message(), None);
    }
}
