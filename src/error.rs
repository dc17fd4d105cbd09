use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PayGateError {
    /// Caller input rejected before any request was sent.
    #[error("{0}")]
    Validation(String),

    /// The gateway answered but reported a failure.
    #[error("{message}")]
    Api {
        code: Option<i64>,
        status: Option<u16>,
        message: String,
    },

    /// The request went out but nothing came back (timeout, DNS, reset).
    #[error("Network error: No response from server")]
    NoResponse,

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Coarse classification of a [`PayGateError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Domain,
    Connectivity,
    Unexpected,
    Config,
}

impl PayGateError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::Api { .. } => ErrorKind::Domain,
            Self::NoResponse => ErrorKind::Connectivity,
            Self::Http(_) | Self::Serialize(_) | Self::Transport(_) => ErrorKind::Unexpected,
            Self::Config(_) => ErrorKind::Config,
        }
    }

    /// Only connectivity failures are worth retrying; everything else will
    /// fail the same way again.
    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::Connectivity
    }

    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

/// Loose shape of a gateway error body. Either field may carry the reason.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ApiErrorResponse {
    pub(crate) fn reason(self) -> Option<String> {
        self.message
            .filter(|m| !m.is_empty())
            .or(self.error.filter(|e| !e.is_empty()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_response_message() {
        assert_eq!(
            PayGateError::NoResponse.to_string(),
            "Network error: No response from server"
        );
    }

    #[test]
    fn test_api_error_displays_server_message() {
        let err = PayGateError::Api {
            code: Some(0),
            status: None,
            message: "dup".into(),
        };
        assert_eq!(err.to_string(), "dup");
        assert_eq!(err.kind(), ErrorKind::Domain);
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_kind_classification() {
        assert_eq!(
            PayGateError::validation("amount must be greater than 0").kind(),
            ErrorKind::Validation
        );
        assert_eq!(PayGateError::NoResponse.kind(), ErrorKind::Connectivity);
        assert!(PayGateError::NoResponse.is_retryable());
        assert_eq!(
            PayGateError::Transport("boom".into()).kind(),
            ErrorKind::Unexpected
        );
        assert_eq!(PayGateError::Config("x".into()).kind(), ErrorKind::Config);
    }

    #[test]
    fn test_error_body_prefers_message_over_error() {
        let body: ApiErrorResponse =
            serde_json::from_str(r#"{"message":"bad sign","error":"other"}"#).unwrap();
        assert_eq!(body.reason().as_deref(), Some("bad sign"));

        let body: ApiErrorResponse = serde_json::from_str(r#"{"error":"forbidden"}"#).unwrap();
        assert_eq!(body.reason().as_deref(), Some("forbidden"));

        let body: ApiErrorResponse = serde_json::from_str(r#"{"message":""}"#).unwrap();
        assert_eq!(body.reason(), None);
    }
}
