use eventhub_models::EventId;
use thiserror::Error;

/// Shown when the server gave no usable message.
pub const FALLBACK_MESSAGE: &str = "An error occurred while submitting the event.";

/// Outcome of one submit attempt.
pub type SubmissionResult = Result<EventId, SubmitError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitErrorKind {
    /// The server answered with a non-success status.
    Server { status: u16 },
    /// The request never produced a response (connect failure, timeout).
    Network,
    /// A success response without a usable event identifier.
    InvalidResponse,
    Unexpected,
}

impl SubmitErrorKind {
    /// Machine-readable error code string.
    pub fn code(&self) -> &'static str {
        match self {
            SubmitErrorKind::Server { .. } => "SERVER_ERROR",
            SubmitErrorKind::Network => "NETWORK_ERROR",
            SubmitErrorKind::InvalidResponse => "INVALID_RESPONSE",
            SubmitErrorKind::Unexpected => "UNEXPECTED_ERROR",
        }
    }
}

/// A failed submission: a message fit for the user plus its classification.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct SubmitError {
    pub kind: SubmitErrorKind,
    pub message: String,
}

impl SubmitError {
    pub fn server(status: u16, message: Option<String>) -> Self {
        Self {
            kind: SubmitErrorKind::Server { status },
            message: message.unwrap_or_else(|| FALLBACK_MESSAGE.to_string()),
        }
    }

    pub fn network() -> Self {
        Self {
            kind: SubmitErrorKind::Network,
            message: FALLBACK_MESSAGE.to_string(),
        }
    }

    pub fn invalid_response() -> Self {
        Self {
            kind: SubmitErrorKind::InvalidResponse,
            message: FALLBACK_MESSAGE.to_string(),
        }
    }

    pub fn unexpected() -> Self {
        Self {
            kind: SubmitErrorKind::Unexpected,
            message: FALLBACK_MESSAGE.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid base url: {0}")]
    InvalidBaseUrl(String),
    #[error("http client error: {0}")]
    Http(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_error_prefers_server_message() {
        let err = SubmitError::server(409, Some("Duplicate title".into()));
        assert_eq!(err.to_string(), "Duplicate title");
        assert_eq!(err.kind, SubmitErrorKind::Server { status: 409 });
        assert_eq!(err.kind.code(), "SERVER_ERROR");

        let err = SubmitError::server(500, None);
        assert_eq!(err.message, FALLBACK_MESSAGE);
    }
}
