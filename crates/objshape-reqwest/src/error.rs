//! Internal error types for objshape-reqwest.

use reqwest::StatusCode;
use thiserror::Error;

/// Result type alias for objshape-reqwest operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Internal error type for objshape-reqwest operations.
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Reqwest(#[from] reqwest::Error),
    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    /// Endpoint URL could not be built.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
    /// Server answered with a non-success status.
    #[error("HTTP {status}: {body}")]
    Status {
        /// Response status.
        status: StatusCode,
        /// Response body, truncated.
        body: String,
    },
    /// GraphQL response carried errors.
    #[error("GraphQL error{}: {message}", .code.as_ref().map(|c| format!(" {c}")).unwrap_or_default())]
    GraphQl {
        /// Error code from the `extensions` of the first error.
        code: Option<String>,
        /// Message of the first error.
        message: String,
    },
    /// Object payload was malformed.
    #[error("Invalid object payload: {0}")]
    Object(String),
    /// Invalid client configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl Error {
    /// Builds a status error, keeping at most 1024 characters of the body.
    pub(crate) fn status(status: StatusCode, body: &str) -> Self {
        Self::Status {
            status,
            body: body.chars().take(1024).collect(),
        }
    }
}

impl From<Error> for objshape_core::Error {
    fn from(err: Error) -> Self {
        use objshape_core::Error as CoreError;

        match err {
            Error::Reqwest(e) => {
                if e.is_timeout() {
                    CoreError::timeout()
                        .with_message(e.to_string())
                        .with_source(e)
                } else if e.is_connect() {
                    CoreError::network_error()
                        .with_message("Connection failed")
                        .with_source(e)
                } else {
                    CoreError::network_error()
                        .with_message(e.to_string())
                        .with_source(e)
                }
            }
            Error::Serde(e) => CoreError::serialization()
                .with_message(e.to_string())
                .with_source(e),
            Error::Url(e) => CoreError::configuration()
                .with_message(e.to_string())
                .with_source(e),
            Error::Status { status, body } => {
                let error = match status {
                    StatusCode::UNAUTHORIZED => CoreError::authentication(),
                    StatusCode::FORBIDDEN => CoreError::authorization(),
                    StatusCode::NOT_FOUND => CoreError::not_found(),
                    StatusCode::TOO_MANY_REQUESTS => CoreError::rate_limited(),
                    StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
                        CoreError::timeout()
                    }
                    s if s.is_server_error() => CoreError::service_unavailable(),
                    _ => CoreError::external_error(),
                };
                error.with_message(format!("HTTP {status}: {body}"))
            }
            Error::GraphQl { code, message } => {
                let error = match code.as_deref() {
                    Some("UNAUTHENTICATED") => CoreError::authentication(),
                    Some("FORBIDDEN" | "UNAUTHORIZED_ACCESS_ERROR") => CoreError::authorization(),
                    Some(code) if code.ends_with("NOT_FOUND") => CoreError::not_found(),
                    Some("RATE_LIMITED") => CoreError::rate_limited(),
                    _ => CoreError::external_error(),
                };
                match code {
                    Some(code) => error.with_message(message).with_context(code),
                    None => error.with_message(message),
                }
            }
            Error::Object(message) => CoreError::serialization().with_message(message),
            Error::Config(message) => CoreError::configuration().with_message(message),
        }
    }
}
