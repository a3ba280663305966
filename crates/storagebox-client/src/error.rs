//! Error types for the robot web service client.

use thiserror::Error;

/// Result type alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur while talking to the robot web service.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("failed to build http client: {0}")]
    Build(#[source] reqwest::Error),

    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The robot answered non-200 with a well-formed error envelope.
    #[error("API error: {status} - {code}")]
    Api { status: u16, code: String },

    /// A response body could not be decoded, on either the success or
    /// the error path.
    #[error("malformed {context} response: {source}")]
    Decode {
        context: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl ClientError {
    /// Whether this error came from an undecodable response body.
    pub fn is_decode(&self) -> bool {
        matches!(self, ClientError::Decode { .. })
    }
}
