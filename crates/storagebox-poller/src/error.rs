//! Error types for the poll loop.

use thiserror::Error;

use storagebox_client::{ClientError, StorageBoxId};

/// Why a poll cycle was abandoned.
#[derive(Debug, Error)]
pub enum PollError {
    #[error("listing storage boxes failed: {0}")]
    List(#[source] ClientError),

    #[error("fetching storage box {id} failed: {source}")]
    Detail {
        id: StorageBoxId,
        #[source]
        source: ClientError,
    },
}

impl PollError {
    /// The client error that aborted the cycle.
    pub fn client_error(&self) -> &ClientError {
        match self {
            PollError::List(e) => e,
            PollError::Detail { source, .. } => source,
        }
    }

    /// Whether the cycle failed on an undecodable response body.
    pub fn is_decode(&self) -> bool {
        self.client_error().is_decode()
    }
}
