//! storagebox-client: access to the storage box robot web service.
//!
//! Lists storage boxes and fetches their full detail records over HTTPS
//! with HTTP Basic authentication. Responses are decoded from the robot's
//! JSON envelopes; non-200 responses surface the robot's error envelope
//! as a recoverable [`ClientError::Api`].
//!
//! # Endpoints
//!
//! | Method | Path | Envelope |
//! |---|---|---|
//! | GET | `/storagebox` | `[{"storagebox": {"id": ..}}, ..]` |
//! | GET | `/storagebox/{id}` | `{"storagebox": {..}}` |
//! | (any non-200) | | `{"error": {"status": .., "code": ".."}}` |
//!
//! The [`StorageBoxApi`] trait is the seam the poller is written against,
//! so tests can substitute a scripted implementation for [`RobotClient`].

pub mod client;
pub mod error;
pub mod types;

pub use client::{Credentials, DEFAULT_BASE_URL, DEFAULT_TIMEOUT, RobotClient, StorageBoxApi};
pub use error::{ClientError, ClientResult};
pub use types::*;
