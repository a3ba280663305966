//! The poller. Owns the last-good snapshot and drives the update loop.

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use storagebox_client::{StorageBox, StorageBoxApi};
use storagebox_metrics::{Registry, publish};

use crate::error::PollError;
use crate::schedule::{wait_interval, wait_minutes};

/// What the loop does when a response body cannot be decoded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DecodeFailurePolicy {
    /// Log the failure and abandon the cycle, like any other error.
    #[default]
    Skip,
    /// Stop the loop and return the error to the supervisor.
    Exit,
}

/// Poller settings.
#[derive(Debug, Clone, Default)]
pub struct PollerConfig {
    pub decode_failure: DecodeFailurePolicy,
}

/// Polls the robot and publishes complete results into a [`Registry`].
pub struct Poller<A> {
    api: A,
    registry: Registry,
    /// Boxes from the last successful cycle.
    boxes: Vec<StorageBox>,
    config: PollerConfig,
}

impl<A: StorageBoxApi + 'static> Poller<A> {
    pub fn new(api: A, registry: Registry) -> Self {
        Self {
            api,
            registry,
            boxes: Vec::new(),
            config: PollerConfig::default(),
        }
    }

    pub fn with_config(mut self, config: PollerConfig) -> Self {
        self.config = config;
        self
    }

    /// Boxes from the last successful cycle (empty before the first).
    pub fn boxes(&self) -> &[StorageBox] {
        &self.boxes
    }

    /// List all boxes and fetch each one's details, one request at a time.
    ///
    /// The snapshot is replaced only when every fetch succeeds; on error
    /// it is left exactly as it was.
    pub async fn poll(&mut self) -> Result<&[StorageBox], PollError> {
        let ids = self.api.list_storageboxes().await.map_err(PollError::List)?;
        debug!(count = ids.len(), "storage boxes listed");

        let mut next = Vec::with_capacity(ids.len());
        for id in ids {
            let b = self
                .api
                .storagebox(id)
                .await
                .map_err(|source| PollError::Detail { id, source })?;
            next.push(b);
        }

        self.boxes = next;
        Ok(&self.boxes)
    }

    /// Run one poll and publish its result if it succeeded.
    ///
    /// Returns the number of boxes published.
    pub async fn run_cycle(&mut self) -> Result<usize, PollError> {
        self.poll().await?;
        publish(&self.registry, &self.boxes).await;
        Ok(self.boxes.len())
    }

    /// Run cycles until `shutdown` fires.
    ///
    /// Returns an error only when a decode failure occurs under
    /// [`DecodeFailurePolicy::Exit`].
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) -> Result<(), PollError> {
        info!(decode_failure = ?self.config.decode_failure, "storage box poller started");

        loop {
            match self.run_cycle().await {
                Ok(count) => info!(boxes = count, "storage boxes updated"),
                Err(e) if e.is_decode() && self.config.decode_failure == DecodeFailurePolicy::Exit => {
                    error!(error = %e, "undecodable robot response, stopping poller");
                    return Err(e);
                }
                Err(e) if e.is_decode() => {
                    error!(error = %e, kept = self.boxes.len(), "undecodable robot response, keeping previous snapshot");
                }
                Err(e) => {
                    warn!(error = %e, kept = self.boxes.len(), "poll cycle failed, keeping previous snapshot");
                }
            }

            let wait = wait_interval(self.boxes.len());
            info!(
                wait_minutes = wait_minutes(self.boxes.len()),
                "waiting before next poll to stay under the rate limit"
            );

            tokio::select! {
                _ = tokio::time::sleep(wait) => {}
                _ = shutdown.changed() => {
                    info!("storage box poller shutting down");
                    return Ok(());
                }
            }
        }
    }

    /// Run the poller as a background task.
    pub fn spawn(self, shutdown: watch::Receiver<bool>) -> JoinHandle<Result<(), PollError>> {
        tokio::spawn(self.run(shutdown))
    }
}
