//! storagebox-poller: the update loop of the exporter.
//!
//! Discovers storage boxes, fetches their details one at a time, publishes
//! complete results into the gauge registry, and spaces cycles out so the
//! robot's hourly request budget is never exceeded.
//!
//! # Architecture
//!
//! ```text
//! Poller (owns the API handle, the last-good snapshot, a Registry handle)
//!   ├── poll()      → list + sequential detail fetches
//!   ├── run_cycle() → poll, then publish() on success
//!   ├── run()       → run_cycle / wait_interval() / sleep, until shutdown
//!   └── spawn()     → run() as a supervised tokio task
//! ```
//!
//! # Cycle semantics
//!
//! A cycle is all-or-nothing. If the list call or any detail fetch fails,
//! the partial result is discarded, the previous snapshot is kept, and the
//! registry keeps serving the previous cycle's values. The next scheduled
//! cycle is the retry.

pub mod error;
pub mod poller;
pub mod schedule;

pub use error::PollError;
pub use poller::{DecodeFailurePolicy, Poller, PollerConfig};
pub use schedule::{HOURLY_REQUEST_BUDGET, MIN_WAIT_MINUTES, REQUEST_HEADROOM, wait_interval, wait_minutes};
