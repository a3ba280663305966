//! storagebox-exporter: Prometheus exporter for robot storage boxes.
//!
//! Wires the robot client, the poller, and the gauge registry together
//! and serves the registry over HTTP.
//!
//! # Routes
//!
//! | Method | Path | Description |
//! |---|---|---|
//! | GET | `/metrics` (configurable) | Prometheus exposition |
//! | GET | `/` | Landing page linking to the metrics path |

pub mod config;
pub mod server;

pub use config::{Cli, ConfigError, ExporterConfig};
pub use server::build_router;
