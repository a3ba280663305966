//! storagebox-metrics: the gauge registry behind `/metrics`.
//!
//! Holds the latest value of every storage box gauge, keyed by a fixed
//! label set, and renders it in the Prometheus text exposition format.
//!
//! # Architecture
//!
//! ```text
//! Registry (Arc<RwLock<..>>, cloned into the poller and the HTTP handler)
//!   ├── publish() ← poller, once per successful cycle
//!   ├── gather()  → FamilySnapshot per gauge family
//!   └── render_prometheus() → text/plain for the /metrics endpoint
//! ```
//!
//! `publish()` swaps the contents of every family under a single write
//! lock, so a concurrent scrape sees either the whole previous cycle or
//! the whole new one.

pub mod hash;
pub mod prometheus;
pub mod publisher;
pub mod registry;

pub use hash::{fnv1a_32, hash_value};
pub use prometheus::{CONTENT_TYPE, render_prometheus};
pub use publisher::{publish, samples_for};
pub use registry::{FamilySnapshot, GaugeDesc, LabelSet, Registry, STORAGEBOX_GAUGES, Sample};
