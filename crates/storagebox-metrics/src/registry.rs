//! Gauge registry shared between the poller and the exposition handler.

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::debug;

use storagebox_client::StorageBox;

/// Name and help text of a gauge family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GaugeDesc {
    pub name: &'static str,
    pub help: &'static str,
}

/// The gauge families exported per storage box, in exposition order.
pub const STORAGEBOX_GAUGES: [GaugeDesc; 6] = [
    GaugeDesc {
        name: "storagebox_disk_quota",
        help: "Total diskspace in MB",
    },
    GaugeDesc {
        name: "storagebox_disk_usage",
        help: "Total used diskspace in MB",
    },
    GaugeDesc {
        name: "storagebox_disk_usage_data",
        help: "Used diskspace by files in MB",
    },
    GaugeDesc {
        name: "storagebox_disk_usage_snapshots",
        help: "Used diskspace by snapshots in MB",
    },
    GaugeDesc {
        name: "storagebox_location_hash",
        help: "Number representation of the location short name",
    },
    GaugeDesc {
        name: "storagebox_host_system_hash",
        help: "Number representation of the host system name",
    },
];

/// The fixed label set attached to every storage box sample.
///
/// Only constructed from a single [`StorageBox`], so all values of one
/// label set come from the same detail fetch.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LabelSet {
    id: String,
    name: String,
    product: String,
    server: String,
    location: String,
    host: String,
}

impl LabelSet {
    pub fn from_storagebox(b: &StorageBox) -> Self {
        Self {
            id: b.id.to_string(),
            name: b.name.clone(),
            product: b.product.clone(),
            server: b.server.clone(),
            location: b.location.clone(),
            host: b.host_system.clone(),
        }
    }

    /// Label name/value pairs in exposition order.
    pub fn pairs(&self) -> [(&'static str, &str); 6] {
        [
            ("id", self.id.as_str()),
            ("name", self.name.as_str()),
            ("product", self.product.as_str()),
            ("server", self.server.as_str()),
            ("location", self.location.as_str()),
            ("host", self.host.as_str()),
        ]
    }
}

/// One (metric, label set, value) triple.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub metric: &'static str,
    pub labels: LabelSet,
    pub value: f64,
}

/// Point-in-time copy of one gauge family.
#[derive(Debug, Clone, PartialEq)]
pub struct FamilySnapshot {
    pub desc: GaugeDesc,
    pub samples: Vec<(LabelSet, f64)>,
}

struct Family {
    desc: GaugeDesc,
    samples: BTreeMap<LabelSet, f64>,
}

/// Concurrency-safe gauge registry.
///
/// Cloning is cheap and yields a handle to the same underlying families.
#[derive(Clone)]
pub struct Registry {
    families: Arc<RwLock<Vec<Family>>>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// Create a registry with the storage box gauge families declared.
    pub fn new() -> Self {
        Self::with_families(&STORAGEBOX_GAUGES)
    }

    /// Create a registry declaring the given gauge families.
    pub fn with_families(descs: &[GaugeDesc]) -> Self {
        let families = descs
            .iter()
            .map(|&desc| Family {
                desc,
                samples: BTreeMap::new(),
            })
            .collect();
        Self {
            families: Arc::new(RwLock::new(families)),
        }
    }

    /// Replace the contents of every family with `samples`.
    ///
    /// Label sets absent from `samples` are dropped. The swap happens
    /// under one write lock.
    pub async fn replace(&self, samples: impl IntoIterator<Item = Sample>) {
        let mut next: Vec<BTreeMap<LabelSet, f64>> = Vec::new();
        let mut families = self.families.write().await;
        next.resize_with(families.len(), BTreeMap::new);

        for sample in samples {
            match families.iter().position(|f| f.desc.name == sample.metric) {
                Some(idx) => {
                    next[idx].insert(sample.labels, sample.value);
                }
                None => debug!(metric = sample.metric, "dropping sample for undeclared gauge"),
            }
        }

        for (family, samples) in families.iter_mut().zip(next) {
            family.samples = samples;
        }
    }

    /// Current value of `metric` for `labels`, if present.
    pub async fn get(&self, metric: &str, labels: &LabelSet) -> Option<f64> {
        let families = self.families.read().await;
        families
            .iter()
            .find(|f| f.desc.name == metric)
            .and_then(|f| f.samples.get(labels).copied())
    }

    /// Copy every family out of the registry under one read lock.
    pub async fn gather(&self) -> Vec<FamilySnapshot> {
        let families = self.families.read().await;
        families
            .iter()
            .map(|f| FamilySnapshot {
                desc: f.desc,
                samples: f.samples.iter().map(|(l, v)| (l.clone(), *v)).collect(),
            })
            .collect()
    }

    /// Total number of samples across all families.
    pub async fn len(&self) -> usize {
        let families = self.families.read().await;
        families.iter().map(|f| f.samples.len()).sum()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
