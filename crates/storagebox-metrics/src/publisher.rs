//! Turns storage box detail records into gauge samples.

use tracing::debug;

use storagebox_client::StorageBox;

use crate::hash::hash_value;
use crate::registry::{LabelSet, Registry, Sample};

/// The six samples exported for one storage box.
///
/// All six share one [`LabelSet`] built from `b`.
pub fn samples_for(b: &StorageBox) -> [Sample; 6] {
    let labels = LabelSet::from_storagebox(b);
    let sample = |metric, value| Sample {
        metric,
        labels: labels.clone(),
        value,
    };

    [
        sample("storagebox_disk_quota", b.disk_quota),
        sample("storagebox_disk_usage", b.disk_usage),
        sample("storagebox_disk_usage_data", b.disk_usage_data),
        sample("storagebox_disk_usage_snapshots", b.disk_usage_snapshots),
        sample("storagebox_location_hash", hash_value(&b.location)),
        sample("storagebox_host_system_hash", hash_value(&b.host_system)),
    ]
}

/// Publish a complete poll result into the registry.
///
/// Series for boxes missing from `boxes` are removed.
pub async fn publish(registry: &Registry, boxes: &[StorageBox]) {
    let samples: Vec<Sample> = boxes.iter().flat_map(samples_for).collect();
    let count = samples.len();
    registry.replace(samples).await;
    debug!(boxes = boxes.len(), samples = count, "storage box metrics published");
}
