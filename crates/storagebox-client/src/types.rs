//! Wire types for the robot web service.
//!
//! Every record is wrapped in a `storagebox` (or `error`) envelope. Fields
//! missing from a response, or sent as `null`, decode to their defaults.

use serde::{Deserialize, Deserializer, Serialize};

/// Unique, stable identifier of a storage box.
pub type StorageBoxId = u64;

// ── Storage box ────────────────────────────────────────────────────

/// Full detail record of a storage box.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StorageBox {
    #[serde(deserialize_with = "null_as_default")]
    pub id: StorageBoxId,
    #[serde(deserialize_with = "null_as_default")]
    pub login: String,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub product: String,
    #[serde(deserialize_with = "null_as_default")]
    pub cancelled: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub locked: bool,
    /// Datacenter short name, e.g. `FSN1`.
    #[serde(deserialize_with = "null_as_default")]
    pub location: String,
    /// Server id the box is linked to, if any.
    pub linked_server: Option<u64>,
    /// Date the box is paid until (`YYYY-MM-DD`).
    pub paid_until: Option<String>,
    /// Total quota in MB.
    #[serde(deserialize_with = "null_as_default")]
    pub disk_quota: f64,
    /// Total usage in MB.
    #[serde(deserialize_with = "null_as_default")]
    pub disk_usage: f64,
    /// Usage by files in MB.
    #[serde(deserialize_with = "null_as_default")]
    pub disk_usage_data: f64,
    /// Usage by snapshots in MB.
    #[serde(deserialize_with = "null_as_default")]
    pub disk_usage_snapshots: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub webdav: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub samba: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub ssh: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub backup_service: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub external_reachability: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub zfs: bool,
    /// Hostname the box is reachable under.
    #[serde(deserialize_with = "null_as_default")]
    pub server: String,
    /// Internal host system the box lives on.
    #[serde(deserialize_with = "null_as_default")]
    pub host_system: String,
}

/// Decode a JSON `null` as the type's default value.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// ── Envelopes ──────────────────────────────────────────────────────

/// Identity-only record as returned by the list endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StorageBoxRef {
    #[serde(deserialize_with = "null_as_default")]
    pub id: StorageBoxId,
}

/// One element of the list response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ListEntry {
    pub storagebox: StorageBoxRef,
}

/// Body of a successful detail response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DetailEnvelope {
    pub storagebox: StorageBox,
}

/// Body of a non-200 response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorEnvelope {
    pub error: ApiErrorBody,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiErrorBody {
    pub status: u16,
    pub code: String,
}
