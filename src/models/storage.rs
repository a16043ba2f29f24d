// Storage domain snapshot

use serde::{Deserialize, Serialize};

use super::{AttributeSource, HardwareAttributes, ProcessIOEntry, RateMetrics};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceSnapshot {
    pub name: String,
    pub model: Option<String>,
    pub attach_token: Option<String>,
    pub read_bytes_total: u64,
    pub write_bytes_total: u64,
    pub read_ops_total: u64,
    pub write_ops_total: u64,
    pub rates: RateMetrics,
    pub attributes: Option<HardwareAttributes>,
    pub attribute_source: Option<AttributeSource>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageSnapshot {
    /// Unix time in milliseconds.
    pub timestamp: u64,
    pub devices: Vec<DeviceSnapshot>,
    pub top_processes: Vec<ProcessIOEntry>,
}
