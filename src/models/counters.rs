// Raw cumulative counters and the rates derived from two of them

use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Point-in-time capture of cumulative counters for one tracked entity (device, interface or pid).
///
/// Only the previous instance is ever retained, as the baseline for the next delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawCounterSnapshot {
    pub timestamp: Instant,
    pub read_bytes: u64,
    pub write_bytes: u64,
    pub read_ops: u64,
    pub write_ops: u64,
}

impl RawCounterSnapshot {
    pub fn new(
        timestamp: Instant,
        read_bytes: u64,
        write_bytes: u64,
        read_ops: u64,
        write_ops: u64,
    ) -> Self {
        Self {
            timestamp,
            read_bytes,
            write_bytes,
            read_ops,
            write_ops,
        }
    }

    /// True when any counter is lower than in `previous` (remount, rollover, pid reuse).
    pub fn went_backwards_from(&self, previous: &RawCounterSnapshot) -> bool {
        self.read_bytes < previous.read_bytes
            || self.write_bytes < previous.write_bytes
            || self.read_ops < previous.read_ops
            || self.write_ops < previous.write_ops
    }
}

/// Per-second rates. `None` means "no valid baseline" or "reset this cycle", never zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateMetrics {
    #[serde(rename = "readIOPS")]
    pub read_iops: Option<f64>,
    #[serde(rename = "writeIOPS")]
    pub write_iops: Option<f64>,
    pub read_bytes_per_second: Option<f64>,
    pub write_bytes_per_second: Option<f64>,
}

impl RateMetrics {
    /// No field is populated.
    pub fn is_empty(&self) -> bool {
        self.read_iops.is_none()
            && self.write_iops.is_none()
            && self.read_bytes_per_second.is_none()
            && self.write_bytes_per_second.is_none()
    }

    /// Read + write throughput, only when both halves are known.
    pub fn total_bytes_per_second(&self) -> Option<f64> {
        Some(self.read_bytes_per_second? + self.write_bytes_per_second?)
    }
}
