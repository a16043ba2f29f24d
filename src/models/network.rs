// Network interface snapshot

use serde::{Deserialize, Serialize};

use super::RateMetrics;

/// One interface. In `rates`, "read" is receive and "write" is transmit; IOPS are packets/sec.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterfaceSnapshot {
    pub name: String,
    pub mac_address: String,
    pub ipv4: Vec<String>,
    pub ipv6: Vec<String>,
    /// Link speed in bits/sec, 0 if unknown.
    pub speed_bps: u64,
    pub received_bytes_total: u64,
    pub transmitted_bytes_total: u64,
    pub rates: RateMetrics,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkSnapshot {
    pub timestamp: u64,
    pub interfaces: Vec<InterfaceSnapshot>,
}
