// Top I/O consumer entries

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessIOEntry {
    pub pid: u32,
    /// Display name; the pid itself when metadata is unavailable.
    pub name: String,
    pub icon_ref: Option<String>,
    /// Combined read + write bytes/sec since the previous poll.
    #[serde(rename = "ioBytesPerSecondDelta")]
    pub io_bytes_per_second_delta: f64,
    pub read_bytes_per_second: f64,
    pub write_bytes_per_second: f64,
}
