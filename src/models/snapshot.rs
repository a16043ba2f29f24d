// Per-domain poll result

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{NetworkSnapshot, StorageSnapshot};

/// Hardware/software domain served by one reader; serializes lowercase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    Storage,
    Network,
}

impl Domain {
    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Storage => "storage",
            Domain::Network => "network",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Domain {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "storage" => Ok(Domain::Storage),
            "network" => Ok(Domain::Network),
            other => Err(format!("unknown domain '{}'", other)),
        }
    }
}

/// Immutable result of one `Reader::poll`, tagged by domain on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "domain", rename_all = "lowercase")]
pub enum DomainSnapshot {
    Storage(StorageSnapshot),
    Network(NetworkSnapshot),
}

impl DomainSnapshot {
    pub fn domain(&self) -> Domain {
        match self {
            DomainSnapshot::Storage(_) => Domain::Storage,
            DomainSnapshot::Network(_) => Domain::Network,
        }
    }

    pub fn timestamp(&self) -> u64 {
        match self {
            DomainSnapshot::Storage(s) => s.timestamp,
            DomainSnapshot::Network(n) => n.timestamp,
        }
    }
}

/// Wall-clock unix milliseconds for snapshot stamps (0 if the clock is before the epoch).
pub fn unix_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, operation = "get_timestamp", "system time error");
            0
        })
}
