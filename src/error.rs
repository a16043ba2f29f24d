// Error types. Only `ReaderError` ever leaves a poll; the others are absorbed into `None`s.

use crate::models::Domain;
use std::time::Duration;

/// Hard failures of `Reader::poll`. Data-unavailable conditions never produce one.
#[derive(Debug, thiserror::Error)]
pub enum ReaderError {
    /// The reader was configured to track an entity that does not exist on this host.
    #[error("{domain} reader: '{id}' does not exist on this host")]
    UnknownEntity { domain: Domain, id: String },

    #[error("{domain} reader: blocking task failed: {source}")]
    Task {
        domain: Domain,
        #[source]
        source: tokio::task::JoinError,
    },
}

impl ReaderError {
    /// Configuration faults will not fix themselves on the next tick.
    pub fn is_fatal_configuration(&self) -> bool {
        matches!(self, ReaderError::UnknownEntity { .. })
    }
}

/// Failure of the external diagnostic probe (fallback attribute tier).
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("probe timed out after {0:?}")]
    Timeout(Duration),

    #[error("probe exited with status {0}")]
    ExitStatus(i32),

    #[error("probe was terminated by a signal")]
    Killed,

    #[error("unparseable probe output: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("probe output carried no recognised attributes")]
    NoAttributes,
}

/// Per-pid counter query failure. Always skips that pid for the current cycle only.
#[derive(Debug, thiserror::Error)]
pub enum ProcessQueryError {
    #[error("permission denied for pid {0}")]
    PermissionDenied(u32),

    #[error("pid {0} exited")]
    Exited(u32),

    #[error("counters unavailable for pid {pid}: {reason}")]
    Unavailable { pid: u32, reason: String },
}

impl ProcessQueryError {
    pub fn from_io(pid: u32, err: &std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::PermissionDenied => ProcessQueryError::PermissionDenied(pid),
            std::io::ErrorKind::NotFound => ProcessQueryError::Exited(pid),
            _ => ProcessQueryError::Unavailable {
                pid,
                reason: err.to_string(),
            },
        }
    }
}
