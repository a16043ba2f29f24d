// Top-N processes by combined read + write bytes/sec.

mod sysinfo_source;

pub use sysinfo_source::SysinfoProcessSource;

use crate::error::ProcessQueryError;
use crate::models::{ProcessIOEntry, RawCounterSnapshot};
use crate::snapshot_store::SnapshotStore;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, trace};

/// Default number of ranked processes returned per poll.
pub const DEFAULT_TOP_N: usize = 8;

/// Best-effort display metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessMetadata {
    pub name: Option<String>,
    pub icon_ref: Option<String>,
}

/// A live process: pid plus start time, so a reused pid is a different process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProcessKey {
    pub pid: u32,
    /// Seconds since the epoch, as reported by the process table.
    pub start_time: u64,
}

/// Live process table plus per-process cumulative I/O counters.
pub trait ProcessSource: Send + Sync {
    /// Currently live processes. Refreshes any internal process table.
    fn enumerate(&self) -> std::io::Result<Vec<ProcessKey>>;

    /// Cumulative counters for one pid, stamped at the moment they were read.
    fn io_counters(&self, pid: u32) -> Result<RawCounterSnapshot, ProcessQueryError>;

    fn metadata(&self, pid: u32) -> Option<ProcessMetadata>;
}

/// Owns the per-process baselines; everything else is rebuilt every call.
pub struct ProcessRanker {
    source: Arc<dyn ProcessSource>,
    baselines: SnapshotStore<ProcessKey>,
}

impl ProcessRanker {
    pub fn new(source: Arc<dyn ProcessSource>) -> Self {
        Self {
            source,
            baselines: SnapshotStore::new(),
        }
    }

    /// Blocking: enumerates processes and reads their counters. Call from a blocking context.
    pub fn rank(&self, limit: usize) -> Vec<ProcessIOEntry> {
        let keys = match self.source.enumerate() {
            Ok(keys) => keys,
            Err(e) => {
                debug!(error = %e, operation = "enumerate_processes", "process enumeration failed");
                return Vec::new();
            }
        };

        let mut ranked: Vec<ProcessIOEntry> = Vec::new();
        for &key in &keys {
            let pid = key.pid;
            let current = match self.source.io_counters(pid) {
                Ok(c) => c,
                Err(e) => {
                    trace!(error = %e, "skipping pid this cycle");
                    continue;
                }
            };
            let rates = self.baselines.advance(key, current);
            let (Some(read), Some(write)) = (rates.read_bytes_per_second, rates.write_bytes_per_second)
            else {
                continue;
            };
            let combined = read + write;
            if combined <= 0.0 {
                continue;
            }
            ranked.push(ProcessIOEntry {
                pid,
                name: String::new(),
                icon_ref: None,
                io_bytes_per_second_delta: combined,
                read_bytes_per_second: read,
                write_bytes_per_second: write,
            });
        }

        sort_by_io(&mut ranked);
        ranked.truncate(limit);
        for entry in &mut ranked {
            let meta = self.source.metadata(entry.pid).unwrap_or_default();
            entry.name = meta
                .name
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| entry.pid.to_string());
            entry.icon_ref = meta.icon_ref;
        }

        let live: HashSet<ProcessKey> = keys.into_iter().collect();
        let pruned = self.baselines.retain(&live);
        if pruned > 0 {
            trace!(pruned, "pruned baselines of exited processes");
        }
        ranked
    }

    /// Pids that currently hold a baseline.
    pub fn tracked_pids(&self) -> Vec<u32> {
        let mut pids: Vec<u32> = self.baselines.keys().into_iter().map(|k| k.pid).collect();
        pids.sort_unstable();
        pids.dedup();
        pids
    }
}

/// Descending by combined bytes/sec, ties by ascending pid.
pub fn sort_by_io(entries: &mut [ProcessIOEntry]) {
    entries.sort_by(|a, b| {
        b.io_bytes_per_second_delta
            .total_cmp(&a.io_bytes_per_second_delta)
            .then(a.pid.cmp(&b.pid))
    });
}
