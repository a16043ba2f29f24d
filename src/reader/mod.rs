// Per-domain readers: one poll = read counters, exchange baselines, compute rates, assemble.

mod network;
mod storage;

pub use network::{InterfaceSample, InterfaceSource, NetworkReader, SysinfoInterfaces};
pub use storage::{
    BlockDevice, BlockDeviceSample, BlockStatsSource, ProcBlockStats, StorageReader,
    StorageReaderConfig,
};

use crate::error::ReaderError;
use crate::models::{Domain, DomainSnapshot};
use async_trait::async_trait;

/// One hardware/software domain. Implementations serialize their own polls and are safe to
/// call on a fixed cadence indefinitely.
#[async_trait]
pub trait Reader: Send + Sync {
    fn domain(&self) -> Domain;

    /// Missing or unreadable data shows up as `None`s inside the snapshot; only
    /// configuration faults are errors.
    async fn poll(&self) -> Result<DomainSnapshot, ReaderError>;
}

/// Entities the reader must track, or `None` for "everything present".
pub(crate) fn tracked_selection(configured: &[String]) -> Option<&[String]> {
    if configured.is_empty() {
        None
    } else {
        Some(configured)
    }
}
