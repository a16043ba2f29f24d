// Storage domain: block-device counters, device health attributes, top I/O processes.

use super::{Reader, tracked_selection};
use crate::attributes::{AttributeAcquirer, DeviceRef};
use crate::error::ReaderError;
use crate::linux::{self, DiskStatLine};
use crate::models::{
    DeviceSnapshot, Domain, DomainSnapshot, RawCounterSnapshot, StorageSnapshot, unix_millis,
};
use crate::process::ProcessRanker;
use crate::snapshot_store::SnapshotStore;
use async_trait::async_trait;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, instrument, warn};

/// Whole-disk identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockDevice {
    pub name: String,
    pub model: Option<String>,
    pub attach_token: Option<String>,
}

/// Identity plus cumulative counters, stamped when read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockDeviceSample {
    pub device: BlockDevice,
    pub counters: RawCounterSnapshot,
}

/// Source of cumulative block-device counters.
pub trait BlockStatsSource: Send + Sync {
    /// Blocking. `Err` means the source itself is unreadable this cycle.
    fn sample(&self) -> std::io::Result<Vec<BlockDeviceSample>>;
}

/// Linux: /proc/diskstats for counters, /sys/block for identity and whole-disk filtering.
pub struct ProcBlockStats {
    proc_root: PathBuf,
    sys_root: PathBuf,
}

impl Default for ProcBlockStats {
    fn default() -> Self {
        Self::new("/proc", "/sys")
    }
}

impl ProcBlockStats {
    pub fn new(proc_root: impl Into<PathBuf>, sys_root: impl Into<PathBuf>) -> Self {
        Self {
            proc_root: proc_root.into(),
            sys_root: sys_root.into(),
        }
    }

    fn identity(&self, line: &DiskStatLine) -> Option<BlockDevice> {
        let block_dir = self.sys_root.join("block").join(&line.name);
        if linux::is_virtual_block_device(&line.name) || !block_dir.is_dir() {
            return None;
        }
        Some(BlockDevice {
            name: line.name.clone(),
            model: linux::read_trimmed(&block_dir.join("device/model")),
            attach_token: linux::read_trimmed(&block_dir.join("diskseq")),
        })
    }
}

impl BlockStatsSource for ProcBlockStats {
    fn sample(&self) -> std::io::Result<Vec<BlockDeviceSample>> {
        let content = std::fs::read_to_string(self.proc_root.join("diskstats"))?;
        let now = Instant::now();
        Ok(linux::parse_diskstats(&content)
            .into_iter()
            .filter_map(|line| {
                let device = self.identity(&line)?;
                Some(BlockDeviceSample {
                    counters: RawCounterSnapshot::new(
                        now,
                        line.read_bytes(),
                        line.write_bytes(),
                        line.reads_completed,
                        line.writes_completed,
                    ),
                    device,
                })
            })
            .collect())
    }
}

#[derive(Debug, Clone)]
pub struct StorageReaderConfig {
    /// Kernel device names to track; empty tracks every whole disk.
    pub devices: Vec<String>,
    pub process_limit: usize,
}

/// Baseline key: a re-attached device (new attach token) starts over from a fresh baseline.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct AttachKey {
    name: String,
    attach_token: Option<String>,
}

impl AttachKey {
    fn of(device: &BlockDevice) -> Self {
        Self {
            name: device.name.clone(),
            attach_token: device.attach_token.clone(),
        }
    }
}

pub struct StorageReader {
    config: StorageReaderConfig,
    source: Arc<dyn BlockStatsSource>,
    acquirer: Arc<AttributeAcquirer>,
    ranker: Option<Arc<ProcessRanker>>,
    baselines: SnapshotStore<AttachKey>,
    poll_lock: tokio::sync::Mutex<()>,
}

impl StorageReader {
    pub fn new(
        config: StorageReaderConfig,
        source: Arc<dyn BlockStatsSource>,
        acquirer: Arc<AttributeAcquirer>,
        ranker: Option<Arc<ProcessRanker>>,
    ) -> Self {
        Self {
            config,
            source,
            acquirer,
            ranker,
            baselines: SnapshotStore::new(),
            poll_lock: tokio::sync::Mutex::new(()),
        }
    }

    /// `None` when the counter source is unreadable this cycle.
    async fn read_samples(&self) -> Result<Option<Vec<BlockDeviceSample>>, ReaderError> {
        let source = self.source.clone();
        let result = tokio::task::spawn_blocking(move || source.sample())
            .await
            .map_err(|source| ReaderError::Task {
                domain: Domain::Storage,
                source,
            })?;
        match result {
            Ok(samples) => Ok(Some(samples)),
            Err(e) => {
                warn!(error = %e, operation = "read_block_stats", "block counters unavailable");
                Ok(None)
            }
        }
    }

    /// Restricts to the configured devices; a configured name that is absent is fatal.
    fn select(
        &self,
        samples: Vec<BlockDeviceSample>,
    ) -> Result<Vec<BlockDeviceSample>, ReaderError> {
        let Some(wanted) = tracked_selection(&self.config.devices) else {
            return Ok(samples);
        };
        if let Some(missing) = wanted
            .iter()
            .find(|name| !samples.iter().any(|s| &s.device.name == *name))
        {
            return Err(ReaderError::UnknownEntity {
                domain: Domain::Storage,
                id: missing.clone(),
            });
        }
        Ok(samples
            .into_iter()
            .filter(|s| wanted.contains(&s.device.name))
            .collect())
    }

    /// Drops baselines and cached attribute facts of devices that are gone or were re-attached.
    fn prune_vanished(&self, present: &HashSet<AttachKey>) {
        for key in self.baselines.keys() {
            if !present.contains(&key) {
                debug!(device = %key.name, "device detached; dropping baseline");
                self.acquirer.forget(&key.name);
            }
        }
        self.baselines.retain(present);
    }

    async fn sample_devices(&self, samples: Vec<BlockDeviceSample>) -> Vec<DeviceSnapshot> {
        let present: HashSet<AttachKey> = samples.iter().map(|s| AttachKey::of(&s.device)).collect();
        self.prune_vanished(&present);

        let mut devices = Vec::with_capacity(samples.len());
        for BlockDeviceSample { device, counters } in samples {
            let rates = self.baselines.advance(AttachKey::of(&device), counters);
            let device_ref = DeviceRef::new(device.name.clone(), device.attach_token.clone());
            let acquired = self.acquirer.acquire(&device_ref).await;
            devices.push(DeviceSnapshot {
                name: device.name,
                model: device.model,
                attach_token: device.attach_token,
                read_bytes_total: counters.read_bytes,
                write_bytes_total: counters.write_bytes,
                read_ops_total: counters.read_ops,
                write_ops_total: counters.write_ops,
                rates,
                attribute_source: acquired.as_ref().map(|a| a.source),
                attributes: acquired.map(|a| a.attributes),
            });
        }
        devices
    }

    async fn rank_processes(&self) -> Result<Vec<crate::models::ProcessIOEntry>, ReaderError> {
        let Some(ranker) = self.ranker.clone() else {
            return Ok(Vec::new());
        };
        let limit = self.config.process_limit;
        tokio::task::spawn_blocking(move || ranker.rank(limit))
            .await
            .map_err(|source| ReaderError::Task {
                domain: Domain::Storage,
                source,
            })
    }
}

#[async_trait]
impl Reader for StorageReader {
    fn domain(&self) -> Domain {
        Domain::Storage
    }

    #[instrument(skip(self), fields(reader = "storage"))]
    async fn poll(&self) -> Result<DomainSnapshot, ReaderError> {
        let _serial = self.poll_lock.lock().await;

        // Selection is only checked against a successful read; an unreadable source keeps
        // every baseline for the next cycle.
        let devices = match self.read_samples().await? {
            Some(samples) => self.sample_devices(self.select(samples)?).await,
            None => Vec::new(),
        };

        let top_processes = self.rank_processes().await?;

        Ok(DomainSnapshot::Storage(StorageSnapshot {
            timestamp: unix_millis(),
            devices,
            top_processes,
        }))
    }
}
