// Owns one Reader per enabled domain. No globals: every instance is built explicitly.

use crate::attributes::{AttributeAcquirer, DiagnosticProbe, SmartctlProbe, SysfsRegistry};
use crate::config::AppConfig;
use crate::error::ReaderError;
use crate::models::{Domain, DomainSnapshot};
use crate::process::{ProcessRanker, SysinfoProcessSource};
use crate::reader::{
    NetworkReader, ProcBlockStats, Reader, StorageReader, StorageReaderConfig, SysinfoInterfaces,
};
use futures_util::future::join_all;
use std::sync::Arc;
use std::time::Duration;

/// Acquirer bound for the fallback tier: slightly above the probe's own so the probe's error wins.
fn fallback_timeout(probe_timeout_ms: u64) -> Duration {
    Duration::from_millis(probe_timeout_ms.saturating_add(500))
}

pub struct Aggregator {
    readers: Vec<Arc<dyn Reader>>,
}

impl Aggregator {
    pub fn new(readers: Vec<Arc<dyn Reader>>) -> Self {
        Self { readers }
    }

    /// Builds the host-backed readers for every enabled domain.
    pub fn from_config(config: &AppConfig) -> Self {
        let mut readers: Vec<Arc<dyn Reader>> = Vec::new();
        let host = &config.host;

        let storage = &config.storage;
        if storage.enabled {
            let probe: Option<Arc<dyn DiagnosticProbe>> = storage.smartctl.enabled.then(|| {
                Arc::new(SmartctlProbe::new(
                    &storage.smartctl.program,
                    Duration::from_millis(storage.smartctl.timeout_ms),
                )) as Arc<dyn DiagnosticProbe>
            });
            let acquirer = AttributeAcquirer::new(
                Arc::new(SysfsRegistry::new(&host.sys_root)),
                probe,
                fallback_timeout(storage.smartctl.timeout_ms),
            );
            let ranker = storage.rank_processes.then(|| {
                Arc::new(ProcessRanker::new(Arc::new(SysinfoProcessSource::new(
                    &host.proc_root,
                ))))
            });
            readers.push(Arc::new(StorageReader::new(
                StorageReaderConfig {
                    devices: storage.devices.clone(),
                    process_limit: config.sampling.process_top_n,
                },
                Arc::new(ProcBlockStats::new(&host.proc_root, &host.sys_root)),
                Arc::new(acquirer),
                ranker,
            )));
        }

        if config.network.enabled {
            readers.push(Arc::new(NetworkReader::new(
                config.network.interfaces.clone(),
                Arc::new(SysinfoInterfaces::new(&host.sys_root)),
            )));
        }

        Self::new(readers)
    }

    pub fn readers(&self) -> &[Arc<dyn Reader>] {
        &self.readers
    }

    pub fn domains(&self) -> Vec<Domain> {
        self.readers.iter().map(|r| r.domain()).collect()
    }

    /// Polls every reader concurrently; each result stands on its own.
    pub async fn poll_all(&self) -> Vec<(Domain, Result<DomainSnapshot, ReaderError>)> {
        join_all(self.readers.iter().map(|reader| async move {
            (reader.domain(), reader.poll().await)
        }))
        .await
    }
}
