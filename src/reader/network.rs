// Network domain: per-interface byte and packet rates.

use super::{Reader, tracked_selection};
use crate::error::ReaderError;
use crate::linux;
use crate::models::{
    Domain, DomainSnapshot, InterfaceSnapshot, NetworkSnapshot, RawCounterSnapshot, unix_millis,
};
use crate::snapshot_store::SnapshotStore;
use async_trait::async_trait;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Instant;
use sysinfo::Networks;
use tracing::{instrument, warn};

/// One interface's identity and cumulative counters (read = received, write = transmitted).
#[derive(Debug, Clone, PartialEq)]
pub struct InterfaceSample {
    pub name: String,
    pub mac_address: String,
    pub ipv4: Vec<String>,
    pub ipv6: Vec<String>,
    pub speed_bps: u64,
    pub counters: RawCounterSnapshot,
}

pub trait InterfaceSource: Send + Sync {
    /// Blocking. `Err` means the source itself is unreadable this cycle.
    fn sample(&self) -> std::io::Result<Vec<InterfaceSample>>;
}

/// Interface counters via sysinfo, link speed via sysfs.
pub struct SysinfoInterfaces {
    networks: Mutex<Networks>,
    sys_root: PathBuf,
}

impl Default for SysinfoInterfaces {
    fn default() -> Self {
        Self::new("/sys")
    }
}

impl SysinfoInterfaces {
    pub fn new(sys_root: impl Into<PathBuf>) -> Self {
        Self {
            networks: Mutex::new(Networks::new_with_refreshed_list()),
            sys_root: sys_root.into(),
        }
    }
}

impl InterfaceSource for SysinfoInterfaces {
    fn sample(&self) -> std::io::Result<Vec<InterfaceSample>> {
        let mut networks = self
            .networks
            .lock()
            .map_err(|e| std::io::Error::other(format!("sysinfo networks lock poisoned: {}", e)))?;
        networks.refresh(true);
        let now = Instant::now();
        Ok(networks
            .list()
            .iter()
            .map(|(name, data)| InterfaceSample {
                name: name.clone(),
                mac_address: data.mac_address().to_string(),
                ipv4: data
                    .ip_networks()
                    .iter()
                    .filter(|n| n.addr.is_ipv4())
                    .map(|n| n.addr.to_string())
                    .collect(),
                ipv6: data
                    .ip_networks()
                    .iter()
                    .filter(|n| n.addr.is_ipv6())
                    .map(|n| n.addr.to_string())
                    .collect(),
                speed_bps: linux::interface_speed(&self.sys_root, name),
                counters: RawCounterSnapshot::new(
                    now,
                    data.total_received(),
                    data.total_transmitted(),
                    data.total_packets_received(),
                    data.total_packets_transmitted(),
                ),
            })
            .collect())
    }
}

pub struct NetworkReader {
    interfaces: Vec<String>,
    source: Arc<dyn InterfaceSource>,
    baselines: SnapshotStore<String>,
    poll_lock: tokio::sync::Mutex<()>,
}

impl NetworkReader {
    /// `interfaces` empty tracks every interface present.
    pub fn new(interfaces: Vec<String>, source: Arc<dyn InterfaceSource>) -> Self {
        Self {
            interfaces,
            source,
            baselines: SnapshotStore::new(),
            poll_lock: tokio::sync::Mutex::new(()),
        }
    }
}

#[async_trait]
impl Reader for NetworkReader {
    fn domain(&self) -> Domain {
        Domain::Network
    }

    #[instrument(skip(self), fields(reader = "network"))]
    async fn poll(&self) -> Result<DomainSnapshot, ReaderError> {
        let _serial = self.poll_lock.lock().await;

        let source = self.source.clone();
        let sampled = tokio::task::spawn_blocking(move || source.sample())
            .await
            .map_err(|source| ReaderError::Task {
                domain: Domain::Network,
                source,
            })?;
        let mut samples = match sampled {
            Ok(samples) => samples,
            Err(e) => {
                warn!(error = %e, operation = "read_interfaces", "interface counters unavailable");
                return Ok(DomainSnapshot::Network(NetworkSnapshot {
                    timestamp: unix_millis(),
                    interfaces: Vec::new(),
                }));
            }
        };

        if let Some(wanted) = tracked_selection(&self.interfaces) {
            if let Some(missing) = wanted.iter().find(|w| !samples.iter().any(|s| &s.name == *w)) {
                return Err(ReaderError::UnknownEntity {
                    domain: Domain::Network,
                    id: missing.clone(),
                });
            }
            samples.retain(|s| wanted.contains(&s.name));
        }
        samples.sort_by(|a, b| a.name.cmp(&b.name));

        let present: HashSet<String> = samples.iter().map(|s| s.name.clone()).collect();
        self.baselines.retain(&present);

        let interfaces = samples
            .into_iter()
            .map(|s| InterfaceSnapshot {
                rates: self.baselines.advance(s.name.clone(), s.counters),
                received_bytes_total: s.counters.read_bytes,
                transmitted_bytes_total: s.counters.write_bytes,
                name: s.name,
                mac_address: s.mac_address,
                ipv4: s.ipv4,
                ipv6: s.ipv6,
                speed_bps: s.speed_bps,
            })
            .collect();

        Ok(DomainSnapshot::Network(NetworkSnapshot {
            timestamp: unix_millis(),
            interfaces,
        }))
    }
}
