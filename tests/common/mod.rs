// Shared test helpers: in-memory sources standing in for /proc, /sys, smartctl and the process table
#![allow(dead_code)]

use async_trait::async_trait;
use iopulse::attributes::{AttributeRegistry, DeviceRef, DiagnosticProbe, PrimaryRead};
use iopulse::error::{ProbeError, ProcessQueryError};
use iopulse::models::{
    DomainSnapshot, HardwareAttributes, NetworkSnapshot, RawCounterSnapshot, StorageSnapshot,
};
use iopulse::process::{ProcessKey, ProcessMetadata, ProcessSource};
use iopulse::reader::{BlockDevice, BlockDeviceSample, BlockStatsSource, InterfaceSample, InterfaceSource};
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

/// `base` shifted by `secs`.
pub fn at(base: Instant, secs: f64) -> Instant {
    base + Duration::from_secs_f64(secs)
}

pub fn counters(t: Instant, read_bytes: u64, write_bytes: u64, read_ops: u64, write_ops: u64) -> RawCounterSnapshot {
    RawCounterSnapshot::new(t, read_bytes, write_bytes, read_ops, write_ops)
}

pub fn storage(snapshot: DomainSnapshot) -> StorageSnapshot {
    match snapshot {
        DomainSnapshot::Storage(s) => s,
        other => panic!("expected storage snapshot, got {:?}", other.domain()),
    }
}

pub fn network(snapshot: DomainSnapshot) -> NetworkSnapshot {
    match snapshot {
        DomainSnapshot::Network(n) => n,
        other => panic!("expected network snapshot, got {:?}", other.domain()),
    }
}

// --- block devices ---

#[derive(Default)]
pub struct FakeBlockStats {
    samples: Mutex<Vec<BlockDeviceSample>>,
    failing: AtomicBool,
}

impl FakeBlockStats {
    pub fn set(&self, samples: Vec<BlockDeviceSample>) {
        *self.samples.lock().unwrap() = samples;
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

impl BlockStatsSource for FakeBlockStats {
    fn sample(&self) -> std::io::Result<Vec<BlockDeviceSample>> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "diskstats unreadable",
            ));
        }
        Ok(self.samples.lock().unwrap().clone())
    }
}

pub fn block_sample(name: &str, token: Option<&str>, counters: RawCounterSnapshot) -> BlockDeviceSample {
    BlockDeviceSample {
        device: BlockDevice {
            name: name.to_string(),
            model: Some(format!("Model {}", name)),
            attach_token: token.map(str::to_string),
        },
        counters,
    }
}

// --- attribute tiers ---

/// Registry answering per device name; unknown devices are `Unsupported`.
#[derive(Default)]
pub struct FakeRegistry {
    responses: Mutex<HashMap<String, PrimaryRead>>,
    calls: AtomicUsize,
}

impl FakeRegistry {
    pub fn respond(&self, device: &str, read: PrimaryRead) {
        self.responses
            .lock()
            .unwrap()
            .insert(device.to_string(), read);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl AttributeRegistry for FakeRegistry {
    fn read(&self, device: &DeviceRef) -> PrimaryRead {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.responses
            .lock()
            .unwrap()
            .get(&device.name)
            .cloned()
            .unwrap_or(PrimaryRead::Unsupported)
    }
}

/// Probe returning a fixed result (`None` = failure), optionally after a delay.
#[derive(Default)]
pub struct FakeProbe {
    result: Mutex<Option<HardwareAttributes>>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl FakeProbe {
    pub fn returning(attributes: HardwareAttributes) -> Self {
        Self {
            result: Mutex::new(Some(attributes)),
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self::default()
    }

    pub fn hanging(delay: Duration, attributes: HardwareAttributes) -> Self {
        Self {
            result: Mutex::new(Some(attributes)),
            delay: Some(delay),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DiagnosticProbe for FakeProbe {
    async fn probe(&self, _device: &DeviceRef) -> Result<HardwareAttributes, ProbeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let result = self.result.lock().unwrap().clone();
        result.ok_or(ProbeError::NoAttributes)
    }
}

// --- processes ---

#[derive(Debug, Clone)]
pub enum FakeProcess {
    Counters(RawCounterSnapshot),
    Denied,
}

/// pid -> (start time, state).
#[derive(Default)]
pub struct FakeProcessSource {
    processes: Mutex<BTreeMap<u32, (u64, FakeProcess)>>,
    names: Mutex<HashMap<u32, String>>,
    enumerate_fails: AtomicBool,
}

impl FakeProcessSource {
    /// Updates a process, keeping its start time (0 when first seen).
    pub fn set(&self, pid: u32, process: FakeProcess) {
        let mut processes = self.processes.lock().unwrap();
        let start_time = processes.get(&pid).map_or(0, |(t, _)| *t);
        processes.insert(pid, (start_time, process));
    }

    /// The pid now belongs to a different process started at `start_time`.
    pub fn respawn(&self, pid: u32, start_time: u64, process: FakeProcess) {
        self.processes.lock().unwrap().insert(pid, (start_time, process));
    }

    pub fn exit(&self, pid: u32) {
        self.processes.lock().unwrap().remove(&pid);
    }

    pub fn name(&self, pid: u32, name: &str) {
        self.names.lock().unwrap().insert(pid, name.to_string());
    }

    pub fn set_enumerate_fails(&self, fails: bool) {
        self.enumerate_fails.store(fails, Ordering::SeqCst);
    }
}

impl ProcessSource for FakeProcessSource {
    fn enumerate(&self) -> std::io::Result<Vec<ProcessKey>> {
        if self.enumerate_fails.load(Ordering::SeqCst) {
            return Err(std::io::Error::other("process table unavailable"));
        }
        Ok(self
            .processes
            .lock()
            .unwrap()
            .iter()
            .map(|(&pid, &(start_time, _))| ProcessKey { pid, start_time })
            .collect())
    }

    fn io_counters(&self, pid: u32) -> Result<RawCounterSnapshot, ProcessQueryError> {
        match self.processes.lock().unwrap().get(&pid).map(|(_, p)| p) {
            Some(FakeProcess::Counters(c)) => Ok(*c),
            Some(FakeProcess::Denied) => Err(ProcessQueryError::PermissionDenied(pid)),
            None => Err(ProcessQueryError::Exited(pid)),
        }
    }

    fn metadata(&self, pid: u32) -> Option<ProcessMetadata> {
        let name = self.names.lock().unwrap().get(&pid).cloned()?;
        Some(ProcessMetadata {
            icon_ref: Some(format!("/usr/bin/{}", name)),
            name: Some(name),
        })
    }
}

// --- network interfaces ---

#[derive(Default)]
pub struct FakeInterfaces {
    samples: Mutex<Vec<InterfaceSample>>,
    failing: AtomicBool,
}

impl FakeInterfaces {
    pub fn set(&self, samples: Vec<InterfaceSample>) {
        *self.samples.lock().unwrap() = samples;
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

impl InterfaceSource for FakeInterfaces {
    fn sample(&self) -> std::io::Result<Vec<InterfaceSample>> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(std::io::Error::other("interface table unavailable"));
        }
        Ok(self.samples.lock().unwrap().clone())
    }
}

pub fn interface_sample(name: &str, counters: RawCounterSnapshot) -> InterfaceSample {
    InterfaceSample {
        name: name.to_string(),
        mac_address: "00:11:22:33:44:55".to_string(),
        ipv4: vec!["192.168.1.10".to_string()],
        ipv6: vec![],
        speed_bps: 1_000_000_000,
        counters,
    }
}
