// Fixed-cadence scheduler: one polling task per reader. Readers never self-schedule.

use crate::aggregator::Aggregator;
use crate::format;
use crate::models::{Domain, DomainSnapshot};
use crate::reader::Reader;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use tokio::sync::{RwLock, broadcast, watch};
use tokio::time::{Duration, Instant, interval};
use tracing::Instrument;

/// Rate limit for "no receivers" message (avoid logging every tick when no one is on /ws/snapshots)
const NO_RECEIVERS_LOG_INTERVAL: Duration = Duration::from_secs(60);

/// Most recent snapshot per domain, read by the HTTP layer.
#[derive(Default)]
pub struct LatestSnapshots {
    inner: RwLock<HashMap<Domain, DomainSnapshot>>,
}

impl LatestSnapshots {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn store(&self, snapshot: DomainSnapshot) {
        self.inner.write().await.insert(snapshot.domain(), snapshot);
    }

    pub async fn get(&self, domain: Domain) -> Option<DomainSnapshot> {
        self.inner.read().await.get(&domain).cloned()
    }

    /// All domains, ordered by domain.
    pub async fn all(&self) -> Vec<DomainSnapshot> {
        let guard = self.inner.read().await;
        let mut out: Vec<DomainSnapshot> = guard.values().cloned().collect();
        out.sort_by_key(|s| s.domain());
        out
    }
}

/// Readers, channels, and shutdown for the worker.
pub struct WorkerDeps {
    pub aggregator: Arc<Aggregator>,
    pub latest: Arc<LatestSnapshots>,
    pub tx: broadcast::Sender<DomainSnapshot>,
    pub ws_connections: Arc<AtomicUsize>,
    pub shutdown_rx: watch::Receiver<bool>,
}

/// Worker timing and logging config.
pub struct WorkerConfig {
    pub sample_interval_ms: u64,
    /// How often to log app stats (real seconds).
    pub stats_log_interval_secs: u64,
}

/// Join handles of every task spawned by [`spawn`].
pub struct WorkerHandle {
    handles: Vec<tokio::task::JoinHandle<()>>,
}

impl WorkerHandle {
    pub async fn join(self) {
        for handle in self.handles {
            if let Err(e) = handle.await {
                tracing::warn!(error = %e, "worker task ended abnormally");
            }
        }
    }
}

pub fn spawn(deps: WorkerDeps, config: WorkerConfig) -> WorkerHandle {
    let WorkerDeps {
        aggregator,
        latest,
        tx,
        ws_connections,
        shutdown_rx,
    } = deps;
    let polls_total = Arc::new(AtomicU64::new(0));
    let sample_interval = Duration::from_millis(config.sample_interval_ms);

    let mut handles: Vec<tokio::task::JoinHandle<()>> = aggregator
        .readers()
        .iter()
        .cloned()
        .map(|reader| {
            let span = tracing::span!(tracing::Level::DEBUG, "worker", domain = %reader.domain());
            tokio::spawn(
                poll_loop(
                    reader,
                    sample_interval,
                    latest.clone(),
                    tx.clone(),
                    polls_total.clone(),
                    shutdown_rx.clone(),
                )
                .instrument(span),
            )
        })
        .collect();

    handles.push(tokio::spawn(stats_loop(
        Duration::from_secs(config.stats_log_interval_secs),
        ws_connections,
        polls_total,
        shutdown_rx,
    )));

    WorkerHandle { handles }
}

async fn poll_loop(
    reader: Arc<dyn Reader>,
    sample_interval: Duration,
    latest: Arc<LatestSnapshots>,
    tx: broadcast::Sender<DomainSnapshot>,
    polls_total: Arc<AtomicU64>,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    let mut tick = interval(sample_interval);
    tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    let mut last_no_receivers_log: Option<Instant> = None;

    loop {
        tokio::select! {
            _ = tick.tick() => {
                let snapshot = match reader.poll().await {
                    Ok(s) => s,
                    Err(e) if e.is_fatal_configuration() => {
                        tracing::error!(error = %e, operation = "poll", "reader misconfigured; stopping its polling task");
                        break;
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, operation = "poll", "poll failed");
                        continue;
                    }
                };
                polls_total.fetch_add(1, Ordering::Relaxed);
                log_summary(&snapshot);
                latest.store(snapshot.clone()).await;

                if tx.send(snapshot).is_err() {
                    let should_log = last_no_receivers_log
                        .is_none_or(|t| t.elapsed() >= NO_RECEIVERS_LOG_INTERVAL);
                    if should_log {
                        tracing::debug!(
                            operation = "broadcast_snapshot",
                            "No active WebSocket clients; broadcast channel has no receivers"
                        );
                        last_no_receivers_log = Some(Instant::now());
                    }
                }
            }
            _ = shutdown_rx.changed() => {
                tracing::debug!("Worker shutting down");
                break;
            }
        }
    }
}

async fn stats_loop(
    every: Duration,
    ws_connections: Arc<AtomicUsize>,
    polls_total: Arc<AtomicU64>,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    let mut tick = interval(every);
    tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    loop {
        tokio::select! {
            _ = tick.tick() => {
                tracing::info!(
                    ws_clients = ws_connections.load(Ordering::Relaxed),
                    polls_total = polls_total.load(Ordering::Relaxed),
                    "app stats"
                );
            }
            _ = shutdown_rx.changed() => break,
        }
    }
}

fn log_summary(snapshot: &DomainSnapshot) {
    match snapshot {
        DomainSnapshot::Storage(s) => {
            for d in &s.devices {
                tracing::trace!(
                    device = %d.name,
                    read = %format::bytes_per_second(d.rates.read_bytes_per_second),
                    write = %format::bytes_per_second(d.rates.write_bytes_per_second),
                    read_iops = %format::ops_per_second(d.rates.read_iops),
                    write_iops = %format::ops_per_second(d.rates.write_iops),
                    temperature = %format::temperature(d.attributes.as_ref().and_then(|a| a.temperature_c)),
                    "storage sample"
                );
            }
        }
        DomainSnapshot::Network(n) => {
            for i in &n.interfaces {
                tracing::trace!(
                    interface = %i.name,
                    rx = %format::bytes_per_second(i.rates.read_bytes_per_second),
                    tx = %format::bytes_per_second(i.rates.write_bytes_per_second),
                    "network sample"
                );
            }
        }
    }
}
