use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub sampling: SamplingConfig,
    #[serde(default)]
    pub host: HostConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub network: NetworkConfig,
    pub publishing: PublishingConfig,
    pub monitoring: MonitoringConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SamplingConfig {
    /// Poll cadence of every reader task.
    pub interval_ms: u64,
    /// Number of top I/O processes reported with the storage snapshot.
    #[serde(default = "default_process_top_n")]
    pub process_top_n: usize,
}

fn default_process_top_n() -> usize {
    crate::process::DEFAULT_TOP_N
}

/// Mount points of procfs and sysfs (overridable for containers with the host's /proc mounted elsewhere).
#[derive(Debug, Clone, Deserialize)]
pub struct HostConfig {
    #[serde(default = "default_proc_root")]
    pub proc_root: String,
    #[serde(default = "default_sys_root")]
    pub sys_root: String,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            proc_root: default_proc_root(),
            sys_root: default_sys_root(),
        }
    }
}

fn default_proc_root() -> String {
    "/proc".into()
}

fn default_sys_root() -> String {
    "/sys".into()
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Kernel device names (e.g. "nvme0n1"); empty = every whole disk.
    #[serde(default)]
    pub devices: Vec<String>,
    #[serde(default = "default_true")]
    pub rank_processes: bool,
    #[serde(default)]
    pub smartctl: SmartctlConfig,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            devices: Vec::new(),
            rank_processes: true,
            smartctl: SmartctlConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SmartctlConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_smartctl_program")]
    pub program: String,
    #[serde(default = "default_smartctl_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for SmartctlConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            program: default_smartctl_program(),
            timeout_ms: default_smartctl_timeout_ms(),
        }
    }
}

fn default_smartctl_program() -> String {
    "smartctl".into()
}

fn default_smartctl_timeout_ms() -> u64 {
    5000
}

#[derive(Debug, Clone, Deserialize)]
pub struct NetworkConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Interface names; empty = every interface.
    #[serde(default)]
    pub interfaces: Vec<String>,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interfaces: Vec::new(),
        }
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
pub struct PublishingConfig {
    /// Max number of domain snapshots kept in the broadcast channel for /ws/snapshots (slow clients may lag).
    pub broadcast_capacity: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MonitoringConfig {
    /// How often to log app stats (ws clients, polls completed) at INFO level.
    pub stats_log_interval_secs: u64,
}

/// Shortest cadence that still clears the rate computer's minimum interval.
const MIN_SAMPLE_INTERVAL_MS: u64 = 100;

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".into());
        let s = std::fs::read_to_string(&path)?;
        Self::load_from_str(&s)
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.server.port > 0,
            "server.port must be between 1 and 65535, got {}",
            self.server.port
        );
        anyhow::ensure!(
            self.sampling.interval_ms >= MIN_SAMPLE_INTERVAL_MS,
            "sampling.interval_ms must be >= {}, got {}",
            MIN_SAMPLE_INTERVAL_MS,
            self.sampling.interval_ms
        );
        anyhow::ensure!(
            self.sampling.process_top_n > 0,
            "sampling.process_top_n must be > 0, got {}",
            self.sampling.process_top_n
        );
        anyhow::ensure!(
            !self.host.proc_root.is_empty(),
            "host.proc_root must be non-empty"
        );
        anyhow::ensure!(
            !self.host.sys_root.is_empty(),
            "host.sys_root must be non-empty"
        );
        anyhow::ensure!(
            self.storage.enabled || self.network.enabled,
            "at least one of storage.enabled / network.enabled must be true"
        );
        if self.storage.enabled && self.storage.smartctl.enabled {
            anyhow::ensure!(
                !self.storage.smartctl.program.is_empty(),
                "storage.smartctl.program must be non-empty"
            );
            anyhow::ensure!(
                self.storage.smartctl.timeout_ms > 0,
                "storage.smartctl.timeout_ms must be > 0, got {}",
                self.storage.smartctl.timeout_ms
            );
        }
        anyhow::ensure!(
            self.publishing.broadcast_capacity > 0,
            "publishing.broadcast_capacity must be > 0, got {}",
            self.publishing.broadcast_capacity
        );
        anyhow::ensure!(
            self.monitoring.stats_log_interval_secs > 0,
            "monitoring.stats_log_interval_secs must be > 0, got {}",
            self.monitoring.stats_log_interval_secs
        );
        Ok(())
    }
}
