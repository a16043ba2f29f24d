// Tiered hardware-attribute acquisition: fast in-process registry first, external probe second.

mod smartctl;
mod sysfs;

pub use smartctl::{SmartctlProbe, parse_smartctl_json};
pub use sysfs::{SysfsRegistry, attributes_from_hwmon};

use crate::error::ProbeError;
use crate::models::{AttributeSource, HardwareAttributes};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, instrument};

/// Identity of a storage device as seen by the acquisition tiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceRef {
    /// Kernel name, e.g. "nvme0n1".
    pub name: String,
    /// Device node handed to external tools, e.g. "/dev/nvme0n1".
    pub dev_path: PathBuf,
    /// Changes whenever the device is re-attached (kernel diskseq). `None` if not exposed.
    pub attach_token: Option<String>,
}

impl DeviceRef {
    pub fn new(name: impl Into<String>, attach_token: Option<String>) -> Self {
        let name = name.into();
        Self {
            dev_path: PathBuf::from("/dev").join(&name),
            name,
            attach_token,
        }
    }
}

/// Outcome of one primary-tier read.
#[derive(Debug, Clone, PartialEq)]
pub enum PrimaryRead {
    Supported(HardwareAttributes),
    /// This class of device never exposes the interface. Cached per device.
    Unsupported,
    /// The interface exists but could not be read this time. Not cached.
    Failed(String),
}

/// Fast, synchronous, in-process attribute source.
pub trait AttributeRegistry: Send + Sync {
    fn read(&self, device: &DeviceRef) -> PrimaryRead;
}

/// Slow attribute source backed by an external diagnostic command.
#[async_trait]
pub trait DiagnosticProbe: Send + Sync {
    async fn probe(&self, device: &DeviceRef) -> Result<HardwareAttributes, ProbeError>;
}

/// Attributes together with the tier that produced them.
#[derive(Debug, Clone, PartialEq)]
pub struct Acquired {
    pub source: AttributeSource,
    pub attributes: HardwareAttributes,
}

/// Resolves attributes per device. "Primary unsupported" is cached for the session and
/// dropped when the device disappears or comes back with a different attach token.
pub struct AttributeAcquirer {
    registry: Arc<dyn AttributeRegistry>,
    probe: Option<Arc<dyn DiagnosticProbe>>,
    probe_timeout: Duration,
    /// device name -> attach token observed when the primary tier reported unsupported.
    primary_unsupported: Mutex<HashMap<String, Option<String>>>,
}

impl AttributeAcquirer {
    pub fn new(
        registry: Arc<dyn AttributeRegistry>,
        probe: Option<Arc<dyn DiagnosticProbe>>,
        probe_timeout: Duration,
    ) -> Self {
        Self {
            registry,
            probe,
            probe_timeout,
            primary_unsupported: Mutex::new(HashMap::new()),
        }
    }

    /// Never fails: any tier failure degrades to `None`.
    #[instrument(skip(self, device), fields(device = %device.name))]
    pub async fn acquire(&self, device: &DeviceRef) -> Option<Acquired> {
        if !self.is_primary_unsupported(device) {
            match self.read_primary(device).await {
                PrimaryRead::Supported(attributes) if !attributes.is_empty() => {
                    return Some(Acquired {
                        source: AttributeSource::Primary,
                        attributes,
                    });
                }
                PrimaryRead::Supported(_) => {
                    debug!("primary tier returned no attributes");
                }
                PrimaryRead::Unsupported => {
                    debug!("primary tier unsupported; caching for this device");
                    self.mark_primary_unsupported(device);
                }
                PrimaryRead::Failed(reason) => {
                    debug!(%reason, "primary tier failed this cycle");
                }
            }
        }
        self.read_fallback(device).await
    }

    async fn read_primary(&self, device: &DeviceRef) -> PrimaryRead {
        let registry = self.registry.clone();
        let device = device.clone();
        tokio::task::spawn_blocking(move || registry.read(&device))
            .await
            .unwrap_or_else(|e| PrimaryRead::Failed(format!("registry task join: {}", e)))
    }

    async fn read_fallback(&self, device: &DeviceRef) -> Option<Acquired> {
        let probe = self.probe.as_ref()?;
        match tokio::time::timeout(self.probe_timeout, probe.probe(device)).await {
            Ok(Ok(attributes)) if !attributes.is_empty() => Some(Acquired {
                source: AttributeSource::Fallback,
                attributes,
            }),
            Ok(Ok(_)) => {
                debug!("fallback tier returned no attributes");
                None
            }
            Ok(Err(e)) => {
                debug!(error = %e, "fallback tier failed");
                None
            }
            Err(_) => {
                debug!(timeout = ?self.probe_timeout, "fallback tier timed out");
                None
            }
        }
    }

    /// Cached "primary unsupported" for this device and attach token. A changed token means
    /// the device was reconnected and the cached fact is discarded.
    pub fn is_primary_unsupported(&self, device: &DeviceRef) -> bool {
        let mut cache = self
            .primary_unsupported
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        match cache.get(&device.name) {
            Some(token) if *token == device.attach_token => true,
            Some(_) => {
                debug!(device = %device.name, "device reattached; retrying primary tier");
                cache.remove(&device.name);
                false
            }
            None => false,
        }
    }

    fn mark_primary_unsupported(&self, device: &DeviceRef) {
        self.primary_unsupported
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(device.name.clone(), device.attach_token.clone());
    }

    /// Forget everything cached for a device that is no longer present.
    pub fn forget(&self, device_name: &str) {
        self.primary_unsupported
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .remove(device_name);
    }
}
