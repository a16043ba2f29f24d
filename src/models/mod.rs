// Domain models: raw counters, derived rates, hardware attributes, per-domain snapshots.

mod attributes;
mod counters;
mod network;
mod process;
mod snapshot;
mod storage;

pub use attributes::{AttributeSource, HardwareAttributes};
pub use counters::{RateMetrics, RawCounterSnapshot};
pub use network::{InterfaceSnapshot, NetworkSnapshot};
pub use process::ProcessIOEntry;
pub use snapshot::{Domain, DomainSnapshot, unix_millis};
pub use storage::{DeviceSnapshot, StorageSnapshot};
