// Primary tier: hwmon nodes the kernel attaches to NVMe controllers and drivetemp SATA disks.

use super::{AttributeRegistry, DeviceRef, PrimaryRead};
use crate::models::HardwareAttributes;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

const HWMON_KEYS: [&str; 3] = ["temp1_input", "temp1_alarm", "temp1_crit_alarm"];

pub struct SysfsRegistry {
    sys_root: PathBuf,
}

impl Default for SysfsRegistry {
    fn default() -> Self {
        Self::new("/sys")
    }
}

impl SysfsRegistry {
    pub fn new(sys_root: impl Into<PathBuf>) -> Self {
        Self {
            sys_root: sys_root.into(),
        }
    }

    /// NVMe: device/hwmonN. drivetemp: device/hwmon/hwmonN.
    fn find_hwmon(&self, device_dir: &Path) -> Option<PathBuf> {
        let direct = sorted_children(device_dir)
            .into_iter()
            .find(|p| is_hwmon_dir(p));
        direct.or_else(|| {
            sorted_children(&device_dir.join("hwmon"))
                .into_iter()
                .find(|p| is_hwmon_dir(p))
        })
    }
}

impl AttributeRegistry for SysfsRegistry {
    fn read(&self, device: &DeviceRef) -> PrimaryRead {
        let device_dir = self.sys_root.join("block").join(&device.name).join("device");
        if !device_dir.is_dir() {
            return PrimaryRead::Unsupported;
        }
        let Some(hwmon) = self.find_hwmon(&device_dir) else {
            return PrimaryRead::Unsupported;
        };

        let mut properties = BTreeMap::new();
        for key in HWMON_KEYS {
            if let Ok(v) = std::fs::read_to_string(hwmon.join(key)) {
                properties.insert(key.to_string(), v.trim().to_string());
            }
        }
        if !properties.contains_key("temp1_input") {
            return PrimaryRead::Failed(format!(
                "{} has no readable temp1_input",
                hwmon.display()
            ));
        }
        PrimaryRead::Supported(attributes_from_hwmon(&properties))
    }
}

/// Maps keyed hwmon properties onto attributes; unknown or unparseable keys stay `None`.
pub fn attributes_from_hwmon(properties: &BTreeMap<String, String>) -> HardwareAttributes {
    let number = |key: &str| properties.get(key).and_then(|v| v.parse::<i64>().ok());
    let alarm = ["temp1_alarm", "temp1_crit_alarm"]
        .iter()
        .filter_map(|k| number(k))
        .fold(None, |acc: Option<bool>, v| Some(acc.unwrap_or(false) || v != 0));
    HardwareAttributes {
        temperature_c: number("temp1_input").map(|milli| milli as f64 / 1000.0),
        critical_warning: alarm,
        ..Default::default()
    }
}

fn is_hwmon_dir(path: &Path) -> bool {
    path.is_dir()
        && path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with("hwmon") && n.len() > "hwmon".len())
}

fn sorted_children(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut paths: Vec<PathBuf> = entries.flatten().map(|e| e.path()).collect();
    paths.sort();
    paths
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(path: &Path, content: &str) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    #[test]
    fn nvme_hwmon_yields_temperature_and_alarm() {
        let dir = TempDir::new().unwrap();
        let hwmon = dir.path().join("block/nvme0n1/device/hwmon2");
        write(&hwmon.join("temp1_input"), "44850\n");
        write(&hwmon.join("temp1_alarm"), "0\n");
        let reg = SysfsRegistry::new(dir.path());
        let PrimaryRead::Supported(attrs) = reg.read(&DeviceRef::new("nvme0n1", None)) else {
            panic!("expected supported");
        };
        assert_eq!(attrs.temperature_c, Some(44.85));
        assert_eq!(attrs.critical_warning, Some(false));
        assert_eq!(attrs.percentage_used, None);
        assert_eq!(attrs.power_cycles, None);
    }

    #[test]
    fn drivetemp_nested_hwmon_is_found() {
        let dir = TempDir::new().unwrap();
        let hwmon = dir.path().join("block/sda/device/hwmon/hwmon4");
        write(&hwmon.join("temp1_input"), "31000");
        write(&hwmon.join("temp1_crit_alarm"), "1");
        let reg = SysfsRegistry::new(dir.path());
        let PrimaryRead::Supported(attrs) = reg.read(&DeviceRef::new("sda", None)) else {
            panic!("expected supported");
        };
        assert_eq!(attrs.temperature_c, Some(31.0));
        assert_eq!(attrs.critical_warning, Some(true));
    }

    #[test]
    fn device_without_hwmon_is_unsupported() {
        let dir = TempDir::new().unwrap();
        write(&dir.path().join("block/vda/device/model"), "virtio");
        let reg = SysfsRegistry::new(dir.path());
        assert_eq!(
            reg.read(&DeviceRef::new("vda", None)),
            PrimaryRead::Unsupported
        );
        assert_eq!(
            reg.read(&DeviceRef::new("dm-0", None)),
            PrimaryRead::Unsupported
        );
    }

    #[test]
    fn hwmon_without_temperature_is_a_failure() {
        let dir = TempDir::new().unwrap();
        write(
            &dir.path().join("block/nvme1n1/device/hwmon0/name"),
            "nvme",
        );
        let reg = SysfsRegistry::new(dir.path());
        assert!(matches!(
            reg.read(&DeviceRef::new("nvme1n1", None)),
            PrimaryRead::Failed(_)
        ));
    }

    #[test]
    fn unparseable_values_become_none() {
        let mut props = BTreeMap::new();
        props.insert("temp1_input".to_string(), "n/a".to_string());
        let attrs = attributes_from_hwmon(&props);
        assert!(attrs.is_empty());
    }
}
