// Fallback tier: `smartctl --json` run as a discrete, time-bounded probe.

use super::{DeviceRef, DiagnosticProbe};
use crate::error::ProbeError;
use crate::models::HardwareAttributes;
use async_trait::async_trait;
use serde::Deserialize;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// smartctl exit status bits that mean no usable output was produced.
const FATAL_EXIT_BITS: i32 = 0b11;

/// ATA attributes whose normalized value counts down remaining endurance (100 = new).
const ATA_WEAR_ATTRIBUTE_IDS: [u32; 3] = [177, 231, 233];

pub struct SmartctlProbe {
    program: PathBuf,
    timeout: Duration,
}

impl SmartctlProbe {
    pub fn new(program: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }
}

#[async_trait]
impl DiagnosticProbe for SmartctlProbe {
    async fn probe(&self, device: &DeviceRef) -> Result<HardwareAttributes, ProbeError> {
        let child = Command::new(&self.program)
            .arg("--json=c")
            .arg("-a")
            .arg(&device.dev_path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .output();
        let output = tokio::time::timeout(self.timeout, child)
            .await
            .map_err(|_| ProbeError::Timeout(self.timeout))?
            .map_err(|source| ProbeError::Spawn {
                program: self.program.display().to_string(),
                source,
            })?;

        let code = output.status.code().ok_or(ProbeError::Killed)?;
        if code & FATAL_EXIT_BITS != 0 {
            return Err(ProbeError::ExitStatus(code));
        }
        parse_smartctl_json(&output.stdout)
    }
}

#[derive(Debug, Default, Deserialize)]
struct SmartctlReport {
    smart_status: Option<SmartStatus>,
    temperature: Option<Temperature>,
    power_cycle_count: Option<u64>,
    power_on_time: Option<PowerOnTime>,
    nvme_smart_health_information_log: Option<NvmeHealthLog>,
    ata_smart_attributes: Option<AtaAttributes>,
}

#[derive(Debug, Deserialize)]
struct SmartStatus {
    passed: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct Temperature {
    current: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct PowerOnTime {
    hours: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct NvmeHealthLog {
    critical_warning: Option<u64>,
    temperature: Option<f64>,
    percentage_used: Option<f64>,
    data_units_read: Option<u64>,
    data_units_written: Option<u64>,
    power_cycles: Option<u64>,
    power_on_hours: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct AtaAttributes {
    #[serde(default)]
    table: Vec<AtaAttribute>,
}

#[derive(Debug, Deserialize)]
struct AtaAttribute {
    id: u32,
    value: Option<u32>,
}

/// Parses `smartctl --json` output. NVMe health-log values win over generic fields.
pub fn parse_smartctl_json(stdout: &[u8]) -> Result<HardwareAttributes, ProbeError> {
    let report: SmartctlReport = serde_json::from_slice(stdout)?;
    let nvme = report.nvme_smart_health_information_log.as_ref();

    let ata_wear = report.ata_smart_attributes.as_ref().and_then(|a| {
        a.table
            .iter()
            .find(|attr| ATA_WEAR_ATTRIBUTE_IDS.contains(&attr.id))
            .and_then(|attr| attr.value)
            .map(|remaining| 100.0 - f64::from(remaining.min(100)))
    });

    let attributes = HardwareAttributes {
        temperature_c: nvme
            .and_then(|n| n.temperature)
            .or_else(|| report.temperature.as_ref().and_then(|t| t.current)),
        percentage_used: nvme.and_then(|n| n.percentage_used).or(ata_wear),
        critical_warning: nvme
            .and_then(|n| n.critical_warning)
            .map(|w| w != 0)
            .or_else(|| {
                report
                    .smart_status
                    .as_ref()
                    .and_then(|s| s.passed)
                    .map(|passed| !passed)
            }),
        power_cycles: nvme
            .and_then(|n| n.power_cycles)
            .or(report.power_cycle_count),
        power_on_hours: nvme
            .and_then(|n| n.power_on_hours)
            .or_else(|| report.power_on_time.as_ref().and_then(|p| p.hours)),
        data_units_read: nvme.and_then(|n| n.data_units_read),
        data_units_written: nvme.and_then(|n| n.data_units_written),
    };
    if attributes.is_empty() {
        return Err(ProbeError::NoAttributes);
    }
    Ok(attributes)
}
