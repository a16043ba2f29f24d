// SMART-style hardware health attributes

use serde::{Deserialize, Serialize};

/// Health telemetry reported by a storage controller. Every field is independently optional;
/// a populated value always comes from a single acquisition tier.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HardwareAttributes {
    pub temperature_c: Option<f64>,
    pub percentage_used: Option<f64>,
    pub critical_warning: Option<bool>,
    pub power_cycles: Option<u64>,
    pub power_on_hours: Option<u64>,
    pub data_units_read: Option<u64>,
    pub data_units_written: Option<u64>,
}

impl HardwareAttributes {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Which tier produced a device's attributes; serializes lowercase ("primary", "fallback").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeSource {
    Primary,
    Fallback,
}
