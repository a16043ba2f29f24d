// Human-readable rendering. Absence renders as ABSENT, never "0".

/// Placeholder for a value that has no valid reading.
pub const ABSENT: &str = "—";

const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

/// Decimal (SI) byte count, e.g. `1.5 MB`.
pub fn bytes(value: f64) -> String {
    let mut v = value.max(0.0);
    let mut unit = 0;
    while v >= 1000.0 && unit < UNITS.len() - 1 {
        v /= 1000.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{:.0} {}", v, UNITS[unit])
    } else {
        format!("{:.1} {}", v, UNITS[unit])
    }
}

pub fn bytes_per_second(rate: Option<f64>) -> String {
    rate.map_or_else(|| ABSENT.to_string(), |r| format!("{}/s", bytes(r)))
}

pub fn ops_per_second(rate: Option<f64>) -> String {
    rate.map_or_else(|| ABSENT.to_string(), |r| format!("{:.0} IOPS", r))
}

pub fn temperature(celsius: Option<f64>) -> String {
    celsius.map_or_else(|| ABSENT.to_string(), |c| format!("{:.0}°C", c))
}

pub fn percentage(value: Option<f64>) -> String {
    value.map_or_else(|| ABSENT.to_string(), |p| format!("{:.0}%", p))
}
