// Config loading and validation tests

use iopulse::config::AppConfig;

const VALID_CONFIG: &str = r#"
[server]
port = 8081
host = "0.0.0.0"

[sampling]
interval_ms = 1000
process_top_n = 5

[host]
proc_root = "/host/proc"
sys_root = "/host/sys"

[storage]
devices = ["nvme0n1"]

[storage.smartctl]
program = "/usr/sbin/smartctl"
timeout_ms = 3000

[network]
interfaces = ["eth0"]

[publishing]
broadcast_capacity = 60

[monitoring]
stats_log_interval_secs = 60
"#;

const MINIMAL_CONFIG: &str = r#"
[server]
port = 8081
host = "127.0.0.1"

[sampling]
interval_ms = 500

[publishing]
broadcast_capacity = 16

[monitoring]
stats_log_interval_secs = 30
"#;

#[test]
fn test_config_loads_from_str() {
    let config = AppConfig::load_from_str(VALID_CONFIG).expect("load_from_str");
    assert_eq!(config.server.port, 8081);
    assert_eq!(config.server.host, "0.0.0.0");
    assert_eq!(config.sampling.interval_ms, 1000);
    assert_eq!(config.sampling.process_top_n, 5);
    assert_eq!(config.host.proc_root, "/host/proc");
    assert_eq!(config.host.sys_root, "/host/sys");
    assert_eq!(config.storage.devices, vec!["nvme0n1".to_string()]);
    assert_eq!(config.storage.smartctl.program, "/usr/sbin/smartctl");
    assert_eq!(config.storage.smartctl.timeout_ms, 3000);
    assert_eq!(config.network.interfaces, vec!["eth0".to_string()]);
    assert_eq!(config.publishing.broadcast_capacity, 60);
}

#[test]
fn test_config_defaults() {
    let config = AppConfig::load_from_str(MINIMAL_CONFIG).expect("load_from_str");
    assert_eq!(config.sampling.process_top_n, 8);
    assert_eq!(config.host.proc_root, "/proc");
    assert_eq!(config.host.sys_root, "/sys");
    assert!(config.storage.enabled);
    assert!(config.storage.devices.is_empty());
    assert!(config.storage.rank_processes);
    assert!(config.storage.smartctl.enabled);
    assert_eq!(config.storage.smartctl.program, "smartctl");
    assert_eq!(config.storage.smartctl.timeout_ms, 5000);
    assert!(config.network.enabled);
    assert!(config.network.interfaces.is_empty());
}

#[test]
fn test_config_validation_rejects_invalid_port() {
    let bad = VALID_CONFIG.replace("port = 8081", "port = 0");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("server.port"));
}

#[test]
fn test_config_validation_rejects_short_interval() {
    let bad = VALID_CONFIG.replace("interval_ms = 1000", "interval_ms = 50");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("sampling.interval_ms"));
}

#[test]
fn test_config_validation_rejects_top_n_zero() {
    let bad = VALID_CONFIG.replace("process_top_n = 5", "process_top_n = 0");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("process_top_n"));
}

#[test]
fn test_config_validation_rejects_empty_proc_root() {
    let bad = VALID_CONFIG.replace("proc_root = \"/host/proc\"", "proc_root = \"\"");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("host.proc_root"));
}

#[test]
fn test_config_validation_rejects_all_domains_disabled() {
    let bad = VALID_CONFIG
        .replace("[storage]\n", "[storage]\nenabled = false\n")
        .replace("[network]\n", "[network]\nenabled = false\n");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("at least one"));
}

#[test]
fn test_config_validation_rejects_smartctl_timeout_zero() {
    let bad = VALID_CONFIG.replace("timeout_ms = 3000", "timeout_ms = 0");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("storage.smartctl.timeout_ms"));
}

#[test]
fn test_config_smartctl_timeout_ignored_when_disabled() {
    let ok = VALID_CONFIG.replace(
        "timeout_ms = 3000",
        "timeout_ms = 0\nenabled = false",
    );
    let config = AppConfig::load_from_str(&ok).expect("disabled probe is not validated");
    assert!(!config.storage.smartctl.enabled);
}

#[test]
fn test_config_validation_rejects_broadcast_capacity_zero() {
    let bad = VALID_CONFIG.replace("broadcast_capacity = 60", "broadcast_capacity = 0");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("broadcast_capacity"));
}

#[test]
fn test_config_validation_rejects_stats_interval_zero() {
    let bad = VALID_CONFIG.replace("stats_log_interval_secs = 60", "stats_log_interval_secs = 0");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("stats_log_interval_secs"));
}

#[test]
fn test_config_rejects_malformed_toml() {
    assert!(AppConfig::load_from_str("[server\nport = 1").is_err());
}
