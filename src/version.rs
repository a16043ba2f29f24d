// Build-time identity from Cargo.toml

/// Package version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Package name (from Cargo.toml).
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// "name version", used for the root endpoint and the startup log line.
pub fn banner() -> String {
    format!("{} {}", NAME, VERSION)
}
