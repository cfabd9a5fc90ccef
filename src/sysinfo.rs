//! Host system information for scan report metadata.

use directories::BaseDirs;
use serde::Serialize;
use std::env;

/// Information about the machine the scan ran from.
#[derive(Debug, Clone, Serialize)]
pub struct SysInfo {
    pub os: String,
    pub arch: String,
    pub host: String,
    pub username: String,
    pub home_dir: String,
}

/// Collect system information. Best effort: missing pieces degrade to
/// "unknown" rather than failing the report.
pub fn collect() -> SysInfo {
    let host = env::var("HOSTNAME").unwrap_or_else(|_| "unknown".to_string());

    let username = env::var("USER")
        .or_else(|_| env::var("USERNAME"))
        .unwrap_or_else(|_| "unknown".to_string());

    let home_dir = BaseDirs::new()
        .map(|dirs| dirs.home_dir().display().to_string())
        .unwrap_or_default();

    SysInfo {
        os: env::consts::OS.to_string(),
        arch: env::consts::ARCH.to_string(),
        host,
        username,
        home_dir,
    }
}
