//! Command-line interface definitions for portscout.
//!
//! Uses `clap` derive macros for declarative argument parsing.

use crate::error::{ScanError, ScanResult};
use crate::output::OutputFormat;
use crate::scanner::Protocol;
use clap::Parser;
use std::net::IpAddr;

/// A concurrent TCP/UDP port reconnaissance tool.
#[derive(Parser, Debug)]
#[command(name = "portscout")]
#[command(version)]
#[command(about = "Concurrent TCP/UDP port scanner with banner grabbing", long_about = None)]
pub struct Args {
    /// Target host to scan (IP address or hostname)
    #[arg(value_name = "HOST")]
    pub host: String,

    /// Ports to scan (e.g., "80", "80,443", "1-1024")
    #[arg(short, long, default_value = "1-1024")]
    pub ports: String,

    /// Protocol to probe with
    #[arg(short = 'P', long, value_enum, default_value = "tcp")]
    pub protocol: Protocol,

    /// Number of concurrent workers
    #[arg(short, long, default_value_t = 25)]
    pub workers: usize,

    /// Per-port timeout in milliseconds
    #[arg(short, long, default_value_t = 5000)]
    pub timeout: u64,

    /// Probe issuance rate in probes per second (defaults to the worker count)
    #[arg(short, long)]
    pub rate: Option<u32>,

    /// Output file format
    #[arg(short = 'o', long, value_enum, default_value = "json")]
    pub format: OutputFormat,

    /// Output file name, without extension
    #[arg(long, default_value = "scan_results")]
    pub output: String,

    /// Also write a detailed JSON report with scan metadata
    #[arg(long)]
    pub report: bool,

    /// Disable the live progress bar
    #[arg(long)]
    pub no_progress: bool,

    /// Verbose output (show closed ports as they are scanned)
    #[arg(short, long)]
    pub verbose: bool,
}

/// Resolve the target to an IP address: literal IPs pass through, anything
/// else goes to DNS. Failure is a configuration error that aborts the run.
pub async fn resolve_target(target: &str) -> ScanResult<IpAddr> {
    if let Ok(ip) = target.parse::<IpAddr>() {
        return Ok(ip);
    }

    use trust_dns_resolver::config::{ResolverConfig, ResolverOpts};
    use trust_dns_resolver::TokioAsyncResolver;

    let resolver = TokioAsyncResolver::tokio(ResolverConfig::default(), ResolverOpts::default());

    let response = resolver
        .lookup_ip(target)
        .await
        .map_err(|e| ScanError::Resolve {
            host: target.to_string(),
            reason: e.to_string(),
        })?;

    response.iter().next().ok_or_else(|| ScanError::Resolve {
        host: target.to_string(),
        reason: "no addresses found".to_string(),
    })
}
