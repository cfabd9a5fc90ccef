//! # portscout - A Concurrent Port Reconnaissance Tool
//!
//! portscout probes a target host's TCP or UDP ports with a bounded worker
//! pool, grabs service banners, classifies services, and reports open ports
//! with summary statistics.
//!
//! ## Features
//!
//! - **TCP and UDP probing**: connect scans with a one-line banner read, and
//!   UDP probes with open|filtered inference
//! - **Bounded concurrency**: fixed worker pool plus a global token-bucket
//!   rate limit on probe issuance
//! - **Service classification**: banner signatures with a well-known-port
//!   fallback
//! - **Live progress**: counter-driven progress bar, safe to cancel
//! - **Multiple output formats**: JSON, CSV, and plain text, plus a detailed
//!   JSON report with scan metadata
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use portscout::scanner::{EngineConfig, Protocol, ScanEngine};
//! use portscout::ports;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let target = "192.168.1.1".parse()?;
//!     let config = EngineConfig::new(target, ports::expand("20-1024"))
//!         .with_workers(50);
//!     let engine = ScanEngine::for_protocol(config, Protocol::Tcp);
//!
//!     let outcome = engine.run().await?;
//!     for finding in &outcome.findings {
//!         println!("{}: {} ({})", finding.port, finding.service, finding.banner);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`ports`] - port specification expansion
//! - [`scanner`] - the scan engine, `Prober` implementations, rate limiter,
//!   and progress reporter
//! - [`services`] - banner/port service classification
//! - [`output`] - result rendering and persistence
//! - [`error`] - error types

pub mod banner;
pub mod cli;
pub mod error;
pub mod output;
pub mod ports;
pub mod scanner;
pub mod services;
pub mod sysinfo;

// Re-export commonly used types
pub use error::{ScanError, ScanResult};
pub use scanner::{
    EngineConfig, Finding, ProbeOutcome, Prober, Protocol, ScanEngine, ScanOutcome, ScanStats,
};
