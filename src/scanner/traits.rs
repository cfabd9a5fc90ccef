//! Prober trait abstraction.
//!
//! Defines a common interface for per-port probe implementations, enabling
//! polymorphism between TCP and UDP probing and easier testing of the engine.

use crate::error::ScanError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

/// Supported probe protocols.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    /// TCP connect probe with a one-line banner read.
    Tcp,
    /// UDP probe with timeout-based open|filtered inference.
    Udp,
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tcp => write!(f, "tcp"),
            Self::Udp => write!(f, "udp"),
        }
    }
}

impl FromStr for Protocol {
    type Err = ScanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "tcp" => Ok(Self::Tcp),
            "udp" => Ok(Self::Udp),
            other => Err(ScanError::UnsupportedProtocol(other.to_string())),
        }
    }
}

/// Result of probing a single port.
#[derive(Debug, Clone, PartialEq)]
pub enum ProbeOutcome {
    /// The port accepted the probe. `banner` holds whatever the service sent,
    /// or a sentinel ("No banner", "open|filtered") when it stayed quiet.
    Open { banner: String },
    /// Connection refused, reset, or timed out. Expected and non-fatal.
    ClosedOrFiltered,
    /// Unexpected I/O failure on an established socket. Logged, no finding.
    Error(String),
}

impl ProbeOutcome {
    /// Whether this outcome produces a finding.
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Open { .. })
    }
}

/// A reported open port with its classified service and banner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub port: u16,
    pub service: String,
    pub banner: String,
    pub status: String,
}

impl Finding {
    /// Create a finding for an open port.
    pub fn new(port: u16, service: impl Into<String>, banner: impl Into<String>) -> Self {
        Self {
            port,
            service: service.into(),
            banner: banner.into(),
            status: "open".to_string(),
        }
    }
}

/// Trait for per-port probe implementations.
///
/// A prober checks a single address and never blocks indefinitely: every
/// implementation bounds its network I/O by the configured timeout.
#[async_trait]
pub trait Prober: Send + Sync {
    /// The protocol this prober speaks.
    fn protocol(&self) -> Protocol;

    /// The per-probe timeout.
    fn timeout(&self) -> Duration;

    /// Probe a single port.
    async fn probe(&self, addr: SocketAddr) -> ProbeOutcome;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_from_str() {
        assert_eq!("tcp".parse::<Protocol>().unwrap(), Protocol::Tcp);
        assert_eq!("UDP".parse::<Protocol>().unwrap(), Protocol::Udp);
        assert!(matches!(
            "icmp".parse::<Protocol>(),
            Err(ScanError::UnsupportedProtocol(_))
        ));
    }

    #[test]
    fn test_protocol_display() {
        assert_eq!(Protocol::Tcp.to_string(), "tcp");
        assert_eq!(Protocol::Udp.to_string(), "udp");
    }

    #[test]
    fn test_outcome_is_open() {
        assert!(ProbeOutcome::Open {
            banner: "No banner".to_string()
        }
        .is_open());
        assert!(!ProbeOutcome::ClosedOrFiltered.is_open());
        assert!(!ProbeOutcome::Error("boom".to_string()).is_open());
    }

    #[test]
    fn test_finding_status_is_open() {
        let f = Finding::new(22, "SSH", "SSH-2.0-OpenSSH_8.9");
        assert_eq!(f.status, "open");
        assert_eq!(f.port, 22);
    }

    #[test]
    fn test_finding_serializes_flat() {
        let f = Finding::new(80, "HTTP", "No banner");
        let json = serde_json::to_value(&f).unwrap();
        assert_eq!(json["port"], 80);
        assert_eq!(json["status"], "open");
    }
}
