//! TCP connect prober.
//!
//! Completes a full TCP handshake via the operating system's socket API, then
//! attempts a one-line banner read. Reliable and unprivileged, but easily
//! logged by the target.

use crate::banner::{grab_banner_line, NO_BANNER};
use crate::scanner::traits::{ProbeOutcome, Prober, Protocol};
use async_trait::async_trait;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::trace;

/// TCP connect prober.
pub struct TcpProber {
    timeout: Duration,
}

impl TcpProber {
    /// Create a new TCP prober with the given per-port timeout.
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl Prober for TcpProber {
    fn protocol(&self) -> Protocol {
        Protocol::Tcp
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn probe(&self, addr: SocketAddr) -> ProbeOutcome {
        let stream = match timeout(self.timeout, TcpStream::connect(addr)).await {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) => {
                trace!(%addr, error = %e, "connect failed");
                return ProbeOutcome::ClosedOrFiltered;
            }
            Err(_) => {
                trace!(%addr, "connect timed out");
                return ProbeOutcome::ClosedOrFiltered;
            }
        };

        // The connection is open regardless of whether the service says
        // anything; a silent service yields the sentinel banner. The stream
        // is dropped (closed) inside grab_banner_line on every path.
        let banner = grab_banner_line(stream, self.timeout)
            .await
            .unwrap_or_else(|| NO_BANNER.to_string());

        ProbeOutcome::Open { banner }
    }
}
