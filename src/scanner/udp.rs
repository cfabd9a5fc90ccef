//! UDP prober.
//!
//! UDP is connectionless, so "open" is inferred rather than observed: a
//! response within the timeout means open, while silence (or an ICMP error
//! surfaced on read) is reported as the ambiguous "open|filtered". Only a
//! failure to send the probe at all is treated as an error.

use crate::banner::sanitize_banner;
use crate::scanner::traits::{ProbeOutcome, Prober, Protocol};
use async_trait::async_trait;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::time::timeout;
use tracing::trace;

/// Probe payload sent to every UDP port.
const UDP_PROBE_PAYLOAD: &[u8] = b"probe";

/// Banner reported when the port neither answered nor errored.
pub const OPEN_FILTERED: &str = "open|filtered";

/// UDP prober.
pub struct UdpProber {
    timeout: Duration,
}

impl UdpProber {
    /// Create a new UDP prober with the given per-port timeout.
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl Prober for UdpProber {
    fn protocol(&self) -> Protocol {
        Protocol::Udp
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn probe(&self, addr: SocketAddr) -> ProbeOutcome {
        let local: SocketAddr = if addr.is_ipv4() {
            ([0, 0, 0, 0], 0).into()
        } else {
            (std::net::Ipv6Addr::UNSPECIFIED, 0).into()
        };

        let socket = match UdpSocket::bind(local).await {
            Ok(socket) => socket,
            Err(e) => return ProbeOutcome::Error(format!("failed to bind socket: {e}")),
        };

        if let Err(e) = socket.connect(addr).await {
            return ProbeOutcome::Error(format!("failed to connect: {e}"));
        }

        if let Err(e) = socket.send(UDP_PROBE_PAYLOAD).await {
            return ProbeOutcome::Error(format!("failed to send probe: {e}"));
        }

        let mut buf = [0u8; 1024];
        match timeout(self.timeout, socket.recv(&mut buf)).await {
            Ok(Ok(n)) => ProbeOutcome::Open {
                banner: format!("open - {}", sanitize_banner(&buf[..n])),
            },
            Ok(Err(e)) => {
                // ICMP unreachable surfaces here on connected sockets; UDP
                // cannot distinguish that reliably from filtering.
                trace!(%addr, error = %e, "udp recv error");
                ProbeOutcome::Open {
                    banner: OPEN_FILTERED.to_string(),
                }
            }
            Err(_) => ProbeOutcome::Open {
                banner: OPEN_FILTERED.to_string(),
            },
        }
    }
}
