//! Banner grabbing helpers for TCP probes.
//!
//! After connecting, the prober writes a short greeting and reads a single
//! line of whatever the service sends back. Banners may be binary (MySQL,
//! RDP), so reads are byte-oriented and sanitized before display.

use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::time::timeout;

/// Greeting written to an open TCP port to elicit a response.
pub const PROBE_GREETING: &[u8] = b"Hello\n\n";

/// Sentinel banner for open ports that sent nothing before the deadline.
pub const NO_BANNER: &str = "No banner";

/// Maximum bytes to read for a banner line.
const MAX_BANNER_SIZE: usize = 1024;

/// Write the greeting probe and read one banner line from an open connection.
///
/// Returns `None` if nothing arrives before `read_timeout`; the connection is
/// still open in that case, the service just kept quiet. The stream is
/// consumed and closed on every path.
pub async fn grab_banner_line(stream: TcpStream, read_timeout: Duration) -> Option<String> {
    let mut reader = BufReader::new(stream);

    // A write failure here just means the read below yields nothing.
    let _ = reader.get_mut().write_all(PROBE_GREETING).await;

    let mut line = Vec::with_capacity(256);
    match timeout(read_timeout, reader.read_until(b'\n', &mut line)).await {
        Ok(Ok(n)) if n > 0 => {
            let banner = sanitize_banner(&line);
            if banner.is_empty() {
                None
            } else {
                Some(banner)
            }
        }
        _ => None,
    }
}

/// Sanitize raw banner bytes into a printable, trimmed string.
///
/// Non-printable bytes become '.', whitespace runs collapse to a single
/// space, and the result is length-capped.
pub fn sanitize_banner(data: &[u8]) -> String {
    let s: String = data
        .iter()
        .take(MAX_BANNER_SIZE)
        .map(|&b| {
            if b.is_ascii_graphic() || b == b' ' {
                b as char
            } else if b == b'\r' || b == b'\n' || b == b'\t' {
                ' '
            } else {
                '.'
            }
        })
        .collect();

    let mut result = String::new();
    let mut prev_space = false;
    for c in s.chars().take(256) {
        if c == ' ' {
            if !prev_space {
                result.push(c);
            }
            prev_space = true;
        } else {
            result.push(c);
            prev_space = false;
        }
    }

    result.trim().to_string()
}
