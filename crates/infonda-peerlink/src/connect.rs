//! Connection establishment with ordered candidate-port retry
//!
//! A peer may expose its peer-link service on any of a small set of
//! well-known ports. Connection attempts walk the candidate list in
//! order, a bounded number of tries per port; any attempt error is
//! swallowed and the next attempt made. Retries are counted, never
//! timed.

use tokio::net::TcpStream;

use crate::error::{PeerLinkError, Result};

/// Default candidate service ports, tried in order
pub const DEFAULT_PORTS: [u16; 3] = [4885, 4886, 4887];

/// Default number of connection attempts per candidate port
pub const DEFAULT_ATTEMPTS: u32 = 2;

/// Connect to `device`, walking `candidate_ports` in order with up to
/// `attempts_per_port` tries each. The first established stream wins.
pub async fn connect(
    device: &str,
    candidate_ports: &[u16],
    attempts_per_port: u32,
) -> Result<TcpStream> {
    for &port in candidate_ports {
        for attempt in 1..=attempts_per_port {
            match TcpStream::connect((device, port)).await {
                Ok(stream) => {
                    log::debug!("Connected to {}:{} on attempt {}", device, port, attempt);
                    return Ok(stream);
                }
                Err(e) => {
                    log::debug!(
                        "Connection to {}:{} failed on attempt {}: {}",
                        device,
                        port,
                        attempt,
                        e
                    );
                }
            }
        }
    }
    Err(PeerLinkError::ConnectionFailed {
        device: device.to_string(),
    })
}
