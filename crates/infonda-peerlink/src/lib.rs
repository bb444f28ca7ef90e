//! Infonda Peerlink Module
//!
//! Point-to-point NDO exchange over length-prefixed frames. A
//! [`PeerLink`] is a client transport bound to one remote device; a
//! [`PeerLinkServer`] answers exchanges from a local service. Every
//! connection carries exactly one request/response exchange.

pub mod client;
pub mod connect;
pub mod error;
pub mod framing;
pub mod protocol;
pub mod server;

pub use client::{PeerLink, PeerLinkConfig};
pub use connect::{connect, DEFAULT_ATTEMPTS, DEFAULT_PORTS};
pub use error::{PeerLinkError, Result};
pub use framing::{read_frame, write_frame, MAX_FRAME_LEN};
pub use server::PeerLinkServer;
