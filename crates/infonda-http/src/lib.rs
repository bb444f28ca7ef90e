//! Infonda HTTP Module
//!
//! NDO exchange over HTTP. An [`HttpPeer`] is a client transport bound
//! to one peer URL; a [`PeerEndpoint`] answers the same operations from
//! a local service so two nodes can interoperate over HTTP. Responses
//! are interpreted through a strict pipeline with a distinct error per
//! stage.

pub mod client;
pub mod endpoint;
pub mod error;
pub mod pipeline;

pub use client::HttpPeer;
pub use endpoint::PeerEndpoint;
pub use error::{HttpError, Result};
