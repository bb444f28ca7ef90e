//! Infonda Services Module
//!
//! This module defines the three-operation service abstraction shared by
//! every transport, the request/response messages, and the router that
//! dispatches operations across the local store and peer transports.

pub mod message;
pub mod router;
pub mod service;

pub use message::{
    Get, GetBuilder, GetResponse, Publish, PublishBuilder, PublishResponse, Search,
    SearchBuilder, SearchResponse, Status,
};
pub use router::Router;
pub use service::{Getter, Publisher, Searcher, Service};
