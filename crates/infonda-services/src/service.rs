//! Service capability traits
//!
//! Each transport implements whichever subset of capabilities it can
//! honour. All methods are total: a transport answers an expected miss
//! or an internal fault with a `Failed` response, never an `Err`, so
//! callers fan out without per-backend error plumbing.

use crate::message::{Get, GetResponse, Publish, PublishResponse, Search, SearchResponse};

/// A transport that can make NDOs available
#[async_trait::async_trait]
pub trait Publisher: Send + Sync {
    async fn publish(&self, request: &Publish) -> PublishResponse;
}

/// A transport that can retrieve NDO payloads
#[async_trait::async_trait]
pub trait Getter: Send + Sync {
    async fn get(&self, request: &Get) -> GetResponse;

    /// Second-chance retrieval through the request's locator hints.
    ///
    /// Transports without locator resolution answer with a failed
    /// response.
    async fn resolve_locators(&self, request: &Get) -> GetResponse;
}

/// A transport that can find NDOs by metadata tokens
#[async_trait::async_trait]
pub trait Searcher: Send + Sync {
    async fn search(&self, request: &Search) -> SearchResponse;
}

/// A transport offering all three capabilities
pub trait Service: Publisher + Getter + Searcher {}

impl<T: Publisher + Getter + Searcher> Service for T {}
