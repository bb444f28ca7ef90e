//! Request routing across the local store and peer transports
//!
//! The router is the node's dispatch policy. It only ever speaks to
//! capability trait objects; no concrete transport type appears here.
//! Retrieval order: the local store first, then each peer transport in
//! registration order, then each transport's locator resolution. The
//! first hit wins and is re-published into the local store so the node
//! keeps a copy of what it fetched.

use crate::message::{
    Get, GetResponse, Publish, PublishResponse, Search, SearchResponse,
};
use crate::service::{Getter, Publisher, Searcher, Service};
use std::collections::HashSet;
use std::sync::Arc;

pub struct Router {
    local: Arc<dyn Service>,
    publishers: Vec<Arc<dyn Publisher>>,
    getters: Vec<Arc<dyn Getter>>,
    searchers: Vec<Arc<dyn Searcher>>,
}

impl Router {
    pub fn new(local: Arc<dyn Service>) -> Self {
        Router {
            local,
            publishers: Vec::new(),
            getters: Vec::new(),
            searchers: Vec::new(),
        }
    }

    pub fn register_publisher(&mut self, publisher: Arc<dyn Publisher>) {
        self.publishers.push(publisher);
    }

    pub fn register_getter(&mut self, getter: Arc<dyn Getter>) {
        self.getters.push(getter);
    }

    pub fn register_searcher(&mut self, searcher: Arc<dyn Searcher>) {
        self.searchers.push(searcher);
    }

    pub fn publisher_count(&self) -> usize {
        self.publishers.len()
    }

    pub fn getter_count(&self) -> usize {
        self.getters.len()
    }

    pub fn searcher_count(&self) -> usize {
        self.searchers.len()
    }

    /// Publish to the local store and every peer transport.
    ///
    /// The operation succeeds if any backend accepted it.
    pub async fn publish(&self, request: &Publish) -> PublishResponse {
        let mut any_ok = self.local.publish(request).await.status().is_ok();
        for publisher in &self.publishers {
            let response = publisher.publish(request).await;
            if response.status().is_ok() {
                any_ok = true;
            }
        }
        if any_ok {
            PublishResponse::ok(request)
        } else {
            PublishResponse::failed(request)
        }
    }

    /// Retrieve an object: local store, then peers, then locator
    /// resolution. A remote hit is cached into the local store.
    pub async fn get(&self, request: &Get) -> GetResponse {
        let local = self.local.get(request).await;
        if local.status().is_ok() {
            return local;
        }

        for getter in &self.getters {
            let response = getter.get(request).await;
            if response.status().is_ok() {
                return self.cache(response).await;
            }
        }

        self.resolve_locators(request).await
    }

    /// Second-chance retrieval through locator hints on every peer
    /// transport, in registration order.
    pub async fn resolve_locators(&self, request: &Get) -> GetResponse {
        for getter in &self.getters {
            let response = getter.resolve_locators(request).await;
            if response.status().is_ok() {
                return self.cache(response).await;
            }
        }
        GetResponse::failed(request)
    }

    /// Search the local store and every peer transport, unioning the
    /// results.
    pub async fn search(&self, request: &Search) -> SearchResponse {
        let mut any_ok = false;
        let mut results: HashSet<_> = HashSet::new();

        let local = self.local.search(request).await;
        if local.status().is_ok() {
            any_ok = true;
            results.extend(local.into_results());
        }

        for searcher in &self.searchers {
            let response = searcher.search(request).await;
            if response.status().is_ok() {
                any_ok = true;
                results.extend(response.into_results());
            }
        }

        if any_ok {
            SearchResponse::ok(request, results)
        } else {
            SearchResponse::failed(request)
        }
    }

    async fn cache(&self, response: GetResponse) -> GetResponse {
        if let Some(ndo) = response.ndo() {
            let mut builder = Publish::builder(ndo.clone());
            if ndo.payload().is_some() {
                builder = builder.full();
            }
            let publish = builder.build();
            if !self.local.publish(&publish).await.status().is_ok() {
                log::warn!("Failed to cache fetched object {}", ndo.uri());
            }
        }
        response
    }
}

#[async_trait::async_trait]
impl Publisher for Router {
    async fn publish(&self, request: &Publish) -> PublishResponse {
        Router::publish(self, request).await
    }
}

#[async_trait::async_trait]
impl Getter for Router {
    async fn get(&self, request: &Get) -> GetResponse {
        Router::get(self, request).await
    }

    async fn resolve_locators(&self, request: &Get) -> GetResponse {
        Router::resolve_locators(self, request).await
    }
}

#[async_trait::async_trait]
impl Searcher for Router {
    async fn search(&self, request: &Search) -> SearchResponse {
        Router::search(self, request).await
    }
}
