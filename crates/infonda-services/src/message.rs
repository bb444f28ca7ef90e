//! Request and response messages for the three node operations
//!
//! Requests are immutable once built; builders assign a fresh
//! correlation identifier unless the caller supplies one. Responses are
//! constructed from the request they answer so the identifier always
//! matches. An expected miss is a `Failed` response, never an error.

use infonda_core::{new_id, Ndo};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

/// Outcome of a service operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    Ok,
    Failed,
}

impl Status {
    pub fn is_ok(&self) -> bool {
        matches!(self, Status::Ok)
    }
}

/// Request to make an NDO available
#[derive(Debug, Clone)]
pub struct Publish {
    id: String,
    ndo: Ndo,
    full: bool,
}

impl Publish {
    pub fn builder(ndo: Ndo) -> PublishBuilder {
        PublishBuilder {
            id: None,
            ndo,
            full: false,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn ndo(&self) -> &Ndo {
        &self.ndo
    }

    /// A full publish ships the payload octets, a hint only the record.
    pub fn is_full(&self) -> bool {
        self.full
    }
}

/// Builder for [`Publish`] requests
#[derive(Debug, Clone)]
pub struct PublishBuilder {
    id: Option<String>,
    ndo: Ndo,
    full: bool,
}

impl PublishBuilder {
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn full(mut self) -> Self {
        self.full = true;
        self
    }

    pub fn build(self) -> Publish {
        Publish {
            id: self.id.unwrap_or_else(new_id),
            ndo: self.ndo,
            full: self.full,
        }
    }
}

/// Response to a [`Publish`] request
#[derive(Debug, Clone)]
pub struct PublishResponse {
    id: String,
    status: Status,
}

impl PublishResponse {
    pub fn ok(request: &Publish) -> Self {
        PublishResponse {
            id: request.id().to_string(),
            status: Status::Ok,
        }
    }

    pub fn failed(request: &Publish) -> Self {
        PublishResponse {
            id: request.id().to_string(),
            status: Status::Failed,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn status(&self) -> Status {
        self.status
    }
}

/// Request to retrieve an NDO's payload
#[derive(Debug, Clone)]
pub struct Get {
    id: String,
    ndo: Ndo,
}

impl Get {
    pub fn builder(ndo: Ndo) -> GetBuilder {
        GetBuilder { id: None, ndo }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn ndo(&self) -> &Ndo {
        &self.ndo
    }
}

/// Builder for [`Get`] requests
#[derive(Debug, Clone)]
pub struct GetBuilder {
    id: Option<String>,
    ndo: Ndo,
}

impl GetBuilder {
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn build(self) -> Get {
        Get {
            id: self.id.unwrap_or_else(new_id),
            ndo: self.ndo,
        }
    }
}

/// Response to a [`Get`] request
#[derive(Debug, Clone)]
pub struct GetResponse {
    id: String,
    status: Status,
    ndo: Option<Ndo>,
}

impl GetResponse {
    pub fn ok(request: &Get, ndo: Ndo) -> Self {
        GetResponse {
            id: request.id().to_string(),
            status: Status::Ok,
            ndo: Some(ndo),
        }
    }

    pub fn failed(request: &Get) -> Self {
        GetResponse {
            id: request.id().to_string(),
            status: Status::Failed,
            ndo: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn ndo(&self) -> Option<&Ndo> {
        self.ndo.as_ref()
    }

    pub fn into_ndo(self) -> Option<Ndo> {
        self.ndo
    }
}

/// Request to find NDOs by metadata tokens
#[derive(Debug, Clone)]
pub struct Search {
    id: String,
    tokens: BTreeSet<String>,
}

impl Search {
    pub fn builder() -> SearchBuilder {
        SearchBuilder {
            id: None,
            tokens: BTreeSet::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn tokens(&self) -> &BTreeSet<String> {
        &self.tokens
    }
}

/// Builder for [`Search`] requests
#[derive(Debug, Clone)]
pub struct SearchBuilder {
    id: Option<String>,
    tokens: BTreeSet<String>,
}

impl SearchBuilder {
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.tokens.insert(token.into());
        self
    }

    pub fn tokens(mut self, tokens: impl IntoIterator<Item = String>) -> Self {
        self.tokens.extend(tokens);
        self
    }

    pub fn build(self) -> Search {
        Search {
            id: self.id.unwrap_or_else(new_id),
            tokens: self.tokens,
        }
    }
}

/// Response to a [`Search`] request
#[derive(Debug, Clone)]
pub struct SearchResponse {
    id: String,
    status: Status,
    results: HashSet<Ndo>,
}

impl SearchResponse {
    pub fn ok(request: &Search, results: HashSet<Ndo>) -> Self {
        SearchResponse {
            id: request.id().to_string(),
            status: Status::Ok,
            results,
        }
    }

    pub fn failed(request: &Search) -> Self {
        SearchResponse {
            id: request.id().to_string(),
            status: Status::Failed,
            results: HashSet::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn results(&self) -> &HashSet<Ndo> {
        &self.results
    }

    pub fn into_results(self) -> HashSet<Ndo> {
        self.results
    }
}
