//! The Named Data Object model
//!
//! An [`Ndo`] is an immutable value identified solely by its
//! `(algorithm, hash)` pair. Everything else it carries, authority,
//! locators, metadata, payload, is routing advice and cargo; none of it
//! participates in identity or equality.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use crate::error::{CoreError, Result};

/// URI scheme under which NDO identities are rendered
pub const NDO_SCHEME: &str = "ni";

/// A hint at where an object's payload may be fetched from
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Locator {
    /// A peer-link device address, rendered `peer://{address}`
    Peer(String),
    /// An HTTP peer URL, rendered verbatim (`http://` or `https://`)
    Http(String),
}

impl FromStr for Locator {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        if let Some(address) = s.strip_prefix("peer://") {
            if address.is_empty() {
                return Err(CoreError::InvalidLocator(s.to_string()));
            }
            Ok(Locator::Peer(address.to_string()))
        } else if s.starts_with("http://") || s.starts_with("https://") {
            Ok(Locator::Http(s.to_string()))
        } else {
            Err(CoreError::InvalidLocator(s.to_string()))
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::Peer(address) => write!(f, "peer://{}", address),
            Locator::Http(url) => write!(f, "{}", url),
        }
    }
}

/// Free-form string key/value annotations attached to an NDO
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata(BTreeMap<String, String>);

impl Metadata {
    pub fn new() -> Self {
        Metadata(BTreeMap::new())
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.0.values().map(String::as_str)
    }
}

/// An immutable Named Data Object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ndo {
    algorithm: String,
    hash: String,
    authority: Option<String>,
    locators: Vec<Locator>,
    metadata: Metadata,
    payload: Option<Vec<u8>>,
}

impl Ndo {
    /// Start building an NDO from an identity URI.
    ///
    /// The parse is all-or-nothing: the authority segment must be
    /// present (an empty one means no authority) and algorithm and hash
    /// must be non-empty.
    pub fn from_uri(uri: &str) -> Result<NdoBuilder> {
        let rest = uri
            .split_once("://")
            .ok_or_else(|| CoreError::InvalidUri(uri.to_string()))?
            .1;
        let (authority, tail) = rest
            .split_once('/')
            .ok_or_else(|| CoreError::InvalidUri(uri.to_string()))?;
        let (algorithm, hash) = tail
            .split_once(';')
            .ok_or_else(|| CoreError::InvalidUri(uri.to_string()))?;
        if algorithm.is_empty() || hash.is_empty() {
            return Err(CoreError::InvalidUri(uri.to_string()));
        }
        let mut builder = NdoBuilder::new(algorithm, hash);
        if !authority.is_empty() {
            builder = builder.authority(authority);
        }
        Ok(builder)
    }

    pub fn algorithm(&self) -> &str {
        &self.algorithm
    }

    pub fn hash(&self) -> &str {
        &self.hash
    }

    pub fn authority(&self) -> Option<&str> {
        self.authority.as_deref()
    }

    pub fn locators(&self) -> &[Locator] {
        &self.locators
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn payload(&self) -> Option<&[u8]> {
        self.payload.as_deref()
    }

    /// Render the identity URI, `ni://{authority}/{algorithm};{hash}`.
    pub fn uri(&self) -> String {
        format!(
            "{}://{}/{};{}",
            NDO_SCHEME,
            self.authority.as_deref().unwrap_or(""),
            self.algorithm,
            self.hash
        )
    }

    /// Return a copy of this NDO carrying the given payload.
    pub fn with_payload(mut self, payload: Vec<u8>) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Conjunctive token match against metadata values.
    ///
    /// Every token must occur as a substring of at least one metadata
    /// value. The empty token set matches nothing.
    pub fn matches(&self, tokens: &BTreeSet<String>) -> bool {
        if tokens.is_empty() {
            return false;
        }
        tokens
            .iter()
            .all(|token| self.metadata.values().any(|value| value.contains(token.as_str())))
    }
}

impl PartialEq for Ndo {
    fn eq(&self, other: &Self) -> bool {
        self.algorithm == other.algorithm && self.hash == other.hash
    }
}

impl Eq for Ndo {}

impl Hash for Ndo {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.algorithm.hash(state);
        self.hash.hash(state);
    }
}

impl fmt::Display for Ndo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.uri())
    }
}

/// Builder for [`Ndo`] values
#[derive(Debug, Clone)]
pub struct NdoBuilder {
    algorithm: String,
    hash: String,
    authority: Option<String>,
    locators: Vec<Locator>,
    metadata: Metadata,
    payload: Option<Vec<u8>>,
}

impl NdoBuilder {
    pub fn new(algorithm: impl Into<String>, hash: impl Into<String>) -> Self {
        NdoBuilder {
            algorithm: algorithm.into(),
            hash: hash.into(),
            authority: None,
            locators: Vec::new(),
            metadata: Metadata::new(),
            payload: None,
        }
    }

    pub fn authority(mut self, authority: impl Into<String>) -> Self {
        self.authority = Some(authority.into());
        self
    }

    pub fn locator(mut self, locator: Locator) -> Self {
        self.locators.push(locator);
        self
    }

    pub fn metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key, value);
        self
    }

    pub fn payload(mut self, payload: Vec<u8>) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Finish the build. Locators are deduplicated preserving first
    /// occurrence order.
    pub fn build(self) -> Ndo {
        let mut locators = Vec::with_capacity(self.locators.len());
        for locator in self.locators {
            if !locators.contains(&locator) {
                locators.push(locator);
            }
        }
        Ndo {
            algorithm: self.algorithm,
            hash: self.hash,
            authority: self.authority,
            locators,
            metadata: self.metadata,
            payload: self.payload,
        }
    }
}
