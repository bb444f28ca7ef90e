//! The HTTP peer transport
//!
//! One exchange per operation against a peer's `/netinf` endpoint:
//! publish is a multipart POST (octets ride as a form part on a full
//! publish), get is a form POST answered with either a JSON record or a
//! multipart record-plus-octets body, search is a GET with the token
//! set in the query string. Fetched payload bytes are re-digested and
//! checked against the requested hash before they are trusted.

use std::collections::HashSet;

use infonda_core::{digest, record, Locator, Ndo};
use infonda_services::{
    Get, GetResponse, Getter, Publish, PublishResponse, Publisher, Search, SearchResponse,
    Searcher, Status,
};
use serde_json::Value;

use crate::error::{HttpError, Result};
use crate::pipeline;

/// An HTTP transport bound to one peer URL
pub struct HttpPeer {
    peer: String,
    http: reqwest::Client,
}

impl HttpPeer {
    pub fn new(peer: impl Into<String>) -> Self {
        HttpPeer {
            peer: peer.into().trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }

    pub fn peer(&self) -> &str {
        &self.peer
    }

    async fn exchange_publish(&self, request: &Publish) -> Result<Status> {
        let ndo = request.ndo();
        let full = request.is_full() && ndo.payload().is_some();

        let mut form = reqwest::multipart::Form::new()
            .text("URI", ndo.uri())
            .text("msgid", request.id().to_string());
        for (index, locator) in ndo.locators().iter().enumerate() {
            form = form.text(format!("loc{}", index + 1), locator.to_string());
        }
        if !ndo.metadata().is_empty() {
            let wire = record::encode(ndo);
            form = form.text("ext", wire["ext"].to_string());
        }
        if full {
            if let Some(payload) = ndo.payload() {
                let part = reqwest::multipart::Part::bytes(payload.to_vec())
                    .mime_str("application/octet-stream")?;
                form = form.text("fullPut", "true").part("octets", part);
            }
        }

        let response = self
            .http
            .post(format!("{}/netinf/publish", self.peer))
            .multipart(form)
            .send()
            .await?;
        if response.status().is_success() {
            Ok(Status::Ok)
        } else {
            Ok(Status::Failed)
        }
    }

    async fn exchange_get(&self, peer: &str, request: &Get) -> Result<Option<Ndo>> {
        let response = self
            .http
            .post(format!("{}/netinf/get", peer))
            .form(&[("URI", request.ndo().uri()), ("msgid", request.id().to_string())])
            .send()
            .await?;
        if !response.status().is_success() {
            return Ok(None);
        }

        let content_type = pipeline::require_content_type(
            response
                .headers()
                .get(reqwest::header::CONTENT_TYPE)
                .and_then(|value| value.to_str().ok()),
        )?;
        let body = response
            .bytes()
            .await
            .map_err(|e| HttpError::StreamError(e.to_string()))?;
        let entity = pipeline::require_entity(body.to_vec())?;

        if content_type.starts_with("application/json") {
            let wire = pipeline::parse_json(&entity)?;
            return Ok(Some(record::decode(&wire)?));
        }
        if content_type.starts_with("multipart/form-data") {
            let (wire, octets) = pipeline::parse_record_parts(&content_type, entity).await?;
            let found = record::decode(&wire)?;
            return match octets {
                Some(octets) => {
                    let computed = digest(&octets, request.ndo().algorithm())?;
                    if computed != request.ndo().hash() {
                        return Err(HttpError::IntegrityFailure {
                            uri: request.ndo().uri(),
                        });
                    }
                    Ok(Some(found.with_payload(octets)))
                }
                None => Ok(Some(found)),
            };
        }
        Err(HttpError::MalformedPayload(format!(
            "unexpected content type {}",
            content_type
        )))
    }

    async fn exchange_search(&self, request: &Search) -> Result<Option<HashSet<Ndo>>> {
        let tokens = request
            .tokens()
            .iter()
            .cloned()
            .collect::<Vec<_>>()
            .join(" ");
        let response = self
            .http
            .get(format!("{}/netinf/search", self.peer))
            .query(&[("tokens", tokens.as_str()), ("msgid", request.id())])
            .send()
            .await?;
        if !response.status().is_success() {
            return Ok(None);
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| HttpError::StreamError(e.to_string()))?;
        let entity = pipeline::require_entity(body.to_vec())?;
        let value = pipeline::parse_json(&entity)?;
        let results = value
            .get("results")
            .and_then(Value::as_array)
            .ok_or_else(|| {
                HttpError::MalformedPayload("search response without results".to_string())
            })?;

        let mut found = HashSet::new();
        for entry in results {
            match record::decode(entry) {
                Ok(ndo) => {
                    found.insert(ndo);
                }
                Err(e) => log::warn!("Dropping malformed search result from {}: {}", self.peer, e),
            }
        }
        Ok(Some(found))
    }
}

#[async_trait::async_trait]
impl Publisher for HttpPeer {
    async fn publish(&self, request: &Publish) -> PublishResponse {
        match self.exchange_publish(request).await {
            Ok(Status::Ok) => PublishResponse::ok(request),
            Ok(Status::Failed) => PublishResponse::failed(request),
            Err(e) => {
                log::warn!("HTTP publish to {} failed: {}", self.peer, e);
                PublishResponse::failed(request)
            }
        }
    }
}

#[async_trait::async_trait]
impl Getter for HttpPeer {
    async fn get(&self, request: &Get) -> GetResponse {
        match self.exchange_get(&self.peer, request).await {
            Ok(Some(ndo)) => GetResponse::ok(request, ndo),
            Ok(None) => GetResponse::failed(request),
            Err(e) => {
                log::warn!("HTTP get from {} failed: {}", self.peer, e);
                GetResponse::failed(request)
            }
        }
    }

    async fn resolve_locators(&self, request: &Get) -> GetResponse {
        for locator in request.ndo().locators() {
            let url = match locator {
                Locator::Http(url) => url.trim_end_matches('/'),
                Locator::Peer(_) => continue,
            };
            match self.exchange_get(url, request).await {
                Ok(Some(ndo)) => return GetResponse::ok(request, ndo),
                Ok(None) => {}
                Err(e) => {
                    log::debug!("Locator {} did not resolve: {}", locator, e);
                }
            }
        }
        GetResponse::failed(request)
    }
}

#[async_trait::async_trait]
impl Searcher for HttpPeer {
    async fn search(&self, request: &Search) -> SearchResponse {
        match self.exchange_search(request).await {
            Ok(Some(results)) => SearchResponse::ok(request, results),
            Ok(None) => SearchResponse::failed(request),
            Err(e) => {
                log::warn!("HTTP search on {} failed: {}", self.peer, e);
                SearchResponse::failed(request)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use infonda_core::NdoBuilder;

    #[test]
    fn test_trailing_slash_trimmed() {
        let peer = HttpPeer::new("http://node.local:9005/");
        assert_eq!(peer.peer(), "http://node.local:9005");
    }

    #[tokio::test]
    async fn test_unreachable_peer_degrades_to_failed() {
        let peer = HttpPeer::new("http://127.0.0.1:1");
        let ndo = NdoBuilder::new("sha-256", "h").build();
        let get = Get::builder(ndo).build();
        let response = peer.get(&get).await;
        assert_eq!(response.status(), Status::Failed);
    }
}
