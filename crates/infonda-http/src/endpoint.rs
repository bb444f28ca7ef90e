//! The HTTP peer endpoint
//!
//! Serves the three node operations to HTTP peers, the counterpart of
//! [`crate::client::HttpPeer`]. A get-hit with payload is answered as a
//! multipart record-plus-octets body, a record-only hit as plain JSON,
//! a miss as 404. Malformed requests are answered 400 and never reach
//! the service.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{Multipart, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use infonda_core::{record, Locator, Ndo};
use infonda_services::{Get, Publish, Search, Service};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::net::{TcpListener, ToSocketAddrs};

use crate::error::{HttpError, Result};
use crate::pipeline;

/// Listens for HTTP peer exchanges and answers them from a service
pub struct PeerEndpoint {
    listener: TcpListener,
    service: Arc<dyn Service>,
}

impl PeerEndpoint {
    /// Bind the endpoint to `addr`.
    pub async fn bind(addr: impl ToSocketAddrs, service: Arc<dyn Service>) -> Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        Ok(PeerEndpoint { listener, service })
    }

    /// The bound local address, useful when binding to port zero.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Serve requests until the task is dropped.
    pub async fn run(self) -> Result<()> {
        let app = create_router(self.service);
        axum::serve(self.listener, app).await?;
        Ok(())
    }
}

#[derive(Clone)]
struct EndpointState {
    service: Arc<dyn Service>,
}

fn create_router(service: Arc<dyn Service>) -> Router {
    Router::new()
        .route("/netinf/publish", post(publish))
        .route("/netinf/get", post(retrieve))
        .route("/netinf/search", get(search))
        .with_state(EndpointState { service })
}

async fn publish(State(state): State<EndpointState>, mut multipart: Multipart) -> StatusCode {
    let request = match read_publish(&mut multipart).await {
        Ok(request) => request,
        Err(e) => {
            log::warn!("Rejecting malformed publish request: {}", e);
            return StatusCode::BAD_REQUEST;
        }
    };
    let response = state.service.publish(&request).await;
    if response.status().is_ok() {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

/// Assemble a publish request from its multipart form.
///
/// `URI` is required; locator, metadata and flag fields are optional
/// and tolerated when malformed, matching the wire record posture.
async fn read_publish(multipart: &mut Multipart) -> Result<Publish> {
    let mut uri = None;
    let mut msgid = None;
    let mut ext = None;
    let mut locators = Vec::new();
    let mut full = false;
    let mut octets = None;

    loop {
        let field = multipart
            .next_field()
            .await
            .map_err(|e| HttpError::MalformedPayload(e.to_string()))?;
        let field = match field {
            Some(field) => field,
            None => break,
        };
        let name = field.name().map(|name| name.to_string());
        let data = field
            .bytes()
            .await
            .map_err(|e| HttpError::MalformedPayload(e.to_string()))?;
        match name.as_deref() {
            Some("URI") => uri = Some(String::from_utf8_lossy(&data).into_owned()),
            Some("msgid") => msgid = Some(String::from_utf8_lossy(&data).into_owned()),
            Some("ext") => ext = Some(String::from_utf8_lossy(&data).into_owned()),
            Some("fullPut") => full = data.as_ref() == b"true",
            Some("octets") => octets = Some(data.to_vec()),
            Some(name) if name.starts_with("loc") => {
                locators.push(String::from_utf8_lossy(&data).into_owned());
            }
            other => log::warn!("Ignoring unknown publish field {:?}", other),
        }
    }

    let uri = uri.ok_or_else(|| HttpError::MalformedPayload("publish without URI".to_string()))?;
    let mut builder = Ndo::from_uri(&uri)?;
    for text in locators {
        match text.parse::<Locator>() {
            Ok(locator) => builder = builder.locator(locator),
            Err(e) => log::warn!("Dropping locator in publish for {}: {}", uri, e),
        }
    }
    if let Some(ext) = ext {
        match serde_json::from_str::<Value>(&ext) {
            Ok(value) => match value.get("meta") {
                None => {}
                Some(Value::Object(entries)) => {
                    for (key, entry) in entries {
                        let text = match entry.as_str() {
                            Some(text) => text.to_string(),
                            None => entry.to_string(),
                        };
                        builder = builder.metadata(key.clone(), text);
                    }
                }
                Some(_) => log::warn!("Ignoring non-object ext.meta in publish for {}", uri),
            },
            Err(e) => log::warn!("Ignoring malformed ext in publish for {}: {}", uri, e),
        }
    }

    let mut ndo = builder.build();
    let full = full && octets.is_some();
    if full {
        if let Some(octets) = octets {
            ndo = ndo.with_payload(octets);
        }
    }

    let mut publish = Publish::builder(ndo);
    if let Some(msgid) = msgid {
        publish = publish.id(msgid);
    }
    if full {
        publish = publish.full();
    }
    Ok(publish.build())
}

#[derive(Deserialize)]
struct GetForm {
    #[serde(rename = "URI")]
    uri: String,
    msgid: Option<String>,
}

async fn retrieve(State(state): State<EndpointState>, Form(form): Form<GetForm>) -> Response {
    let builder = match Ndo::from_uri(&form.uri) {
        Ok(builder) => builder,
        Err(e) => {
            log::warn!("Rejecting malformed get request: {}", e);
            return StatusCode::BAD_REQUEST.into_response();
        }
    };
    let mut get = Get::builder(builder.build());
    if let Some(msgid) = form.msgid {
        get = get.id(msgid);
    }
    let request = get.build();

    let response = state.service.get(&request).await;
    match response.into_ndo() {
        None => StatusCode::NOT_FOUND.into_response(),
        Some(found) => {
            let wire = record::encode(&found);
            match found.payload() {
                None => Json(wire).into_response(),
                Some(octets) => {
                    let (body, content_type) = pipeline::encode_record_parts(&wire, octets);
                    ([(header::CONTENT_TYPE, content_type)], body).into_response()
                }
            }
        }
    }
}

#[derive(Deserialize)]
struct SearchQuery {
    tokens: Option<String>,
    msgid: Option<String>,
}

async fn search(State(state): State<EndpointState>, Query(query): Query<SearchQuery>) -> Response {
    let mut builder = Search::builder();
    if let Some(msgid) = query.msgid {
        builder = builder.id(msgid);
    }
    if let Some(tokens) = query.tokens {
        builder = builder.tokens(tokens.split_whitespace().map(|token| token.to_string()));
    }
    let request = builder.build();

    let response = state.service.search(&request).await;
    if !response.status().is_ok() {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    let results: Vec<Value> = response.results().iter().map(record::encode).collect();
    Json(json!({ "results": results })).into_response()
}
