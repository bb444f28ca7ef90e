//! The peer-link transport
//!
//! One exchange per connection: connect, send a request frame, read the
//! response frame (plus payload frame on a get-hit), close. Sockets are
//! single-owner and never pooled. Fetched payload bytes are re-digested
//! and checked against the requested hash before they are trusted.

use infonda_core::{digest, record, Locator, Ndo};
use infonda_services::{
    Get, GetResponse, Getter, Publish, PublishResponse, Publisher, Status,
};
use tokio::net::TcpStream;

use crate::connect::{connect, DEFAULT_ATTEMPTS, DEFAULT_PORTS};
use crate::error::{PeerLinkError, Result};
use crate::framing::{read_frame, write_frame};
use crate::protocol::{Request, Response};

/// Peer-link transport configuration
#[derive(Debug, Clone)]
pub struct PeerLinkConfig {
    /// Candidate service ports, tried in order
    pub candidate_ports: Vec<u16>,

    /// Connection attempts per candidate port
    pub attempts_per_port: u32,
}

impl Default for PeerLinkConfig {
    fn default() -> Self {
        PeerLinkConfig {
            candidate_ports: DEFAULT_PORTS.to_vec(),
            attempts_per_port: DEFAULT_ATTEMPTS,
        }
    }
}

/// A point-to-point transport bound to one remote device
pub struct PeerLink {
    device: String,
    config: PeerLinkConfig,
}

impl PeerLink {
    pub fn new(device: impl Into<String>, config: PeerLinkConfig) -> Self {
        PeerLink {
            device: device.into(),
            config,
        }
    }

    pub fn device(&self) -> &str {
        &self.device
    }

    async fn open(&self, device: &str) -> Result<TcpStream> {
        connect(
            device,
            &self.config.candidate_ports,
            self.config.attempts_per_port,
        )
        .await
    }

    async fn exchange_publish(&self, request: &Publish) -> Result<Status> {
        let ndo = request.ndo();
        let full = request.is_full() && ndo.payload().is_some();

        let mut stream = self.open(&self.device).await?;

        let wire_request = Request::Publish {
            msgid: request.id().to_string(),
            record: record::encode(ndo),
            full,
        };
        let bytes = serde_json::to_vec(&wire_request)
            .map_err(|e| PeerLinkError::Codec(e.to_string()))?;
        write_frame(&mut stream, &bytes).await?;

        if full {
            if let Some(payload) = ndo.payload() {
                write_frame(&mut stream, payload).await?;
            }
        }

        let response_bytes = read_frame(&mut stream).await?;
        let response: Response = serde_json::from_slice(&response_bytes)
            .map_err(|e| PeerLinkError::Codec(e.to_string()))?;

        match response {
            Response::Publish { msgid, status } => {
                if msgid != request.id() {
                    log::warn!(
                        "Publish response id {} does not match request id {}",
                        msgid,
                        request.id()
                    );
                }
                Ok(status)
            }
            Response::Get { .. } => Err(PeerLinkError::UnexpectedResponse(
                "get response to a publish request".to_string(),
            )),
        }
    }

    async fn exchange_get(&self, device: &str, request: &Get) -> Result<Option<Ndo>> {
        let mut stream = self.open(device).await?;

        let wire_request = Request::Get {
            msgid: request.id().to_string(),
            record: record::encode(request.ndo()),
        };
        let bytes = serde_json::to_vec(&wire_request)
            .map_err(|e| PeerLinkError::Codec(e.to_string()))?;
        write_frame(&mut stream, &bytes).await?;

        let response_bytes = read_frame(&mut stream).await?;
        let response: Response = serde_json::from_slice(&response_bytes)
            .map_err(|e| PeerLinkError::Codec(e.to_string()))?;

        match response {
            Response::Get {
                msgid,
                status,
                record,
                payload,
            } => {
                if msgid != request.id() {
                    log::warn!(
                        "Get response id {} does not match request id {}",
                        msgid,
                        request.id()
                    );
                }
                if status == Status::Failed {
                    return Ok(None);
                }
                let wire_record = record.ok_or_else(|| {
                    PeerLinkError::UnexpectedResponse(
                        "get response without a record".to_string(),
                    )
                })?;
                let found = record::decode(&wire_record)?;
                if !payload {
                    return Ok(Some(found));
                }

                let octets = read_frame(&mut stream).await?;
                let computed = digest(&octets, request.ndo().algorithm())?;
                if computed != request.ndo().hash() {
                    return Err(PeerLinkError::IntegrityFailure {
                        uri: request.ndo().uri(),
                    });
                }
                Ok(Some(found.with_payload(octets)))
            }
            Response::Publish { .. } => Err(PeerLinkError::UnexpectedResponse(
                "publish response to a get request".to_string(),
            )),
        }
    }
}

#[async_trait::async_trait]
impl Publisher for PeerLink {
    async fn publish(&self, request: &Publish) -> PublishResponse {
        match self.exchange_publish(request).await {
            Ok(Status::Ok) => PublishResponse::ok(request),
            Ok(Status::Failed) => PublishResponse::failed(request),
            Err(e) => {
                log::warn!("Peer-link publish to {} failed: {}", self.device, e);
                PublishResponse::failed(request)
            }
        }
    }
}

#[async_trait::async_trait]
impl Getter for PeerLink {
    async fn get(&self, request: &Get) -> GetResponse {
        match self.exchange_get(&self.device, request).await {
            Ok(Some(ndo)) => GetResponse::ok(request, ndo),
            Ok(None) => GetResponse::failed(request),
            Err(e) => {
                log::warn!("Peer-link get from {} failed: {}", self.device, e);
                GetResponse::failed(request)
            }
        }
    }

    async fn resolve_locators(&self, request: &Get) -> GetResponse {
        for locator in request.ndo().locators() {
            let device = match locator {
                Locator::Peer(address) => address,
                Locator::Http(_) => continue,
            };
            match self.exchange_get(device, request).await {
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
