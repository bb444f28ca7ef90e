//! The peer-link acceptor
//!
//! Accepts point-to-point connections and serves one exchange per
//! connection against a local service: read the request frame, perform
//! the operation, write the response frame (plus payload frame on a
//! get-hit), close. Each accepted socket is served on its own task so a
//! slow peer never stalls the accept loop.

use std::net::SocketAddr;
use std::sync::Arc;

use infonda_core::record;
use infonda_services::{Get, Publish, Service, Status};
use tokio::net::{TcpListener, TcpStream, ToSocketAddrs};

use crate::error::{PeerLinkError, Result};
use crate::framing::{read_frame, write_frame};
use crate::protocol::{Request, Response};

/// Listens for peer-link exchanges and answers them from a service
pub struct PeerLinkServer {
    listener: TcpListener,
    service: Arc<dyn Service>,
}

impl PeerLinkServer {
    /// Bind the acceptor to `addr`.
    pub async fn bind(addr: impl ToSocketAddrs, service: Arc<dyn Service>) -> Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        Ok(PeerLinkServer { listener, service })
    }

    /// The bound local address, useful when binding to port zero.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept and serve connections until the task is dropped.
    pub async fn run(self) {
        loop {
            match self.listener.accept().await {
                Ok((stream, peer)) => {
                    log::debug!("Accepted peer-link connection from {}", peer);
                    let service = Arc::clone(&self.service);
                    tokio::spawn(async move {
                        if let Err(e) = serve_connection(stream, service).await {
                            log::warn!("Peer-link exchange with {} failed: {}", peer, e);
                        }
                    });
                }
                Err(e) => {
                    log::warn!("Peer-link accept failed: {}", e);
                }
            }
        }
    }
}

/// Serve one exchange on an accepted stream.
async fn serve_connection(mut stream: TcpStream, service: Arc<dyn Service>) -> Result<()> {
    let request_bytes = read_frame(&mut stream).await?;
    let request: Request = serde_json::from_slice(&request_bytes)
        .map_err(|e| PeerLinkError::Codec(e.to_string()))?;

    match request {
        Request::Publish {
            msgid,
            record,
            full,
        } => {
            let mut ndo = record::decode(&record)?;
            if full {
                let octets = read_frame(&mut stream).await?;
                ndo = ndo.with_payload(octets);
            }

            let mut builder = Publish::builder(ndo).id(&msgid);
            if full {
                builder = builder.full();
            }
            let publish = builder.build();
            let response = service.publish(&publish).await;

            let wire_response = Response::Publish {
                msgid,
                status: response.status(),
            };
            let bytes = serde_json::to_vec(&wire_response)
                .map_err(|e| PeerLinkError::Codec(e.to_string()))?;
            write_frame(&mut stream, &bytes).await?;
        }
        Request::Get { msgid, record } => {
            let ndo = record::decode(&record)?;
            let get = Get::builder(ndo).id(&msgid).build();
            let response = service.get(&get).await;

            match response.into_ndo() {
                Some(found) => {
                    let payload = found.payload().map(|octets| octets.to_vec());
                    let wire_response = Response::Get {
                        msgid,
                        status: Status::Ok,
                        record: Some(record::encode(&found)),
                        payload: payload.is_some(),
                    };
                    let bytes = serde_json::to_vec(&wire_response)
                        .map_err(|e| PeerLinkError::Codec(e.to_string()))?;
                    write_frame(&mut stream, &bytes).await?;
                    if let Some(octets) = payload {
                        write_frame(&mut stream, &octets).await?;
                    }
                }
                None => {
                    let wire_response = Response::Get {
                        msgid,
                        status: Status::Failed,
                        record: None,
                        payload: false,
                    };
                    let bytes = serde_json::to_vec(&wire_response)
                        .map_err(|e| PeerLinkError::Codec(e.to_string()))?;
                    write_frame(&mut stream, &bytes).await?;
                }
            }
        }
    }

    Ok(())
}
