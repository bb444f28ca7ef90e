//! End-to-end exchanges between a peer-link client and server

use std::collections::HashMap;
use std::sync::Arc;

use infonda_core::{digest, Ndo, NdoBuilder};
use infonda_peerlink::{PeerLink, PeerLinkConfig, PeerLinkServer};
use infonda_services::{
    Get, GetResponse, Getter, Publish, PublishResponse, Publisher, Search, SearchResponse,
    Searcher, Status,
};
use tokio::sync::Mutex;

/// In-memory service keyed by NDO identity
#[derive(Default)]
struct MemoryService {
    ndos: Mutex<HashMap<(String, String), Ndo>>,
}

impl MemoryService {
    async fn insert(&self, ndo: Ndo) {
        let key = (ndo.algorithm().to_string(), ndo.hash().to_string());
        self.ndos.lock().await.insert(key, ndo);
    }

    async fn lookup(&self, ndo: &Ndo) -> Option<Ndo> {
        let key = (ndo.algorithm().to_string(), ndo.hash().to_string());
        self.ndos.lock().await.get(&key).cloned()
    }
}

#[async_trait::async_trait]
impl Publisher for MemoryService {
    async fn publish(&self, request: &Publish) -> PublishResponse {
        self.insert(request.ndo().clone()).await;
        PublishResponse::ok(request)
    }
}

#[async_trait::async_trait]
impl Getter for MemoryService {
    async fn get(&self, request: &Get) -> GetResponse {
        match self.lookup(request.ndo()).await {
            Some(ndo) => GetResponse::ok(request, ndo),
            None => GetResponse::failed(request),
        }
    }

    async fn resolve_locators(&self, request: &Get) -> GetResponse {
        GetResponse::failed(request)
    }
}

#[async_trait::async_trait]
impl Searcher for MemoryService {
    async fn search(&self, request: &Search) -> SearchResponse {
        SearchResponse::failed(request)
    }
}

async fn spawn_server() -> (Arc<MemoryService>, u16) {
    let service = Arc::new(MemoryService::default());
    let server = PeerLinkServer::bind("127.0.0.1:0", service.clone())
        .await
        .unwrap();
    let port = server.local_addr().unwrap().port();
    tokio::spawn(server.run());
    (service, port)
}

fn link_to(port: u16) -> PeerLink {
    let config = PeerLinkConfig {
        candidate_ports: vec![port],
        attempts_per_port: 1,
    };
    PeerLink::new("127.0.0.1", config)
}

fn content_ndo(content: &[u8]) -> Ndo {
    let hash = digest(content, "sha-256").unwrap();
    NdoBuilder::new("sha-256", hash)
        .authority("example.org")
        .payload(content.to_vec())
        .build()
}

#[tokio::test]
async fn test_full_publish_reaches_remote_service() {
    let (service, port) = spawn_server().await;
    let link = link_to(port);

    let ndo = content_ndo(b"shared octets");
    let publish = Publish::builder(ndo.clone()).full().build();
    let response = link.publish(&publish).await;
    assert_eq!(response.status(), Status::Ok);

    let stored = service.lookup(&ndo).await.unwrap();
    assert_eq!(stored.payload(), Some(b"shared octets".as_ref()));
}

#[tokio::test]
async fn test_hint_publish_ships_no_payload() {
    let (service, port) = spawn_server().await;
    let link = link_to(port);

    let ndo = content_ndo(b"hinted octets");
    let publish = Publish::builder(ndo.clone()).build();
    let response = link.publish(&publish).await;
    assert_eq!(response.status(), Status::Ok);

    let stored = service.lookup(&ndo).await.unwrap();
    assert!(stored.payload().is_none());
}

#[tokio::test]
async fn test_get_hit_returns_verified_payload() {
    let (service, port) = spawn_server().await;
    let link = link_to(port);

    let content = b"retrievable octets";
    service.insert(content_ndo(content)).await;

    let wanted = NdoBuilder::new("sha-256", digest(content, "sha-256").unwrap()).build();
    let get = Get::builder(wanted).build();
    let response = link.get(&get).await;
    assert_eq!(response.status(), Status::Ok);
    assert_eq!(response.ndo().unwrap().payload(), Some(content.as_ref()));
}

#[tokio::test]
async fn test_get_hit_without_payload_is_still_a_hit() {
    let (service, port) = spawn_server().await;
    let link = link_to(port);

    let content = b"record only";
    let hash = digest(content, "sha-256").unwrap();
    service
        .insert(NdoBuilder::new("sha-256", &hash).authority("example.org").build())
        .await;

    let get = Get::builder(NdoBuilder::new("sha-256", &hash).build()).build();
    let response = link.get(&get).await;
    assert_eq!(response.status(), Status::Ok);
    assert!(response.ndo().unwrap().payload().is_none());
}

#[tokio::test]
async fn test_tampered_payload_is_rejected() {
    let (service, port) = spawn_server().await;
    let link = link_to(port);

    let hash = digest(b"honest octets", "sha-256").unwrap();
    service
        .insert(
            NdoBuilder::new("sha-256", &hash)
                .payload(b"tampered octets".to_vec())
                .build(),
        )
        .await;

    let get = Get::builder(NdoBuilder::new("sha-256", &hash).build()).build();
    let response = link.get(&get).await;
    assert_eq!(response.status(), Status::Failed);
}

#[tokio::test]
async fn test_get_miss_degrades_to_failed() {
    let (_service, port) = spawn_server().await;
    let link = link_to(port);

    let get = Get::builder(NdoBuilder::new("sha-256", "absent").build()).build();
    let response = link.get(&get).await;
    assert_eq!(response.status(), Status::Failed);
}

#[tokio::test]
async fn test_resolve_locators_reaches_hinted_device() {
    let (service, port) = spawn_server().await;

    let content = b"located octets";
    service.insert(content_ndo(content)).await;

    // Bound to an unreachable device; the locator hint names the live one.
    let config = PeerLinkConfig {
        candidate_ports: vec![port],
        attempts_per_port: 1,
    };
    let link = PeerLink::new("192.0.2.1", config);

    let wanted = NdoBuilder::new("sha-256", digest(content, "sha-256").unwrap())
        .locator("peer://127.0.0.1".parse().unwrap())
        .build();
    let get = Get::builder(wanted).build();
    let response = link.resolve_locators(&get).await;
    assert_eq!(response.status(), Status::Ok);
    assert_eq!(response.ndo().unwrap().payload(), Some(content.as_ref()));
}
