//! End-to-end exchanges between an HTTP client and peer endpoint

use std::collections::HashMap;
use std::sync::Arc;

use infonda_core::{digest, Ndo, NdoBuilder};
use infonda_http::{HttpPeer, PeerEndpoint};
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
        let ndos = self.ndos.lock().await;
        let results = ndos
            .values()
            .filter(|ndo| ndo.matches(request.tokens()))
            .cloned()
            .collect();
        SearchResponse::ok(request, results)
    }
}

async fn spawn_endpoint() -> (Arc<MemoryService>, String) {
    let service = Arc::new(MemoryService::default());
    let endpoint = PeerEndpoint::bind("127.0.0.1:0", service.clone())
        .await
        .unwrap();
    let port = endpoint.local_addr().unwrap().port();
    tokio::spawn(endpoint.run());
    (service, format!("http://127.0.0.1:{}", port))
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
    let (service, url) = spawn_endpoint().await;
    let peer = HttpPeer::new(url);

    let ndo = content_ndo(b"shared octets");
    let publish = Publish::builder(ndo.clone()).full().build();
    let response = peer.publish(&publish).await;
    assert_eq!(response.status(), Status::Ok);

    let stored = service.lookup(&ndo).await.unwrap();
    assert_eq!(stored.payload(), Some(b"shared octets".as_ref()));
}

#[tokio::test]
async fn test_hint_publish_carries_record_fields_only() {
    let (service, url) = spawn_endpoint().await;
    let peer = HttpPeer::new(url);

    let content = b"hinted octets";
    let hash = digest(content, "sha-256").unwrap();
    let ndo = NdoBuilder::new("sha-256", &hash)
        .authority("example.org")
        .locator("peer://aa:bb".parse().unwrap())
        .metadata("title", "a hinted object")
        .payload(content.to_vec())
        .build();

    let publish = Publish::builder(ndo.clone()).build();
    let response = peer.publish(&publish).await;
    assert_eq!(response.status(), Status::Ok);

    let stored = service.lookup(&ndo).await.unwrap();
    assert!(stored.payload().is_none());
    assert_eq!(stored.locators(), ndo.locators());
    assert_eq!(stored.metadata().get("title"), Some("a hinted object"));
}

#[tokio::test]
async fn test_get_hit_returns_verified_payload() {
    let (service, url) = spawn_endpoint().await;
    let peer = HttpPeer::new(url);

    let content = b"retrievable octets";
    service.insert(content_ndo(content)).await;

    let wanted = NdoBuilder::new("sha-256", digest(content, "sha-256").unwrap()).build();
    let get = Get::builder(wanted).build();
    let response = peer.get(&get).await;
    assert_eq!(response.status(), Status::Ok);
    assert_eq!(response.ndo().unwrap().payload(), Some(content.as_ref()));
}

#[tokio::test]
async fn test_get_hit_without_payload_is_plain_json() {
    let (service, url) = spawn_endpoint().await;
    let peer = HttpPeer::new(url);

    let content = b"record only";
    let hash = digest(content, "sha-256").unwrap();
    service
        .insert(
            NdoBuilder::new("sha-256", &hash)
                .authority("example.org")
                .metadata("title", "bare record")
                .build(),
        )
        .await;

    let get = Get::builder(NdoBuilder::new("sha-256", &hash).build()).build();
    let response = peer.get(&get).await;
    assert_eq!(response.status(), Status::Ok);
    let found = response.ndo().unwrap();
    assert!(found.payload().is_none());
    assert_eq!(found.metadata().get("title"), Some("bare record"));
}

#[tokio::test]
async fn test_tampered_payload_is_rejected() {
    let (service, url) = spawn_endpoint().await;
    let peer = HttpPeer::new(url);

    let hash = digest(b"honest octets", "sha-256").unwrap();
    service
        .insert(
            NdoBuilder::new("sha-256", &hash)
                .payload(b"tampered octets".to_vec())
                .build(),
        )
        .await;

    let get = Get::builder(NdoBuilder::new("sha-256", &hash).build()).build();
    let response = peer.get(&get).await;
    assert_eq!(response.status(), Status::Failed);
}

#[tokio::test]
async fn test_get_miss_degrades_to_failed() {
    let (_service, url) = spawn_endpoint().await;
    let peer = HttpPeer::new(url);

    let get = Get::builder(NdoBuilder::new("sha-256", "absent").build()).build();
    let response = peer.get(&get).await;
    assert_eq!(response.status(), Status::Failed);
}

#[tokio::test]
async fn test_search_finds_by_metadata_token() {
    let (service, url) = spawn_endpoint().await;
    let peer = HttpPeer::new(url);

    let hash = digest(b"searchable", "sha-256").unwrap();
    service
        .insert(
            NdoBuilder::new("sha-256", &hash)
                .metadata("title", "a tale of two nodes")
                .build(),
        )
        .await;

    let search = Search::builder().token("tale").build();
    let response = peer.search(&search).await;
    assert_eq!(response.status(), Status::Ok);
    assert_eq!(response.results().len(), 1);

    let miss = Search::builder().token("absent").build();
    let response = peer.search(&miss).await;
    assert_eq!(response.status(), Status::Ok);
    assert!(response.results().is_empty());
}

#[tokio::test]
async fn test_resolve_locators_reaches_hinted_peer() {
    let (service, url) = spawn_endpoint().await;

    let content = b"located octets";
    service.insert(content_ndo(content)).await;

    // Bound to an unreachable peer; the locator hint names the live one.
    let peer = HttpPeer::new("http://127.0.0.1:1");
    let wanted = NdoBuilder::new("sha-256", digest(content, "sha-256").unwrap())
        .locator(url.parse().unwrap())
        .build();
    let get = Get::builder(wanted).build();
    let response = peer.resolve_locators(&get).await;
    assert_eq!(response.status(), Status::Ok);
    assert_eq!(response.ndo().unwrap().payload(), Some(content.as_ref()));
}
