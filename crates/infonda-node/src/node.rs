use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info};

use infonda_http::{HttpPeer, PeerEndpoint};
use infonda_peerlink::{PeerLink, PeerLinkConfig, PeerLinkServer};
use infonda_services::Router;
use infonda_store::LocalStore;

use crate::config::Config;

/// Main node orchestrator
pub struct Node {
    config: Config,
    router: Arc<Router>,
    peerlink_server: Option<PeerLinkServer>,
    http_endpoint: Option<PeerEndpoint>,
}

impl Node {
    pub async fn new(config: Config) -> Result<Self> {
        info!("Initializing node components...");

        let store = Arc::new(LocalStore::open(&config.store_path()).await?);
        info!("✓ Object store opened at {}", config.store_path().display());

        let mut router = Router::new(store.clone());

        if config.peerlink.enabled {
            for device in &config.peerlink.peers {
                let link = Arc::new(PeerLink::new(
                    device,
                    PeerLinkConfig {
                        candidate_ports: config.peerlink.candidate_ports.clone(),
                        attempts_per_port: config.peerlink.attempts_per_port,
                    },
                ));
                if config.routing.forward_publishes {
                    router.register_publisher(link.clone());
                }
                if config.routing.forward_gets {
                    router.register_getter(link);
                }
            }
        }

        if config.http.enabled {
            for url in &config.http.peers {
                let peer = Arc::new(HttpPeer::new(url));
                if config.routing.forward_publishes {
                    router.register_publisher(peer.clone());
                }
                if config.routing.forward_gets {
                    router.register_getter(peer.clone());
                }
                if config.routing.forward_searches {
                    router.register_searcher(peer);
                }
            }
        }
        info!(
            "✓ Router assembled: {} publishers, {} getters, {} searchers",
            router.publisher_count(),
            router.getter_count(),
            router.searcher_count()
        );

        let peerlink_server = if config.peerlink.enabled {
            let server = PeerLinkServer::bind(
                ("0.0.0.0", config.peerlink.listen_port),
                store.clone(),
            )
            .await?;
            info!("✓ Peer-link acceptor bound on {}", server.local_addr()?);
            Some(server)
        } else {
            info!("Peer-link transport disabled");
            None
        };

        let http_endpoint = if config.http.enabled {
            let endpoint = PeerEndpoint::bind(
                format!("{}:{}", config.http.bind, config.http.port),
                store,
            )
            .await?;
            info!("✓ HTTP peer endpoint bound on {}", endpoint.local_addr()?);
            Some(endpoint)
        } else {
            info!("HTTP transport disabled");
            None
        };

        Ok(Self {
            config,
            router: Arc::new(router),
            peerlink_server,
            http_endpoint,
        })
    }

    /// The node's service surface: local store plus peer transports.
    pub fn service(&self) -> Arc<Router> {
        self.router.clone()
    }

    pub fn peerlink_addr(&self) -> Option<SocketAddr> {
        self.peerlink_server
            .as_ref()
            .and_then(|server| server.local_addr().ok())
    }

    pub fn http_addr(&self) -> Option<SocketAddr> {
        self.http_endpoint
            .as_ref()
            .and_then(|endpoint| endpoint.local_addr().ok())
    }

    /// Spawn the peer-facing servers.
    pub fn start(&mut self) {
        if let Some(server) = self.peerlink_server.take() {
            tokio::spawn(server.run());
        }
        if let Some(endpoint) = self.http_endpoint.take() {
            tokio::spawn(async move {
                if let Err(e) = endpoint.run().await {
                    error!("HTTP peer endpoint error: {}", e);
                }
            });
        }
    }

    pub async fn run(mut self) -> Result<()> {
        self.start();

        info!("═══════════════════════════════════════════════");
        info!("  {} is now running", self.config.node.name);
        info!("═══════════════════════════════════════════════");
        info!("  Data Dir: {}", self.config.data_directory.display());

        signal::ctrl_c().await?;
        info!("Received Ctrl+C signal, shutting down");
        Ok(())
    }
}
