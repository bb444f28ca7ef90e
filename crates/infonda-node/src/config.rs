use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main application configuration
///
/// Constructed once at startup and passed by reference; there is no
/// global accessor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub node: NodeConfig,
    pub store: StoreConfig,
    pub peerlink: PeerLinkSettings,
    pub http: HttpSettings,
    pub routing: RoutingSettings,
    pub logging: LoggingConfig,

    #[serde(skip)]
    config_file_path: PathBuf,
    #[serde(skip)]
    pub data_directory: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeConfig {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Database file name, relative to the data directory
    pub file: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeerLinkSettings {
    pub enabled: bool,
    pub listen_port: u16,
    pub candidate_ports: Vec<u16>,
    pub attempts_per_port: u32,
    /// Device addresses of known peer-link peers
    pub peers: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpSettings {
    pub enabled: bool,
    pub bind: String,
    pub port: u16,
    /// Base URLs of known HTTP peers
    pub peers: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingSettings {
    pub forward_publishes: bool,
    pub forward_gets: bool,
    pub forward_searches: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl Config {
    /// Load configuration from file or use defaults
    pub fn load(config_path: Option<PathBuf>, data_dir: Option<PathBuf>) -> Result<Self> {
        let config_path = config_path.unwrap_or_else(Self::default_config_path);
        let data_dir = data_dir.unwrap_or_else(Self::default_data_dir);

        if !config_path.exists() {
            anyhow::bail!(
                "Configuration file not found: {}\nRun with --init to create a new configuration",
                config_path.display()
            );
        }

        let contents =
            fs::read_to_string(&config_path).context("Failed to read configuration file")?;

        let mut config: Config =
            serde_yaml::from_str(&contents).context("Failed to parse configuration file")?;

        config.config_file_path = config_path;
        config.data_directory = data_dir;

        Ok(config)
    }

    /// Create a new default configuration
    pub fn create_default(config_path: Option<PathBuf>, data_dir: Option<PathBuf>) -> Result<Self> {
        let config_path = config_path.unwrap_or_else(Self::default_config_path);
        let data_dir = data_dir.unwrap_or_else(Self::default_data_dir);

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::create_dir_all(&data_dir)?;

        let suffix: String = infonda_core::new_id().chars().take(6).collect();
        let config = Config {
            node: NodeConfig {
                name: format!("infonda-{}", suffix),
            },
            store: StoreConfig {
                file: "ndos.db".to_string(),
            },
            peerlink: PeerLinkSettings {
                enabled: true,
                listen_port: infonda_peerlink::DEFAULT_PORTS[0],
                candidate_ports: infonda_peerlink::DEFAULT_PORTS.to_vec(),
                attempts_per_port: infonda_peerlink::DEFAULT_ATTEMPTS,
                peers: vec![],
            },
            http: HttpSettings {
                enabled: true,
                bind: "0.0.0.0".to_string(),
                port: 8080,
                peers: vec![],
            },
            routing: RoutingSettings {
                forward_publishes: true,
                forward_gets: true,
                forward_searches: true,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
            },
            config_file_path: config_path.clone(),
            data_directory: data_dir,
        };

        let yaml = serde_yaml::to_string(&config)?;
        fs::write(&config_path, yaml)?;

        Ok(config)
    }

    pub fn config_path(&self) -> &Path {
        &self.config_file_path
    }

    pub fn store_path(&self) -> PathBuf {
        self.data_directory.join(&self.store.file)
    }

    fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("infonda")
            .join("config.yaml")
    }

    fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("infonda")
    }
}
