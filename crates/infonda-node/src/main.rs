use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use infonda_node::config::Config;
use infonda_node::node::Node;

#[derive(Parser)]
#[command(name = "infonda-node", version, about = "An information-centric network node")]
struct Cli {
    /// Path to the configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Path to the data directory
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Create a new default configuration and exit
    #[arg(long)]
    init: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.init {
        let config = Config::create_default(cli.config, cli.data_dir)?;
        println!("Created configuration at {}", config.config_path().display());
        return Ok(());
    }

    let config = Config::load(cli.config, cli.data_dir)?;
    init_tracing(&config.logging.level);

    info!("Starting infonda-node v{}", env!("CARGO_PKG_VERSION"));

    let node = Node::new(config).await?;
    node.run().await
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
