use anyhow::Result;
use clap::Parser;
use openvpn_exporter::{config::Config, server};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/Default.toml")]
    config: String,

    /// Port to listen on for metrics (overrides config)
    #[arg(short, long, env = "EXPORTER_PORT")]
    port: Option<u16>,

    /// Address to bind to (overrides config)
    #[arg(short, long, env = "EXPORTER_ADDR")]
    addr: Option<String>,

    /// Path under which to expose metrics (overrides config)
    #[arg(long, env = "EXPORTER_TELEMETRY_PATH")]
    telemetry_path: Option<String>,

    /// Only export per-common-name series (overrides config)
    #[arg(long, env = "EXPORTER_IGNORE_INDIVIDUALS")]
    ignore_individuals: Option<bool>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting OpenVPN Exporter v{}", env!("CARGO_PKG_VERSION"));

    // Parse CLI arguments
    let args = Args::parse();

    // Load configuration
    let mut config = Config::load(&args.config)?;

    // Override with CLI arguments if provided
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(addr) = args.addr {
        config.server.addr = addr;
    }
    if let Some(path) = args.telemetry_path {
        config.server.telemetry_path = path;
    }
    if let Some(ignore) = args.ignore_individuals {
        config.openvpn.ignore_individuals = ignore;
    }
    config.validate()?;

    info!("Configuration loaded successfully");
    info!("Ignore individuals: {}", config.openvpn.ignore_individuals);
    if config.sources.is_empty() {
        warn!("No status sources configured; only the landing page will be useful");
    }
    for source in &config.sources {
        info!("Status source {}: {}", source.name, source.path);
    }

    // Start the metrics server
    if let Err(e) = server::start(config).await {
        error!("Server error: {}", e);
        std::process::exit(1);
    }

    Ok(())
}
