//! Gatekeeper binary.
//!
//! `serve` runs the gateway in front of the upstream application; `check`,
//! `csp` and `validate` inspect a configuration file without serving.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tokio::net::TcpListener;

use gatekeeper::config::{load_config, loader::read_config};
use gatekeeper::lifecycle::{signals, Shutdown};
use gatekeeper::observability::{logging, metrics};
use gatekeeper::routing::PublicRoutes;
use gatekeeper::security::HeaderPolicy;
use gatekeeper::HttpServer;

#[derive(Parser)]
#[command(name = "gatekeeper")]
#[command(about = "Authentication gatekeeper for HTTP applications", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "gatekeeper.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the gateway (default)
    Serve,
    /// Report whether a path is public
    Check { path: String },
    /// Print the Content-Security-Policy header value
    Csp,
    /// Validate the configuration file
    Validate,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(&cli.config).await,
        Commands::Check { path } => {
            let config = read_config(&cli.config)?;
            let routes = PublicRoutes::from_patterns(&config.routes.public)?;
            match routes.matching_pattern(&path) {
                Some(pattern) => println!("{}: public (matches {})", path, pattern),
                None => println!("{}: protected", path),
            }
            Ok(())
        }
        Commands::Csp => {
            let config = read_config(&cli.config)?;
            let policy = HeaderPolicy::from_config(&config.security)?;
            println!("{}", policy.build_csp());
            Ok(())
        }
        Commands::Validate => {
            load_config(&cli.config)?;
            println!("{}: ok", cli.config.display());
            Ok(())
        }
    }
}

async fn serve(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(path)?;
    logging::init(&config.observability);

    tracing::info!(
        config = %path.display(),
        bind_address = %config.server.bind_address,
        strategy = config.session.strategy.as_str(),
        "gatekeeper v{} starting",
        env!("CARGO_PKG_VERSION")
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.server.bind_address).await?;
    let server = HttpServer::new(config)?;

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(signals::shutdown_on_signal(shutdown));

    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
