//! cep-temp: postal code → temperature, over two hops.
//!
//! # Architecture Overview
//!
//! ```text
//!                 ┌──────────────┐   POST {"cep"}   ┌──────────────────────────────┐
//!   Client ──────▶│   edge hop   │─────────────────▶│       resolution hop         │
//!                 │  validate +  │   traceparent    │                              │
//!   ◀──────────── │   forward    │◀─────────────────│  validate                    │
//!                 └──────────────┘   relay verbatim │    → race BrasilAPI/ViaCEP   │──▶ providers
//!                                                   │    → WeatherAPI (Celsius)    │──▶ weather
//!                                                   │    → convert C/F/K           │
//!                                                   └──────────────────────────────┘
//! ```
//!
//! One binary serves either hop; the subcommand picks which.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tokio::net::TcpListener;

use cep_temp::config::{load_config, Role};
use cep_temp::lifecycle::{signals, Shutdown};
use cep_temp::observability::{logging, metrics, Tracer};
use cep_temp::HttpServer;

#[derive(Parser)]
#[command(name = "cep-temp")]
#[command(about = "Postal code to temperature service", long_about = None)]
struct Cli {
    /// Optional TOML configuration file; environment variables override it.
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the front-facing hop that validates and forwards
    Edge,
    /// Run the hop that resolves locations and looks up temperatures
    Resolver,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let role = match cli.command {
        Commands::Edge => Role::Edge,
        Commands::Resolver => Role::Resolver,
    };

    let config = load_config(cli.config.as_deref(), role)?;
    logging::init(&config.observability)?;

    let service = config.observability.service_name(role);
    tracing::info!(
        role = %role,
        service = %service,
        bind_address = %config.bind_address(role),
        request_timeout_secs = config.timeouts.request_secs,
        "cep-temp v{} starting",
        env!("CARGO_PKG_VERSION")
    );

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    let tracer = Tracer::new(service, config.observability.trace_sampled);
    let server = match role {
        Role::Edge => HttpServer::edge(&config, tracer)?,
        Role::Resolver => HttpServer::resolver(&config, tracer)?,
    };

    let listener = TcpListener::bind(config.bind_address(role)).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let stopped = shutdown.wait();
    tokio::spawn(signals::wait_for_signal(shutdown));

    server.run(listener, stopped).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
