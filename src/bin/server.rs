//! NestDB Server Binary
//!
//! Starts the TCP server for NestDB.

use std::sync::Arc;

use clap::Parser;
use nestdb::network::Server;
use nestdb::{Config, DatabaseRegistry};
use signal_hook::consts::{SIGINT, SIGTERM};
use signal_hook::flag;
use tracing_subscriber::{fmt, EnvFilter};

/// NestDB Server
#[derive(Parser, Debug)]
#[command(name = "nestdb-server")]
#[command(about = "Document store served over a line-based TCP protocol")]
#[command(version)]
struct Args {
    /// Data directory (one sub-directory per database)
    #[arg(short, long, default_value = "./databases")]
    data_dir: String,

    /// Listen address (host:port)
    #[arg(short, long, default_value = "127.0.0.1:8080")]
    listen: String,

    /// Maximum concurrent connections
    #[arg(short, long, default_value = "1024")]
    max_connections: usize,

    /// Soft deadline for a single operation, in seconds
    #[arg(short = 't', long, default_value = "5")]
    op_timeout_secs: u64,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,nestdb=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    tracing::info!("NestDB Server v{}", nestdb::VERSION);
    tracing::info!("Data directory: {}", args.data_dir);
    tracing::info!("Listen address: {}", args.listen);

    // Build config from args
    let config = Config::builder()
        .data_dir(&args.data_dir)
        .listen_addr(&args.listen)
        .max_connections(args.max_connections)
        .op_timeout_ms(args.op_timeout_secs.saturating_mul(1000))
        .build();

    if let Err(e) = config.validate() {
        tracing::error!("Invalid configuration: {}", e);
        std::process::exit(1);
    }

    if let Err(e) = std::fs::create_dir_all(&config.data_dir) {
        tracing::error!("Failed to create data directory {}: {}", args.data_dir, e);
        std::process::exit(1);
    }

    let registry = Arc::new(DatabaseRegistry::from_config(&config));
    let mut server = Server::new(config, registry);

    // SIGINT / SIGTERM set the flag; the accept loop notices within one poll
    let shutdown = server.shutdown_handle();
    for signal in [SIGINT, SIGTERM] {
        if let Err(e) = flag::register(signal, Arc::clone(&shutdown)) {
            tracing::error!("Failed to install signal handler: {}", e);
            std::process::exit(1);
        }
    }

    if let Err(e) = server.run() {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }

    tracing::info!("Server stopped");
}
