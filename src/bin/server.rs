//! TagKV Server Binary
//!
//! Starts the TCP server for TagKV.

use std::sync::Arc;

use clap::Parser;
use tagkv::{Config, Server, Store};
use tracing_subscriber::{fmt, EnvFilter};

/// TagKV Server
#[derive(Parser, Debug)]
#[command(name = "tagkv-server")]
#[command(about = "In-memory key-value server with a type-prefixed wire protocol")]
#[command(version)]
struct Args {
    /// Host address to bind
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// TCP port to listen on
    #[arg(short, long, default_value = "31337")]
    port: u16,

    /// Maximum concurrent client connections (worker pool size)
    #[arg(short, long, default_value = "64")]
    max_connections: usize,

    /// Close connections idle for this many milliseconds (0 = never)
    #[arg(long, default_value = "0")]
    idle_timeout_ms: u64,

    /// Deepest array/map nesting accepted in a request
    #[arg(long, default_value = "32")]
    max_depth: usize,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tagkv=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    tracing::info!("TagKV Server v{}", tagkv::VERSION);

    // Build config from args
    let config = Config::builder()
        .host(&args.host)
        .port(args.port)
        .max_connections(args.max_connections)
        .read_timeout_ms(args.idle_timeout_ms)
        .max_depth(args.max_depth)
        .build();

    tracing::info!("Listen address: {}", config.listen_addr());

    let store = Arc::new(Store::new());

    let server = match Server::bind(config, store) {
        Ok(server) => server,
        Err(e) => {
            tracing::error!("Failed to start server: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = server.run() {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }

    tracing::info!("Server stopped");
}
