use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rendezvous::server::{DEFAULT_WS_PATH, ServerConfig, serve};
use std::net::SocketAddr;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "rendezvous", version, about = "Room-scoped peer address exchange server")]
struct Cli {
    /// Default log filter when RUST_LOG is not set.
    #[arg(long, env = "RENDEZVOUS_LOG", default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Accept WebSocket peers and introduce them to their room.
    Serve {
        #[arg(long, env = "RENDEZVOUS_BIND", default_value = "0.0.0.0:8080")]
        bind: SocketAddr,

        #[arg(long, env = "RENDEZVOUS_WS_PATH", default_value = DEFAULT_WS_PATH)]
        path: String,

        /// Seconds a new connection gets to send its address report; 0 waits forever.
        #[arg(long, env = "RENDEZVOUS_HANDSHAKE_TIMEOUT_SECS", default_value_t = 10)]
        handshake_timeout_secs: u64,
    },
}

fn init_tracing(default_level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .context("Invalid log filter")?;

    tracing_subscriber::fmt().with_env_filter(filter).init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level)?;

    match cli.command {
        Commands::Serve {
            bind,
            path,
            handshake_timeout_secs,
        } => {
            let config = ServerConfig {
                bind_addr: bind,
                ws_path: path,
                handshake_timeout: (handshake_timeout_secs > 0)
                    .then(|| Duration::from_secs(handshake_timeout_secs)),
            };

            info!("Starting rendezvous server with {:?}", config);
            serve(config).await?;
        }
    }

    Ok(())
}
