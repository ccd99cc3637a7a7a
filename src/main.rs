//! Darts Party Server
//!
//! Serves one live scoring session to the scoreboard display and the
//! control devices over WebSocket.

use std::sync::Arc;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use darts_party::{
    core::rng::DeterministicRng,
    network::{GameServer, ServerConfig, SharedSession},
    record::{JsonLinesSink, MemorySink, ResultSink},
    Session, VERSION,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Darts Party Server v{}", VERSION);

    let config = ServerConfig::from_env().context("reading DARTS_* configuration")?;

    let sink: Arc<dyn ResultSink> = match &config.results_path {
        Some(path) => {
            let sink = JsonLinesSink::new(path);
            info!("Recording finished games to {}", sink.path().display());
            Arc::new(sink)
        }
        None => {
            info!("No results file configured, keeping finished games in memory");
            Arc::new(MemorySink::new())
        }
    };

    let rng = match config.bracket_seed {
        Some(seed) => {
            info!("Bracket seed fixed at {}", seed);
            DeterministicRng::new(seed)
        }
        None => DeterministicRng::from_entropy(),
    };

    let session = SharedSession::new(Session::new(rng), sink);
    let server = Arc::new(GameServer::new(config, session));

    let signal_server = server.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Ctrl-C received");
            signal_server.shutdown();
        }
    });

    server.run().await.context("running server")?;
    info!("Server stopped");
    Ok(())
}
