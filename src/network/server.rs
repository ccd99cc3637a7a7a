//! WebSocket Game Server
//!
//! Async WebSocket server for the scoreboard display and control devices.
//! Every client sees the same shared session; any client may submit actions.

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{broadcast, mpsc, RwLock};
use tokio_tungstenite::{accept_async, tungstenite::Message};
use futures_util::{SinkExt, StreamExt};
use tracing::{info, warn, error, debug, instrument};

use crate::game::action::Action;
use crate::network::protocol::{ActionResult, ClientMessage, ErrorCode, ServerMessage};
use crate::network::session::{FinishError, SessionError, SharedSession};

/// Per-client outbound queue depth.
const CLIENT_QUEUE: usize = 64;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address.
    pub bind_addr: SocketAddr,
    /// Maximum concurrent connections.
    pub max_connections: usize,
    /// JSON-lines results file; in-memory when unset.
    pub results_path: Option<PathBuf>,
    /// Fixed bracket seed, for rehearsals.
    pub bracket_seed: Option<u64>,
    /// Server version string.
    pub version: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 5000)),
            max_connections: 64,
            results_path: None,
            bracket_seed: None,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

impl ServerConfig {
    /// Read `DARTS_*` environment variables over the defaults.
    pub fn from_env() -> Result<Self, GameServerError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Unset keys keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, GameServerError> {
        let mut config = Self::default();

        if let Some(value) = lookup("DARTS_BIND_ADDR") {
            config.bind_addr = parse_setting("DARTS_BIND_ADDR", &value)?;
        }
        if let Some(value) = lookup("DARTS_MAX_CONNECTIONS") {
            config.max_connections = parse_setting("DARTS_MAX_CONNECTIONS", &value)?;
        }
        if let Some(value) = lookup("DARTS_RESULTS_PATH") {
            if !value.trim().is_empty() {
                config.results_path = Some(PathBuf::from(value.trim()));
            }
        }
        if let Some(value) = lookup("DARTS_BRACKET_SEED") {
            config.bracket_seed = Some(parse_setting("DARTS_BRACKET_SEED", &value)?);
        }

        Ok(config)
    }
}

fn parse_setting<T: std::str::FromStr>(key: &'static str, value: &str) -> Result<T, GameServerError> {
    value.trim().parse().map_err(|_| GameServerError::InvalidConfig {
        key,
        value: value.to_string(),
    })
}

/// Game server errors.
#[derive(Debug, thiserror::Error)]
pub enum GameServerError {
    /// Failed to bind to address.
    #[error("Failed to bind: {0}")]
    BindFailed(#[from] std::io::Error),

    /// WebSocket error.
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// A configuration value did not parse.
    #[error("Invalid value for {key}: {value:?}")]
    InvalidConfig {
        /// Environment key.
        key: &'static str,
        /// Offending value.
        value: String,
    },
}

/// Connected client state.
struct ConnectedClient {
    /// Connection time.
    connected_at: Instant,
    /// Messages handled.
    messages: u64,
}

/// The game server.
pub struct GameServer {
    /// Server configuration.
    config: ServerConfig,
    /// The shared scoring session.
    session: SharedSession,
    /// Connected clients.
    clients: Arc<RwLock<BTreeMap<SocketAddr, ConnectedClient>>>,
    /// Shutdown signal.
    shutdown_tx: broadcast::Sender<()>,
}

impl GameServer {
    /// Create a new game server around a session.
    pub fn new(config: ServerConfig, session: SharedSession) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);

        Self {
            config,
            session,
            clients: Arc::new(RwLock::new(BTreeMap::new())),
            shutdown_tx,
        }
    }

    /// Bind the configured address and run until shutdown.
    #[instrument(skip(self))]
    pub async fn run(&self) -> Result<(), GameServerError> {
        let listener = TcpListener::bind(&self.config.bind_addr).await?;
        self.serve(listener).await
    }

    /// Accept connections from an already-bound listener until shutdown.
    pub async fn serve(&self, listener: TcpListener) -> Result<(), GameServerError> {
        info!("Darts server v{} listening on {}", self.config.version, listener.local_addr()?);

        let mut shutdown_rx = self.shutdown_tx.subscribe();

        loop {
            tokio::select! {
                result = listener.accept() => {
                    match result {
                        Ok((stream, addr)) => {
                            let clients_count = self.clients.read().await.len();
                            if clients_count >= self.config.max_connections {
                                warn!("Connection limit reached, rejecting {}", addr);
                                continue;
                            }

                            info!("New connection from {}", addr);
                            self.handle_connection(stream, addr);
                        }
                        Err(e) => {
                            error!("Accept error: {}", e);
                        }
                    }
                }
                _ = shutdown_rx.recv() => {
                    info!("Shutdown signal received");
                    break;
                }
            }
        }

        Ok(())
    }

    /// Handle a new WebSocket connection.
    fn handle_connection(&self, stream: TcpStream, addr: SocketAddr) {
        let clients = self.clients.clone();
        let session = self.session.clone();
        let shutdown_rx = self.shutdown_tx.subscribe();

        tokio::spawn(async move {
            clients.write().await.insert(addr, ConnectedClient {
                connected_at: Instant::now(),
                messages: 0,
            });

            if let Err(e) = Self::serve_client(stream, addr, &clients, &session, shutdown_rx).await {
                error!("Connection {} failed: {}", addr, e);
            }

            if let Some(client) = clients.write().await.remove(&addr) {
                info!(
                    "Client {} cleaned up after {:?}, {} messages",
                    addr,
                    client.connected_at.elapsed(),
                    client.messages
                );
            }
        });
    }

    /// Pump one client until it leaves or the server shuts down.
    async fn serve_client(
        stream: TcpStream,
        addr: SocketAddr,
        clients: &Arc<RwLock<BTreeMap<SocketAddr, ConnectedClient>>>,
        session: &SharedSession,
        mut shutdown_rx: broadcast::Receiver<()>,
    ) -> Result<(), GameServerError> {
        let ws_stream = accept_async(stream).await?;
        let (mut ws_sender, mut ws_receiver) = ws_stream.split();
        let (msg_tx, mut msg_rx) = mpsc::channel::<ServerMessage>(CLIENT_QUEUE);
        let mut updates = session.subscribe();

        // Spawn message sender task
        let sender_task = tokio::spawn(async move {
            while let Some(msg) = msg_rx.recv().await {
                let text = match msg.to_json() {
                    Ok(t) => t,
                    Err(e) => {
                        error!("Failed to serialize message: {}", e);
                        continue;
                    }
                };
                if ws_sender.send(Message::Text(text)).await.is_err() {
                    break;
                }
            }
        });

        // New clients draw the current board straight away
        let _ = msg_tx.send(ServerMessage::state(session.snapshot().await)).await;

        loop {
            tokio::select! {
                msg = ws_receiver.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => {
                            let client_msg = match ClientMessage::from_json(&text) {
                                Ok(m) => m,
                                Err(e) => {
                                    debug!("Invalid message from {}: {}", addr, e);
                                    let _ = msg_tx.send(ServerMessage::error(
                                        ErrorCode::InvalidInput,
                                        format!("Invalid message format: {}", e),
                                    )).await;
                                    continue;
                                }
                            };

                            if let Some(client) = clients.write().await.get_mut(&addr) {
                                client.messages += 1;
                            }

                            Self::handle_client_message(addr, client_msg, session, &msg_tx).await;
                        }
                        Some(Ok(Message::Binary(_))) => {
                            let _ = msg_tx.send(ServerMessage::error(
                                ErrorCode::InvalidInput,
                                "Binary frames are not supported",
                            )).await;
                        }
                        Some(Ok(Message::Close(_))) | None => {
                            debug!("Client {} disconnected", addr);
                            break;
                        }
                        Some(Err(e)) => {
                            sender_task.abort();
                            return Err(e.into());
                        }
                        _ => {}
                    }
                }
                update = updates.recv() => {
                    match update {
                        Ok(msg) => {
                            if msg_tx.send(msg).await.is_err() {
                                break;
                            }
                        }
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            // Missed updates are superseded by a fresh snapshot
                            warn!("Client {} lagged by {} updates, resyncing", addr, skipped);
                            let _ = msg_tx.send(ServerMessage::state(session.snapshot().await)).await;
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    }
                }
                _ = shutdown_rx.recv() => {
                    let _ = msg_tx.send(ServerMessage::Shutdown {
                        reason: "Server shutting down".to_string(),
                    }).await;
                    break;
                }
            }
        }

        // Let queued messages flush before the socket goes
        drop(msg_tx);
        let _ = sender_task.await;
        Ok(())
    }

    /// Handle a client message.
    async fn handle_client_message(
        addr: SocketAddr,
        msg: ClientMessage,
        session: &SharedSession,
        sender: &mpsc::Sender<ServerMessage>,
    ) {
        match msg {
            ClientMessage::Action { action } => {
                Self::handle_action(addr, action, session, sender).await;
            }
            ClientMessage::SyncRequest => {
                let _ = sender.send(ServerMessage::state(session.snapshot().await)).await;
            }
            ClientMessage::Finish => {
                let reply = match session.finish().await {
                    Ok(_) => ServerMessage::ActionResult(ActionResult::ok()),
                    Err(FinishError::NoActiveGame) => {
                        ServerMessage::error(ErrorCode::NoActiveGame, "No game in progress")
                    }
                    Err(e @ FinishError::Sink(_)) => ServerMessage::error(ErrorCode::RecordFailed, e.to_string()),
                };
                let _ = sender.send(reply).await;
            }
            ClientMessage::Ping { timestamp } => {
                let _ = sender.send(ServerMessage::Pong {
                    timestamp,
                    server_time: std::time::SystemTime::now()
                        .duration_since(std::time::UNIX_EPOCH)
                        .unwrap_or_default()
                        .as_millis() as u64,
                }).await;
            }
        }
    }

    /// Handle an action request.
    async fn handle_action(
        addr: SocketAddr,
        action: Action,
        session: &SharedSession,
        sender: &mpsc::Sender<ServerMessage>,
    ) {
        let reply = match session.apply(&action).await {
            Ok(_) => ServerMessage::ActionResult(ActionResult::ok()),
            Err(SessionError::Rejected(e)) => {
                warn!("Rejected {} from {}: {}", action.name(), addr, e);
                ServerMessage::ActionResult(ActionResult::rejected(&e))
            }
            Err(SessionError::Finish(e)) => ServerMessage::error(ErrorCode::RecordFailed, e.to_string()),
        };
        let _ = sender.send(reply).await;
    }

    /// Shutdown the server.
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());
    }

    /// Get active connection count.
    pub async fn connection_count(&self) -> usize {
        self.clients.read().await.len()
    }

    /// The shared session.
    pub fn session(&self) -> &SharedSession {
        &self.session
    }
}
