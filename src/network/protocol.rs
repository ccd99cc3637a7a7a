//! Protocol Messages
//!
//! Wire format between the control/display clients and the server over
//! WebSocket. Everything is JSON.

use serde::{Deserialize, Serialize};

use crate::game::action::{Action, ActionError};
use crate::game::events::GameEvent;
use crate::game::snapshot::Snapshot;
use crate::record::GameRecord;

// =============================================================================
// CLIENT -> SERVER MESSAGES
// =============================================================================

/// Messages sent from client to server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Submit an action.
    Action { action: Action },

    /// Request the current snapshot.
    SyncRequest,

    /// Finish the current game and record it.
    Finish,

    /// Ping for latency measurement.
    Ping { timestamp: u64 },
}

// =============================================================================
// SERVER -> CLIENT MESSAGES
// =============================================================================

/// Messages sent from server to client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Full session snapshot.
    State { snapshot: Box<Snapshot> },

    /// Result of the sender's own action.
    ActionResult(ActionResult),

    /// Game event notification.
    Event { event: GameEvent },

    /// A finished game was recorded.
    GameRecorded { record: Box<GameRecord> },

    /// Pong response.
    Pong { timestamp: u64, server_time: u64 },

    /// Error message.
    Error(ServerError),

    /// Server is shutting down.
    Shutdown { reason: String },
}

/// Outcome of one submitted action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionResult {
    /// Whether the action was accepted.
    pub ok: bool,
    /// Rejection reason, if not.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ActionResult {
    /// Accepted.
    pub fn ok() -> Self {
        Self { ok: true, error: None }
    }

    /// Rejected with a reason.
    pub fn rejected(error: &ActionError) -> Self {
        Self { ok: false, error: Some(error.to_string()) }
    }
}

/// Server error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerError {
    /// Error code.
    pub code: ErrorCode,
    /// Human-readable message.
    pub message: String,
}

/// Error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Message could not be parsed.
    InvalidInput,
    /// Nothing to finish.
    NoActiveGame,
    /// The result sink failed.
    RecordFailed,
    /// Server overloaded.
    ServerOverloaded,
    /// Internal error.
    InternalError,
}

// =============================================================================
// SERIALIZATION HELPERS
// =============================================================================

impl ClientMessage {
    /// Serialize to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON string.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

impl ServerMessage {
    /// Serialize to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON string.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }

    /// Snapshot broadcast.
    pub fn state(snapshot: Snapshot) -> Self {
        ServerMessage::State { snapshot: Box::new(snapshot) }
    }

    /// Error message.
    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        ServerMessage::Error(ServerError { code, message: message.into() })
    }
}
