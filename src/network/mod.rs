//! Network Layer
//!
//! WebSocket server for the display and control clients.
//! This layer is **non-deterministic** - all scoring runs through `game/`.

pub mod protocol;
pub mod session;
pub mod server;

pub use protocol::{ActionResult, ClientMessage, ErrorCode, ServerError, ServerMessage};
pub use session::{FinishError, SessionError, SharedSession};
pub use server::{GameServer, ServerConfig, GameServerError};
