//! # Darts Party Server
//!
//! Live scoring for a darts party: one shared scoreboard display, any number
//! of control devices, one authoritative session.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    DARTS PARTY SERVER                        │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Deterministic primitives                  │
//! │  ├── rng.rs      - Deterministic Xorshift128+ PRNG           │
//! │  └── hash.rs     - State hashing for snapshots               │
//! │                                                              │
//! │  game/           - Scoring logic (deterministic)             │
//! │  ├── roster.rs   - Mode, rosters and settings                │
//! │  ├── turn.rs     - FFA, team and head-to-head rotation       │
//! │  ├── ohone.rs    - 501 engine                                │
//! │  ├── cricket.rs  - Cricket engine                            │
//! │  ├── clock.rs    - Around-the-clock engine                   │
//! │  ├── leaderboard.rs - Free-form points                       │
//! │  ├── bracket.rs  - Single-elimination championship           │
//! │  ├── session.rs  - Action dispatch (aggregate root)          │
//! │  └── snapshot.rs - Read-only projection                      │
//! │                                                              │
//! │  record/         - Finished-game records and sinks           │
//! │  display/        - Presenters                                │
//! │                                                              │
//! │  network/        - Networking (non-deterministic)            │
//! │  ├── server.rs   - WebSocket server                          │
//! │  ├── protocol.rs - Message types                             │
//! │  └── session.rs  - Shared, lock-guarded session              │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Determinism
//!
//! The `core/` and `game/` modules do no I/O and never read the clock on
//! their own. Bracket shuffles come from a seeded Xorshift128+, so a session
//! replayed with the same seed and actions ends in the same state hash.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod display;
pub mod game;
pub mod network;
pub mod record;

// Re-export commonly used types
pub use core::rng::DeterministicRng;
pub use display::{Presenter, TextScoreboard};
pub use game::{Action, ActionError, GameType, Mode, Session, Snapshot};
pub use record::{GameRecord, ResultSink};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
