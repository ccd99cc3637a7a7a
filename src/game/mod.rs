//! Game Logic Module
//!
//! The scoring core. Deterministic given the RNG seed; no I/O.
//!
//! ## Module Structure
//!
//! - `participant`: identities, team sides, bracket slots
//! - `roster`: rosters, mode and settings
//! - `turn`: FFA, team and head-to-head rotation
//! - `ohone`, `cricket`, `clock`, `leaderboard`: score engines
//! - `engine`: game selection and the active-engine union
//! - `bracket`: single-elimination championship
//! - `action`: action requests and rejections
//! - `events`: game events for displays
//! - `session`: the aggregate root
//! - `snapshot`: read-only projection

pub mod participant;
pub mod roster;
pub mod turn;
pub mod ohone;
pub mod cricket;
pub mod clock;
pub mod leaderboard;
pub mod engine;
pub mod bracket;
pub mod action;
pub mod events;
pub mod session;
pub mod snapshot;

// Re-export key types
pub use action::{Action, ActionError, CricketTarget};
pub use bracket::{Bracket, Match};
pub use engine::{GameInstance, GameType};
pub use events::{GameEvent, GameEventData};
pub use participant::{Participant, Slot, TeamSide};
pub use roster::{Mode, RosterConfig, Settings};
pub use session::{ActionOutcome, Session};
pub use snapshot::Snapshot;
