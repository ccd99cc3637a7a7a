//! Finished-game records.
//!
//! The normalized shape handed to storage when a game is finished: who took
//! part, what they ended on, and who won. Storage needs nothing else from the
//! session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::game::engine::GameType;
use crate::game::participant::TeamSide;
use crate::game::roster::Mode;

/// One participant's line in a finished game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantResult {
    /// Player, team member or entrant name.
    pub name: String,
    /// Team, in teams mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub side: Option<TeamSide>,
    /// Remaining (501), points (cricket, leaderboard), target (around the
    /// clock) or matches won (championship).
    pub final_score: i64,
    /// Won the game or the tournament.
    pub won: bool,
}

/// A finished game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRecord {
    /// Unique record id.
    pub id: Uuid,
    /// Game played.
    pub game: GameType,
    /// Mode it was played in.
    pub mode: Mode,
    /// When the game was started.
    pub started_at: DateTime<Utc>,
    /// When it was finished.
    pub ended_at: DateTime<Utc>,
    /// Winner display label, if the game had one.
    pub winner: Option<String>,
    /// Per-participant results, roster order.
    pub results: Vec<ParticipantResult>,
}

impl GameRecord {
    /// New record with a fresh id.
    pub fn new(
        game: GameType,
        mode: Mode,
        started_at: DateTime<Utc>,
        ended_at: DateTime<Utc>,
        winner: Option<String>,
        results: Vec<ParticipantResult>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            game,
            mode,
            started_at,
            ended_at,
            winner,
            results,
        }
    }

    /// Names of everyone flagged as a winner.
    pub fn winners(&self) -> impl Iterator<Item = &str> {
        self.results.iter().filter(|r| r.won).map(|r| r.name.as_str())
    }
}
