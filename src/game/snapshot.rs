//! Session Snapshot
//!
//! Read-only projection of the session for displays. Field names follow the
//! JSON the control and display surfaces poll.

use serde::{Deserialize, Serialize};

use crate::game::bracket::Bracket;
use crate::game::engine::{GameInstance, GameType};
use crate::game::participant::{Participant, TeamSide};
use crate::game::roster::{Mode, Settings};

/// Team rosters and rotation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamsView {
    /// Team A roster.
    #[serde(rename = "A")]
    pub a: Vec<Participant>,
    /// Team B roster.
    #[serde(rename = "B")]
    pub b: Vec<Participant>,
    /// Side on throw.
    pub team_turn: TeamSide,
    /// Highlighted roster index, taken mod the roster length.
    pub team_current: usize,
}

/// Tournament field and bracket.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TournamentView {
    /// Entrants.
    pub players: Vec<Participant>,
    /// Bracket, once the championship has started.
    pub bracket: Option<Bracket>,
}

/// Everything a display needs to draw the session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Session mode.
    pub mode: Mode,
    /// Selected game.
    pub game: Option<GameType>,
    /// A game is in progress.
    pub started: bool,
    /// FFA players, turn order.
    pub players: Vec<Participant>,
    /// FFA rotation index.
    pub current: usize,
    /// Game settings.
    pub settings: Settings,
    /// Team rosters and rotation.
    pub teams: TeamsView,
    /// Championship field and bracket.
    pub tournament: TournamentView,
    /// Active engine payload, tagged by game.
    pub data: Option<GameInstance>,
    /// Winner display label ("Ann", "Team A").
    pub winner: Option<String>,
    /// Who is on the oche, or the bracket status.
    pub turn_label: String,
    /// Hex SHA-256 of the session state.
    pub state_hash: String,
}

impl Snapshot {
    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
