//! Action Requests
//!
//! One request type for every operation a control device can submit, plus
//! the rejection reasons. Parameters a client leaves out take the same
//! defaults the control surface would have sent.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::game::roster::{DEFAULT_MATCH_START, DEFAULT_START_SCORE};

// =============================================================================
// ERRORS
// =============================================================================

/// Why an action was rejected. A rejected action never changes the session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    /// Mode name not one of ffa, teams, championship.
    #[error("unknown mode: {0}")]
    UnknownMode(String),

    /// Game name not one of 501, cricket, atc, leaderboard.
    #[error("unknown game: {0}")]
    UnknownGame(String),

    /// Action does not fit the current mode or game.
    #[error("{action} is not valid for the current mode/game")]
    NotApplicable { action: &'static str },

    /// Nothing is being played.
    #[error("no game in progress")]
    NoActiveGame,

    /// The bracket cannot move on until the current match is won.
    #[error("current match has no winner yet")]
    MatchUndecided,

    /// The engine has no seat for this participant.
    #[error("unknown participant: {0}")]
    UnknownParticipant(String),
}

// =============================================================================
// PARAMETERS
// =============================================================================

/// Cricket number as sent by a client: `20` or `"20"` / `"bull"`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CricketTarget {
    /// Plain number, `20`.
    Number(i64),
    /// Text, `"20"` or `"bull"`.
    Label(String),
}

impl CricketTarget {
    /// Text form handed to the cricket engine.
    pub fn label(&self) -> String {
        match self {
            CricketTarget::Number(n) => n.to_string(),
            CricketTarget::Label(s) => s.clone(),
        }
    }
}

impl Default for CricketTarget {
    fn default() -> Self {
        CricketTarget::Label("20".to_string())
    }
}

fn default_mode() -> String {
    "ffa".to_string()
}

fn default_start_score() -> i64 {
    DEFAULT_START_SCORE
}

fn default_match_start() -> i64 {
    DEFAULT_MATCH_START
}

fn default_hits() -> i64 {
    1
}

// =============================================================================
// ACTION
// =============================================================================

/// A request to change the session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    /// Throw everything away and start over with defaults.
    Reset,

    /// Switch mode; clears the active game.
    SetMode {
        #[serde(default = "default_mode")]
        mode: String,
    },

    /// Replace the FFA roster.
    SetPlayers {
        #[serde(default)]
        players: Vec<String>,
    },

    /// Replace both team rosters.
    SetTeams {
        #[serde(rename = "A", default)]
        a: Vec<String>,
        #[serde(rename = "B", default)]
        b: Vec<String>,
    },

    /// Replace the tournament field and drop any bracket.
    SetTournamentPlayers {
        #[serde(default)]
        players: Vec<String>,
    },

    /// Championship match start score.
    SetMatchStart {
        #[serde(default = "default_match_start")]
        start: i64,
    },

    /// 501 start score and double-out rule.
    #[serde(rename = "set_501_settings")]
    Set501Settings {
        #[serde(default = "default_start_score")]
        start: i64,
        #[serde(rename = "doubleOut", default)]
        double_out: bool,
    },

    /// Start a game. Ignored in championship mode, which always plays "match".
    StartGame {
        #[serde(default)]
        game: Option<String>,
    },

    /// Pass the turn (FFA and teams).
    Next,

    /// Move to the next bracket match (championship).
    NextMatch,

    /// 501 turn total.
    #[serde(rename = "501_add")]
    OhOneAdd {
        #[serde(default)]
        score: i64,
    },

    /// Cricket marks.
    CricketHit {
        #[serde(default)]
        number: CricketTarget,
        #[serde(default = "default_hits")]
        hits: i64,
    },

    /// Around-the-clock attempt.
    AtcHit {
        #[serde(default)]
        success: bool,
    },

    /// Leaderboard points.
    LbAdd {
        #[serde(default)]
        points: i64,
    },

    /// Championship match turn total.
    MatchAdd {
        #[serde(default)]
        score: i64,
    },

    /// End the current game and hand its result to the record sink.
    FinishGame,
}

impl Action {
    /// Wire name, for logs and rejections.
    pub fn name(&self) -> &'static str {
        match self {
            Action::Reset => "reset",
            Action::SetMode { .. } => "set_mode",
            Action::SetPlayers { .. } => "set_players",
            Action::SetTeams { .. } => "set_teams",
            Action::SetTournamentPlayers { .. } => "set_tournament_players",
            Action::SetMatchStart { .. } => "set_match_start",
            Action::Set501Settings { .. } => "set_501_settings",
            Action::StartGame { .. } => "start_game",
            Action::Next => "next",
            Action::NextMatch => "next_match",
            Action::OhOneAdd { .. } => "501_add",
            Action::CricketHit { .. } => "cricket_hit",
            Action::AtcHit { .. } => "atc_hit",
            Action::LbAdd { .. } => "lb_add",
            Action::MatchAdd { .. } => "match_add",
            Action::FinishGame => "finish_game",
        }
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
