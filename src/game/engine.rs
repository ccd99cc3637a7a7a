//! Score Engines
//!
//! `GameType` names the game; `GameInstance` holds the one active engine.
//! Dispatch is on the variant, never on which keys a payload happens to have.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::hash::StateHasher;
use crate::game::action::ActionError;
use crate::game::clock::AroundTheClock;
use crate::game::cricket::Cricket;
use crate::game::leaderboard::Leaderboard;
use crate::game::ohone::OhOne;
use crate::game::participant::Participant;
use crate::game::roster::Settings;

/// Selectable game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameType {
    /// Countdown from the start score.
    #[serde(rename = "501")]
    OhOne,
    /// Close 15-20 and bull.
    #[serde(rename = "cricket")]
    Cricket,
    /// Hit 1 to 20, then bull.
    #[serde(rename = "atc")]
    AroundTheClock,
    /// Free-form points.
    #[serde(rename = "leaderboard")]
    Leaderboard,
    /// Championship bracket match (implicit in championship mode).
    #[serde(rename = "match")]
    Match,
}

impl GameType {
    /// Wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            GameType::OhOne => "501",
            GameType::Cricket => "cricket",
            GameType::AroundTheClock => "atc",
            GameType::Leaderboard => "leaderboard",
            GameType::Match => "match",
        }
    }
}

impl fmt::Display for GameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses the games a client may pick; "match" is never selectable.
impl FromStr for GameType {
    type Err = ActionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "501" => Ok(GameType::OhOne),
            "cricket" => Ok(GameType::Cricket),
            "atc" => Ok(GameType::AroundTheClock),
            "leaderboard" => Ok(GameType::Leaderboard),
            other => Err(ActionError::UnknownGame(other.to_string())),
        }
    }
}

/// The active engine for FFA or teams play.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "game")]
pub enum GameInstance {
    /// 501 engine.
    #[serde(rename = "501")]
    OhOne(OhOne),
    /// Cricket engine.
    #[serde(rename = "cricket")]
    Cricket(Cricket),
    /// Around-the-clock engine.
    #[serde(rename = "atc")]
    AroundTheClock(AroundTheClock),
    /// Leaderboard.
    #[serde(rename = "leaderboard")]
    Leaderboard(Leaderboard),
}

impl GameInstance {
    /// Fresh engine over `seats`. `None` for [`GameType::Match`], which the
    /// bracket owns.
    pub fn new(game: GameType, seats: &[Participant], settings: &Settings) -> Option<Self> {
        match game {
            GameType::OhOne => Some(GameInstance::OhOne(OhOne::new(
                seats,
                settings.start_score,
                settings.double_out,
            ))),
            GameType::Cricket => Some(GameInstance::Cricket(Cricket::new(seats))),
            GameType::AroundTheClock => Some(GameInstance::AroundTheClock(AroundTheClock::new(seats))),
            GameType::Leaderboard => Some(GameInstance::Leaderboard(Leaderboard::new(seats))),
            GameType::Match => None,
        }
    }

    /// Which game this is.
    pub fn game_type(&self) -> GameType {
        match self {
            GameInstance::OhOne(_) => GameType::OhOne,
            GameInstance::Cricket(_) => GameType::Cricket,
            GameInstance::AroundTheClock(_) => GameType::AroundTheClock,
            GameInstance::Leaderboard(_) => GameType::Leaderboard,
        }
    }

    /// Winner, if the game has one yet. The leaderboard never does.
    pub fn winner(&self) -> Option<&Participant> {
        match self {
            GameInstance::OhOne(g) => g.winner(),
            GameInstance::Cricket(g) => g.winner(),
            GameInstance::AroundTheClock(g) => g.winner(),
            GameInstance::Leaderboard(_) => None,
        }
    }

    /// Final value per participant for the record handoff.
    pub fn final_scores(&self) -> Vec<(Participant, i64)> {
        match self {
            GameInstance::OhOne(g) => g.final_scores(),
            GameInstance::Cricket(g) => g.final_scores(),
            GameInstance::AroundTheClock(g) => g.final_scores(),
            GameInstance::Leaderboard(g) => g.final_scores(),
        }
    }

    /// Hash engine state, tagged by game.
    pub fn hash_into(&self, hasher: &mut StateHasher) {
        hasher.update_str(self.game_type().as_str());
        match self {
            GameInstance::OhOne(g) => g.hash_into(hasher),
            GameInstance::Cricket(g) => g.hash_into(hasher),
            GameInstance::AroundTheClock(g) => g.hash_into(hasher),
            GameInstance::Leaderboard(g) => g.hash_into(hasher),
        }
    }
}
