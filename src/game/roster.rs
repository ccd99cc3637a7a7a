//! Roster Configuration
//!
//! Who is playing and under which settings. Survives game restarts; only a
//! session reset replaces it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::hash::StateHasher;
use crate::game::action::ActionError;
use crate::game::participant::{normalize_names, Participant, TeamSide};

/// Default 501 start score.
pub const DEFAULT_START_SCORE: i64 = 501;
/// Allowed 501 start scores.
pub const START_SCORE_RANGE: (i64, i64) = (101, 1001);
/// Default championship match start score.
pub const DEFAULT_MATCH_START: i64 = 301;
/// Allowed championship match start scores.
pub const MATCH_START_RANGE: (i64, i64) = (101, 501);
/// Synthetic team roster size.
pub const DEFAULT_TEAM_SIZE: usize = 10;
/// Synthetic tournament field size.
pub const DEFAULT_ENTRANTS: usize = 8;

// =============================================================================
// MODE
// =============================================================================

/// Session mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Everyone plays individually in one rotation.
    #[default]
    Ffa,
    /// Team A against Team B.
    Teams,
    /// Single-elimination tournament.
    Championship,
}

impl Mode {
    /// Wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Ffa => "ffa",
            Mode::Teams => "teams",
            Mode::Championship => "championship",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = ActionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ffa" => Ok(Mode::Ffa),
            "teams" => Ok(Mode::Teams),
            "championship" => Ok(Mode::Championship),
            other => Err(ActionError::UnknownMode(other.to_string())),
        }
    }
}

// =============================================================================
// SETTINGS
// =============================================================================

/// Numeric game settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// 501 start score (101..=1001).
    pub start_score: i64,
    /// Finishing throw must be even or a bullseye.
    pub double_out: bool,
    /// Championship match start score (101..=501).
    pub match_start: i64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            start_score: DEFAULT_START_SCORE,
            double_out: false,
            match_start: DEFAULT_MATCH_START,
        }
    }
}

impl Settings {
    /// Set the 501 start score, clamped into range.
    pub fn set_start_score(&mut self, start: i64) {
        self.start_score = start.clamp(START_SCORE_RANGE.0, START_SCORE_RANGE.1);
    }

    /// Set the championship match start score, clamped into range.
    pub fn set_match_start(&mut self, start: i64) {
        self.match_start = start.clamp(MATCH_START_RANGE.0, MATCH_START_RANGE.1);
    }
}

// =============================================================================
// ROSTER CONFIG
// =============================================================================

/// Participant lists plus global settings.
///
/// Invariant: no roster is ever empty. Every setter falls back to a
/// synthesized default instead of storing an empty list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterConfig {
    /// Current mode.
    pub mode: Mode,
    /// Numeric settings.
    pub settings: Settings,
    /// FFA players; order is turn order.
    players: Vec<Participant>,
    /// Team A roster (display only).
    team_a: Vec<Participant>,
    /// Team B roster (display only).
    team_b: Vec<Participant>,
    /// Tournament entrants.
    entrants: Vec<Participant>,
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            mode: Mode::Ffa,
            settings: Settings::default(),
            players: default_players(),
            team_a: default_team(TeamSide::A),
            team_b: default_team(TeamSide::B),
            entrants: default_entrants(),
        }
    }
}

impl RosterConfig {
    /// FFA players in turn order.
    pub fn players(&self) -> &[Participant] {
        &self.players
    }

    /// Roster of one team.
    pub fn team(&self, side: TeamSide) -> &[Participant] {
        match side {
            TeamSide::A => &self.team_a,
            TeamSide::B => &self.team_b,
        }
    }

    /// Tournament entrants.
    pub fn entrants(&self) -> &[Participant] {
        &self.entrants
    }

    /// Replace the FFA roster; falls back to two synthetic players.
    pub fn set_players<S: AsRef<str>>(&mut self, raw: &[S]) {
        let players = normalize_names(raw);
        self.players = if players.is_empty() { default_players() } else { players };
    }

    /// Replace both team rosters; each side falls back independently.
    pub fn set_teams<S: AsRef<str>>(&mut self, raw_a: &[S], raw_b: &[S]) {
        let a = normalize_names(raw_a);
        let b = normalize_names(raw_b);
        self.team_a = if a.is_empty() { default_team(TeamSide::A) } else { a };
        self.team_b = if b.is_empty() { default_team(TeamSide::B) } else { b };
    }

    /// Replace the tournament field; fewer than two names falls back to eight.
    pub fn set_entrants<S: AsRef<str>>(&mut self, raw: &[S]) {
        let entrants = normalize_names(raw);
        self.entrants = if entrants.len() < 2 { default_entrants() } else { entrants };
    }

    /// Hash roster and settings for state verification.
    pub fn hash_into(&self, hasher: &mut StateHasher) {
        hasher.update_str(self.mode.as_str());
        hasher.update_i64(self.settings.start_score);
        hasher.update_bool(self.settings.double_out);
        hasher.update_i64(self.settings.match_start);
        for list in [&self.players, &self.team_a, &self.team_b, &self.entrants] {
            hasher.update_usize(list.len());
            for p in list.iter() {
                hasher.update_str(p.name());
            }
        }
    }
}

fn default_players() -> Vec<Participant> {
    vec![Participant::new("Player 1"), Participant::new("Player 2")]
}

fn default_team(side: TeamSide) -> Vec<Participant> {
    (1..=DEFAULT_TEAM_SIZE)
        .map(|i| Participant::new(format!("{}{}", side.code(), i)))
        .collect()
}

fn default_entrants() -> Vec<Participant> {
    (1..=DEFAULT_ENTRANTS)
        .map(|i| Participant::new(format!("P{}", i)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_never_empty() {
        let roster = RosterConfig::default();
        assert_eq!(roster.players().len(), 2);
        assert_eq!(roster.team(TeamSide::A).len(), DEFAULT_TEAM_SIZE);
        assert_eq!(roster.team(TeamSide::B)[0].name(), "B1");
        assert_eq!(roster.entrants().len(), DEFAULT_ENTRANTS);
    }

    #[test]
    fn test_blank_players_fall_back() {
        let mut roster = RosterConfig::default();
        roster.set_players(&["  ", ""]);
        assert_eq!(roster.players()[0].name(), "Player 1");
    }

    #[test]
    fn test_teams_fall_back_per_side() {
        let mut roster = RosterConfig::default();
        roster.set_teams(&["Ann", "Bo"], &[]);
        assert_eq!(roster.team(TeamSide::A).len(), 2);
        assert_eq!(roster.team(TeamSide::B).len(), DEFAULT_TEAM_SIZE);
    }

    #[test]
    fn test_single_entrant_falls_back_to_eight() {
        let mut roster = RosterConfig::default();
        roster.set_entrants(&["Solo"]);
        assert_eq!(roster.entrants().len(), 8);
        assert_eq!(roster.entrants()[7].name(), "P8");

        roster.set_entrants(&["Ann", "Bo"]);
        assert_eq!(roster.entrants().len(), 2);
    }

    #[test]
    fn test_settings_clamp() {
        let mut settings = Settings::default();
        settings.set_start_score(5000);
        assert_eq!(settings.start_score, 1001);
        settings.set_start_score(3);
        assert_eq!(settings.start_score, 101);
        settings.set_match_start(1001);
        assert_eq!(settings.match_start, 501);
    }

    #[test]
    fn test_mode_parse() {
        assert_eq!("teams".parse::<Mode>().ok(), Some(Mode::Teams));
        assert!(matches!("darts".parse::<Mode>(), Err(ActionError::UnknownMode(_))));
    }
}
