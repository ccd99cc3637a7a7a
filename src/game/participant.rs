//! Participants
//!
//! A participant is whoever owns a score: a player name in free-for-all, a
//! team label in teams mode, or a tournament entrant in the championship.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::hash::StateHasher;

// =============================================================================
// PARTICIPANT
// =============================================================================

/// Opaque participant identity.
///
/// In FFA and the championship the identity IS the display name; names are
/// unique within their roster (see [`normalize_names`]). Ordered so it can key
/// a `BTreeMap`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Participant(String);

impl Participant {
    /// Create from a name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The participant standing in for a whole team.
    pub fn team(side: TeamSide) -> Self {
        Self(side.code().to_string())
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Participant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Participant {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

// =============================================================================
// TEAM SIDE
// =============================================================================

/// One of the two fixed teams.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TeamSide {
    /// Team A always throws first.
    #[default]
    A,
    /// Team B.
    B,
}

impl TeamSide {
    /// The opposing side.
    pub fn other(self) -> TeamSide {
        match self {
            TeamSide::A => TeamSide::B,
            TeamSide::B => TeamSide::A,
        }
    }

    /// Short code used as the engine participant ("A" / "B").
    pub fn code(self) -> &'static str {
        match self {
            TeamSide::A => "A",
            TeamSide::B => "B",
        }
    }

    /// Display label ("Team A").
    pub fn label(self) -> &'static str {
        match self {
            TeamSide::A => "Team A",
            TeamSide::B => "Team B",
        }
    }

    /// Resolve a team participant back to its side.
    pub fn from_participant(participant: &Participant) -> Option<TeamSide> {
        match participant.name() {
            "A" => Some(TeamSide::A),
            "B" => Some(TeamSide::B),
            _ => None,
        }
    }
}

// =============================================================================
// BRACKET SLOT
// =============================================================================

/// A bracket slot: a real entrant or the bye sentinel.
///
/// Keeping the bye out of the name space means an entrant literally called
/// "BYE" is still a real player.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    /// A live entrant.
    Entrant(Participant),
    /// Unpaired slot, auto-advanced without scoring.
    Bye,
}

impl Slot {
    /// The entrant in this slot, if any.
    pub fn entrant(&self) -> Option<&Participant> {
        match self {
            Slot::Entrant(p) => Some(p),
            Slot::Bye => None,
        }
    }

    /// Check for the bye sentinel.
    pub fn is_bye(&self) -> bool {
        matches!(self, Slot::Bye)
    }

    /// Hash this slot for state verification.
    pub fn hash_into(&self, hasher: &mut StateHasher) {
        hasher.update_opt_str(self.entrant().map(Participant::name));
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Entrant(p) => write!(f, "{}", p),
            Slot::Bye => f.write_str("BYE"),
        }
    }
}

// =============================================================================
// NAME NORMALIZATION
// =============================================================================

/// Trim names, drop blanks, and drop repeats (first occurrence wins).
pub fn normalize_names<I, S>(raw: I) -> Vec<Participant>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<Participant> = Vec::new();
    for name in raw {
        let trimmed = name.as_ref().trim();
        if trimmed.is_empty() {
            continue;
        }
        if out.iter().any(|p| p.name() == trimmed) {
            continue;
        }
        out.push(Participant::new(trimmed));
    }
    out
}
