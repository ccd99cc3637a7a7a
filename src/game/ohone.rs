//! 501 ("Oh-One") Engine
//!
//! Count down from the start score to exactly zero. A turn that would leave
//! a negative score or exactly 1 is a bust and leaves the score untouched.
//! Under double-out a zero is only legal from an even total or a bullseye.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::hash::StateHasher;
use crate::game::action::ActionError;
use crate::game::participant::Participant;

/// Highest total three darts can score.
pub const MAX_TURN_SCORE: i64 = 180;

/// Bullseye value, always a legal double-out finish.
pub const BULLSEYE: i64 = 50;

/// Result of one turn.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ThrowOutcome {
    /// Game already won; nothing happened and the turn does not move.
    Ignored,
    /// Illegal remainder; score unchanged.
    Bust {
        /// Clamped points the participant tried to score.
        attempted: i64,
    },
    /// Points taken off.
    Scored {
        /// Clamped points scored.
        points: i64,
        /// Remaining after the turn.
        remaining: i64,
    },
    /// Reached exactly zero; the participant won.
    Checkout {
        /// Clamped points of the finishing turn.
        points: i64,
    },
}

impl ThrowOutcome {
    /// Whether the turn counted (everything but the game-over guard).
    pub fn applied(&self) -> bool {
        !matches!(self, ThrowOutcome::Ignored)
    }
}

/// Validate a turn. Returns the new remainder, or `None` on a bust.
pub fn settle_turn(remaining: i64, points: i64, double_out: bool) -> Option<i64> {
    let next = remaining - points;
    if next < 0 || next == 1 {
        return None;
    }
    if next == 0 && double_out && !(points == BULLSEYE || points % 2 == 0) {
        return None;
    }
    Some(next)
}

/// Countdown scoring for any number of participants.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OhOne {
    /// Score every participant started from.
    pub start: i64,
    /// Double-out rule in force.
    pub double_out: bool,
    /// Participants in roster order.
    seats: Vec<Participant>,
    /// Points still needed.
    remaining: BTreeMap<Participant, i64>,
    /// Annotation of each participant's last turn.
    last_result: BTreeMap<Participant, String>,
    /// Set once, by the checkout.
    winner: Option<Participant>,
}

impl OhOne {
    /// Fresh game: everyone on `start`.
    pub fn new(seats: &[Participant], start: i64, double_out: bool) -> Self {
        Self {
            start,
            double_out,
            seats: seats.to_vec(),
            remaining: seats.iter().map(|p| (p.clone(), start)).collect(),
            last_result: BTreeMap::new(),
            winner: None,
        }
    }

    /// Apply one turn of `points` for `current`.
    ///
    /// Points are clamped to [0, 180]. After a winner exists every call is
    /// [`ThrowOutcome::Ignored`].
    pub fn apply(&mut self, current: &Participant, points: i64) -> Result<ThrowOutcome, ActionError> {
        if self.winner.is_some() {
            return Ok(ThrowOutcome::Ignored);
        }
        let points = points.clamp(0, MAX_TURN_SCORE);
        let before = *self
            .remaining
            .get(current)
            .ok_or_else(|| ActionError::UnknownParticipant(current.name().to_string()))?;

        let Some(after) = settle_turn(before, points, self.double_out) else {
            self.last_result
                .insert(current.clone(), format!("BUST (tried {})", points));
            return Ok(ThrowOutcome::Bust { attempted: points });
        };

        self.remaining.insert(current.clone(), after);
        self.last_result
            .insert(current.clone(), format!("-{} → {}", points, after));

        if after == 0 {
            self.winner = Some(current.clone());
            return Ok(ThrowOutcome::Checkout { points });
        }
        Ok(ThrowOutcome::Scored { points, remaining: after })
    }

    /// Points a participant still needs.
    pub fn remaining(&self, participant: &Participant) -> Option<i64> {
        self.remaining.get(participant).copied()
    }

    /// Annotation of a participant's last turn.
    pub fn last_result(&self, participant: &Participant) -> Option<&str> {
        self.last_result.get(participant).map(String::as_str)
    }

    /// The winner, once somebody checks out.
    pub fn winner(&self) -> Option<&Participant> {
        self.winner.as_ref()
    }

    /// Participants in roster order.
    pub fn seats(&self) -> &[Participant] {
        &self.seats
    }

    /// Remaining score per participant, roster order.
    pub fn final_scores(&self) -> Vec<(Participant, i64)> {
        self.seats
            .iter()
            .map(|p| (p.clone(), self.remaining(p).unwrap_or(self.start)))
            .collect()
    }

    /// Hash this game's state for verification.
    pub fn hash_into(&self, hasher: &mut StateHasher) {
        hasher.update_i64(self.start);
        hasher.update_bool(self.double_out);
        for p in &self.seats {
            hasher.update_str(p.name());
            hasher.update_i64(self.remaining(p).unwrap_or(self.start));
            hasher.update_opt_str(self.last_result(p));
        }
        hasher.update_opt_str(self.winner.as_ref().map(Participant::name));
    }
}
