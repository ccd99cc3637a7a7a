//! Leaderboard Engine
//!
//! Free-form point accumulation. No winner; the ranking is the result.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::hash::StateHasher;
use crate::game::action::ActionError;
use crate::game::participant::Participant;

/// Running totals.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leaderboard {
    seats: Vec<Participant>,
    points: BTreeMap<Participant, i64>,
}

impl Leaderboard {
    /// Everyone on zero.
    pub fn new(seats: &[Participant]) -> Self {
        Self {
            seats: seats.to_vec(),
            points: seats.iter().map(|p| (p.clone(), 0)).collect(),
        }
    }

    /// Add points (negative allowed). Returns the new total.
    pub fn add(&mut self, current: &Participant, delta: i64) -> Result<i64, ActionError> {
        let total = self
            .points
            .get_mut(current)
            .ok_or_else(|| ActionError::UnknownParticipant(current.name().to_string()))?;
        *total = total.saturating_add(delta);
        Ok(*total)
    }

    /// A participant's total.
    pub fn points(&self, participant: &Participant) -> i64 {
        self.points.get(participant).copied().unwrap_or(0)
    }

    /// Highest first; ties keep roster order.
    pub fn ranking(&self) -> Vec<(&Participant, i64)> {
        let mut ranked: Vec<(&Participant, i64)> =
            self.seats.iter().map(|p| (p, self.points(p))).collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked
    }

    /// Participants in roster order.
    pub fn seats(&self) -> &[Participant] {
        &self.seats
    }

    /// Totals, roster order.
    pub fn final_scores(&self) -> Vec<(Participant, i64)> {
        self.seats.iter().map(|p| (p.clone(), self.points(p))).collect()
    }

    /// Hash totals.
    pub fn hash_into(&self, hasher: &mut StateHasher) {
        for p in &self.seats {
            hasher.update_str(p.name());
            hasher.update_i64(self.points(p));
        }
    }
}
