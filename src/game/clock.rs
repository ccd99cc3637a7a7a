//! Around The Clock Engine
//!
//! Hit 1 through 20 in order, then the bull.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::hash::StateHasher;
use crate::game::action::ActionError;
use crate::game::participant::Participant;

/// Highest numbered target; past this the bull is the target.
pub const LAST_NUMBER: u8 = 20;

/// Target value meaning "the bull".
pub const BULL_TARGET: u8 = LAST_NUMBER + 1;

/// Result of one attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClockOutcome {
    /// Game over; nothing changed, turn stays put.
    Ignored,
    /// Missed the target.
    Missed,
    /// Moved on to the next target.
    Advanced {
        /// New target.
        target: u8,
    },
    /// Hit the bull; game won.
    Completed,
}

impl ClockOutcome {
    /// Whether the attempt counted.
    pub fn applied(&self) -> bool {
        !matches!(self, ClockOutcome::Ignored)
    }
}

/// Display label for a target.
pub fn target_label(target: u8) -> String {
    if target > LAST_NUMBER {
        "BULL".to_string()
    } else {
        target.to_string()
    }
}

/// Around-the-clock progress for any number of participants.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AroundTheClock {
    seats: Vec<Participant>,
    target: BTreeMap<Participant, u8>,
    winner: Option<Participant>,
}

impl AroundTheClock {
    /// Everyone starts on 1.
    pub fn new(seats: &[Participant]) -> Self {
        Self {
            seats: seats.to_vec(),
            target: seats.iter().map(|p| (p.clone(), 1)).collect(),
            winner: None,
        }
    }

    /// Record an attempt at `current`'s target.
    pub fn hit(&mut self, current: &Participant, success: bool) -> Result<ClockOutcome, ActionError> {
        if self.winner.is_some() {
            return Ok(ClockOutcome::Ignored);
        }
        let target = self
            .target
            .get_mut(current)
            .ok_or_else(|| ActionError::UnknownParticipant(current.name().to_string()))?;

        if !success {
            return Ok(ClockOutcome::Missed);
        }
        if *target <= LAST_NUMBER {
            *target += 1;
            return Ok(ClockOutcome::Advanced { target: *target });
        }
        self.winner = Some(current.clone());
        Ok(ClockOutcome::Completed)
    }

    /// Current target of a participant (21 = bull).
    pub fn target(&self, participant: &Participant) -> Option<u8> {
        self.target.get(participant).copied()
    }

    /// The winner, if any.
    pub fn winner(&self) -> Option<&Participant> {
        self.winner.as_ref()
    }

    /// Participants in roster order.
    pub fn seats(&self) -> &[Participant] {
        &self.seats
    }

    /// Target reached per participant, roster order.
    pub fn final_scores(&self) -> Vec<(Participant, i64)> {
        self.seats
            .iter()
            .map(|p| (p.clone(), i64::from(self.target(p).unwrap_or(1))))
            .collect()
    }

    /// Hash progress.
    pub fn hash_into(&self, hasher: &mut StateHasher) {
        for p in &self.seats {
            hasher.update_str(p.name());
            hasher.update_u8(self.target(p).unwrap_or(1));
        }
        hasher.update_opt_str(self.winner.as_ref().map(Participant::name));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_lap_then_bull_wins() {
        let a = Participant::new("A");
        let mut game = AroundTheClock::new(&[a.clone()]);

        for expected in 2..=BULL_TARGET {
            assert_eq!(game.hit(&a, true).unwrap(), ClockOutcome::Advanced { target: expected });
        }
        assert_eq!(game.target(&a), Some(21));
        assert_eq!(target_label(21), "BULL");
        assert!(game.winner().is_none());

        assert_eq!(game.hit(&a, true).unwrap(), ClockOutcome::Completed);
        assert_eq!(game.winner(), Some(&a));
        assert_eq!(game.target(&a), Some(21));
    }

    #[test]
    fn test_miss_keeps_target() {
        let a = Participant::new("A");
        let mut game = AroundTheClock::new(&[a.clone()]);
        assert_eq!(game.hit(&a, false).unwrap(), ClockOutcome::Missed);
        assert_eq!(game.target(&a), Some(1));
    }

    #[test]
    fn test_ignored_after_winner() {
        let a = Participant::new("A");
        let b = Participant::new("B");
        let mut game = AroundTheClock::new(&[a.clone(), b.clone()]);
        for _ in 0..21 {
            game.hit(&a, true).unwrap();
        }
        assert_eq!(game.winner(), Some(&a));
        assert_eq!(game.hit(&b, true).unwrap(), ClockOutcome::Ignored);
        assert_eq!(game.target(&b), Some(1));
    }
}
