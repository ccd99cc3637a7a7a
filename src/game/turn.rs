//! Turn Scheduling
//!
//! Rotation state only. Nothing in here touches a score.
//!
//! - FFA: cyclic index over the player list.
//! - Teams: A/B flip; the roster index moves on after B throws.
//! - Head-to-head: direct toggle between the two sides of a bracket match.

use serde::{Deserialize, Serialize};

use crate::core::hash::StateHasher;
use crate::game::participant::{Participant, TeamSide};

// =============================================================================
// FFA
// =============================================================================

/// Free-for-all rotation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FfaRotation {
    index: usize,
}

impl FfaRotation {
    /// Current index into the player list.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Move to the next player. A roster of one rotates to itself.
    pub fn advance(&mut self, player_count: usize) {
        self.index = (self.index + 1) % player_count.max(1);
    }

    /// Player on the oche.
    ///
    /// Re-modded on read in case the roster shrank since the last advance.
    pub fn current<'a>(&self, players: &'a [Participant]) -> Option<&'a Participant> {
        if players.is_empty() {
            return None;
        }
        players.get(self.index % players.len())
    }

    /// Back to the first player.
    pub fn reset(&mut self) {
        self.index = 0;
    }
}

// =============================================================================
// TEAMS
// =============================================================================

/// Two-team alternation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamRotation {
    turn: TeamSide,
    roster_index: usize,
}

impl TeamRotation {
    /// Side currently throwing.
    pub fn turn(&self) -> TeamSide {
        self.turn
    }

    /// How many full A/B cycles have completed.
    pub fn roster_index(&self) -> usize {
        self.roster_index
    }

    /// A hands over to B; B hands back to A and the next members step up.
    pub fn advance(&mut self) {
        if self.turn == TeamSide::B {
            self.roster_index += 1;
        }
        self.turn = self.turn.other();
    }

    /// Highlighted member of the throwing team. Cosmetic only.
    pub fn current_member<'a>(&self, roster: &'a [Participant]) -> Option<&'a Participant> {
        if roster.is_empty() {
            return None;
        }
        roster.get(self.roster_index % roster.len())
    }

    /// Back to Team A, first members.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

// =============================================================================
// HEAD-TO-HEAD
// =============================================================================

/// Toggle between the two sides of a bracket match.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadToHead {
    p1: Participant,
    p2: Participant,
    turn: Participant,
}

impl HeadToHead {
    /// `p1` throws first.
    pub fn new(p1: Participant, p2: Participant) -> Self {
        let turn = p1.clone();
        Self { p1, p2, turn }
    }

    /// Side currently throwing.
    pub fn turn(&self) -> &Participant {
        &self.turn
    }

    /// Hand the oche to the other side.
    pub fn advance(&mut self) {
        self.turn = if self.turn == self.p1 {
            self.p2.clone()
        } else {
            self.p1.clone()
        };
    }

    /// Hash rotation state for verification.
    pub fn hash_into(&self, hasher: &mut StateHasher) {
        hasher.update_str(self.turn.name());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn names(n: usize) -> Vec<Participant> {
        (0..n).map(|i| Participant::new(format!("P{}", i))).collect()
    }

    proptest! {
        #[test]
        fn test_ffa_index_advances_mod_count(n in 1usize..40, k in 0usize..500) {
            let mut rotation = FfaRotation::default();
            for _ in 0..k {
                rotation.advance(n);
            }
            prop_assert_eq!(rotation.index(), k % n);
        }
    }

    #[test]
    fn test_single_player_rotates_to_self() {
        let players = names(1);
        let mut rotation = FfaRotation::default();
        rotation.advance(players.len());
        rotation.advance(players.len());
        assert_eq!(rotation.current(&players), Some(&players[0]));
    }

    #[test]
    fn test_zero_count_does_not_panic() {
        let mut rotation = FfaRotation::default();
        rotation.advance(0);
        assert_eq!(rotation.index(), 0);
        assert_eq!(rotation.current(&[]), None);
    }

    #[test]
    fn test_shrunken_roster_is_remodded() {
        let mut rotation = FfaRotation::default();
        for _ in 0..4 {
            rotation.advance(5);
        }
        let players = names(3);
        assert_eq!(rotation.current(&players), Some(&players[1]));
    }

    #[test]
    fn test_team_rotation() {
        let roster_a = names(2);
        let mut rotation = TeamRotation::default();
        assert_eq!(rotation.turn(), TeamSide::A);

        rotation.advance();
        assert_eq!(rotation.turn(), TeamSide::B);
        assert_eq!(rotation.roster_index(), 0);

        rotation.advance();
        assert_eq!(rotation.turn(), TeamSide::A);
        assert_eq!(rotation.roster_index(), 1);
        assert_eq!(rotation.current_member(&roster_a), Some(&roster_a[1]));

        rotation.advance();
        rotation.advance();
        assert_eq!(rotation.current_member(&roster_a), Some(&roster_a[0]));
    }

    #[test]
    fn test_head_to_head_toggle() {
        let mut h2h = HeadToHead::new(Participant::new("Ann"), Participant::new("Bo"));
        assert_eq!(h2h.turn().name(), "Ann");
        h2h.advance();
        assert_eq!(h2h.turn().name(), "Bo");
        h2h.advance();
        assert_eq!(h2h.turn().name(), "Ann");
    }
}
