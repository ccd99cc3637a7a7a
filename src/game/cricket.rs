//! Cricket Engine
//!
//! Numbers 15 through 20 plus the bull. Three marks close a number; marks
//! beyond that score the number's value, but only while at least one opponent
//! still has it open. The first participant with everything closed and no
//! fewer points than anyone else wins.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::hash::StateHasher;
use crate::game::action::ActionError;
use crate::game::participant::Participant;

/// Marks needed to close a number.
pub const MARKS_TO_CLOSE: u8 = 3;

// =============================================================================
// TARGETS
// =============================================================================

/// A cricket number.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CricketNumber {
    /// 20
    #[serde(rename = "20")]
    Twenty,
    /// 19
    #[serde(rename = "19")]
    Nineteen,
    /// 18
    #[serde(rename = "18")]
    Eighteen,
    /// 17
    #[serde(rename = "17")]
    Seventeen,
    /// 16
    #[serde(rename = "16")]
    Sixteen,
    /// 15
    #[serde(rename = "15")]
    Fifteen,
    /// Bullseye, 25 a mark.
    #[serde(rename = "BULL")]
    Bull,
}

impl CricketNumber {
    /// Every number, board order.
    pub const ALL: [CricketNumber; 7] = [
        CricketNumber::Twenty,
        CricketNumber::Nineteen,
        CricketNumber::Eighteen,
        CricketNumber::Seventeen,
        CricketNumber::Sixteen,
        CricketNumber::Fifteen,
        CricketNumber::Bull,
    ];

    /// Points per extra mark. The bull counts 25.
    pub fn value(self) -> i64 {
        match self {
            CricketNumber::Twenty => 20,
            CricketNumber::Nineteen => 19,
            CricketNumber::Eighteen => 18,
            CricketNumber::Seventeen => 17,
            CricketNumber::Sixteen => 16,
            CricketNumber::Fifteen => 15,
            CricketNumber::Bull => 25,
        }
    }

    /// Wire label.
    pub fn label(self) -> &'static str {
        match self {
            CricketNumber::Twenty => "20",
            CricketNumber::Nineteen => "19",
            CricketNumber::Eighteen => "18",
            CricketNumber::Seventeen => "17",
            CricketNumber::Sixteen => "16",
            CricketNumber::Fifteen => "15",
            CricketNumber::Bull => "BULL",
        }
    }

    /// Parse a label, case-insensitive. Anything outside the set is `None`.
    pub fn parse(raw: &str) -> Option<CricketNumber> {
        let wanted = raw.trim().to_ascii_uppercase();
        Self::ALL.into_iter().find(|n| n.label() == wanted)
    }
}

impl fmt::Display for CricketNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// =============================================================================
// OUTCOME
// =============================================================================

/// Result of a hit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HitOutcome {
    /// Unknown number or game over; nothing changed, turn stays put.
    Ignored,
    /// Marks recorded.
    Marked {
        /// Number hit.
        number: CricketNumber,
        /// This hit brought the number to three marks.
        closed_now: bool,
        /// Points scored by the surplus marks.
        points: i64,
        /// The hit completed the board and won.
        won: bool,
    },
}

impl HitOutcome {
    /// Whether the hit counted.
    pub fn applied(&self) -> bool {
        !matches!(self, HitOutcome::Ignored)
    }
}

// =============================================================================
// ENGINE
// =============================================================================

/// Cricket scoring for any number of participants.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cricket {
    seats: Vec<Participant>,
    /// Marks per number, capped at three.
    marks: BTreeMap<Participant, BTreeMap<CricketNumber, u8>>,
    points: BTreeMap<Participant, i64>,
    winner: Option<Participant>,
}

impl Cricket {
    /// Fresh board.
    pub fn new(seats: &[Participant]) -> Self {
        let empty: BTreeMap<CricketNumber, u8> =
            CricketNumber::ALL.iter().map(|n| (*n, 0)).collect();
        Self {
            seats: seats.to_vec(),
            marks: seats.iter().map(|p| (p.clone(), empty.clone())).collect(),
            points: seats.iter().map(|p| (p.clone(), 0)).collect(),
            winner: None,
        }
    }

    /// Record `hits` marks on `number` for `current`.
    ///
    /// Hits are clamped to [0, 3]. An unrecognised number or a finished game
    /// is [`HitOutcome::Ignored`].
    pub fn hit(
        &mut self,
        current: &Participant,
        number: &str,
        hits: i64,
    ) -> Result<HitOutcome, ActionError> {
        if self.winner.is_some() {
            return Ok(HitOutcome::Ignored);
        }
        let Some(number) = CricketNumber::parse(number) else {
            return Ok(HitOutcome::Ignored);
        };
        if !self.marks.contains_key(current) {
            return Err(ActionError::UnknownParticipant(current.name().to_string()));
        }

        let hits = hits.clamp(0, i64::from(MARKS_TO_CLOSE));
        let was_closed = self.marks_on(current, number) >= MARKS_TO_CLOSE;
        let mut scored = 0;

        for _ in 0..hits {
            let marks = self.marks_on(current, number);
            if marks < MARKS_TO_CLOSE {
                if let Some(board) = self.marks.get_mut(current) {
                    board.insert(number, marks + 1);
                }
            } else if self.open_for_opponent(current, number) {
                scored += number.value();
            }
        }

        if scored > 0 {
            *self.points.entry(current.clone()).or_insert(0) += scored;
        }

        let closed_now = !was_closed && self.marks_on(current, number) >= MARKS_TO_CLOSE;
        let won = self.check_win(current);
        if won {
            self.winner = Some(current.clone());
        }

        Ok(HitOutcome::Marked { number, closed_now, points: scored, won })
    }

    fn marks_on(&self, participant: &Participant, number: CricketNumber) -> u8 {
        self.marks
            .get(participant)
            .and_then(|board| board.get(&number))
            .copied()
            .unwrap_or(0)
    }

    fn open_for_opponent(&self, current: &Participant, number: CricketNumber) -> bool {
        self.seats
            .iter()
            .filter(|p| *p != current)
            .any(|p| self.marks_on(p, number) < MARKS_TO_CLOSE)
    }

    fn check_win(&self, current: &Participant) -> bool {
        let all_closed = CricketNumber::ALL
            .iter()
            .all(|n| self.marks_on(current, *n) >= MARKS_TO_CLOSE);
        if !all_closed {
            return false;
        }
        let best_other = self
            .seats
            .iter()
            .filter(|p| *p != current)
            .map(|p| self.points(p))
            .max()
            .unwrap_or(0);
        self.points(current) >= best_other
    }

    /// Marks a participant holds on a number.
    pub fn marks(&self, participant: &Participant, number: CricketNumber) -> u8 {
        self.marks_on(participant, number)
    }

    /// Points a participant has scored.
    pub fn points(&self, participant: &Participant) -> i64 {
        self.points.get(participant).copied().unwrap_or(0)
    }

    /// The winner, if any.
    pub fn winner(&self) -> Option<&Participant> {
        self.winner.as_ref()
    }

    /// Participants in roster order.
    pub fn seats(&self) -> &[Participant] {
        &self.seats
    }

    /// Points per participant, roster order.
    pub fn final_scores(&self) -> Vec<(Participant, i64)> {
        self.seats.iter().map(|p| (p.clone(), self.points(p))).collect()
    }

    /// Hash board state.
    pub fn hash_into(&self, hasher: &mut StateHasher) {
        for p in &self.seats {
            hasher.update_str(p.name());
            for n in CricketNumber::ALL {
                hasher.update_u8(self.marks_on(p, n));
            }
            hasher.update_i64(self.points(p));
        }
        hasher.update_opt_str(self.winner.as_ref().map(Participant::name));
    }
}
