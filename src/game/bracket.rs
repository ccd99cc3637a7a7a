//! Championship Bracket
//!
//! Single elimination. Round 1 is a shuffle of the entrants; every later round
//! pairs the previous round's winners in order. An odd field is padded with one
//! bye, and a bye match resolves on the spot, which can cascade through several
//! matches in one step.
//!
//! Each live match is a two-participant 501 played with the head-to-head
//! toggle. The bracket records the match winner but never moves on by itself;
//! the operator does that with [`Bracket::advance_match`].
//!
//! Settings are read when they matter, not stored: the match start score when
//! a match is set up, double-out on every throw.

use serde::{Deserialize, Serialize};

use crate::core::hash::StateHasher;
use crate::core::rng::DeterministicRng;
use crate::game::action::ActionError;
use crate::game::events::GameEventData;
use crate::game::ohone::{OhOne, ThrowOutcome};
use crate::game::participant::{Participant, Slot};
use crate::game::roster::Settings;
use crate::game::turn::HeadToHead;

// =============================================================================
// MATCH
// =============================================================================

/// One pairing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    /// First slot.
    pub p1: Slot,
    /// Second slot.
    pub p2: Slot,
    /// Set on checkout, or on arrival for a bye.
    pub winner: Option<Participant>,
}

impl Match {
    /// Undecided pairing.
    pub fn new(p1: Slot, p2: Slot) -> Self {
        Self { p1, p2, winner: None }
    }

    /// Both sides are real entrants.
    pub fn is_live(&self) -> bool {
        !self.p1.is_bye() && !self.p2.is_bye()
    }

    /// Hash for state verification.
    pub fn hash_into(&self, hasher: &mut StateHasher) {
        self.p1.hash_into(hasher);
        self.p2.hash_into(hasher);
        hasher.update_opt_str(self.winner.as_ref().map(Participant::name));
    }
}

/// Pair slots in order, padding an odd count with a bye.
fn pair_up(mut slots: Vec<Slot>) -> Vec<Match> {
    if slots.len() % 2 == 1 {
        slots.push(Slot::Bye);
    }
    slots
        .chunks(2)
        .map(|pair| Match::new(pair[0].clone(), pair[1].clone()))
        .collect()
}

// =============================================================================
// LIVE MATCH
// =============================================================================

/// Score engine and turn for the match being played.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchPlay {
    /// Head-to-head 501.
    pub engine: OhOne,
    /// Who throws next.
    pub turn: HeadToHead,
}

// =============================================================================
// BRACKET
// =============================================================================

/// Tournament state.
///
/// Invariant: `champion` is written once, when a round resolves to a single
/// winner, and nothing changes after that.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bracket {
    round: u32,
    matches: Vec<Match>,
    current_match: usize,
    champion: Option<Participant>,
    /// Completed rounds, oldest first.
    history: Vec<Vec<Match>>,
    live: Option<MatchPlay>,
    #[serde(skip)]
    events: Vec<GameEventData>,
}

impl Bracket {
    /// Shuffle the entrants into round 1 and set up the first playable match.
    pub fn new(
        entrants: &[Participant],
        rng: &mut DeterministicRng,
        settings: &Settings,
    ) -> Self {
        let mut field = entrants.to_vec();
        rng.shuffle(&mut field);
        let matches = pair_up(field.into_iter().map(Slot::Entrant).collect());

        let mut bracket = Self {
            round: 1,
            current_match: 0,
            champion: None,
            history: Vec::new(),
            live: None,
            events: vec![GameEventData::RoundStarted { round: 1, matches: matches.len() }],
            matches,
        };
        bracket.settle(settings);
        bracket
    }

    /// Score a turn in the live match. The turn toggles unless the match was
    /// already decided.
    pub fn match_add(&mut self, points: i64, settings: &Settings) -> Result<ThrowOutcome, ActionError> {
        if self.champion.is_some() {
            return Ok(ThrowOutcome::Ignored);
        }
        let Some(play) = self.live.as_mut() else {
            return Ok(ThrowOutcome::Ignored);
        };

        play.engine.double_out = settings.double_out;
        let thrower = play.turn.turn().clone();
        let outcome = play.engine.apply(&thrower, points)?;
        if !outcome.applied() {
            return Ok(outcome);
        }
        play.turn.advance();

        if let ThrowOutcome::Checkout { .. } = outcome {
            if let Some(m) = self.matches.get_mut(self.current_match) {
                m.winner = Some(thrower.clone());
            }
            self.events.push(GameEventData::MatchDecided { winner: thrower, round: self.round });
        }
        Ok(outcome)
    }

    /// Move to the next match, rolling the round over when it is complete.
    ///
    /// The current match must have a winner. Harmless once a champion exists.
    /// The next live match starts from `settings.match_start`.
    pub fn advance_match(&mut self, settings: &Settings) -> Result<(), ActionError> {
        if self.champion.is_some() {
            return Ok(());
        }
        if let Some(m) = self.matches.get(self.current_match) {
            if m.winner.is_none() {
                return Err(ActionError::MatchUndecided);
            }
        }
        self.step();
        self.settle(settings);
        Ok(())
    }

    /// Resolve byes until a live match is ready or the tournament is over.
    fn settle(&mut self, settings: &Settings) {
        loop {
            self.live = None;
            if self.champion.is_some() {
                return;
            }
            let round = self.round;
            let Some(m) = self.matches.get_mut(self.current_match) else {
                return;
            };
            match (&m.p1, &m.p2) {
                (Slot::Entrant(a), Slot::Entrant(b)) => {
                    let (a, b) = (a.clone(), b.clone());
                    self.live = Some(MatchPlay {
                        engine: OhOne::new(&[a.clone(), b.clone()], settings.match_start, settings.double_out),
                        turn: HeadToHead::new(a, b),
                    });
                    return;
                }
                (Slot::Entrant(p), Slot::Bye) | (Slot::Bye, Slot::Entrant(p)) => {
                    let p = p.clone();
                    m.winner = Some(p.clone());
                    self.events.push(GameEventData::ByeAdvanced { participant: p, round });
                }
                (Slot::Bye, Slot::Bye) => {}
            }
            self.step();
        }
    }

    /// Next index; a finished round either crowns a champion or pairs the
    /// winners into the next one.
    fn step(&mut self) {
        self.current_match += 1;
        if self.current_match < self.matches.len() {
            return;
        }

        let winners: Vec<Participant> =
            self.matches.iter().filter_map(|m| m.winner.clone()).collect();
        if winners.len() == 1 {
            let champion = winners[0].clone();
            self.champion = Some(champion.clone());
            self.events.push(GameEventData::ChampionCrowned { champion });
            return;
        }
        if winners.is_empty() {
            return;
        }

        let next = pair_up(winners.into_iter().map(Slot::Entrant).collect());
        self.history.push(std::mem::replace(&mut self.matches, next));
        self.round += 1;
        self.current_match = 0;
        self.events.push(GameEventData::RoundStarted { round: self.round, matches: self.matches.len() });
    }

    /// Current round number, from 1.
    pub fn round(&self) -> u32 {
        self.round
    }

    /// Matches of the current round.
    pub fn matches(&self) -> &[Match] {
        &self.matches
    }

    /// Index of the current match.
    pub fn current_match_index(&self) -> usize {
        self.current_match
    }

    /// The match on the board, if the round still has one.
    pub fn current_match(&self) -> Option<&Match> {
        self.matches.get(self.current_match)
    }

    /// Completed rounds.
    pub fn history(&self) -> &[Vec<Match>] {
        &self.history
    }

    /// The tournament winner.
    pub fn champion(&self) -> Option<&Participant> {
        self.champion.as_ref()
    }

    /// The match being played.
    pub fn live(&self) -> Option<&MatchPlay> {
        self.live.as_ref()
    }

    /// Entrant whose turn it is in the live match.
    pub fn turn(&self) -> Option<&Participant> {
        self.live.as_ref().map(|play| play.turn.turn())
    }

    /// Matches each entrant won on the board; byes do not count.
    pub fn wins(&self, entrant: &Participant) -> i64 {
        self.history
            .iter()
            .flatten()
            .chain(self.matches.iter())
            .filter(|m| m.is_live() && m.winner.as_ref() == Some(entrant))
            .count() as i64
    }

    /// Drain bracket events raised since the last call.
    pub fn take_events(&mut self) -> Vec<GameEventData> {
        std::mem::take(&mut self.events)
    }

    /// Hash bracket state.
    pub fn hash_into(&self, hasher: &mut StateHasher) {
        hasher.update_u64(u64::from(self.round));
        hasher.update_usize(self.current_match);
        hasher.update_usize(self.history.len());
        for m in self.history.iter().flatten().chain(self.matches.iter()) {
            m.hash_into(hasher);
        }
        hasher.update_opt_str(self.champion.as_ref().map(Participant::name));
        match &self.live {
            Some(play) => {
                hasher.update_bool(true);
                play.engine.hash_into(hasher);
                play.turn.hash_into(hasher);
            }
            None => hasher.update_bool(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(match_start: i64, double_out: bool) -> Settings {
        Settings { match_start, double_out, ..Settings::default() }
    }

    /// Short matches so one throw can finish them.
    fn quick() -> Settings {
        settings(101, false)
    }

    fn field(n: usize) -> Vec<Participant> {
        (1..=n).map(|i| Participant::new(format!("P{}", i))).collect()
    }

    /// Finish the live match with the side on throw checking out.
    fn win_live(bracket: &mut Bracket) -> Participant {
        let thrower = bracket.turn().cloned().unwrap();
        let left = bracket.live().unwrap().engine.remaining(&thrower).unwrap();
        assert_eq!(bracket.match_add(left, &quick()).unwrap(), ThrowOutcome::Checkout { points: left });
        thrower
    }

    #[test]
    fn test_five_entrants() {
        let mut rng = DeterministicRng::new(7);
        let mut bracket = Bracket::new(&field(5), &mut rng, &settings(101, false));

        assert_eq!(bracket.round(), 1);
        assert_eq!(bracket.matches().len(), 3);
        assert_eq!(bracket.matches().iter().filter(|m| !m.is_live()).count(), 1);

        let mut played = 0;
        let mut per_round = vec![bracket.matches().len()];
        while bracket.champion().is_none() {
            let round = bracket.round();
            win_live(&mut bracket);
            played += 1;
            bracket.advance_match(&quick()).unwrap();
            if bracket.round() != round && bracket.champion().is_none() {
                per_round.push(bracket.matches().len());
            }
        }

        assert_eq!(per_round, vec![3, 2, 1]);
        assert_eq!(played, 4);
        assert_eq!(bracket.round(), 3);
        assert_eq!(bracket.history().len(), 2);
    }

    #[test]
    fn test_same_seed_same_pairing() {
        let a = Bracket::new(&field(8), &mut DeterministicRng::new(99), &settings(301, false));
        let b = Bracket::new(&field(8), &mut DeterministicRng::new(99), &settings(301, false));
        assert_eq!(a.matches(), b.matches());
    }

    #[test]
    fn test_turn_toggles_and_winner_waits_for_operator() {
        let mut bracket = Bracket::new(&field(2), &mut DeterministicRng::new(1), &settings(101, false));
        let first = bracket.turn().cloned().unwrap();

        bracket.match_add(20, &quick()).unwrap();
        assert_ne!(bracket.turn(), Some(&first));

        let winner = win_live(&mut bracket);
        assert_eq!(bracket.current_match().unwrap().winner.as_ref(), Some(&winner));
        assert!(bracket.champion().is_none());

        bracket.advance_match(&quick()).unwrap();
        assert_eq!(bracket.champion(), Some(&winner));
        assert!(bracket.live().is_none());
        assert_eq!(bracket.wins(&winner), 1);
    }

    #[test]
    fn test_advance_rejected_while_undecided() {
        let mut bracket = Bracket::new(&field(4), &mut DeterministicRng::new(3), &settings(301, false));
        assert_eq!(bracket.advance_match(&quick()), Err(ActionError::MatchUndecided));
        assert_eq!(bracket.current_match_index(), 0);
    }

    #[test]
    fn test_after_champion_everything_is_harmless() {
        let mut bracket = Bracket::new(&field(2), &mut DeterministicRng::new(5), &settings(101, false));
        win_live(&mut bracket);
        bracket.advance_match(&quick()).unwrap();
        let done = bracket.clone();

        assert_eq!(bracket.match_add(60, &quick()).unwrap(), ThrowOutcome::Ignored);
        bracket.advance_match(&quick()).unwrap();
        assert_eq!(bracket.champion(), done.champion());
        assert_eq!(bracket.round(), done.round());
    }

    #[test]
    fn test_bye_resolves_without_a_throw() {
        let mut rng = DeterministicRng::new(11);
        let mut bracket = Bracket::new(&field(3), &mut rng, &settings(101, false));
        win_live(&mut bracket);
        bracket.advance_match(&quick()).unwrap();

        // Round 2 (two winners) is a single live match.
        assert_eq!(bracket.round(), 2);
        assert_eq!(bracket.matches().len(), 1);
        assert!(bracket.live().is_some());

        let events = bracket.take_events();
        assert!(events.iter().any(|e| matches!(e, GameEventData::ByeAdvanced { round: 1, .. })));
    }

    #[test]
    fn test_byes_never_count_as_wins() {
        let mut bracket = Bracket::new(&field(3), &mut DeterministicRng::new(2), &settings(101, false));
        let bye_winner = bracket
            .matches()
            .iter()
            .find(|m| !m.is_live())
            .and_then(|m| m.p1.entrant().or(m.p2.entrant()))
            .cloned()
            .unwrap();
        win_live(&mut bracket);
        bracket.advance_match(&quick()).unwrap();

        assert_eq!(bracket.wins(&bye_winner), 0);
    }

    #[test]
    fn test_double_out_applies_to_match() {
        let rules = settings(101, true);
        let mut bracket = Bracket::new(&field(2), &mut DeterministicRng::new(4), &rules);
        let thrower = bracket.turn().cloned().unwrap();
        bracket.match_add(96, &rules).unwrap();
        bracket.match_add(0, &rules).unwrap();
        assert!(matches!(bracket.match_add(5, &rules).unwrap(), ThrowOutcome::Bust { .. }));
        assert_eq!(bracket.live().unwrap().engine.remaining(&thrower), Some(5));
    }

    #[test]
    fn test_double_out_follows_current_settings() {
        let mut bracket = Bracket::new(&field(2), &mut DeterministicRng::new(4), &quick());
        let thrower = bracket.turn().cloned().unwrap();
        bracket.match_add(96, &quick()).unwrap();
        bracket.match_add(0, &quick()).unwrap();

        // Switched on mid-match: the odd finish now busts.
        let strict = settings(101, true);
        assert!(matches!(bracket.match_add(5, &strict).unwrap(), ThrowOutcome::Bust { .. }));
        assert!(bracket.live().unwrap().engine.double_out);
        assert_eq!(bracket.live().unwrap().engine.remaining(&thrower), Some(5));
    }

    #[test]
    fn test_next_match_uses_current_start_score() {
        let mut bracket = Bracket::new(&field(4), &mut DeterministicRng::new(6), &quick());
        win_live(&mut bracket);
        bracket.advance_match(&settings(201, false)).unwrap();

        let play = bracket.live().unwrap();
        let next = bracket.turn().cloned().unwrap();
        assert_eq!(play.engine.start, 201);
        assert_eq!(play.engine.remaining(&next), Some(201));
    }
}
