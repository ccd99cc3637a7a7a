//! Game Events
//!
//! Everything a display might animate. Queued on the session while an action
//! runs and drained right after it.

use serde::{Deserialize, Serialize};

use crate::game::cricket::CricketNumber;
use crate::game::engine::GameType;
use crate::game::participant::Participant;
use crate::game::roster::Mode;

/// Priority for event processing order.
///
/// Lower value = processed first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum EventPriority {
    /// Wins and champions first
    Outcome = 0,
    /// Then scoring
    Scoring = 1,
    /// Then bracket progress
    Bracket = 2,
    /// Then turn changes
    Rotation = 3,
    /// Lowest priority
    Other = 255,
}

/// Game event data.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GameEventData {
    /// A game or championship was started
    GameStarted { game: GameType, mode: Mode },

    /// 501 points taken off
    Scored { participant: Participant, points: i64, remaining: i64 },

    /// 501 turn discarded
    Bust { participant: Participant, attempted: i64 },

    /// 501 finished on exactly zero
    Checkout { participant: Participant, points: i64 },

    /// Cricket number reached three marks
    NumberClosed { participant: Participant, number: CricketNumber },

    /// Cricket surplus marks scored
    CricketPoints { participant: Participant, number: CricketNumber, points: i64 },

    /// Around-the-clock target moved on
    TargetAdvanced { participant: Participant, target: u8 },

    /// Around-the-clock bull hit
    ClockCompleted { participant: Participant },

    /// Someone won the current game (display label)
    GameWon { winner: String },

    /// Leaderboard points added
    PointsAdded { participant: Participant, delta: i64, total: i64 },

    /// Turn moved on
    TurnPassed { turn_label: String },

    /// Bracket entrant advanced without playing
    ByeAdvanced { participant: Participant, round: u32 },

    /// Bracket match won
    MatchDecided { winner: Participant, round: u32 },

    /// New bracket round paired
    RoundStarted { round: u32, matches: usize },

    /// Tournament over
    ChampionCrowned { champion: Participant },

    /// Session replaced with defaults
    SessionReset,
}

impl GameEventData {
    /// Default processing priority for this kind of event.
    pub fn priority(&self) -> EventPriority {
        match self {
            GameEventData::Checkout { .. }
            | GameEventData::ClockCompleted { .. }
            | GameEventData::GameWon { .. }
            | GameEventData::MatchDecided { .. }
            | GameEventData::ChampionCrowned { .. } => EventPriority::Outcome,
            GameEventData::Scored { .. }
            | GameEventData::Bust { .. }
            | GameEventData::NumberClosed { .. }
            | GameEventData::CricketPoints { .. }
            | GameEventData::TargetAdvanced { .. }
            | GameEventData::PointsAdded { .. } => EventPriority::Scoring,
            GameEventData::ByeAdvanced { .. } | GameEventData::RoundStarted { .. } => {
                EventPriority::Bracket
            }
            GameEventData::TurnPassed { .. } => EventPriority::Rotation,
            GameEventData::GameStarted { .. } | GameEventData::SessionReset => EventPriority::Other,
        }
    }
}

/// A game event stamped with the action that produced it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameEvent {
    /// Sequence number of the action that raised it
    pub seq: u64,

    /// Processing priority
    pub priority: EventPriority,

    /// Participant involved, if any
    pub participant: Option<Participant>,

    /// Event data
    pub data: GameEventData,
}

impl GameEvent {
    /// Create a new event.
    pub fn new(seq: u64, data: GameEventData) -> Self {
        let participant = match &data {
            GameEventData::Scored { participant, .. }
            | GameEventData::Bust { participant, .. }
            | GameEventData::Checkout { participant, .. }
            | GameEventData::NumberClosed { participant, .. }
            | GameEventData::CricketPoints { participant, .. }
            | GameEventData::TargetAdvanced { participant, .. }
            | GameEventData::ClockCompleted { participant }
            | GameEventData::PointsAdded { participant, .. }
            | GameEventData::ByeAdvanced { participant, .. } => Some(participant.clone()),
            GameEventData::MatchDecided { winner, .. } => Some(winner.clone()),
            GameEventData::ChampionCrowned { champion } => Some(champion.clone()),
            _ => None,
        };

        Self {
            seq,
            priority: data.priority(),
            participant,
            data,
        }
    }
}

/// Order events for delivery: by action, then in the order they were raised.
///
/// Priority is carried for consumers that triage; it never reorders a
/// single action's events.
pub fn sort_events(events: &mut [GameEvent]) {
    events.sort_by_key(|e| e.seq);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_participant_is_extracted() {
        let event = GameEvent::new(
            3,
            GameEventData::Bust { participant: Participant::new("Ann"), attempted: 60 },
        );
        assert_eq!(event.participant, Some(Participant::new("Ann")));
        assert_eq!(event.priority, EventPriority::Scoring);
    }

    #[test]
    fn test_sort_keeps_raise_order_within_action() {
        let ann = Participant::new("Ann");
        let mut events = vec![
            GameEvent::new(2, GameEventData::NumberClosed { participant: ann.clone(), number: CricketNumber::Bull }),
            GameEvent::new(2, GameEventData::CricketPoints { participant: ann.clone(), number: CricketNumber::Bull, points: 25 }),
            GameEvent::new(2, GameEventData::GameWon { winner: "Ann".into() }),
            GameEvent::new(1, GameEventData::SessionReset),
        ];
        sort_events(&mut events);

        assert_eq!(events[0].data, GameEventData::SessionReset);
        assert!(matches!(events[1].data, GameEventData::NumberClosed { .. }));
        assert!(matches!(events[2].data, GameEventData::CricketPoints { .. }));
        assert!(matches!(events[3].data, GameEventData::GameWon { .. }));
    }

    #[test]
    fn test_wire_tag() {
        let event = GameEventData::RoundStarted { round: 2, matches: 2 };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["kind"], "round_started");
        assert_eq!(json["matches"], 2);
    }
}
