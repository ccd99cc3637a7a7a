//! Session
//!
//! The aggregate root. One session holds the roster, the mode, the active
//! engine (or the bracket in championship mode) and the turn rotation. Every
//! change goes through [`Session::apply`]; a rejected action leaves the
//! session exactly as it was.
//!
//! The session does no I/O. Time is injected by the caller and only used to
//! stamp finished-game records.

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::core::hash::{compute_state_hash, to_hex, StateHash};
use crate::core::rng::DeterministicRng;
use crate::game::action::{Action, ActionError};
use crate::game::bracket::Bracket;
use crate::game::clock::ClockOutcome;
use crate::game::cricket::HitOutcome;
use crate::game::engine::{GameInstance, GameType};
use crate::game::events::{sort_events, GameEvent, GameEventData};
use crate::game::ohone::ThrowOutcome;
use crate::game::participant::{Participant, TeamSide};
use crate::game::roster::{Mode, RosterConfig};
use crate::game::snapshot::{Snapshot, TeamsView, TournamentView};
use crate::game::turn::{FfaRotation, TeamRotation};
use crate::record::{GameRecord, ParticipantResult};

/// What a successful action produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ActionOutcome {
    /// The session changed (or the action was a harmless no-op).
    Applied,
    /// The game was finished; this is its record.
    Finished(GameRecord),
}

// =============================================================================
// SESSION
// =============================================================================

/// The single live scoring session.
#[derive(Clone, Debug)]
pub struct Session {
    roster: RosterConfig,
    game: Option<GameType>,
    started: bool,
    instance: Option<GameInstance>,
    ffa: FfaRotation,
    teams: TeamRotation,
    bracket: Option<Bracket>,
    /// Bracket shuffles; survives resets so a seeded run stays reproducible.
    rng: DeterministicRng,
    /// Successful actions so far.
    seq: u64,
    started_at: Option<DateTime<Utc>>,
    pending_events: Vec<GameEvent>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(DeterministicRng::default())
    }
}

impl Session {
    /// Fresh session with default rosters and settings.
    pub fn new(rng: DeterministicRng) -> Self {
        Self {
            roster: RosterConfig::default(),
            game: None,
            started: false,
            instance: None,
            ffa: FfaRotation::default(),
            teams: TeamRotation::default(),
            bracket: None,
            rng,
            seq: 0,
            started_at: None,
            pending_events: Vec::new(),
        }
    }

    /// Fresh session with a seeded bracket shuffle.
    pub fn with_seed(seed: u64) -> Self {
        Self::new(DeterministicRng::new(seed))
    }

    // =========================================================================
    // ACCESSORS
    // =========================================================================

    /// Rosters and settings.
    pub fn roster(&self) -> &RosterConfig {
        &self.roster
    }

    /// Current mode.
    pub fn mode(&self) -> Mode {
        self.roster.mode
    }

    /// Selected game.
    pub fn game(&self) -> Option<GameType> {
        self.game
    }

    /// A game is in progress.
    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Active FFA/teams engine.
    pub fn instance(&self) -> Option<&GameInstance> {
        self.instance.as_ref()
    }

    /// Active championship bracket.
    pub fn bracket(&self) -> Option<&Bracket> {
        self.bracket.as_ref()
    }

    /// Successful actions so far.
    pub fn seq(&self) -> u64 {
        self.seq
    }

    // =========================================================================
    // DISPATCH
    // =========================================================================

    /// Apply one action. `now` stamps game start and finish times.
    pub fn apply(&mut self, action: &Action, now: DateTime<Utc>) -> Result<ActionOutcome, ActionError> {
        let outcome = self.dispatch(action, now)?;
        self.collect_bracket_events();
        self.seq += 1;
        Ok(outcome)
    }

    fn dispatch(&mut self, action: &Action, now: DateTime<Utc>) -> Result<ActionOutcome, ActionError> {
        match action {
            Action::Reset => self.reset(),
            Action::SetMode { mode } => self.set_mode(mode)?,
            Action::SetPlayers { players } => {
                self.roster.set_players(players);
                if self.mode() == Mode::Ffa {
                    self.restart(now);
                }
            }
            Action::SetTeams { a, b } => {
                self.roster.set_teams(a, b);
                self.teams.reset();
                if self.mode() == Mode::Teams {
                    self.restart(now);
                }
            }
            Action::SetTournamentPlayers { players } => {
                self.roster.set_entrants(players);
                self.bracket = None;
                if self.mode() == Mode::Championship {
                    self.clear_game();
                }
            }
            Action::SetMatchStart { start } => self.roster.settings.set_match_start(*start),
            Action::Set501Settings { start, double_out } => {
                self.roster.settings.set_start_score(*start);
                self.roster.settings.double_out = *double_out;
                if self.game == Some(GameType::OhOne) {
                    self.restart(now);
                }
            }
            Action::StartGame { game } => self.start_game(game.as_deref(), now)?,
            Action::Next => match self.mode() {
                Mode::Ffa | Mode::Teams => self.advance_turn(),
                Mode::Championship => return Err(ActionError::NotApplicable { action: action.name() }),
            },
            Action::NextMatch => self.next_match()?,
            Action::OhOneAdd { score } => self.ohone_add(*score)?,
            Action::CricketHit { number, hits } => self.cricket_hit(&number.label(), *hits)?,
            Action::AtcHit { success } => self.atc_hit(*success)?,
            Action::LbAdd { points } => self.lb_add(*points)?,
            Action::MatchAdd { score } => self.match_add(*score)?,
            Action::FinishGame => return self.finish_game(now).map(ActionOutcome::Finished),
        }
        Ok(ActionOutcome::Applied)
    }

    // =========================================================================
    // CONFIGURATION
    // =========================================================================

    fn reset(&mut self) {
        let seq = self.seq;
        *self = Session::new(self.rng.clone());
        self.seq = seq;
        info!("Session reset");
        self.emit(GameEventData::SessionReset);
    }

    fn set_mode(&mut self, raw: &str) -> Result<(), ActionError> {
        let mode: Mode = raw.parse()?;
        self.roster.mode = mode;
        self.clear_game();
        info!(mode = %mode, "Mode changed");
        Ok(())
    }

    fn start_game(&mut self, requested: Option<&str>, now: DateTime<Utc>) -> Result<(), ActionError> {
        if self.mode() == Mode::Championship {
            let bracket = Bracket::new(self.roster.entrants(), &mut self.rng, &self.roster.settings);
            self.instance = None;
            self.bracket = Some(bracket);
            self.game = Some(GameType::Match);
        } else {
            let game: GameType = requested.unwrap_or_default().parse()?;
            self.begin(game);
        }
        self.started = true;
        self.started_at = Some(now);

        if let Some(game) = self.game {
            info!(game = %game, mode = %self.mode(), "Game started");
            self.emit(GameEventData::GameStarted { game, mode: self.mode() });
        }
        Ok(())
    }

    /// Restart a running FFA/teams game after a roster or settings change.
    fn restart(&mut self, now: DateTime<Utc>) {
        let Some(game) = self.game else { return };
        if !self.started || game == GameType::Match {
            return;
        }
        self.begin(game);
        self.started_at = Some(now);
        info!(game = %game, "Game restarted");
        self.emit(GameEventData::GameStarted { game, mode: self.mode() });
    }

    /// Fresh engine and rotation for an FFA/teams game.
    fn begin(&mut self, game: GameType) {
        let seats = self.seats();
        self.instance = GameInstance::new(game, &seats, &self.roster.settings);
        self.bracket = None;
        self.game = Some(game);
        match self.mode() {
            Mode::Ffa => self.ffa.reset(),
            Mode::Teams => self.teams.reset(),
            Mode::Championship => {}
        }
    }

    fn clear_game(&mut self) {
        self.started = false;
        self.game = None;
        self.instance = None;
        self.bracket = None;
        self.started_at = None;
    }

    /// Engine participants: the players, or the two teams.
    fn seats(&self) -> Vec<Participant> {
        match self.mode() {
            Mode::Teams => vec![Participant::team(TeamSide::A), Participant::team(TeamSide::B)],
            _ => self.roster.players().to_vec(),
        }
    }

    // =========================================================================
    // TURNS
    // =========================================================================

    /// Whoever is throwing now.
    pub fn current_participant(&self) -> Option<Participant> {
        match self.mode() {
            Mode::Ffa => self.ffa.current(self.roster.players()).cloned(),
            Mode::Teams => Some(Participant::team(self.teams.turn())),
            Mode::Championship => self.bracket.as_ref().and_then(Bracket::turn).cloned(),
        }
    }

    fn advance_turn(&mut self) {
        match self.mode() {
            Mode::Ffa => self.ffa.advance(self.roster.players().len()),
            Mode::Teams => self.teams.advance(),
            Mode::Championship => return,
        }
        let turn_label = self.turn_label();
        debug!(turn = %turn_label, "Turn passed");
        self.emit(GameEventData::TurnPassed { turn_label });
    }

    /// After an applied scoring call: announce a win, then move the turn on.
    /// The turn moves even after the winning throw.
    fn end_turn(&mut self, won: bool) {
        if won {
            if let Some(winner) = self.winner_label() {
                info!(winner = %winner, game = ?self.game, "Game won");
                self.emit(GameEventData::GameWon { winner });
            }
        }
        self.advance_turn();
    }

    fn next_match(&mut self) -> Result<(), ActionError> {
        if self.mode() != Mode::Championship {
            return Err(ActionError::NotApplicable { action: "next_match" });
        }
        let bracket = self.bracket.as_mut().ok_or(ActionError::NoActiveGame)?;
        bracket.advance_match(&self.roster.settings)?;
        debug!(round = bracket.round(), index = bracket.current_match_index(), "Next match");
        Ok(())
    }

    // =========================================================================
    // SCORING
    // =========================================================================

    fn require_current(&self) -> Result<Participant, ActionError> {
        self.current_participant().ok_or(ActionError::NoActiveGame)
    }

    fn ohone_add(&mut self, score: i64) -> Result<(), ActionError> {
        let current = self.require_current()?;
        let outcome = match self.instance.as_mut() {
            Some(GameInstance::OhOne(engine)) => engine.apply(&current, score)?,
            _ => return Err(ActionError::NotApplicable { action: "501_add" }),
        };
        if !self.record_throw(current, &outcome) {
            return Ok(());
        }
        self.end_turn(matches!(outcome, ThrowOutcome::Checkout { .. }));
        Ok(())
    }

    /// Emit events for a 501 turn. Returns whether the turn counted.
    fn record_throw(&mut self, participant: Participant, outcome: &ThrowOutcome) -> bool {
        match *outcome {
            ThrowOutcome::Ignored => return false,
            ThrowOutcome::Bust { attempted } => {
                debug!(participant = %participant, attempted, "Bust");
                self.emit(GameEventData::Bust { participant, attempted });
            }
            ThrowOutcome::Scored { points, remaining } => {
                debug!(participant = %participant, points, remaining, "Scored");
                self.emit(GameEventData::Scored { participant, points, remaining });
            }
            ThrowOutcome::Checkout { points } => {
                debug!(participant = %participant, points, "Checkout");
                self.emit(GameEventData::Checkout { participant, points });
            }
        }
        true
    }

    fn cricket_hit(&mut self, number: &str, hits: i64) -> Result<(), ActionError> {
        let current = self.require_current()?;
        let outcome = match self.instance.as_mut() {
            Some(GameInstance::Cricket(engine)) => engine.hit(&current, number, hits)?,
            _ => return Err(ActionError::NotApplicable { action: "cricket_hit" }),
        };
        let HitOutcome::Marked { number, closed_now, points, won } = outcome else {
            return Ok(());
        };
        debug!(participant = %current, number = %number, points, "Cricket hit");
        if closed_now {
            self.emit(GameEventData::NumberClosed { participant: current.clone(), number });
        }
        if points > 0 {
            self.emit(GameEventData::CricketPoints { participant: current, number, points });
        }
        self.end_turn(won);
        Ok(())
    }

    fn atc_hit(&mut self, success: bool) -> Result<(), ActionError> {
        let current = self.require_current()?;
        let outcome = match self.instance.as_mut() {
            Some(GameInstance::AroundTheClock(engine)) => engine.hit(&current, success)?,
            _ => return Err(ActionError::NotApplicable { action: "atc_hit" }),
        };
        let won = match outcome {
            ClockOutcome::Ignored => return Ok(()),
            ClockOutcome::Missed => false,
            ClockOutcome::Advanced { target } => {
                debug!(participant = %current, target, "Target advanced");
                self.emit(GameEventData::TargetAdvanced { participant: current, target });
                false
            }
            ClockOutcome::Completed => {
                self.emit(GameEventData::ClockCompleted { participant: current });
                true
            }
        };
        self.end_turn(won);
        Ok(())
    }

    fn lb_add(&mut self, points: i64) -> Result<(), ActionError> {
        let current = self.require_current()?;
        let total = match self.instance.as_mut() {
            Some(GameInstance::Leaderboard(engine)) => engine.add(&current, points)?,
            _ => return Err(ActionError::NotApplicable { action: "lb_add" }),
        };
        debug!(participant = %current, points, total, "Points added");
        self.emit(GameEventData::PointsAdded { participant: current, delta: points, total });
        self.end_turn(false);
        Ok(())
    }

    fn match_add(&mut self, score: i64) -> Result<(), ActionError> {
        if self.mode() != Mode::Championship || self.game != Some(GameType::Match) {
            return Err(ActionError::NotApplicable { action: "match_add" });
        }
        let bracket = self.bracket.as_mut().ok_or(ActionError::NoActiveGame)?;
        let thrower = bracket.turn().cloned();
        let outcome = bracket.match_add(score, &self.roster.settings)?;
        if let Some(thrower) = thrower {
            self.record_throw(thrower, &outcome);
        }
        Ok(())
    }

    // =========================================================================
    // FINISH
    // =========================================================================

    fn finish_game(&mut self, now: DateTime<Utc>) -> Result<GameRecord, ActionError> {
        let game = match self.game {
            Some(game) if self.started => game,
            _ => return Err(ActionError::NoActiveGame),
        };
        let record = GameRecord::new(
            game,
            self.mode(),
            self.started_at.unwrap_or(now),
            now,
            self.winner_label(),
            self.results(),
        );
        self.clear_game();
        info!(id = %record.id, game = %game, winner = ?record.winner, "Game finished");
        Ok(record)
    }

    /// Per-participant results in roster order.
    fn results(&self) -> Vec<ParticipantResult> {
        if let Some(instance) = &self.instance {
            let winner = instance.winner();
            let scores = instance.final_scores();
            if self.mode() == Mode::Teams {
                let mut results = Vec::new();
                for side in [TeamSide::A, TeamSide::B] {
                    let team = Participant::team(side);
                    let final_score = scores
                        .iter()
                        .find(|(p, _)| *p == team)
                        .map(|(_, s)| *s)
                        .unwrap_or_default();
                    let won = winner == Some(&team);
                    for member in self.roster.team(side) {
                        results.push(ParticipantResult {
                            name: member.name().to_string(),
                            side: Some(side),
                            final_score,
                            won,
                        });
                    }
                }
                return results;
            }
            return scores
                .into_iter()
                .map(|(p, final_score)| ParticipantResult {
                    won: winner == Some(&p),
                    name: p.name().to_string(),
                    side: None,
                    final_score,
                })
                .collect();
        }

        match &self.bracket {
            Some(bracket) => self
                .roster
                .entrants()
                .iter()
                .map(|p| ParticipantResult {
                    name: p.name().to_string(),
                    side: None,
                    final_score: bracket.wins(p),
                    won: bracket.champion() == Some(p),
                })
                .collect(),
            None => Vec::new(),
        }
    }

    // =========================================================================
    // PROJECTION
    // =========================================================================

    /// Winner display label: a name, `"Team A"`, or the champion.
    pub fn winner_label(&self) -> Option<String> {
        match self.mode() {
            Mode::Championship => {
                let bracket = self.bracket.as_ref()?;
                bracket
                    .champion()
                    .or_else(|| bracket.live().and_then(|play| play.engine.winner()))
                    .map(|p| p.name().to_string())
            }
            Mode::Teams => self.instance.as_ref()?.winner().map(|w| {
                TeamSide::from_participant(w)
                    .map(|side| side.label().to_string())
                    .unwrap_or_else(|| w.name().to_string())
            }),
            Mode::Ffa => self.instance.as_ref()?.winner().map(|w| w.name().to_string()),
        }
    }

    /// Who is on the oche, or the bracket status in championship mode.
    pub fn turn_label(&self) -> String {
        match self.mode() {
            Mode::Ffa => self
                .ffa
                .current(self.roster.players())
                .map(|p| p.name().to_string())
                .unwrap_or_default(),
            Mode::Teams => {
                let side = self.teams.turn();
                let member = self
                    .teams
                    .current_member(self.roster.team(side))
                    .map(Participant::name)
                    .unwrap_or_default();
                format!("{}: {}", side.label(), member)
            }
            Mode::Championship => {
                let Some(bracket) = &self.bracket else {
                    return "No matches".to_string();
                };
                if let Some(champion) = bracket.champion() {
                    return format!("Champion: {}", champion);
                }
                match bracket.current_match() {
                    Some(m) => format!("Match: {} vs {}", m.p1, m.p2),
                    None => "No matches".to_string(),
                }
            }
        }
    }

    /// Hash of everything a snapshot shows.
    pub fn compute_hash(&self) -> StateHash {
        compute_state_hash(|hasher| {
            self.roster.hash_into(hasher);
            hasher.update_opt_str(self.game.map(GameType::as_str));
            hasher.update_bool(self.started);
            hasher.update_usize(self.ffa.index());
            hasher.update_str(self.teams.turn().code());
            hasher.update_usize(self.teams.roster_index());

            match &self.instance {
                Some(instance) => {
                    hasher.update_bool(true);
                    instance.hash_into(hasher);
                }
                None => hasher.update_bool(false),
            }
            match &self.bracket {
                Some(bracket) => {
                    hasher.update_bool(true);
                    bracket.hash_into(hasher);
                }
                None => hasher.update_bool(false),
            }
        })
    }

    /// Read-only projection for displays.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            mode: self.mode(),
            game: self.game,
            started: self.started,
            players: self.roster.players().to_vec(),
            current: self.ffa.index(),
            settings: self.roster.settings,
            teams: TeamsView {
                a: self.roster.team(TeamSide::A).to_vec(),
                b: self.roster.team(TeamSide::B).to_vec(),
                team_turn: self.teams.turn(),
                team_current: self.teams.roster_index(),
            },
            tournament: TournamentView {
                players: self.roster.entrants().to_vec(),
                bracket: self.bracket.clone(),
            },
            data: self.instance.clone(),
            winner: self.winner_label(),
            turn_label: self.turn_label(),
            state_hash: to_hex(&self.compute_hash()),
        }
    }

    // =========================================================================
    // EVENTS
    // =========================================================================

    fn emit(&mut self, data: GameEventData) {
        self.pending_events.push(GameEvent::new(self.seq + 1, data));
    }

    fn collect_bracket_events(&mut self) {
        let Some(bracket) = self.bracket.as_mut() else { return };
        for data in bracket.take_events() {
            match &data {
                GameEventData::ChampionCrowned { champion } => info!(champion = %champion, "Champion crowned"),
                GameEventData::MatchDecided { winner, round } => info!(winner = %winner, round, "Match decided"),
                GameEventData::RoundStarted { round, matches } => info!(round, matches, "Round started"),
                GameEventData::ByeAdvanced { participant, round } => {
                    debug!(participant = %participant, round, "Bye advanced")
                }
                _ => {}
            }
            self.pending_events.push(GameEvent::new(self.seq + 1, data));
        }
    }

    /// Drain events raised since the last call, in delivery order.
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        let mut events = std::mem::take(&mut self.pending_events);
        sort_events(&mut events);
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::action::CricketTarget;
    use crate::game::ohone::OhOne;

    fn act(session: &mut Session, action: Action) -> ActionOutcome {
        session.apply(&action, Utc::now()).unwrap()
    }

    fn start(session: &mut Session, game: &str) {
        act(session, Action::StartGame { game: Some(game.to_string()) });
    }

    fn ohone(session: &Session) -> &OhOne {
        match session.instance() {
            Some(GameInstance::OhOne(engine)) => engine,
            other => panic!("expected 501, got {:?}", other),
        }
    }

    fn ffa_ab() -> Session {
        let mut session = Session::with_seed(1);
        act(&mut session, Action::SetPlayers { players: vec!["A".into(), "B".into()] });
        session
    }

    #[test]
    fn test_ffa_501_end_to_end() {
        let mut session = ffa_ab();
        start(&mut session, "501");
        let a = Participant::new("A");
        let b = Participant::new("B");

        act(&mut session, Action::OhOneAdd { score: 140 });
        assert_eq!(ohone(&session).remaining(&a), Some(361));
        act(&mut session, Action::OhOneAdd { score: 100 });
        assert_eq!(ohone(&session).remaining(&b), Some(401));

        // 361 in one turn is more than three darts can score.
        act(&mut session, Action::OhOneAdd { score: 361 });
        assert_eq!(ohone(&session).remaining(&a), Some(181));
        assert_eq!(ohone(&session).last_result(&a), Some("-180 → 181"));

        act(&mut session, Action::OhOneAdd { score: 0 });
        act(&mut session, Action::OhOneAdd { score: 121 });
        act(&mut session, Action::OhOneAdd { score: 0 });
        session.take_events();
        act(&mut session, Action::OhOneAdd { score: 60 });

        assert_eq!(ohone(&session).remaining(&a), Some(0));
        assert_eq!(ohone(&session).winner(), Some(&a));
        assert_eq!(session.winner_label().as_deref(), Some("A"));
        assert_eq!(session.turn_label(), "B");

        // The checkout is shown before the win, the win before the turn change.
        let events: Vec<GameEventData> = session.take_events().into_iter().map(|e| e.data).collect();
        assert_eq!(
            events,
            vec![
                GameEventData::Checkout { participant: a, points: 60 },
                GameEventData::GameWon { winner: "A".into() },
                GameEventData::TurnPassed { turn_label: "B".into() },
            ]
        );
    }

    #[test]
    fn test_throws_after_win_are_harmless() {
        let mut session = ffa_ab();
        act(&mut session, Action::Set501Settings { start: 101, double_out: false });
        start(&mut session, "501");
        act(&mut session, Action::OhOneAdd { score: 101 });
        let before = session.snapshot();

        act(&mut session, Action::OhOneAdd { score: 50 });
        assert_eq!(session.snapshot(), before);
    }

    #[test]
    fn test_snapshot_is_idempotent() {
        let mut session = ffa_ab();
        start(&mut session, "cricket");
        act(&mut session, Action::CricketHit { number: CricketTarget::Number(20), hits: 3 });

        assert_eq!(session.snapshot(), session.snapshot());
    }

    #[test]
    fn test_rejection_changes_nothing() {
        let mut session = ffa_ab();
        start(&mut session, "cricket");
        let before = session.snapshot();
        let seq = session.seq();

        let err = session.apply(&Action::OhOneAdd { score: 60 }, Utc::now()).unwrap_err();
        assert_eq!(err, ActionError::NotApplicable { action: "501_add" });
        assert_eq!(session.snapshot(), before);
        assert_eq!(session.seq(), seq);

        let err = session.apply(&Action::NextMatch, Utc::now()).unwrap_err();
        assert!(matches!(err, ActionError::NotApplicable { .. }));
        assert_eq!(session.snapshot(), before);
    }

    #[test]
    fn test_unknown_names_are_rejected() {
        let mut session = Session::default();
        assert_eq!(
            session.apply(&Action::SetMode { mode: "doubles".into() }, Utc::now()),
            Err(ActionError::UnknownMode("doubles".into()))
        );
        assert_eq!(
            session.apply(&Action::StartGame { game: Some("killer".into()) }, Utc::now()),
            Err(ActionError::UnknownGame("killer".into()))
        );
        assert_eq!(
            session.apply(&Action::StartGame { game: None }, Utc::now()),
            Err(ActionError::UnknownGame(String::new()))
        );
        assert_eq!(session.mode(), Mode::Ffa);
        assert!(!session.is_started());
    }

    #[test]
    fn test_invalid_cricket_number_does_not_move_turn() {
        let mut session = ffa_ab();
        start(&mut session, "cricket");
        act(&mut session, Action::CricketHit { number: CricketTarget::Label("12".into()), hits: 1 });
        assert_eq!(session.turn_label(), "A");
    }

    #[test]
    fn test_atc_miss_still_passes_turn() {
        let mut session = ffa_ab();
        start(&mut session, "atc");
        act(&mut session, Action::AtcHit { success: false });
        assert_eq!(session.turn_label(), "B");
        act(&mut session, Action::AtcHit { success: true });
        assert_eq!(session.turn_label(), "A");
    }

    #[test]
    fn test_set_players_restarts_running_game() {
        let mut session = ffa_ab();
        start(&mut session, "leaderboard");
        act(&mut session, Action::LbAdd { points: 40 });

        act(&mut session, Action::SetPlayers { players: vec!["Cy".into(), " ".into(), "Di".into()] });

        let Some(GameInstance::Leaderboard(board)) = session.instance() else {
            panic!("leaderboard expected");
        };
        assert_eq!(board.seats().len(), 2);
        assert_eq!(board.points(&Participant::new("Cy")), 0);
        assert_eq!(session.turn_label(), "Cy");
    }

    #[test]
    fn test_501_settings_restart_live_game() {
        let mut session = ffa_ab();
        start(&mut session, "501");
        act(&mut session, Action::OhOneAdd { score: 60 });

        act(&mut session, Action::Set501Settings { start: 5000, double_out: true });

        let engine = ohone(&session);
        assert_eq!(engine.remaining(&Participant::new("A")), Some(1001));
        assert!(engine.double_out);
    }

    #[test]
    fn test_teams_play_as_two_sides() {
        let mut session = Session::default();
        act(&mut session, Action::SetMode { mode: "teams".into() });
        act(&mut session, Action::SetTeams { a: vec!["Ann".into(), "Al".into()], b: vec!["Bo".into()] });
        act(&mut session, Action::Set501Settings { start: 101, double_out: false });
        start(&mut session, "501");
        assert_eq!(session.turn_label(), "Team A: Ann");

        act(&mut session, Action::OhOneAdd { score: 41 });
        assert_eq!(session.turn_label(), "Team B: Bo");
        act(&mut session, Action::OhOneAdd { score: 20 });
        assert_eq!(session.turn_label(), "Team A: Al");

        act(&mut session, Action::OhOneAdd { score: 60 });
        assert_eq!(session.winner_label().as_deref(), Some("Team A"));

        let ActionOutcome::Finished(record) = act(&mut session, Action::FinishGame) else {
            panic!("expected a record");
        };
        assert_eq!(record.results.len(), 3);
        assert!(record.results.iter().filter(|r| r.side == Some(TeamSide::A)).all(|r| r.won && r.final_score == 0));
        assert_eq!(record.results[2].final_score, 81);
        assert!(!session.is_started());
    }

    #[test]
    fn test_teams_cricket_checks_single_opponent() {
        let mut session = Session::default();
        act(&mut session, Action::SetMode { mode: "teams".into() });
        start(&mut session, "cricket");

        act(&mut session, Action::CricketHit { number: CricketTarget::Label("BULL".into()), hits: 3 });
        act(&mut session, Action::CricketHit { number: CricketTarget::Label("BULL".into()), hits: 3 });
        act(&mut session, Action::CricketHit { number: CricketTarget::Label("BULL".into()), hits: 1 });

        let Some(GameInstance::Cricket(board)) = session.instance() else {
            panic!("cricket expected");
        };
        assert_eq!(board.points(&Participant::team(TeamSide::A)), 0);
    }

    #[test]
    fn test_next_is_rejected_in_championship() {
        let mut session = Session::default();
        act(&mut session, Action::SetMode { mode: "championship".into() });
        assert!(matches!(
            session.apply(&Action::Next, Utc::now()),
            Err(ActionError::NotApplicable { action: "next" })
        ));
        assert_eq!(session.turn_label(), "No matches");
    }

    #[test]
    fn test_championship_to_champion() {
        let mut session = Session::with_seed(42);
        act(&mut session, Action::SetMode { mode: "championship".into() });
        act(&mut session, Action::SetTournamentPlayers {
            players: ["Ann", "Bo", "Cy", "Di", "Ed"].iter().map(|s| s.to_string()).collect(),
        });
        act(&mut session, Action::SetMatchStart { start: 101 });
        act(&mut session, Action::StartGame { game: None });
        assert_eq!(session.game(), Some(GameType::Match));
        assert!(session.turn_label().starts_with("Match: "));

        assert_eq!(
            session.apply(&Action::NextMatch, Utc::now()),
            Err(ActionError::MatchUndecided)
        );

        let mut played = 0;
        while session.bracket().and_then(Bracket::champion).is_none() {
            act(&mut session, Action::MatchAdd { score: 101 });
            played += 1;
            act(&mut session, Action::NextMatch);
        }
        assert_eq!(played, 4);

        let champion = session.bracket().and_then(Bracket::champion).cloned().unwrap();
        assert_eq!(session.turn_label(), format!("Champion: {}", champion));
        assert_eq!(session.winner_label(), Some(champion.name().to_string()));

        let before = session.snapshot();
        act(&mut session, Action::MatchAdd { score: 60 });
        act(&mut session, Action::NextMatch);
        assert_eq!(session.snapshot(), before);

        let ActionOutcome::Finished(record) = act(&mut session, Action::FinishGame) else {
            panic!("expected a record");
        };
        assert_eq!(record.results.iter().map(|r| r.final_score).sum::<i64>(), 4);
        assert_eq!(record.winners().collect::<Vec<_>>(), vec![champion.name()]);
    }

    #[test]
    fn test_settings_changed_mid_tournament_reach_next_match() {
        let mut session = Session::with_seed(42);
        act(&mut session, Action::SetMode { mode: "championship".into() });
        act(&mut session, Action::SetTournamentPlayers {
            players: ["Ann", "Bo", "Cy", "Di"].iter().map(|s| s.to_string()).collect(),
        });
        act(&mut session, Action::StartGame { game: None });

        act(&mut session, Action::SetMatchStart { start: 101 });
        act(&mut session, Action::Set501Settings { start: 501, double_out: true });

        // Match 1 still runs from 301; the finish must now be even.
        act(&mut session, Action::MatchAdd { score: 161 });
        act(&mut session, Action::MatchAdd { score: 0 });
        act(&mut session, Action::MatchAdd { score: 140 });
        act(&mut session, Action::NextMatch);

        let bracket = session.bracket().unwrap();
        assert_eq!(bracket.current_match_index(), 1);
        let play = bracket.live().unwrap();
        let thrower = bracket.turn().cloned().unwrap();
        assert_eq!(play.engine.remaining(&thrower), Some(101));
        assert!(play.engine.double_out);
    }

    #[test]
    fn test_same_seed_same_bracket() {
        let build = || {
            let mut session = Session::with_seed(9);
            act(&mut session, Action::SetMode { mode: "championship".into() });
            act(&mut session, Action::StartGame { game: None });
            session.snapshot()
        };
        assert_eq!(build(), build());
    }

    #[test]
    fn test_set_tournament_players_drops_bracket() {
        let mut session = Session::default();
        act(&mut session, Action::SetMode { mode: "championship".into() });
        act(&mut session, Action::StartGame { game: None });
        assert!(session.bracket().is_some());

        act(&mut session, Action::SetTournamentPlayers { players: vec!["Solo".into()] });
        assert!(session.bracket().is_none());
        assert!(!session.is_started());
        assert_eq!(session.roster().entrants().len(), 8);
    }

    #[test]
    fn test_finish_without_game() {
        let mut session = Session::default();
        assert_eq!(session.apply(&Action::FinishGame, Utc::now()), Err(ActionError::NoActiveGame));
    }

    #[test]
    fn test_reset_restores_defaults() {
        let mut session = ffa_ab();
        act(&mut session, Action::SetMode { mode: "teams".into() });
        start(&mut session, "atc");
        session.take_events();

        act(&mut session, Action::Reset);

        assert_eq!(session.mode(), Mode::Ffa);
        assert!(session.instance().is_none());
        assert_eq!(session.roster().players()[0].name(), "Player 1");
        assert_eq!(session.take_events()[0].data, GameEventData::SessionReset);
    }

    #[test]
    fn test_set_mode_clears_game_keeps_entrants() {
        let mut session = Session::default();
        act(&mut session, Action::SetTournamentPlayers { players: vec!["Ann".into(), "Bo".into()] });
        start(&mut session, "501");

        act(&mut session, Action::SetMode { mode: "championship".into() });

        assert!(!session.is_started());
        assert!(session.game().is_none());
        assert_eq!(session.roster().entrants().len(), 2);
    }
}
