//! Shared Session
//!
//! The one live scoring session, shared by every connected client. All
//! mutations go through a single write lock; results fan out over a
//! broadcast channel so displays and control panels stay in lockstep.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, info, warn};

use crate::display::{Presenter, TextScoreboard};
use crate::game::action::{Action, ActionError};
use crate::game::session::{ActionOutcome, Session};
use crate::game::snapshot::Snapshot;
use crate::network::protocol::ServerMessage;
use crate::record::{GameRecord, RecordError, ResultSink};

/// Capacity of the update channel per subscriber.
const UPDATE_CHANNEL_CAPACITY: usize = 256;

/// Finishing a game failed.
#[derive(Debug, thiserror::Error)]
pub enum FinishError {
    /// Nothing to finish.
    #[error("no game in progress")]
    NoActiveGame,

    /// The game was finished and cleared, but the sink refused the record.
    #[error("game finished but not recorded: {0}")]
    Sink(#[from] RecordError),
}

/// Applying an action failed.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The session rejected the action; nothing changed.
    #[error(transparent)]
    Rejected(#[from] ActionError),

    /// A `finish_game` action went through but could not be recorded.
    #[error(transparent)]
    Finish(#[from] FinishError),
}

/// Session shared across connections.
#[derive(Clone)]
pub struct SharedSession {
    inner: Arc<RwLock<Session>>,
    updates: broadcast::Sender<ServerMessage>,
    sink: Arc<dyn ResultSink>,
    presenter: Arc<dyn Presenter>,
}

impl SharedSession {
    /// Wrap a session with the sink finished games are handed to.
    pub fn new(session: Session, sink: Arc<dyn ResultSink>) -> Self {
        let (updates, _) = broadcast::channel(UPDATE_CHANNEL_CAPACITY);
        Self {
            inner: Arc::new(RwLock::new(session)),
            updates,
            sink,
            presenter: Arc::new(TextScoreboard::new()),
        }
    }

    /// Subscribe to snapshots, events and records.
    pub fn subscribe(&self) -> broadcast::Receiver<ServerMessage> {
        self.updates.subscribe()
    }

    /// Current snapshot.
    pub async fn snapshot(&self) -> Snapshot {
        self.inner.read().await.snapshot()
    }

    /// Apply one action and broadcast the result.
    ///
    /// A rejected action changes nothing and broadcasts nothing.
    pub async fn apply(&self, action: &Action) -> Result<ActionOutcome, SessionError> {
        let (outcome, snapshot, events) = {
            let mut session = self.inner.write().await;
            let outcome = session.apply(action, Utc::now())?;
            (outcome, session.snapshot(), session.take_events())
        };

        debug!(action = action.name(), "\n{}", self.presenter.render(&snapshot));

        for event in events {
            let _ = self.updates.send(ServerMessage::Event { event });
        }
        let _ = self.updates.send(ServerMessage::state(snapshot));

        if let ActionOutcome::Finished(record) = &outcome {
            self.hand_off(record)?;
        }
        Ok(outcome)
    }

    /// Finish the current game and hand its record to the sink.
    pub async fn finish(&self) -> Result<GameRecord, FinishError> {
        match self.apply(&Action::FinishGame).await {
            Ok(ActionOutcome::Finished(record)) => Ok(record),
            Ok(ActionOutcome::Applied) | Err(SessionError::Rejected(_)) => Err(FinishError::NoActiveGame),
            Err(SessionError::Finish(e)) => Err(e),
        }
    }

    fn hand_off(&self, record: &GameRecord) -> Result<(), FinishError> {
        if let Err(e) = self.sink.record(record) {
            warn!(id = %record.id, error = %e, "Failed to record game");
            return Err(FinishError::Sink(e));
        }

        info!(id = %record.id, game = %record.game, "Game recorded");
        let _ = self.updates.send(ServerMessage::GameRecorded {
            record: Box::new(record.clone()),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::events::GameEventData;
    use crate::game::engine::{GameInstance, GameType};
    use crate::record::MemorySink;

    struct BrokenSink;

    impl ResultSink for BrokenSink {
        fn record(&self, _record: &GameRecord) -> Result<(), RecordError> {
            Err(RecordError::Poisoned)
        }
    }

    fn create_test_session() -> (SharedSession, Arc<MemorySink>) {
        let sink = Arc::new(MemorySink::new());
        let shared = SharedSession::new(Session::with_seed(9), sink.clone());
        (shared, sink)
    }

    fn drain(rx: &mut broadcast::Receiver<ServerMessage>) -> Vec<ServerMessage> {
        let mut out = Vec::new();
        while let Ok(msg) = rx.try_recv() {
            out.push(msg);
        }
        out
    }

    #[tokio::test]
    async fn test_apply_broadcasts_state() {
        let (shared, _) = create_test_session();
        let mut rx = shared.subscribe();

        shared
            .apply(&Action::SetPlayers { players: vec!["Ann".into(), "Bo".into()] })
            .await
            .unwrap();

        let messages = drain(&mut rx);
        let last = messages.last().unwrap();
        match last {
            ServerMessage::State { snapshot } => assert_eq!(snapshot.players.len(), 2),
            other => panic!("expected state, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_rejected_action_is_silent() {
        let (shared, _) = create_test_session();
        let mut rx = shared.subscribe();
        let before = shared.snapshot().await;

        let result = shared.apply(&Action::StartGame { game: Some("golf".into()) }).await;
        assert!(matches!(
            result,
            Err(SessionError::Rejected(ActionError::UnknownGame(_)))
        ));
        assert!(drain(&mut rx).is_empty());
        assert_eq!(shared.snapshot().await, before);
    }

    #[tokio::test]
    async fn test_events_forwarded() {
        let (shared, _) = create_test_session();
        let mut rx = shared.subscribe();

        shared.apply(&Action::StartGame { game: Some("501".into()) }).await.unwrap();

        let started = drain(&mut rx).into_iter().any(|msg| {
            matches!(
                msg,
                ServerMessage::Event { event } if matches!(event.data, GameEventData::GameStarted { .. })
            )
        });
        assert!(started);
    }

    #[tokio::test]
    async fn test_finish_records_game() {
        let (shared, sink) = create_test_session();
        shared.apply(&Action::StartGame { game: Some("atc".into()) }).await.unwrap();
        let mut rx = shared.subscribe();

        let record = shared.finish().await.unwrap();
        assert_eq!(record.game, GameType::AroundTheClock);
        assert_eq!(sink.records(), vec![record.clone()]);
        assert!(!shared.snapshot().await.started);

        let recorded = drain(&mut rx)
            .into_iter()
            .any(|msg| matches!(msg, ServerMessage::GameRecorded { record: r } if r.id == record.id));
        assert!(recorded);
    }

    #[tokio::test]
    async fn test_finish_without_game() {
        let (shared, sink) = create_test_session();
        assert!(matches!(shared.finish().await, Err(FinishError::NoActiveGame)));
        assert!(sink.records().is_empty());
    }

    #[tokio::test]
    async fn test_sink_failure_still_clears_game() {
        let shared = SharedSession::new(Session::with_seed(1), Arc::new(BrokenSink));
        shared.apply(&Action::StartGame { game: Some("cricket".into()) }).await.unwrap();

        let result = shared.finish().await;
        assert!(matches!(result, Err(FinishError::Sink(RecordError::Poisoned))));
        assert!(!shared.snapshot().await.started);
    }

    #[tokio::test]
    async fn test_concurrent_actions_serialize() {
        let (shared, _) = create_test_session();
        shared
            .apply(&Action::SetPlayers { players: vec!["Ann".into(), "Bo".into()] })
            .await
            .unwrap();
        shared.apply(&Action::StartGame { game: Some("leaderboard".into()) }).await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..10 {
            let shared = shared.clone();
            handles.push(tokio::spawn(async move {
                shared.apply(&Action::LbAdd { points: 3 }).await.map(|_| ())
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let snapshot = shared.snapshot().await;
        let Some(GameInstance::Leaderboard(board)) = snapshot.data else {
            panic!("expected leaderboard");
        };
        let total: i64 = board.final_scores().iter().map(|(_, p)| p).sum();
        assert_eq!(total, 30);
        assert_eq!(snapshot.current, 0);
        assert_eq!(snapshot.turn_label, "Ann");
    }
}
