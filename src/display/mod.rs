//! Presentation.
//!
//! Displays only ever see a [`Snapshot`]; they never reach into the session.

pub mod scoreboard;

pub use scoreboard::TextScoreboard;

use crate::game::snapshot::Snapshot;

/// Turns a snapshot into something a display can show.
pub trait Presenter: Send + Sync {
    /// Render the current snapshot.
    fn render(&self, snapshot: &Snapshot) -> String;
}
