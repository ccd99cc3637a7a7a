//! Plain-text scoreboard.

use std::fmt::Write;

use crate::display::Presenter;
use crate::game::bracket::{Bracket, Match};
use crate::game::clock::target_label;
use crate::game::cricket::{CricketNumber, MARKS_TO_CLOSE};
use crate::game::engine::GameInstance;
use crate::game::snapshot::Snapshot;

const NAME_WIDTH: usize = 12;

/// Renders a snapshot as a compact block of text, one participant per line.
#[derive(Clone, Copy, Debug, Default)]
pub struct TextScoreboard;

impl TextScoreboard {
    /// New scoreboard.
    pub fn new() -> Self {
        Self
    }
}

impl Presenter for TextScoreboard {
    fn render(&self, snapshot: &Snapshot) -> String {
        let mut out = String::new();
        let game = snapshot.game.map(|g| g.as_str()).unwrap_or("-");
        let _ = writeln!(out, "[{} | {}] {}", snapshot.mode, game, snapshot.turn_label);

        match (&snapshot.data, &snapshot.tournament.bracket) {
            (Some(instance), _) => render_instance(&mut out, instance),
            (None, Some(bracket)) => render_bracket(&mut out, bracket),
            (None, None) => {
                let _ = writeln!(out, "no game in progress");
            }
        }

        if let Some(winner) = &snapshot.winner {
            let _ = writeln!(out, "winner: {}", winner);
        }
        out
    }
}

fn render_instance(out: &mut String, instance: &GameInstance) {
    match instance {
        GameInstance::OhOne(game) => {
            for p in game.seats() {
                let left = game.remaining(p).unwrap_or(game.start);
                let last = game.last_result(p).unwrap_or("");
                let _ = writeln!(out, "{:<w$} {:>4}  {}", p.name(), left, last, w = NAME_WIDTH);
            }
        }
        GameInstance::Cricket(game) => {
            let header: Vec<&str> = CricketNumber::ALL.iter().map(|n| n.label()).collect();
            let _ = writeln!(out, "{:<w$} {}  pts", "", header.join(" "), w = NAME_WIDTH);
            for p in game.seats() {
                let marks: Vec<String> = CricketNumber::ALL
                    .iter()
                    .map(|n| {
                        let width = n.label().len();
                        format!("{:>width$}", mark_glyph(game.marks(p, *n)), width = width)
                    })
                    .collect();
                let _ = writeln!(
                    out,
                    "{:<w$} {}  {}",
                    p.name(),
                    marks.join(" "),
                    game.points(p),
                    w = NAME_WIDTH
                );
            }
        }
        GameInstance::AroundTheClock(game) => {
            for p in game.seats() {
                let target = game.target(p).unwrap_or(1);
                let _ = writeln!(out, "{:<w$} -> {}", p.name(), target_label(target), w = NAME_WIDTH);
            }
        }
        GameInstance::Leaderboard(board) => {
            for (rank, (p, points)) in board.ranking().into_iter().enumerate() {
                let _ = writeln!(out, "{}. {:<w$} {:>5}", rank + 1, p.name(), points, w = NAME_WIDTH);
            }
        }
    }
}

fn mark_glyph(marks: u8) -> &'static str {
    match marks {
        0 => ".",
        1 => "/",
        2 => "X",
        m if m >= MARKS_TO_CLOSE => "O",
        _ => "?",
    }
}

fn render_bracket(out: &mut String, bracket: &Bracket) {
    let _ = writeln!(out, "round {}", bracket.round());
    for (i, m) in bracket.matches().iter().enumerate() {
        let cursor = if i == bracket.current_match_index() { ">" } else { " " };
        let _ = writeln!(out, "{} {}", cursor, match_line(m));
    }
    if let Some(play) = bracket.live() {
        for p in play.engine.seats() {
            let left = play.engine.remaining(p).unwrap_or(play.engine.start);
            let _ = writeln!(out, "  {:<w$} {:>4}", p.name(), left, w = NAME_WIDTH);
        }
    }
}

fn match_line(m: &Match) -> String {
    match &m.winner {
        Some(w) => format!("{} vs {} -> {}", m.p1, m.p2, w),
        None => format!("{} vs {}", m.p1, m.p2),
    }
}
