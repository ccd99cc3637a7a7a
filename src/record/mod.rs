//! Persistence handoff.
//!
//! - `result`: normalized finished-game records
//! - `sink`: storage collaborators

pub mod result;
pub mod sink;

pub use result::{GameRecord, ParticipantResult};
pub use sink::{JsonLinesSink, MemorySink, RecordError, ResultSink};
