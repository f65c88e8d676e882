mod controller;
mod sink;

pub use controller::{
    GradeCounts, GradeOutcome, ReviewSession, SaveFailure, SessionState, SessionSummary,
};
pub use sink::{CardSink, GradedCard, MemorySink};
