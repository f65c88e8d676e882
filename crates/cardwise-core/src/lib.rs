//! # Cardwise Core Library
//!
//! This library provides the core logic of the Cardwise flashcard trainer.
//! The CLI binary is a thin layer over it; everything that decides *when* a
//! card comes back lives here.
//!
//! ## Architecture
//!
//! - **Review State Model**: per-card scheduling memory (interval, repetitions,
//!   ease factor, status, due date) and the four-way quality grade
//! - **Scheduler**: a pure SM-2 engine behind the [`ReviewScheduler`] trait
//! - **Due-Set Selector**: filters a deck down to the cards due on a given day
//! - **Review Session**: a state machine that walks the due set, grades each
//!   card through the scheduler and hands it to a [`CardSink`]
//! - **Storage**: SQLite deck storage and TOML-based configuration
//!
//! ## Key Components
//!
//! - [`next_state`]: SM-2 scheduling function
//! - [`select_due`]: due-set selection
//! - [`ReviewSession`]: review session state machine
//! - [`Database`]: deck persistence, also a [`CardSink`]
//! - [`Config`]: application configuration management

pub mod clock;
pub mod due;
pub mod error;
pub mod events;
pub mod review;
pub mod scheduler;
pub mod session;
pub mod storage;

pub use clock::{Clock, FixedClock, SystemClock};
pub use due::{is_due, select_due, DueAnomaly, DueCandidate, DueOrder, DueSelection};
pub use error::{
    CardDataError, ConfigError, CoreError, DatabaseError, Result, SessionError, ValidationError,
};
pub use events::Event;
pub use review::{
    Card, CardReviewState, QualityGrade, ReviewStatus, INITIAL_EASE_FACTOR, MIN_EASE_FACTOR,
};
pub use scheduler::{next_state, ReviewScheduler, Sm2Scheduler};
pub use session::{
    CardSink, GradeOutcome, GradedCard, MemorySink, ReviewSession, SaveFailure, SessionState,
    SessionSummary,
};
pub use storage::{CardRow, Config, Database, DeckStats, ReviewLogRecord};
