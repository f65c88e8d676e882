//! Review session controller.
//!
//! Walks a due set one card at a time. Like the rest of the core it has no
//! threads and no I/O of its own: the caller reveals, grades and supplies the
//! sink that persists each graded card.
//!
//! ## State Transitions
//!
//! ```text
//! Active --(reveal, grade)--> Active    (more cards left)
//! Active --(reveal, grade)--> Finished  (last card graded)
//! new(empty due set)       -> Finished
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut session = ReviewSession::new(due, Sm2Scheduler, SystemClock);
//! while let Some(card) = session.current() {
//!     show(card);
//!     session.reveal();
//!     let outcome = session.submit_grade(ask_grade(), &mut db)?;
//! }
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::sink::{CardSink, GradedCard};
use crate::clock::Clock;
use crate::error::SessionError;
use crate::events::Event;
use crate::review::{Card, CardReviewState, QualityGrade};
use crate::scheduler::ReviewScheduler;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    Active,
    Finished,
}

/// A graded card the sink failed to persist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SaveFailure {
    pub card_id: String,
    pub message: String,
}

/// Result of a single grade submission.
#[derive(Debug, Clone)]
pub struct GradeOutcome {
    pub graded: GradedCard,
    /// Whether the sink accepted the card.
    pub persisted: Result<(), SaveFailure>,
    /// Events produced by this submission, in order.
    pub events: Vec<Event>,
    /// Session state after advancing.
    pub state: SessionState,
}

impl GradeOutcome {
    pub fn card(&self) -> &Card {
        &self.graded.card
    }

    pub fn previous(&self) -> &CardReviewState {
        &self.graded.previous
    }
}

/// Per-grade tallies for a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GradeCounts {
    pub again: usize,
    pub hard: usize,
    pub good: usize,
    pub easy: usize,
}

impl GradeCounts {
    fn record(&mut self, grade: QualityGrade) {
        match grade {
            QualityGrade::Again => self.again += 1,
            QualityGrade::Hard => self.hard += 1,
            QualityGrade::Good => self.good += 1,
            QualityGrade::Easy => self.easy += 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSummary {
    pub total: usize,
    pub graded: usize,
    pub failed_saves: Vec<SaveFailure>,
    pub by_grade: GradeCounts,
}

/// One pass over a due set.
///
/// Not shareable between sessions: each study session owns its own
/// controller. To study again, build a new session from a fresh due set.
#[derive(Debug)]
pub struct ReviewSession<S, K> {
    cards: Vec<Card>,
    cursor: usize,
    revealed: bool,
    state: SessionState,
    scheduler: S,
    clock: K,
    failed_saves: Vec<SaveFailure>,
    by_grade: GradeCounts,
}

impl<S: ReviewScheduler, K: Clock> ReviewSession<S, K> {
    /// Start a session over `due`. An empty due set finishes immediately.
    pub fn new(due: Vec<Card>, scheduler: S, clock: K) -> Self {
        let state = if due.is_empty() {
            SessionState::Finished
        } else {
            SessionState::Active
        };
        info!(
            due = due.len(),
            scheduler = scheduler.name(),
            "review session started"
        );
        Self {
            cards: due,
            cursor: 0,
            revealed: false,
            state,
            scheduler,
            clock,
            failed_saves: Vec::new(),
            by_grade: GradeCounts::default(),
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        self.state == SessionState::Finished
    }

    /// Card currently presented, `None` once finished.
    pub fn current(&self) -> Option<&Card> {
        match self.state {
            SessionState::Active => self.cards.get(self.cursor),
            SessionState::Finished => None,
        }
    }

    pub fn is_revealed(&self) -> bool {
        self.revealed
    }

    /// `(graded, total)`.
    pub fn progress(&self) -> (usize, usize) {
        (self.cursor, self.cards.len())
    }

    /// Cards graded but not persisted, in grading order.
    pub fn failed_saves(&self) -> &[SaveFailure] {
        &self.failed_saves
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            total: self.cards.len(),
            graded: self.cursor,
            failed_saves: self.failed_saves.clone(),
            by_grade: self.by_grade,
        }
    }

    pub fn started(&self) -> Event {
        Event::SessionStarted {
            due_count: self.cards.len(),
            state: self.state,
            at: Utc::now(),
        }
    }

    /// Presentation event for the current card.
    pub fn presented(&self) -> Option<Event> {
        let card = self.current()?;
        Some(Event::CardPresented {
            card_id: card.id.clone(),
            position: self.cursor + 1,
            total: self.cards.len(),
            at: Utc::now(),
        })
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Flip the current card. Returns `None` when finished or already
    /// revealed.
    pub fn reveal(&mut self) -> Option<Event> {
        if self.revealed {
            return None;
        }
        let card_id = self.current()?.id.clone();
        self.revealed = true;
        Some(Event::AnswerRevealed {
            card_id,
            at: Utc::now(),
        })
    }

    /// Grade the current card, persist it through `sink`, and advance.
    ///
    /// A sink error does not stop the session; it is returned in
    /// [`GradeOutcome::persisted`] and kept in [`Self::failed_saves`].
    ///
    /// # Errors
    /// `SessionError::Finished` when no card is left,
    /// `SessionError::AnswerHidden` when the answer has not been revealed.
    pub fn submit_grade<W: CardSink>(
        &mut self,
        grade: QualityGrade,
        sink: &mut W,
    ) -> Result<GradeOutcome, SessionError> {
        let card = self.current().ok_or(SessionError::Finished)?;
        if !self.revealed {
            return Err(SessionError::AnswerHidden);
        }

        let today = self.clock.today();
        let next = self.scheduler.next_state(&card.review, grade, today);
        let graded = GradedCard {
            card: card.with_review(next),
            previous: card.review.clone(),
            grade,
            reviewed_on: today,
            scheduler: self.scheduler.name(),
        };

        let mut events = vec![Event::CardGraded {
            card_id: graded.card.id.clone(),
            grade,
            interval_before: graded.previous.interval,
            interval_after: graded.card.review.interval,
            ease_after: graded.card.review.ease_factor,
            status: graded.card.review.status,
            due_date: graded.card.review.due_date,
            at: Utc::now(),
        }];

        let persisted = match sink.save(&graded) {
            Ok(()) => Ok(()),
            Err(err) => {
                let failure = SaveFailure {
                    card_id: graded.card.id.clone(),
                    message: err.to_string(),
                };
                warn!(card_id = %failure.card_id, error = %failure.message, "failed to persist graded card");
                events.push(Event::SaveFailed {
                    card_id: failure.card_id.clone(),
                    error: failure.message.clone(),
                    at: Utc::now(),
                });
                self.failed_saves.push(failure.clone());
                Err(failure)
            }
        };

        self.by_grade.record(grade);
        self.advance();
        debug!(card_id = %graded.card.id, grade = %grade, "card graded");

        match self.presented() {
            Some(next_card) => events.push(next_card),
            None => {
                info!(
                    graded = self.cursor,
                    failed_saves = self.failed_saves.len(),
                    "review session finished"
                );
                events.push(Event::SessionFinished {
                    graded: self.cursor,
                    failed_saves: self.failed_saves.len(),
                    at: Utc::now(),
                });
            }
        }

        Ok(GradeOutcome {
            graded,
            persisted,
            events,
            state: self.state,
        })
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn advance(&mut self) {
        self.cursor += 1;
        self.revealed = false;
        if self.cursor >= self.cards.len() {
            self.state = SessionState::Finished;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::review::ReviewStatus;
    use crate::scheduler::{next_state, Sm2Scheduler};
    use crate::session::MemorySink;
    use chrono::NaiveDate;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 4, 1).unwrap()
    }

    fn deck(n: usize) -> Vec<Card> {
        (0..n)
            .map(|i| Card::new(format!("q{i}"), format!("a{i}"), today()))
            .collect()
    }

    struct BrokenSink {
        fail_on: String,
        saved: usize,
    }

    impl CardSink for BrokenSink {
        type Error = String;

        fn save(&mut self, graded: &GradedCard) -> Result<(), String> {
            if graded.card.id == self.fail_on {
                return Err("disk full".into());
            }
            self.saved += 1;
            Ok(())
        }
    }

    #[test]
    fn empty_due_set_finishes_immediately() {
        let mut session = ReviewSession::new(Vec::new(), Sm2Scheduler, FixedClock::new(today()));
        assert_eq!(session.state(), SessionState::Finished);
        assert!(session.current().is_none());
        assert!(session.reveal().is_none());
        let mut sink = MemorySink::new();
        assert_eq!(
            session.submit_grade(QualityGrade::Good, &mut sink).unwrap_err(),
            SessionError::Finished
        );
        assert!(sink.saved.is_empty());
    }

    #[test]
    fn n_grades_finish_a_session_of_n_cards() {
        let cards = deck(3);
        let mut session = ReviewSession::new(cards.clone(), Sm2Scheduler, FixedClock::new(today()));
        let mut sink = MemorySink::new();

        for (i, original) in cards.iter().enumerate() {
            assert_eq!(session.state(), SessionState::Active);
            assert_eq!(session.current().unwrap().id, original.id);
            session.reveal().unwrap();
            let outcome = session.submit_grade(QualityGrade::Good, &mut sink).unwrap();
            assert!(outcome.persisted.is_ok());
            assert_eq!(sink.saved.len(), i + 1);
            assert_eq!(
                outcome.card().review,
                next_state(&original.review, QualityGrade::Good, today())
            );
        }

        assert_eq!(session.state(), SessionState::Finished);
        assert_eq!(sink.saved.len(), 3);
        assert_eq!(session.progress(), (3, 3));
    }

    #[test]
    fn grading_requires_reveal() {
        let mut session = ReviewSession::new(deck(1), Sm2Scheduler, FixedClock::new(today()));
        let mut sink = MemorySink::new();
        assert_eq!(
            session.submit_grade(QualityGrade::Easy, &mut sink).unwrap_err(),
            SessionError::AnswerHidden
        );
        assert!(sink.saved.is_empty());
        assert!(session.reveal().is_some());
        assert!(session.reveal().is_none(), "second reveal is a no-op");
        session.submit_grade(QualityGrade::Easy, &mut sink).unwrap();
    }

    #[test]
    fn a_presented_card_cannot_be_graded_twice() {
        let cards = deck(2);
        let mut session = ReviewSession::new(cards.clone(), Sm2Scheduler, FixedClock::new(today()));
        let mut sink = MemorySink::new();
        session.reveal();
        session.submit_grade(QualityGrade::Good, &mut sink).unwrap();
        // Next card is hidden again, and it is a different card.
        assert!(!session.is_revealed());
        assert_eq!(session.current().unwrap().id, cards[1].id);
        assert_eq!(
            session.submit_grade(QualityGrade::Good, &mut sink).unwrap_err(),
            SessionError::AnswerHidden
        );
        assert_eq!(sink.saved.len(), 1);
    }

    #[test]
    fn save_failure_is_reported_and_session_continues() {
        let cards = deck(2);
        let mut sink = BrokenSink {
            fail_on: cards[0].id.clone(),
            saved: 0,
        };
        let mut session = ReviewSession::new(cards.clone(), Sm2Scheduler, FixedClock::new(today()));

        session.reveal();
        let outcome = session.submit_grade(QualityGrade::Again, &mut sink).unwrap();
        let failure = outcome.persisted.clone().unwrap_err();
        assert_eq!(failure.card_id, cards[0].id);
        assert_eq!(failure.message, "disk full");
        assert!(outcome
            .events
            .iter()
            .any(|e| matches!(e, Event::SaveFailed { .. })));
        assert_eq!(outcome.state, SessionState::Active);

        session.reveal();
        let outcome = session.submit_grade(QualityGrade::Good, &mut sink).unwrap();
        assert!(outcome.persisted.is_ok());
        assert_eq!(session.state(), SessionState::Finished);
        assert_eq!(sink.saved, 1);
        assert_eq!(session.failed_saves().len(), 1);
        assert_eq!(session.summary().failed_saves[0].card_id, cards[0].id);
    }

    #[test]
    fn uses_injected_clock_for_due_dates() {
        let clock = FixedClock::new(today());
        let mut session = ReviewSession::new(deck(2), Sm2Scheduler, &clock);
        let mut sink = MemorySink::new();

        session.reveal();
        let first = session.submit_grade(QualityGrade::Again, &mut sink).unwrap();
        assert_eq!(first.card().review.status, ReviewStatus::Relearning);
        assert_eq!(first.card().review.due_date, NaiveDate::from_ymd_opt(2024, 4, 2).unwrap());

        clock.advance_days(10);
        session.reveal();
        let second = session.submit_grade(QualityGrade::Good, &mut sink).unwrap();
        assert_eq!(second.graded.reviewed_on, NaiveDate::from_ymd_opt(2024, 4, 11).unwrap());
        assert_eq!(second.card().review.due_date, NaiveDate::from_ymd_opt(2024, 4, 12).unwrap());
    }

    #[test]
    fn events_trace_the_session() {
        let mut session = ReviewSession::new(deck(2), Sm2Scheduler, FixedClock::new(today()));
        let mut sink = MemorySink::new();
        assert!(matches!(session.started(), Event::SessionStarted { due_count: 2, .. }));
        assert!(matches!(
            session.presented(),
            Some(Event::CardPresented { position: 1, total: 2, .. })
        ));

        session.reveal();
        let outcome = session.submit_grade(QualityGrade::Hard, &mut sink).unwrap();
        assert!(matches!(outcome.events[0], Event::CardGraded { grade: QualityGrade::Hard, .. }));
        assert!(matches!(outcome.events[1], Event::CardPresented { position: 2, .. }));

        session.reveal();
        let outcome = session.submit_grade(QualityGrade::Easy, &mut sink).unwrap();
        assert!(matches!(
            outcome.events.last(),
            Some(Event::SessionFinished { graded: 2, failed_saves: 0, .. })
        ));

        let summary = session.summary();
        assert_eq!(summary.by_grade.hard, 1);
        assert_eq!(summary.by_grade.easy, 1);
        assert_eq!(summary.graded, 2);
    }
}
