use chrono::NaiveDate;
use serde::Serialize;

use crate::review::{Card, CardReviewState, QualityGrade};

/// A card right after grading, as handed to the persistence collaborator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradedCard {
    /// The card carrying its new review state.
    pub card: Card,
    /// Review state before this grade.
    pub previous: CardReviewState,
    pub grade: QualityGrade,
    pub reviewed_on: NaiveDate,
    /// Name of the engine that produced the new state.
    pub scheduler: &'static str,
}

/// Persistence collaborator for graded cards.
///
/// Called exactly once per grade, synchronously, before the session moves to
/// the next card.
pub trait CardSink {
    type Error: std::fmt::Display;

    fn save(&mut self, graded: &GradedCard) -> Result<(), Self::Error>;
}

impl<T: CardSink + ?Sized> CardSink for &mut T {
    type Error = T::Error;

    fn save(&mut self, graded: &GradedCard) -> Result<(), Self::Error> {
        (**self).save(graded)
    }
}

/// Keeps graded cards in memory. Useful for previews and tests.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    pub saved: Vec<GradedCard>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CardSink for MemorySink {
    type Error = std::convert::Infallible;

    fn save(&mut self, graded: &GradedCard) -> Result<(), Self::Error> {
        self.saved.push(graded.clone());
        Ok(())
    }
}
