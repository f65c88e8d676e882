//! Review scheduling engines.
//!
//! [`ReviewScheduler`] is the seam between the session controller and the
//! algorithm deciding the next interval. SM-2 is the only engine shipped.

mod sm2;

pub use sm2::{
    next_ease, next_state, Sm2Scheduler, FIRST_INTERVAL_DAYS, LAPSE_INTERVAL_DAYS,
    SECOND_INTERVAL_DAYS,
};

use chrono::NaiveDate;

use crate::review::{CardReviewState, QualityGrade};

/// A pure scheduling engine: (state, grade, today) -> next state.
///
/// Implementations must not read the clock or touch storage.
pub trait ReviewScheduler {
    /// Short identifier written to the review log.
    fn name(&self) -> &'static str;

    fn next_state(
        &self,
        current: &CardReviewState,
        grade: QualityGrade,
        today: NaiveDate,
    ) -> CardReviewState;
}

impl<S: ReviewScheduler + ?Sized> ReviewScheduler for &S {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn next_state(
        &self,
        current: &CardReviewState,
        grade: QualityGrade,
        today: NaiveDate,
    ) -> CardReviewState {
        (**self).next_state(current, grade, today)
    }
}
