//! SM-2 (SuperMemo 2) scheduling.
//!
//! ## Rules
//!
//! ```text
//! quality < 3   -> repetitions = 0, interval = 1, status = relearning
//! quality >= 3  -> repetitions += 1
//!                  interval = 1 | 6 | round(interval * ease)   (rep 1 | 2 | 3+)
//!                  ease += 0.1 - (5 - q) * (0.08 + (5 - q) * 0.02), floor 1.3
//!                  status = review
//! due_date = today + interval
//! ```
//!
//! A lapse leaves the ease factor untouched. Textbook SM-2 would lower it;
//! this scheduler keeps the ease so a single slip does not permanently slow
//! a card down.

use chrono::NaiveDate;
use tracing::debug;

use super::ReviewScheduler;
use crate::clock::add_days;
use crate::review::{CardReviewState, QualityGrade, ReviewStatus, MIN_EASE_FACTOR};

/// Interval after the first successful review.
pub const FIRST_INTERVAL_DAYS: f64 = 1.0;
/// Interval after the second consecutive successful review.
pub const SECOND_INTERVAL_DAYS: f64 = 6.0;
/// Interval after a lapse.
pub const LAPSE_INTERVAL_DAYS: f64 = 1.0;

/// Stateless SM-2 engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sm2Scheduler;

impl ReviewScheduler for Sm2Scheduler {
    fn name(&self) -> &'static str {
        "sm2"
    }

    fn next_state(
        &self,
        current: &CardReviewState,
        grade: QualityGrade,
        today: NaiveDate,
    ) -> CardReviewState {
        next_state(current, grade, today)
    }
}

/// Compute the state a card moves to when graded `grade` on `today`.
pub fn next_state(
    current: &CardReviewState,
    grade: QualityGrade,
    today: NaiveDate,
) -> CardReviewState {
    let next = if grade.is_failure() {
        CardReviewState {
            interval: LAPSE_INTERVAL_DAYS,
            repetitions: 0,
            ease_factor: current.ease_factor,
            status: ReviewStatus::Relearning,
            due_date: due_after(today, LAPSE_INTERVAL_DAYS),
        }
    } else {
        let repetitions = current.repetitions.saturating_add(1);
        let interval = match repetitions {
            1 => FIRST_INTERVAL_DAYS,
            2 => SECOND_INTERVAL_DAYS,
            _ => (current.interval * current.ease_factor).round(),
        };
        CardReviewState {
            interval,
            repetitions,
            ease_factor: next_ease(current.ease_factor, grade),
            status: ReviewStatus::Review,
            due_date: due_after(today, interval),
        }
    };

    debug!(
        grade = %grade,
        interval_before = current.interval,
        interval_after = next.interval,
        ease_before = current.ease_factor,
        ease_after = next.ease_factor,
        due = %next.due_date,
        "sm2 scheduled card"
    );

    next
}

/// Ease factor after a successful review, clamped to the SM-2 floor.
pub fn next_ease(ease_factor: f64, grade: QualityGrade) -> f64 {
    let miss = 5.0 - f64::from(grade.quality());
    let ease = ease_factor + (0.1 - miss * (0.08 + miss * 0.02));
    ease.max(MIN_EASE_FACTOR)
}

fn due_after(today: NaiveDate, interval: f64) -> NaiveDate {
    // Intervals produced above are whole, non-negative numbers of days.
    add_days(today, interval.max(0.0) as u64)
}
