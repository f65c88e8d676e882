use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Lowest ease factor SM-2 allows.
pub const MIN_EASE_FACTOR: f64 = 1.3;

/// Ease factor given to freshly authored cards.
pub const INITIAL_EASE_FACTOR: f64 = 2.5;

/// Informational classification of a card. Rewritten by the scheduler, never
/// read by the interval formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReviewStatus {
    #[default]
    New,
    Learning,
    Review,
    Relearning,
}

impl ReviewStatus {
    pub const ALL: [ReviewStatus; 4] = [
        ReviewStatus::New,
        ReviewStatus::Learning,
        ReviewStatus::Review,
        ReviewStatus::Relearning,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewStatus::New => "new",
            ReviewStatus::Learning => "learning",
            ReviewStatus::Review => "review",
            ReviewStatus::Relearning => "relearning",
        }
    }
}

impl std::fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

impl std::str::FromStr for ReviewStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "new" => Ok(ReviewStatus::New),
            "learning" => Ok(ReviewStatus::Learning),
            "review" => Ok(ReviewStatus::Review),
            "relearning" => Ok(ReviewStatus::Relearning),
            _ => Err(format!("Unknown review status: {}", s)),
        }
    }
}

/// Scheduling memory of a single card.
///
/// Between grading events the following hold:
/// - `ease_factor >= MIN_EASE_FACTOR`
/// - `interval >= 0`, and `0` only before the first review
/// - `repetitions` is `0` right after a failed grade
/// - `due_date` is the grading day plus `interval` days
///
/// `due_date` serializes as a zero-padded `YYYY-MM-DD` string, so the text
/// form sorts the same way the dates do.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardReviewState {
    /// Days until the next review.
    pub interval: f64,
    /// Consecutive successful reviews since creation or the last failure.
    pub repetitions: u32,
    pub ease_factor: f64,
    pub status: ReviewStatus,
    pub due_date: NaiveDate,
}

impl CardReviewState {
    /// State of a card that has just been authored. It is due right away.
    pub fn new_card(today: NaiveDate) -> Self {
        Self {
            interval: 0.0,
            repetitions: 0,
            ease_factor: INITIAL_EASE_FACTOR,
            status: ReviewStatus::New,
            due_date: today,
        }
    }

    /// Check the numeric invariants.
    ///
    /// # Errors
    /// Returns a `ValidationError` when the ease factor is below the floor or
    /// not a number, or when the interval is negative or not finite.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.ease_factor.is_finite() || self.ease_factor < MIN_EASE_FACTOR {
            return Err(ValidationError::EaseTooLow {
                value: self.ease_factor,
                min: MIN_EASE_FACTOR,
            });
        }
        if !self.interval.is_finite() || self.interval < 0.0 {
            return Err(ValidationError::InvalidInterval(self.interval));
        }
        Ok(())
    }
}
