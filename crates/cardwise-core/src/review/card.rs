use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::state::CardReviewState;

/// A flashcard together with its scheduling memory.
///
/// The scheduling core only reads `id` and `review`; the text fields are
/// carried for whoever presents the card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub id: String,
    pub front: String,
    pub back: String,
    pub review: CardReviewState,
    pub created_at: DateTime<Utc>,
}

impl Card {
    /// Author a new card with a fresh UUID and a new-card review state.
    pub fn new(front: impl Into<String>, back: impl Into<String>, today: NaiveDate) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            front: front.into(),
            back: back.into(),
            review: CardReviewState::new_card(today),
            created_at: Utc::now(),
        }
    }

    /// Same card with a replaced review state.
    pub fn with_review(&self, review: CardReviewState) -> Self {
        Self {
            review,
            ..self.clone()
        }
    }
}
