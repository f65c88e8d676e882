use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::review::{QualityGrade, ReviewStatus};
use crate::session::SessionState;

/// Every review session transition produces an Event.
/// The presentation layer renders them; the CLI can print them as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    SessionStarted {
        due_count: usize,
        state: SessionState,
        at: DateTime<Utc>,
    },
    CardPresented {
        card_id: String,
        position: usize,
        total: usize,
        at: DateTime<Utc>,
    },
    AnswerRevealed {
        card_id: String,
        at: DateTime<Utc>,
    },
    CardGraded {
        card_id: String,
        grade: QualityGrade,
        interval_before: f64,
        interval_after: f64,
        ease_after: f64,
        status: ReviewStatus,
        due_date: NaiveDate,
        at: DateTime<Utc>,
    },
    /// The sink could not persist a graded card. The session moved on anyway.
    SaveFailed {
        card_id: String,
        error: String,
        at: DateTime<Utc>,
    },
    SessionFinished {
        graded: usize,
        failed_saves: usize,
        at: DateTime<Utc>,
    },
}

impl Event {
    /// Card the event refers to, if any.
    pub fn card_id(&self) -> Option<&str> {
        match self {
            Event::CardPresented { card_id, .. }
            | Event::AnswerRevealed { card_id, .. }
            | Event::CardGraded { card_id, .. }
            | Event::SaveFailed { card_id, .. } => Some(card_id),
            Event::SessionStarted { .. } | Event::SessionFinished { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_type_tag() {
        let event = Event::AnswerRevealed {
            card_id: "c1".into(),
            at: Utc::now(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "answer_revealed");
        assert_eq!(json["card_id"], "c1");
        assert_eq!(event.card_id(), Some("c1"));
    }
}
