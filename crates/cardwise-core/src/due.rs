//! Due-set selection.
//!
//! Picks the cards eligible for review on a given day. A card is due when
//! its due date is on or before today. Cards whose stored due date cannot be
//! read are kept out of the due set and reported as anomalies instead.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::CardDataError;
use crate::review::Card;

/// Order of the cards in a due set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DueOrder {
    /// Same order as the input collection.
    #[default]
    Input,
    /// Earliest due date first. Stable: cards due the same day keep their
    /// input order.
    OldestFirst,
}

impl std::fmt::Display for DueOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DueOrder::Input => write!(f, "input"),
            DueOrder::OldestFirst => write!(f, "oldest_first"),
        }
    }
}

impl std::str::FromStr for DueOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "input" => Ok(DueOrder::Input),
            "oldest_first" | "oldest-first" | "oldest" => Ok(DueOrder::OldestFirst),
            _ => Err(format!("Unknown due order: {}", s)),
        }
    }
}

/// Anything the selector can test for due-ness.
pub trait DueCandidate {
    fn card_id(&self) -> &str;

    /// The card's due date, or the reason it cannot be read.
    fn due_date(&self) -> Result<NaiveDate, CardDataError>;
}

impl DueCandidate for Card {
    fn card_id(&self) -> &str {
        &self.id
    }

    fn due_date(&self) -> Result<NaiveDate, CardDataError> {
        Ok(self.review.due_date)
    }
}

/// A card left out of the due set because its data was unreadable.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DueAnomaly {
    pub card_id: String,
    pub reason: String,
    #[serde(skip)]
    pub error: CardDataError,
}

impl From<CardDataError> for DueAnomaly {
    fn from(error: CardDataError) -> Self {
        Self {
            card_id: error.card_id().to_string(),
            reason: error.to_string(),
            error,
        }
    }
}

/// Result of a due-set selection.
#[derive(Debug, Clone, PartialEq)]
pub struct DueSelection<C> {
    pub due: Vec<C>,
    pub anomalies: Vec<DueAnomaly>,
}

impl<C> DueSelection<C> {
    pub fn is_empty(&self) -> bool {
        self.due.is_empty()
    }

    pub fn len(&self) -> usize {
        self.due.len()
    }

    pub fn has_anomalies(&self) -> bool {
        !self.anomalies.is_empty()
    }
}

/// Inclusive at today: a card due today is due.
pub fn is_due(due_date: NaiveDate, today: NaiveDate) -> bool {
    due_date <= today
}

/// Select the cards due on `today`.
///
/// Pure and repeatable; the input is never modified.
pub fn select_due<C>(cards: &[C], today: NaiveDate, order: DueOrder) -> DueSelection<C>
where
    C: DueCandidate + Clone,
{
    let mut due: Vec<(NaiveDate, C)> = Vec::new();
    let mut anomalies = Vec::new();

    for card in cards {
        match card.due_date() {
            Ok(date) if is_due(date, today) => due.push((date, card.clone())),
            Ok(_) => {}
            Err(err) => anomalies.push(DueAnomaly::from(err)),
        }
    }

    if order == DueOrder::OldestFirst {
        // sort_by_key is stable
        due.sort_by_key(|(date, _)| *date);
    }

    DueSelection {
        due: due.into_iter().map(|(_, card)| card).collect(),
        anomalies,
    }
}
