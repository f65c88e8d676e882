//! SQLite-based deck storage.
//!
//! Provides persistent storage for:
//! - Cards and their review state
//! - A log of every grade given
//! - Key-value store for application state
//!
//! Rows are read back as [`CardRow`] with the raw column text, so a corrupt
//! row can be reported on its own instead of failing the whole deck.

use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{data_dir, migrations};
use crate::due::{is_due, DueCandidate};
use crate::error::{CardDataError, CoreError, DatabaseError, Result, ValidationError};
use crate::review::{Card, CardReviewState, ReviewStatus};
use crate::session::{CardSink, GradedCard};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// A `cards` row as stored, before interpretation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardRow {
    pub id: String,
    pub front: String,
    pub back: String,
    pub interval: f64,
    pub repetitions: i64,
    pub ease_factor: f64,
    pub status: String,
    pub due_date: String,
    pub created_at: String,
}

impl CardRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            front: row.get(1)?,
            back: row.get(2)?,
            interval: row.get(3)?,
            repetitions: row.get(4)?,
            ease_factor: row.get(5)?,
            status: row.get(6)?,
            due_date: row.get(7)?,
            created_at: row.get(8)?,
        })
    }

    /// Interpret the row as a typed card.
    ///
    /// # Errors
    /// Returns the first field that cannot be read or that breaks a review
    /// state invariant.
    pub fn into_card(self) -> Result<Card, CardDataError> {
        let due_date = DueCandidate::due_date(&self)?;
        let status: ReviewStatus =
            self.status
                .parse()
                .map_err(|_| CardDataError::UnknownStatus {
                    card_id: self.id.clone(),
                    raw: self.status.clone(),
                })?;
        let repetitions =
            u32::try_from(self.repetitions).map_err(|_| CardDataError::InvalidState {
                card_id: self.id.clone(),
                source: ValidationError::InvalidValue {
                    field: "repetitions".into(),
                    message: format!("{} is not a valid count", self.repetitions),
                },
            })?;
        let review = CardReviewState {
            interval: self.interval,
            repetitions,
            ease_factor: self.ease_factor,
            status,
            due_date,
        };
        review
            .validate()
            .map_err(|source| CardDataError::InvalidState {
                card_id: self.id.clone(),
                source,
            })?;
        let created_at = DateTime::parse_from_rfc3339(&self.created_at)
            .map_err(|_| CardDataError::MalformedTimestamp {
                card_id: self.id.clone(),
                raw: self.created_at.clone(),
            })?
            .with_timezone(&Utc);

        Ok(Card {
            id: self.id,
            front: self.front,
            back: self.back,
            review,
            created_at,
        })
    }
}

impl DueCandidate for CardRow {
    fn card_id(&self) -> &str {
        &self.id
    }

    fn due_date(&self) -> Result<NaiveDate, CardDataError> {
        NaiveDate::parse_from_str(&self.due_date, DATE_FORMAT).map_err(|_| {
            CardDataError::MalformedDueDate {
                card_id: self.id.clone(),
                raw: self.due_date.clone(),
            }
        })
    }
}

/// One grade recorded in the review log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewLogRecord {
    pub id: i64,
    pub card_id: String,
    pub grade: String,
    pub quality: u8,
    pub scheduler: String,
    pub interval_before: f64,
    pub interval_after: f64,
    pub ease_before: f64,
    pub ease_after: f64,
    pub reviewed_on: String,
    pub reviewed_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct DeckStats {
    pub total_cards: u64,
    pub new: u64,
    pub learning: u64,
    pub review: u64,
    pub relearning: u64,
    pub due_today: u64,
    /// Rows whose data could not be read.
    pub unreadable: u64,
    pub total_reviews: u64,
    pub reviews_today: u64,
}

/// SQLite database holding the deck.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open the database at `<data_dir>/cardwise.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        let path = data_dir()?.join("cardwise.db");
        Self::open_at(&path)
    }

    /// Open (or create) the database at `path`.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Self::init(conn)
    }

    /// Open an in-memory database.
    ///
    /// # Errors
    /// Returns an error if the schema cannot be created.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        migrations::migrate(&conn)
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        Ok(Self { conn })
    }

    // ── Cards ────────────────────────────────────────────────────────

    /// Insert a newly authored card.
    ///
    /// # Errors
    /// Returns an error if the insert fails (for example a duplicate id).
    pub fn add_card(&self, card: &Card) -> Result<()> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO cards (id, front, back, interval, repetitions, ease_factor,
                                status, due_date, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                card.id,
                card.front,
                card.back,
                card.review.interval,
                card.review.repetitions,
                card.review.ease_factor,
                card.review.status.as_str(),
                card.review.due_date.format(DATE_FORMAT).to_string(),
                card.created_at.to_rfc3339(),
                now,
            ],
        )?;
        debug!(card_id = %card.id, "card added");
        Ok(())
    }

    /// Fetch the raw row of a card.
    ///
    /// # Errors
    /// Returns `DatabaseError::CardNotFound` if no card has this id.
    pub fn get_row(&self, id: &str) -> Result<CardRow> {
        self.conn
            .query_row(
                "SELECT id, front, back, interval, repetitions, ease_factor, status, due_date, created_at
                 FROM cards WHERE id = ?1",
                params![id],
                CardRow::from_row,
            )
            .optional()?
            .ok_or_else(|| DatabaseError::CardNotFound(id.to_string()).into())
    }

    /// Expand an id or a unique id prefix, as printed by `card list`, into
    /// the full card id.
    ///
    /// # Errors
    /// `CardNotFound` when nothing matches, `AmbiguousId` when several
    /// cards share the prefix.
    pub fn resolve_id(&self, prefix: &str) -> Result<String> {
        if prefix.is_empty() {
            return Err(DatabaseError::CardNotFound(String::new()).into());
        }
        let mut stmt = self
            .conn
            .prepare("SELECT id FROM cards WHERE substr(id, 1, length(?1)) = ?1 ORDER BY id")?;
        let mut ids = stmt
            .query_map(params![prefix], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        if let Some(pos) = ids.iter().position(|id| id == prefix) {
            return Ok(ids.swap_remove(pos));
        }
        match ids.len() {
            0 => Err(DatabaseError::CardNotFound(prefix.to_string()).into()),
            1 => Ok(ids.remove(0)),
            matches => Err(DatabaseError::AmbiguousId {
                prefix: prefix.to_string(),
                matches,
            }
            .into()),
        }
    }

    /// Fetch and interpret a card.
    ///
    /// # Errors
    /// Returns `CardNotFound` for unknown ids and `CardData` for corrupt rows.
    pub fn get_card(&self, id: &str) -> Result<Card> {
        Ok(self.get_row(id)?.into_card()?)
    }

    /// All rows, in authoring order.
    pub fn list_rows(&self) -> Result<Vec<CardRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, front, back, interval, repetitions, ease_factor, status, due_date, created_at
             FROM cards
             ORDER BY created_at, rowid",
        )?;
        let rows = stmt.query_map([], CardRow::from_row)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    /// All readable cards in authoring order, plus the errors of the rows
    /// that could not be read.
    pub fn list_cards(&self) -> Result<(Vec<Card>, Vec<CardDataError>)> {
        let mut cards = Vec::new();
        let mut unreadable = Vec::new();
        for row in self.list_rows()? {
            match row.into_card() {
                Ok(card) => cards.push(card),
                Err(e) => unreadable.push(e),
            }
        }
        Ok((cards, unreadable))
    }

    /// Delete a card and its review history.
    ///
    /// # Errors
    /// Returns `DatabaseError::CardNotFound` if no card has this id.
    pub fn delete_card(&mut self, id: &str) -> Result<()> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM review_log WHERE card_id = ?1", params![id])?;
        let deleted = tx.execute("DELETE FROM cards WHERE id = ?1", params![id])?;
        if deleted == 0 {
            return Err(DatabaseError::CardNotFound(id.to_string()).into());
        }
        tx.commit()?;
        Ok(())
    }

    /// Store a graded card: its new review state and a review log entry,
    /// in one transaction.
    ///
    /// # Errors
    /// Returns `DatabaseError::CardNotFound` if the card was deleted meanwhile.
    pub fn save_graded(&mut self, graded: &GradedCard) -> Result<()> {
        let card = &graded.card;
        let review = &card.review;
        let now = Utc::now().to_rfc3339();

        let tx = self.conn.transaction()?;
        let updated = tx.execute(
            "UPDATE cards
             SET interval = ?2, repetitions = ?3, ease_factor = ?4, status = ?5,
                 due_date = ?6, updated_at = ?7
             WHERE id = ?1",
            params![
                card.id,
                review.interval,
                review.repetitions,
                review.ease_factor,
                review.status.as_str(),
                review.due_date.format(DATE_FORMAT).to_string(),
                now,
            ],
        )?;
        if updated == 0 {
            return Err(DatabaseError::CardNotFound(card.id.clone()).into());
        }
        tx.execute(
            "INSERT INTO review_log (card_id, grade, quality, scheduler, interval_before,
                                     interval_after, ease_before, ease_after, reviewed_on, reviewed_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                card.id,
                graded.grade.as_str(),
                graded.grade.quality(),
                graded.scheduler,
                graded.previous.interval,
                review.interval,
                graded.previous.ease_factor,
                review.ease_factor,
                graded.reviewed_on.format(DATE_FORMAT).to_string(),
                now,
            ],
        )?;
        tx.commit()?;
        debug!(card_id = %card.id, due = %review.due_date, "graded card saved");
        Ok(())
    }

    /// Review log of one card, oldest first.
    pub fn review_history(&self, card_id: &str) -> Result<Vec<ReviewLogRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, card_id, grade, quality, scheduler, interval_before, interval_after,
                    ease_before, ease_after, reviewed_on, reviewed_at
             FROM review_log
             WHERE card_id = ?1
             ORDER BY id",
        )?;
        let rows = stmt.query_map(params![card_id], |row| {
            Ok(ReviewLogRecord {
                id: row.get(0)?,
                card_id: row.get(1)?,
                grade: row.get(2)?,
                quality: row.get(3)?,
                scheduler: row.get(4)?,
                interval_before: row.get(5)?,
                interval_after: row.get(6)?,
                ease_before: row.get(7)?,
                ease_after: row.get(8)?,
                reviewed_on: row.get(9)?,
                reviewed_at: row.get(10)?,
            })
        })?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    /// Deck counts as of `today`.
    pub fn deck_stats(&self, today: NaiveDate) -> Result<DeckStats> {
        let mut stats = DeckStats::default();
        for row in self.list_rows()? {
            stats.total_cards += 1;
            let card = match row.into_card() {
                Ok(card) => card,
                Err(_) => {
                    stats.unreadable += 1;
                    continue;
                }
            };
            match card.review.status {
                ReviewStatus::New => stats.new += 1,
                ReviewStatus::Learning => stats.learning += 1,
                ReviewStatus::Review => stats.review += 1,
                ReviewStatus::Relearning => stats.relearning += 1,
            }
            if is_due(card.review.due_date, today) {
                stats.due_today += 1;
            }
        }

        stats.total_reviews =
            self.conn
                .query_row("SELECT COUNT(*) FROM review_log", [], |row| row.get(0))?;
        stats.reviews_today = self.conn.query_row(
            "SELECT COUNT(*) FROM review_log WHERE reviewed_on = ?1",
            params![today.format(DATE_FORMAT).to_string()],
            |row| row.get(0),
        )?;
        Ok(stats)
    }

    // ── Key-value ────────────────────────────────────────────────────

    /// Get a value from the kv store.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get::<_, String>(0)
            })
            .optional()?;
        Ok(value)
    }

    /// Set a value in the kv store.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }
}

impl CardSink for Database {
    type Error = CoreError;

    fn save(&mut self, graded: &GradedCard) -> Result<(), CoreError> {
        self.save_graded(graded)
    }
}
