use cardwise_core::{Card, Database, ReviewLogRecord};
use chrono::NaiveDate;
use clap::Subcommand;
use serde::Serialize;

use super::{resolve_today, short_id};

#[derive(Subcommand)]
pub enum CardAction {
    /// Add a new card, due on the day it is created
    Add {
        /// Prompt side
        front: String,
        /// Answer side
        back: String,
        /// Creation date (YYYY-MM-DD); the card is first due on this day
        #[arg(long)]
        today: Option<NaiveDate>,
    },
    /// List all cards
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show a card with its review history
    Show {
        /// Card ID, or a unique prefix of it
        id: String,
    },
    /// Delete a card and its review history
    Delete {
        /// Card ID, or a unique prefix of it
        id: String,
    },
}

#[derive(Serialize)]
struct CardDetail {
    card: Card,
    history: Vec<ReviewLogRecord>,
}

pub fn run(action: CardAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        CardAction::Add { front, back, today } => {
            let front = front.trim();
            let back = back.trim();
            if front.is_empty() || back.is_empty() {
                return Err("front and back must not be empty".into());
            }
            let db = Database::open()?;
            let card = Card::new(front, back, resolve_today(today));
            db.add_card(&card)?;
            println!("{}", card.id);
        }
        CardAction::List { json } => {
            let db = Database::open()?;
            let (cards, errors) = db.list_cards()?;
            for err in &errors {
                tracing::warn!(card_id = %err.card_id(), error = %err, "unreadable card");
                eprintln!("warning: {err}");
            }
            if json {
                println!("{}", serde_json::to_string_pretty(&cards)?);
            } else if cards.is_empty() {
                println!("No cards.");
            } else {
                println!(
                    "{:<8}  {:<10}  {:<10}  {:>8}  FRONT",
                    "ID", "STATUS", "DUE", "INTERVAL"
                );
                for card in &cards {
                    println!(
                        "{:<8}  {:<10}  {:<10}  {:>8}  {}",
                        short_id(&card.id),
                        card.review.status,
                        card.review.due_date,
                        card.review.interval,
                        card.front
                    );
                }
            }
        }
        CardAction::Show { id } => {
            let db = Database::open()?;
            let id = db.resolve_id(&id)?;
            let card = db.get_card(&id)?;
            let history = db.review_history(&id)?;
            let detail = CardDetail { card, history };
            println!("{}", serde_json::to_string_pretty(&detail)?);
        }
        CardAction::Delete { id } => {
            let mut db = Database::open()?;
            let id = db.resolve_id(&id)?;
            db.delete_card(&id)?;
            println!("Card deleted: {id}");
        }
    }
    Ok(())
}
