use cardwise_core::{Database, DeckStats};
use chrono::NaiveDate;
use clap::Args;
use serde::Serialize;

use super::{resolve_today, review::LAST_SESSION_KEY};

#[derive(Args)]
pub struct StatsArgs {
    /// Count due cards and reviews as of this date (YYYY-MM-DD)
    #[arg(long)]
    pub today: Option<NaiveDate>,
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct StatsReport {
    today: NaiveDate,
    #[serde(flatten)]
    deck: DeckStats,
    last_session: Option<serde_json::Value>,
}

pub fn run(args: StatsArgs) -> Result<(), Box<dyn std::error::Error>> {
    let today = resolve_today(args.today);
    let db = Database::open()?;
    let deck = db.deck_stats(today)?;
    let last_session = db
        .kv_get(LAST_SESSION_KEY)?
        .and_then(|raw| serde_json::from_str::<serde_json::Value>(&raw).ok());

    if args.json {
        let report = StatsReport {
            today,
            deck,
            last_session,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Deck as of {today}");
    println!("  cards:       {}", deck.total_cards);
    println!("  new:         {}", deck.new);
    println!("  learning:    {}", deck.learning);
    println!("  review:      {}", deck.review);
    println!("  relearning:  {}", deck.relearning);
    println!("  due today:   {}", deck.due_today);
    if deck.unreadable > 0 {
        println!("  unreadable:  {}", deck.unreadable);
    }
    println!("  reviews:     {} ({} today)", deck.total_reviews, deck.reviews_today);

    if let Some(last) = last_session {
        let count = |key: &str| last.get(key).and_then(|v| v.as_u64()).unwrap_or(0);
        let unsaved = last
            .get("failed_saves")
            .and_then(|v| v.as_array())
            .map_or(0, Vec::len);
        println!(
            "Last session: {}/{} graded, {} unsaved",
            count("graded"),
            count("total"),
            unsaved
        );
    }
    Ok(())
}
