use cardwise_core::{Config, Database};
use chrono::NaiveDate;
use clap::Args;
use serde::Serialize;

use super::{load_due, report_anomalies, resolve_today, short_id};

#[derive(Args)]
pub struct DueArgs {
    /// Evaluate as of this date (YYYY-MM-DD) instead of today
    #[arg(long)]
    pub today: Option<NaiveDate>,
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct DueListing<'a> {
    today: NaiveDate,
    due: &'a [cardwise_core::Card],
    anomalies: &'a [cardwise_core::DueAnomaly],
}

pub fn run(args: DueArgs) -> Result<(), Box<dyn std::error::Error>> {
    let today = resolve_today(args.today);
    let config = Config::load_or_default();
    let db = Database::open()?;
    let (due, anomalies) = load_due(&db, today, config.session.order)?;

    if args.json {
        let listing = DueListing {
            today,
            due: &due,
            anomalies: &anomalies,
        };
        println!("{}", serde_json::to_string_pretty(&listing)?);
        return Ok(());
    }

    report_anomalies(&anomalies);
    if due.is_empty() {
        println!("Nothing due on {today}.");
        return Ok(());
    }
    println!("{} card(s) due on {today}:", due.len());
    for card in &due {
        println!(
            "  {}  {}  {}  {}",
            short_id(&card.id),
            card.review.due_date,
            card.review.status,
            card.front
        );
    }
    Ok(())
}
