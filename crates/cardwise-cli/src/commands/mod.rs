pub mod card;
pub mod config;
pub mod due;
pub mod review;
pub mod stats;

use cardwise_core::{
    select_due, Card, CardRow, Clock, Database, DueAnomaly, DueOrder, SystemClock,
};
use chrono::NaiveDate;
use tracing::warn;

/// `--today` override, or the local calendar date.
pub fn resolve_today(arg: Option<NaiveDate>) -> NaiveDate {
    arg.unwrap_or_else(|| SystemClock.today())
}

/// Due cards in session order, plus every row that had to be left out.
///
/// Rows with a readable due date can still fail to load (unknown status,
/// broken numbers); those are reported alongside the date anomalies.
pub fn load_due(
    db: &Database,
    today: NaiveDate,
    order: DueOrder,
) -> Result<(Vec<Card>, Vec<DueAnomaly>), Box<dyn std::error::Error>> {
    let rows: Vec<CardRow> = db.list_rows()?;
    let selection = select_due(&rows, today, order);
    let mut anomalies = selection.anomalies;
    let mut due = Vec::with_capacity(selection.due.len());
    for row in selection.due {
        match row.into_card() {
            Ok(card) => due.push(card),
            Err(e) => anomalies.push(DueAnomaly::from(e)),
        }
    }
    for anomaly in &anomalies {
        warn!(card_id = %anomaly.card_id, reason = %anomaly.reason, "card skipped");
    }
    Ok((due, anomalies))
}

pub fn report_anomalies(anomalies: &[DueAnomaly]) {
    for anomaly in anomalies {
        eprintln!("warning: skipped {}", anomaly.reason);
    }
}

/// First eight characters of a card id, enough to tell cards apart in lists.
pub fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}
