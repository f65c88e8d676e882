use std::io::{self, BufRead, Write};

use cardwise_core::{
    Card, CardSink, Config, Database, Event, FixedClock, QualityGrade, ReviewSession,
    SessionSummary, Sm2Scheduler,
};
use chrono::NaiveDate;
use clap::Args;
use tracing::debug;

use super::{load_due, report_anomalies, resolve_today};

/// kv key holding the JSON summary of the most recent session.
pub const LAST_SESSION_KEY: &str = "last_session";

#[derive(Args)]
pub struct ReviewArgs {
    /// Review as of this date (YYYY-MM-DD) instead of today
    #[arg(long)]
    pub today: Option<NaiveDate>,
    /// Review at most this many cards (overrides session.limit)
    #[arg(long)]
    pub limit: Option<usize>,
    /// Write session events to stderr as JSON lines
    #[arg(long)]
    pub events: bool,
}

/// Display switches for one interactive session.
#[derive(Debug, Clone, Copy)]
pub struct SessionOptions {
    pub show_progress: bool,
    pub show_schedule: bool,
    pub emit_events: bool,
}

pub fn run(args: ReviewArgs) -> Result<(), Box<dyn std::error::Error>> {
    let today = resolve_today(args.today);
    let config = Config::load_or_default();
    let mut db = Database::open()?;

    let (mut due, anomalies) = load_due(&db, today, config.session.order)?;
    report_anomalies(&anomalies);
    if let Some(limit) = args.limit.or(config.session.limit) {
        due.truncate(limit);
    }

    let options = SessionOptions {
        show_progress: config.display.show_progress,
        show_schedule: config.display.show_schedule,
        emit_events: args.events,
    };
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let summary = run_session(
        due,
        FixedClock::new(today),
        &mut db,
        stdin.lock(),
        &mut stdout,
        options,
    )?;

    db.kv_set(LAST_SESSION_KEY, &serde_json::to_string(&summary)?)?;
    Ok(())
}

/// Drive a session over `due`, reading answers from `input`.
///
/// Any line reveals the answer; a grade line grades it. `q` or end of input
/// abandons the session, leaving the remaining cards untouched.
pub fn run_session<R, W, K>(
    due: Vec<Card>,
    clock: FixedClock,
    sink: &mut K,
    input: R,
    out: &mut W,
    options: SessionOptions,
) -> Result<SessionSummary, Box<dyn std::error::Error>>
where
    R: BufRead,
    W: Write,
    K: CardSink,
{
    let mut session = ReviewSession::new(due, Sm2Scheduler, clock);
    emit(&options, &session.started())?;
    if session.is_finished() {
        writeln!(out, "Nothing to review.")?;
        return Ok(session.summary());
    }
    if let Some(event) = session.presented() {
        emit(&options, &event)?;
    }

    let mut lines = input.lines();
    'cards: while let Some(card) = session.current().cloned() {
        writeln!(out)?;
        if options.show_progress {
            let (graded, total) = session.progress();
            writeln!(out, "[{}/{}]", graded + 1, total)?;
        }
        writeln!(out, "Q: {}", card.front)?;
        write!(out, "(enter to reveal, q to quit) ")?;
        out.flush()?;
        match lines.next().transpose()? {
            Some(line) if !is_quit(&line) => {}
            _ => break,
        }

        if let Some(event) = session.reveal() {
            emit(&options, &event)?;
        }
        writeln!(out, "A: {}", card.back)?;

        let grade = loop {
            write!(out, "grade [1] again [2] hard [3] good [4] easy: ")?;
            out.flush()?;
            let Some(line) = lines.next().transpose()? else {
                break 'cards;
            };
            if is_quit(&line) {
                break 'cards;
            }
            match line.parse::<QualityGrade>() {
                Ok(grade) => break grade,
                Err(e) => writeln!(out, "{e}")?,
            }
        };

        let outcome = session.submit_grade(grade, sink)?;
        for event in &outcome.events {
            emit(&options, event)?;
        }
        if let Err(failure) = &outcome.persisted {
            writeln!(out, "warning: not saved: {}", failure.message)?;
        }
        if options.show_schedule {
            let review = &outcome.card().review;
            writeln!(
                out,
                "next review in {} day(s), on {}",
                review.interval, review.due_date
            )?;
        }
    }

    let summary = session.summary();
    writeln!(out)?;
    if session.is_finished() {
        writeln!(out, "Session complete: {} card(s) reviewed.", summary.graded)?;
    } else {
        writeln!(
            out,
            "Session stopped: {} of {} card(s) reviewed.",
            summary.graded, summary.total
        )?;
    }
    let counts = summary.by_grade;
    writeln!(
        out,
        "again {}, hard {}, good {}, easy {}",
        counts.again, counts.hard, counts.good, counts.easy
    )?;
    if !summary.failed_saves.is_empty() {
        writeln!(out, "{} card(s) could not be saved:", summary.failed_saves.len())?;
        for failure in &summary.failed_saves {
            writeln!(out, "  {}: {}", failure.card_id, failure.message)?;
        }
    }
    Ok(summary)
}

fn is_quit(line: &str) -> bool {
    matches!(line.trim(), "q" | "Q" | "quit")
}

fn emit(options: &SessionOptions, event: &Event) -> serde_json::Result<()> {
    debug!(?event, "session event");
    if options.emit_events {
        eprintln!("{}", serde_json::to_string(event)?);
    }
    Ok(())
}
