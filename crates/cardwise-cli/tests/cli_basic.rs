//! Basic CLI E2E tests.
//!
//! Tests invoke the built binary against a throwaway data directory and
//! verify outputs.

use std::io::Write;
use std::process::{Command, Stdio};

use cardwise_core::{Event, QualityGrade};
use tempfile::TempDir;

/// Run a CLI command and return (exit code, stdout, stderr).
fn run_cli(dir: &TempDir, args: &[&str]) -> (i32, String, String) {
    run_cli_with_input(dir, args, "")
}

fn run_cli_with_input(dir: &TempDir, args: &[&str], input: &str) -> (i32, String, String) {
    let mut child = Command::new(env!("CARGO_BIN_EXE_cardwise"))
        .args(args)
        .env("CARDWISE_DATA_DIR", dir.path())
        .env_remove("CARDWISE_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to execute CLI command");

    child
        .stdin
        .take()
        .unwrap()
        .write_all(input.as_bytes())
        .unwrap();
    let output = child.wait_with_output().unwrap();

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (code, stdout, stderr)
}

fn add_card(dir: &TempDir, front: &str, back: &str) -> String {
    let (code, stdout, stderr) = run_cli(dir, &["card", "add", front, back]);
    assert_eq!(code, 0, "card add failed: {stderr}");
    stdout.trim().to_string()
}

#[test]
fn test_card_add_and_list_json() {
    let dir = TempDir::new().unwrap();
    let id = add_card(&dir, "capital of France", "Paris");

    let (code, stdout, _) = run_cli(&dir, &["card", "list", "--json"]);
    assert_eq!(code, 0);
    let cards: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let cards = cards.as_array().unwrap();
    assert_eq!(cards.len(), 1);
    assert_eq!(cards[0]["id"], id.as_str());
    assert_eq!(cards[0]["review"]["status"], "new");
    assert_eq!(cards[0]["review"]["ease_factor"], 2.5);
}

#[test]
fn test_card_add_rejects_empty_sides() {
    let dir = TempDir::new().unwrap();
    let (code, _, stderr) = run_cli(&dir, &["card", "add", "  ", "Paris"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("error:"));
}

#[test]
fn test_card_show_unknown_id_fails() {
    let dir = TempDir::new().unwrap();
    let (code, _, stderr) = run_cli(&dir, &["card", "show", "missing"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("Card not found: missing"));
}

#[test]
fn test_card_show_and_delete_by_listed_id() {
    let dir = TempDir::new().unwrap();
    let id = add_card(&dir, "hola", "hello");

    let (code, stdout, _) = run_cli(&dir, &["card", "list"]);
    assert_eq!(code, 0);
    let listed = stdout
        .lines()
        .find(|line| line.ends_with("hola"))
        .and_then(|line| line.split_whitespace().next())
        .unwrap()
        .to_string();
    assert!(id.starts_with(&listed));

    let (code, stdout, stderr) = run_cli(&dir, &["card", "show", &listed]);
    assert_eq!(code, 0, "card show failed: {stderr}");
    let detail: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(detail["card"]["id"], id.as_str());

    let (code, stdout, _) = run_cli(&dir, &["card", "delete", &listed]);
    assert_eq!(code, 0);
    assert!(stdout.contains(&id));
}

#[test]
fn test_card_list_columns_line_up() {
    let dir = TempDir::new().unwrap();
    let (code, _, _) = run_cli(&dir, &["card", "add", "hola", "hello", "--today", "2030-05-01"]);
    assert_eq!(code, 0);
    let (_, stdout, _) = run_cli(&dir, &["card", "list"]);
    let mut lines = stdout.lines();
    let header = lines.next().unwrap();
    let row = lines.next().unwrap();
    assert_eq!(row.find("2030-05-01"), header.find("DUE"));
    assert!(row.contains("new         2030-05-01"));
}

#[test]
fn test_card_add_with_creation_date() {
    let dir = TempDir::new().unwrap();
    let id = run_cli(&dir, &["card", "add", "uno", "one", "--today", "2030-05-01"]).1;
    let (_, stdout, _) = run_cli(&dir, &["card", "show", id.trim()]);
    let detail: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(detail["card"]["review"]["due_date"], "2030-05-01");

    let (_, stdout, _) = run_cli(&dir, &["due", "--today", "2030-04-30", "--json"]);
    let due: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert!(due["due"].as_array().unwrap().is_empty());
}

#[test]
fn test_review_events_are_json_lines() {
    let dir = TempDir::new().unwrap();
    let id = add_card(&dir, "hola", "hello");

    let (code, _, stderr) = run_cli_with_input(
        &dir,
        &["review", "--today", "2030-01-01", "--events"],
        "\neasy\n",
    );
    assert_eq!(code, 0);
    let events: Vec<Event> = stderr
        .lines()
        .filter(|line| line.starts_with('{'))
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();

    assert_eq!(events.len(), 5);
    assert!(matches!(events[0], Event::SessionStarted { due_count: 1, .. }));
    assert!(matches!(events[1], Event::CardPresented { position: 1, total: 1, .. }));
    assert!(matches!(events[2], Event::AnswerRevealed { .. }));
    match &events[3] {
        Event::CardGraded { card_id, grade, .. } => {
            assert_eq!(card_id, &id);
            assert_eq!(*grade, QualityGrade::Easy);
        }
        other => panic!("expected CardGraded, got {other:?}"),
    }
    assert!(matches!(events[4], Event::SessionFinished { graded: 1, failed_saves: 0, .. }));
}

#[test]
fn test_card_delete() {
    let dir = TempDir::new().unwrap();
    let id = add_card(&dir, "2 + 2", "4");
    let (code, _, _) = run_cli(&dir, &["card", "delete", &id]);
    assert_eq!(code, 0);

    let (_, stdout, _) = run_cli(&dir, &["card", "list", "--json"]);
    let cards: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert!(cards.as_array().unwrap().is_empty());
}

#[test]
fn test_review_session_reschedules_cards() {
    let dir = TempDir::new().unwrap();
    let id = add_card(&dir, "hola", "hello");

    let (code, stdout, stderr) =
        run_cli_with_input(&dir, &["review", "--today", "2030-01-01"], "\ngood\n");
    assert_eq!(code, 0, "review failed: {stderr}");
    assert!(stdout.contains("Q: hola"));
    assert!(stdout.contains("A: hello"));
    assert!(stdout.contains("Session complete: 1 card(s) reviewed."));

    let (_, stdout, _) = run_cli(&dir, &["card", "show", &id]);
    let detail: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(detail["card"]["review"]["interval"], 1.0);
    assert_eq!(detail["card"]["review"]["repetitions"], 1);
    assert_eq!(detail["card"]["review"]["due_date"], "2030-01-02");
    assert_eq!(detail["history"].as_array().unwrap().len(), 1);
    assert_eq!(detail["history"][0]["grade"], "good");

    // Not due again until tomorrow.
    let (_, stdout, _) = run_cli(&dir, &["due", "--today", "2030-01-01", "--json"]);
    let due: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert!(due["due"].as_array().unwrap().is_empty());

    let (_, stdout, _) = run_cli(&dir, &["due", "--today", "2030-01-02", "--json"]);
    let due: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(due["due"].as_array().unwrap().len(), 1);
}

#[test]
fn test_review_respects_limit_and_quit() {
    let dir = TempDir::new().unwrap();
    for i in 0..3 {
        add_card(&dir, &format!("q{i}"), &format!("a{i}"));
    }

    let (code, stdout, _) = run_cli_with_input(
        &dir,
        &["review", "--today", "2030-01-01", "--limit", "2"],
        "\n1\nq\n",
    );
    assert_eq!(code, 0);
    assert!(stdout.contains("[1/2]"));
    assert!(stdout.contains("Session stopped: 1 of 2 card(s) reviewed."));

    let (_, stdout, _) = run_cli(&dir, &["stats", "--today", "2030-01-01", "--json"]);
    let stats: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(stats["total_cards"], 3);
    assert_eq!(stats["relearning"], 1);
    assert_eq!(stats["new"], 2);
    assert_eq!(stats["total_reviews"], 1);
    assert_eq!(stats["last_session"]["graded"], 1);
}

#[test]
fn test_review_with_nothing_due() {
    let dir = TempDir::new().unwrap();
    let (code, stdout, _) = run_cli(&dir, &["review"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("Nothing to review."));
}

#[test]
fn test_config_set_get_and_reset() {
    let dir = TempDir::new().unwrap();
    let (code, _, _) = run_cli(&dir, &["config", "set", "session.limit", "20"]);
    assert_eq!(code, 0);
    let (_, stdout, _) = run_cli(&dir, &["config", "get", "session.limit"]);
    assert_eq!(stdout.trim(), "20");

    let (code, _, _) = run_cli(&dir, &["config", "set", "session.order", "oldest_first"]);
    assert_eq!(code, 0);

    let (code, _, _) = run_cli(&dir, &["config", "reset"]);
    assert_eq!(code, 0);
    let (_, stdout, _) = run_cli(&dir, &["config", "get", "session.order"]);
    assert_eq!(stdout.trim(), "input");
}

#[test]
fn test_config_rejects_unknown_key() {
    let dir = TempDir::new().unwrap();
    let (code, _, stderr) = run_cli(&dir, &["config", "set", "session.speed", "fast"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("error:"));
}

#[test]
fn test_completions() {
    let dir = TempDir::new().unwrap();
    let (code, stdout, _) = run_cli(&dir, &["completions", "bash"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("cardwise"));
}
