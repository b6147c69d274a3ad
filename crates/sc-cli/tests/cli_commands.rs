//! Integration tests for the sc-cli command-line interface.

#![allow(deprecated)] // Command::cargo_bin – macro replacement not yet stable

use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const CARD: &str = r#"{
    "parameters": [
        {"name": "favor", "id": "affection", "scope": "relationship", "type": "number",
         "min": -10, "max": 10},
        {"name": "mood", "scope": "character", "type": "enum",
         "enumValues": ["calm", "tense", "angry"], "default": "calm"},
        {"name": "weather", "scope": "global", "type": "text", "default": "clear"}
    ],
    "entities": [
        {"name": "Alice", "type": "character", "parameterNames": ["mood"]},
        {"name": "Bob", "type": "character"},
        {"name": "Town", "type": "location"},
        {"name": "Inn", "type": "location", "parentLocation": "Town"}
    ]
}"#;

const HISTORY: &str = r#"[
    {"role": "user", "text": "Bob walks into the inn. set('Alice.favor.Bob', 'up_large')"},
    {"role": "assistant", "text": "Alice glares. set('Alice.mood', 'next') cast('enter', 'Alice')\nlocation('current', 'Inn')"},
    {"role": "assistant", "text": "She softens. set('Alice.affection.Bob', 'down_small', 'apology')"}
]"#;

/// Create a temp directory holding a card and a short history.
fn fixture() -> (TempDir, PathBuf, PathBuf) {
    let dir = TempDir::new().unwrap();
    let card = dir.path().join("card.json");
    let history = dir.path().join("history.json");
    fs::write(&card, CARD).unwrap();
    fs::write(&history, HISTORY).unwrap();
    (dir, card, history)
}

fn sc() -> Command {
    Command::cargo_bin("sc").unwrap()
}

// ---------------------------------------------------------------------------
// check
// ---------------------------------------------------------------------------

#[test]
fn check_lists_parameters_and_entities() {
    let (_dir, card, _) = fixture();
    sc().args(["check", "--card"])
        .arg(&card)
        .assert()
        .success()
        .stdout(predicate::str::contains("favor"))
        .stdout(predicate::str::contains("affection"))
        .stdout(predicate::str::contains("Town.Inn"))
        .stdout(predicate::str::contains("focus=3"))
        .stdout(predicate::str::contains("Card OK: 3 parameters, 4 entities"));
}

#[test]
fn check_rejects_invalid_card() {
    let dir = TempDir::new().unwrap();
    let card = dir.path().join("card.json");
    fs::write(
        &card,
        r#"{"entities": [{"name": "Inn", "type": "location", "parentLocation": "Nowhere"}]}"#,
    )
    .unwrap();
    sc().args(["check", "--card"])
        .arg(&card)
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid card"));
}

#[test]
fn check_missing_card_fails() {
    sc().args(["check", "--card", "/nonexistent/card.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot read"));
}

// ---------------------------------------------------------------------------
// parse
// ---------------------------------------------------------------------------

#[test]
fn parse_reads_stdin() {
    let (_dir, card, _) = fixture();
    sc().args(["parse", "--card"])
        .arg(&card)
        .write_stdin("Alice smiles. set('Alice.favor.Bob', 'up_small', 'kind words')")
        .assert()
        .success()
        .stdout(predicate::str::contains("Alice.favor.Bob"))
        .stdout(predicate::str::contains("1 command, 0 dropped"));
}

#[test]
fn parse_reports_dropped_commands() {
    let (dir, card, _) = fixture();
    let block = dir.path().join("block.txt");
    fs::write(
        &block,
        "set('Alice.hunger', 'up_small')\ncast('enter', 'Bob')\nset('Alice.mood', 'next')",
    )
    .unwrap();
    sc().args(["parse", "--card"])
        .arg(&card)
        .arg("--file")
        .arg(&block)
        .assert()
        .success()
        .stdout(predicate::str::contains("cast enter Bob focus"))
        .stdout(predicate::str::contains("2 commands, 1 dropped"))
        .stderr(predicate::str::contains("hunger"));
}

// ---------------------------------------------------------------------------
// replay
// ---------------------------------------------------------------------------

#[test]
fn replay_prints_latest_state() {
    let (_dir, card, history) = fixture();
    sc().args(["replay", "--card"])
        .arg(&card)
        .arg("--history")
        .arg(&history)
        .assert()
        .success()
        .stdout(predicate::str::contains("state after turn"))
        .stdout(predicate::str::contains("Alice.favor.Bob"))
        .stdout(predicate::str::contains("Town.Inn"))
        .stdout(predicate::str::contains("\"tense\""));
}

#[test]
fn replay_json_at_index() {
    let (_dir, card, history) = fixture();
    let output = sc()
        .args(["replay", "--json", "--index", "0", "--card"])
        .arg(&card)
        .arg("--history")
        .arg(&history)
        .output()
        .unwrap();
    assert!(output.status.success());
    let state: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(state["variables"]["relationship"]["Alice"]["favor"]["Bob"], 5);
    assert_eq!(state["variables"]["character"]["Alice"]["mood"], "calm");
    assert_eq!(state["locationCast"]["current"], serde_json::Value::Null);
}

#[test]
fn replay_assistant_only_skips_user_turns() {
    let (_dir, card, history) = fixture();
    let output = sc()
        .args(["replay", "--json", "--assistant-only", "--card"])
        .arg(&card)
        .arg("--history")
        .arg(&history)
        .output()
        .unwrap();
    assert!(output.status.success());
    let state: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(state["variables"]["relationship"]["Alice"]["favor"]["Bob"], -1);
    assert_eq!(state["cast"]["focus"], serde_json::json!(["Alice"]));
}

#[test]
fn replay_index_out_of_range_fails() {
    let (_dir, card, history) = fixture();
    sc().args(["replay", "--index", "9", "--card"])
        .arg(&card)
        .arg("--history")
        .arg(&history)
        .assert()
        .failure()
        .stderr(predicate::str::contains("out of range"));
}

#[test]
fn replay_empty_history_shows_initial_state() {
    let (dir, card, _) = fixture();
    let history = dir.path().join("empty.json");
    fs::write(&history, "[]").unwrap();
    sc().args(["replay", "--card"])
        .arg(&card)
        .arg("--history")
        .arg(&history)
        .assert()
        .success()
        .stdout(predicate::str::contains("initial state"))
        .stdout(predicate::str::contains("\"clear\""));
}

#[test]
fn replay_marks_empty_slots_with_ascii_dash() {
    let (dir, card, _) = fixture();
    let history = dir.path().join("empty.json");
    fs::write(&history, "[]").unwrap();
    sc().args(["replay", "--card"])
        .arg(&card)
        .arg("--history")
        .arg(&history)
        .env("NO_COLOR", "1")
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"current:\s+-\n").unwrap())
        .stdout(predicate::str::contains("—").not());
}

#[test]
fn check_marks_missing_ids_with_ascii_dash() {
    let (_dir, card, _) = fixture();
    sc().args(["check", "--card"])
        .arg(&card)
        .assert()
        .success()
        .stdout(predicate::str::contains("—").not());
}
