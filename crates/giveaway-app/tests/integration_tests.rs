// Integration tests for the giveaway tool.
//
// These drive whole runs through the library's public API: loading a comment
// dump, aggregating under each counting mode, writing reports, and drawing a
// winner from either a fresh tally or a previous run's JSON report.

use std::path::{Path, PathBuf};

use clap::Parser;
use giveaway_app::cli::{self, Cli};
use giveaway_app::report;
use giveaway_app::source;
use giveaway_core::{aggregate, draw_winner, CountingMode, RngSource, Tally};

// ===========================================================================
// Test helpers
// ===========================================================================

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

fn defaults_config() -> String {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("defaults/giveaway.toml")
        .display()
        .to_string()
}

/// Fresh scratch directory for report output.
fn scratch(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("giveaway_it_{name}"));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn load_fixture_tally(mode: CountingMode) -> Tally {
    let loaded = source::load_comments(&fixture("comments.json")).unwrap();
    aggregate(&loaded.records, mode)
}

fn handles(tally: &Tally) -> Vec<&str> {
    tally.ranked().iter().map(|p| p.handle.as_str()).collect()
}

fn run_cli(args: &[&str]) -> anyhow::Result<String> {
    let config = defaults_config();
    let mut argv = vec!["giveaway", "--config", config.as_str()];
    argv.extend_from_slice(args);
    cli::run(Cli::try_parse_from(argv)?)
}

// ===========================================================================
// Loading
// ===========================================================================

#[test]
fn fixture_loads_with_one_malformed_record() {
    let loaded = source::load_comments(&fixture("comments.json")).unwrap();
    assert_eq!(loaded.records.len(), 8);
    assert_eq!(loaded.malformed, 1);
}

#[test]
fn json_lines_fixture_loads() {
    let loaded = source::load_comments(&fixture("comments.jsonl")).unwrap();
    assert_eq!(loaded.records.len(), 3);
    let tally = aggregate(&loaded.records, CountingMode::PerLink);
    assert_eq!(tally.get("bob").unwrap().entry_count, 2);
    assert_eq!(tally.total_entries(), 3);
}

// ===========================================================================
// Aggregation across modes
// ===========================================================================

#[test]
fn per_comment_mode_over_fixture() {
    let tally = load_fixture_tally(CountingMode::PerComment);
    assert_eq!(handles(&tally), vec!["alice", "carol", "dave"]);
    assert_eq!(tally.get("alice").unwrap().entry_count, 2);
    assert_eq!(tally.get("carol").unwrap().entry_count, 2);
    assert_eq!(tally.get("dave").unwrap().entry_count, 1);
    assert_eq!(tally.total_entries(), 5);
    assert!(tally.get("bob").is_none());
    assert_eq!(tally.skipped_no_author(), 2);
    assert_eq!(tally.skipped_no_link(), 1);
}

#[test]
fn per_link_mode_over_fixture() {
    let tally = load_fixture_tally(CountingMode::PerLink);
    assert_eq!(handles(&tally), vec!["alice", "dave", "carol"]);
    assert_eq!(tally.get("alice").unwrap().entry_count, 3);
    assert_eq!(tally.get("dave").unwrap().entry_count, 3);
    assert_eq!(tally.get("carol").unwrap().entry_count, 2);
}

#[test]
fn dedupe_mode_over_fixture() {
    let tally = load_fixture_tally(CountingMode::UniquePerUser);
    assert_eq!(handles(&tally), vec!["dave", "alice", "carol"]);
    assert_eq!(tally.get("alice").unwrap().entry_count, 2);
    assert_eq!(tally.get("carol").unwrap().entry_count, 1);
    assert_eq!(tally.get("dave").unwrap().entry_count, 3);
    let sum: f64 = tally.participants().values().map(|p| p.probability).sum();
    assert!((sum - 1.0).abs() < 1e-9);
}

#[test]
fn fixture_timestamps_normalized() {
    let tally = load_fixture_tally(CountingMode::PerComment);
    let alice = tally.get("alice").unwrap();
    assert_eq!(alice.user_id, Some(501));
    let stamps: Vec<String> = alice
        .entries
        .iter()
        .map(|e| giveaway_core::comment::canonical_timestamp(&e.created_at))
        .collect();
    assert_eq!(stamps, vec!["2024-06-01T09:00:00Z", "2024-06-01T09:00:00Z"]);

    let carol = tally.get("carol").unwrap();
    assert_eq!(
        giveaway_core::comment::canonical_timestamp(&carol.entries[0].created_at),
        "2024-06-01T12:00:00Z"
    );
}

#[test]
fn case_insensitive_host_keeps_identifier_case() {
    let tally = load_fixture_tally(CountingMode::PerComment);
    let dave = tally.get("dave").unwrap();
    assert_eq!(dave.entries[0].recipe_ids, vec!["Gazpacho_2", "abc123", "flan"]);
}

// ===========================================================================
// Reports
// ===========================================================================

#[test]
fn reports_written_and_reloadable() {
    let dir = scratch("reports");
    let tally = load_fixture_tally(CountingMode::PerComment);
    let csv_path = dir.join("participants.csv");
    let json_path = dir.join("participants.json");

    report::write_csv(&csv_path, &tally).unwrap();
    report::write_json(&json_path, &tally).unwrap();

    let csv_text = std::fs::read_to_string(&csv_path).unwrap();
    assert_eq!(csv_text.lines().count(), 4);
    assert!(csv_text.contains("alice,501,2,0.400000,\"1001,1003\",\"abc123,xyz789\""));

    let reloaded = Tally::from_participants(source::load_participants(&json_path).unwrap());
    assert_eq!(reloaded.total_entries(), tally.total_entries());
    assert_eq!(handles(&reloaded), handles(&tally));
    assert_eq!(
        reloaded.get("carol").unwrap().comment_ids(),
        tally.get("carol").unwrap().comment_ids()
    );

    let _ = std::fs::remove_dir_all(&dir);
}

// ===========================================================================
// Draws
// ===========================================================================

#[test]
fn seeded_draw_is_reproducible() {
    let tally = load_fixture_tally(CountingMode::PerLink);
    let first = draw_winner(&tally, &mut RngSource::seeded(2024)).unwrap();
    let second = draw_winner(&tally, &mut RngSource::seeded(2024)).unwrap();
    assert_eq!(first.participant.handle, second.participant.handle);
    assert_eq!(first.entry.comment_id, second.entry.comment_id);
    assert!(first.participant.entries.contains(first.entry));
}

#[test]
fn draw_from_reloaded_report_skips_zero_weight() {
    let tally = Tally::from_participants(
        source::load_participants(&fixture("participants.json")).unwrap(),
    );
    assert_eq!(tally.len(), 1);
    assert!((tally.get("winner_only").unwrap().probability - 1.0).abs() < 1e-9);
    let winner = draw_winner(&tally, &mut RngSource::from_entropy()).unwrap();
    assert_eq!(winner.participant.handle, "winner_only");
    assert_eq!(winner.entry.comment_id, 77);
}

// ===========================================================================
// Command line
// ===========================================================================

#[test]
fn tally_command_writes_reports() {
    let dir = scratch("cli_tally");
    let csv_path = dir.join("out.csv").display().to_string();
    let json_path = dir.join("out.json").display().to_string();
    let comments = fixture("comments.json").display().to_string();

    let output = run_cli(&[
        "tally",
        "--comments",
        &comments,
        "--post-url",
        "https://www.instagram.com/p/Cabc123/?igsh=1",
        "--dedupe-recipes-per-user",
        "--out-csv",
        &csv_path,
        "--out-json",
        &json_path,
    ])
    .unwrap();

    assert!(output.starts_with(
        "Post: https://www.instagram.com/p/Cabc123/  | Total valid entries: 6\n"
    ));
    assert!(output.contains("dave, 3, 50.00%\nalice, 2, 33.33%\ncarol, 1, 16.67%\n"));
    assert!(Path::new(&csv_path).exists());
    assert!(Path::new(&json_path).exists());

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn bad_post_url_rejected_before_tally() {
    let dir = scratch("cli_bad_post");
    let csv_path = dir.join("out.csv").display().to_string();
    let json_path = dir.join("out.json").display().to_string();
    let comments = fixture("comments.json").display().to_string();

    let err = run_cli(&[
        "tally",
        "--comments",
        &comments,
        "--post-url",
        "https://www.instagram.com/jorbites/",
        "--out-csv",
        &csv_path,
        "--out-json",
        &json_path,
    ])
    .unwrap_err();

    assert!(format!("{err:#}").contains("unsupported post URL"));
    assert!(!Path::new(&csv_path).exists());

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn draw_command_with_seed() {
    let comments = fixture("comments.json").display().to_string();
    let args = ["draw", "--comments", comments.as_str(), "--seed", "7"];
    let first = run_cli(&args).unwrap();
    let second = run_cli(&args).unwrap();
    assert_eq!(first, second);
    assert!(first.contains("winner: "));
    assert!(first.contains("winning_comment_id: "));
}

#[test]
fn draw_command_from_participants_report() {
    let participants = fixture("participants.json").display().to_string();
    let output = run_cli(&["draw", "--participants", &participants]).unwrap();
    assert!(output.contains("winner: winner_only"));
    assert!(output.contains("entries: 4"));
    assert!(output.contains("winning_comment_id: 77"));
}

#[test]
fn draw_command_on_empty_contest() {
    let dir = scratch("cli_empty");
    let empty = dir.join("empty.json");
    std::fs::write(&empty, "[]").unwrap();
    let empty_arg = empty.display().to_string();

    let output = run_cli(&["draw", "--comments", &empty_arg]).unwrap();
    assert_eq!(output, "No eligible participants found.\n");

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn draw_requires_an_input() {
    assert!(Cli::try_parse_from(["giveaway", "draw"]).is_err());
    assert!(Cli::try_parse_from([
        "giveaway",
        "draw",
        "--comments",
        "a.json",
        "--participants",
        "b.json"
    ])
    .is_err());
}

#[test]
fn counting_flags_rejected_with_participants_report() {
    for flag in ["--dedupe-recipes-per-user", "--count-multiple-links-per-comment"] {
        assert!(Cli::try_parse_from(["giveaway", "draw", "--participants", "b.json", flag]).is_err());
        assert!(Cli::try_parse_from(["giveaway", "draw", "--comments", "a.json", flag]).is_ok());
    }
}
