// Report output: CSV summary, JSON detail, console table and winner box.

use crate::post::Shortcode;
use giveaway_core::{Tally, Winner};
use serde::Serialize;
use std::fmt::Write as _;
use std::io::Write;
use std::path::Path;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to create {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },

    #[error("JSON error in {path}: {source}")]
    Json {
        path: String,
        source: serde_json::Error,
    },
}

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------

/// One summary row per participant.
#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    username: &'a str,
    user_id: Option<u64>,
    entry_count: u64,
    probability: String,
    comment_ids: String,
    recipe_ids_posted: String,
}

fn write_csv_to_writer<W: Write>(wtr: W, tally: &Tally) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(wtr);
    for p in tally.ranked() {
        let comment_ids: Vec<String> = p.comment_ids().iter().map(u64::to_string).collect();
        let recipes: Vec<&str> = p.recipe_ids_posted().into_iter().collect();
        writer.serialize(CsvRow {
            username: &p.handle,
            user_id: p.user_id,
            entry_count: p.entry_count,
            probability: format!("{:.6}", p.probability),
            comment_ids: comment_ids.join(","),
            recipe_ids_posted: recipes.join(","),
        })?;
    }
    if tally.is_empty() {
        writer.write_record([
            "username",
            "user_id",
            "entry_count",
            "probability",
            "comment_ids",
            "recipe_ids_posted",
        ])?;
    }
    writer.flush()?;
    Ok(())
}

/// Write the ranked participant summary as CSV.
pub fn write_csv(path: &Path, tally: &Tally) -> Result<(), ReportError> {
    let file = std::fs::File::create(path).map_err(|e| ReportError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    write_csv_to_writer(file, tally).map_err(|e| ReportError::Csv {
        path: path.display().to_string(),
        source: e,
    })
}

// ---------------------------------------------------------------------------
// JSON
// ---------------------------------------------------------------------------

fn write_json_to_writer<W: Write>(wtr: W, tally: &Tally) -> Result<(), serde_json::Error> {
    serde_json::to_writer_pretty(wtr, &tally.ranked())
}

/// Write every ranked participant with their comments as pretty JSON.
pub fn write_json(path: &Path, tally: &Tally) -> Result<(), ReportError> {
    let file = std::fs::File::create(path).map_err(|e| ReportError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    let mut wtr = std::io::BufWriter::new(file);
    write_json_to_writer(&mut wtr, tally)
        .and_then(|()| wtr.flush().map_err(serde_json::Error::io))
        .map_err(|e| ReportError::Json {
            path: path.display().to_string(),
            source: e,
        })
}

// ---------------------------------------------------------------------------
// Console rendering
// ---------------------------------------------------------------------------

/// Ranked participant table for the console.
pub fn render_table(tally: &Tally, post: Option<&Shortcode>) -> String {
    let mut out = String::new();
    match post {
        Some(code) => {
            let _ = writeln!(
                out,
                "Post: {}  | Total valid entries: {}",
                code.canonical_url(),
                tally.total_entries()
            );
        }
        None => {
            let _ = writeln!(out, "Total valid entries: {}", tally.total_entries());
        }
    }
    out.push('\n');
    out.push_str("Participants (sorted by probability):\n");
    out.push_str("username, entries, probability\n");
    for p in tally.ranked() {
        let _ = writeln!(
            out,
            "{}, {}, {:.2}%",
            p.handle,
            p.entry_count,
            p.probability * 100.0
        );
    }
    out
}

/// Boxed winner announcement, or a notice when nobody qualified.
pub fn render_winner(winner: Option<&Winner<'_>>) -> String {
    let Some(winner) = winner else {
        return "No eligible participants found.\n".to_string();
    };

    let lines = [
        format!("winner: {}", winner.participant.handle),
        format!("  entries: {}", winner.participant.entry_count),
        format!("  winning_comment_id: {}", winner.entry.comment_id),
    ];
    let width = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
    let indent = "  ";
    let rule = "─".repeat(width + 2);

    let mut out = String::from("\n");
    let _ = writeln!(out, "{indent}┌{rule}┐");
    for line in &lines {
        let pad = " ".repeat(width - line.chars().count());
        let _ = writeln!(out, "{indent}│ {line}{pad} │");
    }
    let _ = writeln!(out, "{indent}└{rule}┘");
    out.push('\n');
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
