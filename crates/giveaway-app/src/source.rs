// Comment dump loading.
//
// Fetching comments from the network is somebody else's job; this module
// reads the dump they leave behind. Accepts a JSON array of comment records,
// or JSON Lines when the file ends in `.jsonl` / `.ndjson`. Records that do
// not match the expected shape are skipped with a warning.

use giveaway_core::{CommentRecord, Participant};
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: String,
        source: serde_json::Error,
    },
}

/// Records read from a dump plus the number of rejected ones.
#[derive(Debug, Clone, Default)]
pub struct LoadedComments {
    pub records: Vec<CommentRecord>,
    pub malformed: usize,
}

// ---------------------------------------------------------------------------
// Reader-based loaders
// ---------------------------------------------------------------------------

fn load_json_array_from_reader<R: Read>(rdr: R) -> Result<LoadedComments, serde_json::Error> {
    let values: Vec<serde_json::Value> = serde_json::from_reader(rdr)?;
    let mut loaded = LoadedComments::default();
    for (index, value) in values.into_iter().enumerate() {
        match serde_json::from_value::<CommentRecord>(value) {
            Ok(record) => loaded.records.push(record),
            Err(e) => {
                warn!("skipping malformed comment record #{}: {}", index, e);
                loaded.malformed += 1;
            }
        }
    }
    Ok(loaded)
}

fn load_json_lines_from_reader<R: BufRead>(rdr: R) -> Result<LoadedComments, std::io::Error> {
    let mut loaded = LoadedComments::default();
    for (index, line) in rdr.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<CommentRecord>(&line) {
            Ok(record) => loaded.records.push(record),
            Err(e) => {
                warn!("skipping malformed comment on line {}: {}", index + 1, e);
                loaded.malformed += 1;
            }
        }
    }
    Ok(loaded)
}

fn is_json_lines(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("jsonl") || ext.eq_ignore_ascii_case("ndjson"))
}

// ---------------------------------------------------------------------------
// Public path-based loaders
// ---------------------------------------------------------------------------

/// Load the comment dump at `path`, in input order.
pub fn load_comments(path: &Path) -> Result<LoadedComments, SourceError> {
    let file = std::fs::File::open(path).map_err(|e| SourceError::Io {
        path: path.display().to_string(),
        source: e,
    })?;

    let loaded = if is_json_lines(path) {
        load_json_lines_from_reader(BufReader::new(file)).map_err(|e| SourceError::Io {
            path: path.display().to_string(),
            source: e,
        })?
    } else {
        load_json_array_from_reader(BufReader::new(file)).map_err(|e| SourceError::Json {
            path: path.display().to_string(),
            source: e,
        })?
    };

    info!(
        "Loaded {} comments from {} ({} malformed)",
        loaded.records.len(),
        path.display(),
        loaded.malformed
    );
    Ok(loaded)
}

/// Load participants from a JSON report written by a previous tally run.
pub fn load_participants(path: &Path) -> Result<Vec<Participant>, SourceError> {
    let file = std::fs::File::open(path).map_err(|e| SourceError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    serde_json::from_reader(BufReader::new(file)).map_err(|e| SourceError::Json {
        path: path.display().to_string(),
        source: e,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
