// Participant aggregation: turns raw comments into weighted entries.

use crate::comment::CommentRecord;
use crate::extract::{default_extractor, RecipeLinkExtractor};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use tracing::{debug, info};

// ---------------------------------------------------------------------------
// Counting mode
// ---------------------------------------------------------------------------

/// How a qualifying comment contributes to its author's weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CountingMode {
    /// One entry per qualifying comment.
    #[default]
    PerComment,
    /// One entry per distinct recipe linked in each comment.
    PerLink,
    /// One entry per distinct recipe across all of the author's comments.
    UniquePerUser,
}

impl CountingMode {
    /// Resolve the two command-line switches. Deduplication takes precedence.
    pub fn from_flags(count_multiple_links_per_comment: bool, dedupe_recipes_per_user: bool) -> Self {
        if dedupe_recipes_per_user {
            CountingMode::UniquePerUser
        } else if count_multiple_links_per_comment {
            CountingMode::PerLink
        } else {
            CountingMode::PerComment
        }
    }
}

// ---------------------------------------------------------------------------
// Participants
// ---------------------------------------------------------------------------

/// One accepted comment for a participant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticipantEntry {
    pub comment_id: u64,
    #[serde(rename = "created_at_utc")]
    pub created_at: DateTime<Utc>,
    pub text: String,
    /// Distinct recipe identifiers in this comment, never empty.
    pub recipe_ids: Vec<String>,
}

/// All accepted comments of one author and the resulting weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    #[serde(rename = "username")]
    pub handle: String,
    pub user_id: Option<u64>,
    /// Accepted comments in processing order.
    #[serde(rename = "comments")]
    pub entries: Vec<ParticipantEntry>,
    pub entry_count: u64,
    #[serde(default)]
    pub probability: f64,
}

impl Participant {
    pub fn new(handle: &str, user_id: Option<u64>) -> Self {
        Self {
            handle: handle.to_string(),
            user_id,
            entries: Vec::new(),
            entry_count: 0,
            probability: 0.0,
        }
    }

    pub fn comment_ids(&self) -> Vec<u64> {
        self.entries.iter().map(|e| e.comment_id).collect()
    }

    /// Sorted union of every recipe this participant linked.
    pub fn recipe_ids_posted(&self) -> BTreeSet<&str> {
        self.entries
            .iter()
            .flat_map(|e| e.recipe_ids.iter().map(String::as_str))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Tally
// ---------------------------------------------------------------------------

/// Finalized participant mapping. Every participant has `entry_count > 0`
/// and at least one entry; probabilities sum to 1 unless the tally is empty.
#[derive(Debug, Clone, Default)]
pub struct Tally {
    participants: BTreeMap<String, Participant>,
    total_entries: u64,
    skipped_no_author: usize,
    skipped_no_link: usize,
}

impl Tally {
    /// Finalize an existing set of participants, e.g. one reloaded from a
    /// previous run's report. Participants with zero weight or no comments
    /// are dropped and
    /// probabilities recomputed; a repeated handle keeps its last occurrence.
    pub fn from_participants(participants: impl IntoIterator<Item = Participant>) -> Self {
        let participants = participants
            .into_iter()
            .map(|p| (p.handle.clone(), p))
            .collect();
        Self::finalize(participants, 0, 0)
    }

    fn finalize(
        mut participants: BTreeMap<String, Participant>,
        skipped_no_author: usize,
        skipped_no_link: usize,
    ) -> Self {
        participants.retain(|handle, p| {
            let keep = p.entry_count > 0 && !p.entries.is_empty();
            if !keep {
                debug!(handle = %handle, "dropping participant with no drawable entries");
            }
            keep
        });

        let total_entries: u64 = participants.values().map(|p| p.entry_count).sum();
        for p in participants.values_mut() {
            p.probability = if total_entries > 0 {
                p.entry_count as f64 / total_entries as f64
            } else {
                0.0
            };
        }

        Self {
            participants,
            total_entries,
            skipped_no_author,
            skipped_no_link,
        }
    }

    pub fn participants(&self) -> &BTreeMap<String, Participant> {
        &self.participants
    }

    pub fn get(&self, handle: &str) -> Option<&Participant> {
        self.participants.get(handle)
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    pub fn total_entries(&self) -> u64 {
        self.total_entries
    }

    /// Comments dropped because no author handle could be resolved.
    pub fn skipped_no_author(&self) -> usize {
        self.skipped_no_author
    }

    /// Comments dropped because they linked no recipe.
    pub fn skipped_no_link(&self) -> usize {
        self.skipped_no_link
    }

    /// Participants by descending probability, ties by ascending handle.
    pub fn ranked(&self) -> Vec<&Participant> {
        let mut ranked: Vec<&Participant> = self.participants.values().collect();
        ranked.sort_by(|a, b| {
            b.probability
                .total_cmp(&a.probability)
                .then_with(|| a.handle.cmp(&b.handle))
        });
        ranked
    }
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// Aggregate comments using the default recipe domain. Comments without a
/// usable timestamp are stamped with the current time.
pub fn aggregate(records: &[CommentRecord], mode: CountingMode) -> Tally {
    aggregate_with(records, mode, default_extractor(), Utc::now())
}

/// Aggregate comments with an explicit extractor and timestamp fallback.
///
/// Records are processed in order. A record is skipped when it has no
/// resolvable author or links no recipe; skipping never aborts the pass.
pub fn aggregate_with(
    records: &[CommentRecord],
    mode: CountingMode,
    extractor: &RecipeLinkExtractor,
    fallback_now: DateTime<Utc>,
) -> Tally {
    let mut participants: BTreeMap<String, Participant> = BTreeMap::new();
    let mut seen_recipes: HashMap<String, HashSet<String>> = HashMap::new();
    let mut skipped_no_author = 0;
    let mut skipped_no_link = 0;

    for record in records {
        let Some(handle) = record.author_handle() else {
            debug!(comment_id = record.id, "skipping comment without author handle");
            skipped_no_author += 1;
            continue;
        };

        let recipe_ids = extractor.extract(record.text.as_deref());
        if recipe_ids.is_empty() {
            debug!(comment_id = record.id, handle, "skipping comment without recipe link");
            skipped_no_link += 1;
            continue;
        }

        let created_at = record.created_at_utc().unwrap_or_else(|| {
            debug!(comment_id = record.id, "unusable timestamp, using current time");
            fallback_now
        });

        let contribution = match mode {
            CountingMode::UniquePerUser => {
                let seen = seen_recipes.entry(handle.to_string()).or_default();
                recipe_ids
                    .iter()
                    .filter(|id| seen.insert((*id).clone()))
                    .count() as u64
            }
            CountingMode::PerLink => recipe_ids.len() as u64,
            CountingMode::PerComment => 1,
        };

        let participant = participants
            .entry(handle.to_string())
            .or_insert_with(|| Participant::new(handle, record.author_id()));
        if participant.user_id.is_none() {
            participant.user_id = record.author_id();
        }
        participant.entries.push(ParticipantEntry {
            comment_id: record.id,
            created_at,
            text: record.text.clone().unwrap_or_default(),
            recipe_ids: recipe_ids.into_iter().collect(),
        });
        participant.entry_count += contribution;
    }

    let tally = Tally::finalize(participants, skipped_no_author, skipped_no_link);
    info!(
        comments = records.len(),
        participants = tally.len(),
        total_entries = tally.total_entries(),
        skipped_no_author,
        skipped_no_link,
        ?mode,
        "aggregated contest entries"
    );
    tally
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
