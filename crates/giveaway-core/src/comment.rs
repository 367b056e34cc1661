// Raw comment records as handed over by the fetching side, plus the
// resolution rules for author identity and creation time.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer};

// ---------------------------------------------------------------------------
// Boundary types
// ---------------------------------------------------------------------------

/// Author information attached to a comment.
///
/// Dumps from different fetchers disagree on the shape: some carry a full
/// profile object, some only the bare handle. Anything else is kept as
/// `Unrecognized` so the record still loads and is skipped during tallying.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Author {
    Profile {
        username: Option<String>,
        #[serde(
            default,
            alias = "userid",
            alias = "user_id",
            deserialize_with = "lenient_user_id"
        )]
        id: Option<u64>,
    },
    Handle(String),
    Unrecognized(serde_json::Value),
}

/// Accepts a non-negative integer or a numeric string. Any other id shape
/// becomes `None` so the profile (and its username) still loads.
fn lenient_user_id<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Number(n) => n.as_u64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

/// Creation time as found in the dump.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawTimestamp {
    /// Unix seconds.
    Seconds(i64),
    /// Unix seconds with a fractional part.
    FractionalSeconds(f64),
    /// RFC 3339, or a naive `YYYY-MM-DDTHH:MM:SS[.f]` read as UTC.
    Text(String),
    Unrecognized(serde_json::Value),
}

/// One comment from the contest post. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CommentRecord {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub owner: Option<Author>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default, alias = "created_at_utc")]
    pub created_at: Option<RawTimestamp>,
}

/// Naive layouts accepted for text timestamps, tried in order.
const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

impl CommentRecord {
    /// Build a record with a profile author. Mostly useful for callers that
    /// assemble records in code rather than loading a dump.
    pub fn new(id: u64, handle: &str, text: &str) -> Self {
        Self {
            id,
            owner: Some(Author::Profile {
                username: Some(handle.to_string()),
                id: None,
            }),
            text: Some(text.to_string()),
            created_at: None,
        }
    }

    /// Resolve the author handle.
    ///
    /// Order: the profile's `username`, then a bare handle string. Empty
    /// handles and every other owner shape resolve to `None`; no coercion of
    /// non-string values is attempted.
    pub fn author_handle(&self) -> Option<&str> {
        let handle = match self.owner.as_ref()? {
            Author::Profile { username, .. } => username.as_deref()?,
            Author::Handle(handle) => handle.as_str(),
            Author::Unrecognized(_) => return None,
        };
        (!handle.is_empty()).then_some(handle)
    }

    /// Numeric author id, only available from a profile owner.
    pub fn author_id(&self) -> Option<u64> {
        match self.owner.as_ref()? {
            Author::Profile { id, .. } => *id,
            _ => None,
        }
    }

    /// Creation time as a UTC instant, or `None` when absent or unusable.
    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        self.created_at.as_ref()?.to_utc()
    }
}

impl RawTimestamp {
    pub fn to_utc(&self) -> Option<DateTime<Utc>> {
        match self {
            RawTimestamp::Seconds(secs) => DateTime::from_timestamp(*secs, 0),
            RawTimestamp::FractionalSeconds(value) => from_fractional_seconds(*value),
            RawTimestamp::Text(text) => parse_text(text),
            RawTimestamp::Unrecognized(_) => None,
        }
    }
}

fn from_fractional_seconds(value: f64) -> Option<DateTime<Utc>> {
    if !value.is_finite() || value.abs() > i64::MAX as f64 {
        return None;
    }
    let secs = value.floor();
    let nanos = (((value - secs) * 1e9).round() as u32).min(999_999_999);
    DateTime::from_timestamp(secs as i64, nanos)
}

fn parse_text(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// Canonical rendering of an instant: RFC 3339 with a `Z` suffix.
pub fn canonical_timestamp(instant: &DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
