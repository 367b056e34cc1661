// Contest post reference parsing.
//
// The post URL is validated up front so a bad reference is rejected before
// any comments are tallied.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PostRefError {
    #[error("unsupported post URL `{0}`: expected /p/<shortcode> or /reel/<shortcode>")]
    UnsupportedFormat(String),

    #[error("post URL `{0}` has no shortcode after /p/ or /reel/")]
    MissingShortcode(String),
}

/// Shortcode identifying the contest post.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Shortcode(String);

impl Shortcode {
    /// Parse a post URL of the form `.../p/<shortcode>/` or
    /// `.../reel/<shortcode>/`. Query string and fragment are ignored.
    pub fn from_post_url(url: &str) -> Result<Self, PostRefError> {
        let trimmed = url.trim();
        let without_query = trimmed
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .trim_end_matches('/');
        let parts: Vec<&str> = without_query.split('/').collect();

        let idx = parts
            .iter()
            .position(|part| *part == "p")
            .or_else(|| parts.iter().position(|part| *part == "reel"))
            .ok_or_else(|| PostRefError::UnsupportedFormat(trimmed.to_string()))?;

        match parts.get(idx + 1) {
            Some(code) if !code.is_empty() => Ok(Self(code.to_string())),
            _ => Err(PostRefError::MissingShortcode(trimmed.to_string())),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn canonical_url(&self) -> String {
        format!("https://www.instagram.com/p/{}/", self.0)
    }
}

impl FromStr for Shortcode {
    type Err = PostRefError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_post_url(s)
    }
}

impl fmt::Display for Shortcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
