// Recipe link extraction from free-form comment text.

use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

/// Domain whose recipe links count as contest entries.
pub const DEFAULT_RECIPE_DOMAIN: &str = "jorbites.com";

static DEFAULT_EXTRACTOR: LazyLock<RecipeLinkExtractor> = LazyLock::new(|| {
    RecipeLinkExtractor::new(DEFAULT_RECIPE_DOMAIN).expect("default recipe link pattern compiles")
});

/// Matches `http(s)://[www.]<domain>/recipes/<id>` links.
///
/// Scheme, host and the `/recipes/` prefix match case-insensitively; the
/// identifier (`[A-Za-z0-9_-]+`) is returned as written.
#[derive(Debug, Clone)]
pub struct RecipeLinkExtractor {
    domain: String,
    pattern: Regex,
}

impl RecipeLinkExtractor {
    pub fn new(domain: &str) -> Result<Self, regex::Error> {
        let pattern = Regex::new(&format!(
            r"(?i:https?://(?:www\.)?{}/recipes/)([A-Za-z0-9_-]+)",
            regex::escape(domain)
        ))?;
        Ok(Self {
            domain: domain.to_string(),
            pattern,
        })
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Distinct recipe identifiers linked from `text`. Missing or empty text
    /// yields an empty set.
    pub fn extract(&self, text: Option<&str>) -> BTreeSet<String> {
        let Some(text) = text else {
            return BTreeSet::new();
        };
        self.pattern
            .captures_iter(text)
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
            .collect()
    }
}

impl Default for RecipeLinkExtractor {
    fn default() -> Self {
        DEFAULT_EXTRACTOR.clone()
    }
}

/// Shared extractor for the default domain.
pub fn default_extractor() -> &'static RecipeLinkExtractor {
    &DEFAULT_EXTRACTOR
}

/// Extract recipe identifiers using the default domain.
pub fn extract_recipe_ids(text: Option<&str>) -> BTreeSet<String> {
    DEFAULT_EXTRACTOR.extract(text)
}
