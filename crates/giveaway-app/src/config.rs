// Configuration loading and validation (giveaway.toml).

use giveaway_core::{CountingMode, RecipeLinkExtractor, DEFAULT_RECIPE_DOMAIN};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Location of the config file relative to the working directory.
pub const CONFIG_RELATIVE_PATH: &str = "config/giveaway.toml";

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },
}

// ---------------------------------------------------------------------------
// giveaway.toml structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub counting: CountingConfig,
    pub links: LinksConfig,
    pub output: OutputConfig,
}

/// Default counting switches. Command-line flags can only turn them on.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
pub struct CountingConfig {
    pub count_multiple_links_per_comment: bool,
    pub dedupe_recipes_per_user: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LinksConfig {
    /// Host whose `/recipes/<id>` links count as entries, without scheme.
    pub domain: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub csv: String,
    pub json: String,
}

impl Default for LinksConfig {
    fn default() -> Self {
        Self {
            domain: DEFAULT_RECIPE_DOMAIN.to_string(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            csv: "participants.csv".into(),
            json: "participants.json".into(),
        }
    }
}

impl CountingConfig {
    pub fn mode(&self) -> CountingMode {
        CountingMode::from_flags(
            self.count_multiple_links_per_comment,
            self.dedupe_recipes_per_user,
        )
    }
}

impl LinksConfig {
    pub fn extractor(&self) -> Result<RecipeLinkExtractor, ConfigError> {
        RecipeLinkExtractor::new(self.domain.trim()).map_err(|e| ConfigError::ValidationError {
            field: "links.domain".into(),
            message: e.to_string(),
        })
    }
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate an explicit config file. The file must exist.
pub fn load_config_file(path: &Path) -> Result<Config, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })?;
    let config: Config = toml::from_str(&text).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })?;
    validate(&config)?;
    Ok(config)
}

/// Load `config/giveaway.toml` under `base_dir`, falling back to built-in
/// defaults when the file is absent.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let path = base_dir.join(CONFIG_RELATIVE_PATH);
    if !path.exists() {
        let config = Config::default();
        validate(&config)?;
        return Ok(config);
    }
    load_config_file(&path)
}

/// Load an explicit config file if given, otherwise the optional one in the
/// current working directory.
pub fn load_config(explicit: Option<&Path>) -> Result<Config, ConfigError> {
    if let Some(path) = explicit {
        return load_config_file(path);
    }
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    load_config_from(&cwd)
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    let domain = config.links.domain.trim();
    if domain.is_empty() {
        return Err(ConfigError::ValidationError {
            field: "links.domain".into(),
            message: "must not be empty".into(),
        });
    }
    if domain.contains("://") || domain.contains('/') {
        return Err(ConfigError::ValidationError {
            field: "links.domain".into(),
            message: format!("must be a bare host name, got `{domain}`"),
        });
    }

    let outputs: &[(&str, &str)] = &[
        ("output.csv", config.output.csv.as_str()),
        ("output.json", config.output.json.as_str()),
    ];
    for (name, value) in outputs {
        if value.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                field: name.to_string(),
                message: "must not be empty".into(),
            });
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
