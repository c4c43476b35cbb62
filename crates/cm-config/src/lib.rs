//! Configuration management for the `cm` renderer.
//!
//! Parses `cmark.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ```toml
//! [html]
//! softbreak = "\n"
//! safe = false
//! sourcepos = false
//! alt_text = false
//! ```
//!
//! ## Environment Variable Expansion
//!
//! `html.softbreak` supports `${VAR}` (errors if unset) and
//! `${VAR:-default}`.

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "cmark.toml";

/// Longest accepted soft break text, in bytes.
const MAX_SOFTBREAK_LEN: usize = 64;

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override soft break text.
    pub softbreak: Option<String>,
    /// Override safe mode.
    pub safe: Option<bool>,
    /// Override source position attributes.
    pub sourcepos: Option<bool>,
    /// Override image alt text collection.
    pub alt_text: Option<bool>,
}

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTML output configuration.
    pub html: HtmlConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// HTML output configuration.
#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct HtmlConfig {
    /// Text emitted for soft line breaks. Empty means a newline.
    pub softbreak: String,
    /// Drop unsafe destinations and raw HTML.
    pub safe: bool,
    /// Emit `data-sourcepos` attributes.
    pub sourcepos: bool,
    /// Fill image `alt` attributes with their plain text.
    pub alt_text: bool,
}

impl Default for HtmlConfig {
    fn default() -> Self {
        Self {
            softbreak: "\n".to_owned(),
            safe: false,
            sourcepos: false,
            alt_text: false,
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`html.softbreak`").
        field: String,
        /// Error message (e.g., "${`CM_SOFTBREAK`} not set").
        message: String,
    },
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `cmark.toml` in current directory and parents,
    /// falling back to defaults when none is found.
    ///
    /// CLI settings are applied after loading, so they take precedence over
    /// config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist or parsing fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            tracing::debug!("No {CONFIG_FILENAME} found, using defaults");
            Self::default()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
            config.validate()?;
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(softbreak) = &settings.softbreak {
            self.html.softbreak.clone_from(softbreak);
        }
        if let Some(safe) = settings.safe {
            self.html.safe = safe;
        }
        if let Some(sourcepos) = settings.sourcepos {
            self.html.sourcepos = sourcepos;
        }
        if let Some(alt_text) = settings.alt_text {
            self.html.alt_text = alt_text;
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;
        config.config_path = Some(path.to_path_buf());
        config.validate()?;

        tracing::info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.html.softbreak.len() > MAX_SOFTBREAK_LEN {
            return Err(ConfigError::Validation(format!(
                "html.softbreak cannot exceed {MAX_SOFTBREAK_LEN} bytes"
            )));
        }
        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.html.softbreak = expand::expand_env(&self.html.softbreak, "html.softbreak")?;
        Ok(())
    }
}
