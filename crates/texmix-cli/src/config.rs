//! `.texmix.toml` configuration
//!
//! Lookup order (first found wins):
//! 1. `--config <FILE>`
//! 2. Project config (`./.texmix.toml`)
//! 3. User config (`~/.texmix.toml`)
//! 4. Built-in defaults

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use texmix_latex::{ParseOptions, SyntaxCheck};

/// Configuration file name looked up in the project and home directories
pub const CONFIG_FILE_NAME: &str = ".texmix.toml";

/// Output format for `texmix parse`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Markdown output (default)
    #[default]
    Markdown,
    /// JSON output
    Json,
    /// YAML output
    Yaml,
}

/// Settings loaded from `.texmix.toml`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Parser options
    pub parse: ParseOptions,
    /// Defaults for `texmix parse`
    pub output: OutputConfig,
    /// Defaults for `texmix check`
    pub typeset: TypesetConfig,
    /// Defaults for `texmix images`
    pub images: ImagesConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Default output format (markdown, json, yaml)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<OutputFormat>,

    /// Pretty-print JSON
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pretty: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TypesetConfig {
    /// Commands the target math engine does not support
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unsupported_commands: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImagesConfig {
    /// Base URL of the image CDN
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cdn_base: Option<String>,
}

impl Config {
    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse configuration")
    }

    /// Load configuration from a file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_toml(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }

    /// Load the explicit config, or the first discovered one, or defaults
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load_from_file(path);
        }
        match Self::discover_path() {
            Some(path) => {
                log::debug!("using config file {}", path.display());
                Self::load_from_file(&path)
            }
            None => Ok(Self::default()),
        }
    }

    /// First existing config file: project, then user
    pub fn discover_path() -> Option<PathBuf> {
        let project = PathBuf::from(CONFIG_FILE_NAME);
        if project.is_file() {
            return Some(project);
        }
        let user = dirs::home_dir()?.join(CONFIG_FILE_NAME);
        user.is_file().then_some(user)
    }

    /// Resolve output format: CLI > config > markdown
    #[must_use]
    pub fn resolve_format(&self, cli_value: Option<OutputFormat>) -> OutputFormat {
        cli_value.or(self.output.format).unwrap_or_default()
    }

    /// Whether JSON is pretty-printed; `--compact` always wins
    #[must_use]
    pub fn resolve_pretty(&self, compact: bool) -> bool {
        !compact && self.output.pretty.unwrap_or(true)
    }

    /// Syntax checker with the configured unsupported commands
    #[must_use]
    pub fn syntax_check(&self) -> SyntaxCheck {
        self.typeset
            .unsupported_commands
            .as_ref()
            .map_or_else(SyntaxCheck::default, |commands| {
                SyntaxCheck::with_unsupported(commands.iter().cloned())
            })
    }
}
