//! Configuration management for marsh.
//!
//! Loads configuration from ${MARSH_HOME}/config.toml with sensible defaults.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Unit in which edit offsets are given to the `edit` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OffsetEncoding {
    /// UTF-16 code units, as counted by platform text views (default)
    #[default]
    Utf16,
    /// UTF-8 bytes
    Utf8,
}

/// Returns the default config template with comments.
///
/// This is embedded from `default_config.toml` at compile time.
fn default_config_template() -> &'static str {
    include_str!("../default_config.toml")
}

/// Recursively merges items from source table into target table.
fn merge_items(target: &mut toml_edit::Table, source: &toml_edit::Table) {
    use toml_edit::Item;

    for (key, value) in source.iter() {
        match value {
            Item::Value(v) => {
                target[key] = Item::Value(v.clone());
            }
            Item::Table(src_table) => {
                if let Some(Item::Table(target_table)) = target.get_mut(key) {
                    merge_items(target_table, src_table);
                } else {
                    target[key] = Item::Table(src_table.clone());
                }
            }
            Item::ArrayOfTables(src_arr) => {
                target[key] = Item::ArrayOfTables(src_arr.clone());
            }
            Item::None => {}
        }
    }
}

pub mod paths {
    //! Path resolution for marsh configuration.
    //!
    //! `MARSH_HOME` resolution order:
    //! 1. `MARSH_HOME` environment variable (if set)
    //! 2. ~/.config/marsh (default)

    use std::path::PathBuf;

    use anyhow::{Context, Result};

    /// Returns the marsh home directory.
    pub fn marsh_home() -> Result<PathBuf> {
        if let Ok(home) = std::env::var("MARSH_HOME") {
            return Ok(PathBuf::from(home));
        }

        dirs::home_dir()
            .map(|h| h.join(".config").join("marsh"))
            .context("Could not determine home directory")
    }

    /// Returns the path to the config.toml file.
    pub fn config_path() -> Result<PathBuf> {
        Ok(marsh_home()?.join("config.toml"))
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Model named in chat requests
    pub model: String,

    /// Maximum tokens for responses (optional)
    pub max_tokens: Option<u32>,

    pub temperature: f64,

    /// Optional inline system prompt
    pub system_prompt: Option<String>,

    /// Optional path to a file containing the system prompt
    pub system_prompt_file: Option<String>,

    /// Unit for edit offsets
    pub offset_encoding: OffsetEncoding,
}

impl Config {
    pub const DEFAULT_MODEL: &str = "claude-sonnet-4-0";
    pub const DEFAULT_MAX_TOKENS: u32 = 2048;
    const DEFAULT_TEMPERATURE: f64 = 1.0;

    /// Loads configuration from the default config path.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path()?)
    }

    /// Loads configuration from a specific path.
    /// Returns defaults if file doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config from {}", path.display()))
        } else {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            Ok(Config::default())
        }
    }

    /// Returns the effective system prompt, preferring the file if both are set.
    pub fn effective_system_prompt(&self) -> Result<Option<String>> {
        if let Some(path_str) = &self.system_prompt_file {
            let path = Path::new(path_str);
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read system prompt file: {path_str}"))?;
            let trimmed = content.trim();
            return Ok((!trimmed.is_empty()).then(|| trimmed.to_string()));
        }

        let trimmed = self.system_prompt.as_deref().unwrap_or("").trim();
        Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
    }

    /// Returns the `max_tokens` to put in chat requests.
    pub fn effective_max_tokens(&self) -> u32 {
        self.max_tokens.unwrap_or(Self::DEFAULT_MAX_TOKENS)
    }

    /// Creates a default config file at the given path.
    /// Returns an error if the file already exists.
    pub fn init(path: &Path) -> Result<()> {
        if path.exists() {
            anyhow::bail!("Config file already exists at {}", path.display());
        }

        Self::write_config(path, default_config_template())
    }

    /// Generates a fresh config TOML from Rust defaults.
    ///
    /// This is used by `xtask update-default-config` to keep
    /// `default_config.toml` in sync with Rust default values.
    pub fn generate() -> Result<String> {
        use toml_edit::DocumentMut;

        let config = Config::default();
        let generated_toml =
            toml::to_string(&config).context("Failed to serialize default config to TOML")?;

        // Parse template as base (preserves comments)
        let mut doc: DocumentMut = default_config_template()
            .parse()
            .context("Failed to parse default config template")?;

        let generated_doc: DocumentMut = generated_toml
            .parse()
            .context("Failed to parse generated config")?;

        merge_items(doc.as_table_mut(), generated_doc.as_table());

        Ok(doc.to_string())
    }

    /// Writes config content to a file, creating parent directories as needed.
    /// Uses atomic write (temp file + rename) to prevent corruption.
    fn write_config(path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let tmp_path = path.with_extension("toml.tmp");
        fs::write(&tmp_path, content)
            .with_context(|| format!("Failed to write config to {}", tmp_path.display()))?;
        fs::rename(&tmp_path, path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                tmp_path.display(),
                path.display()
            )
        })?;

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model: Self::DEFAULT_MODEL.to_string(),
            max_tokens: None,
            temperature: Self::DEFAULT_TEMPERATURE,
            system_prompt: None,
            system_prompt_file: None,
            offset_encoding: OffsetEncoding::default(),
        }
    }
}
