//! Application configuration for Rinku.
//!
//! User config lives at `~/.rinku/rinku.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, RinkuError};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "rinku.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".rinku";

// ---------------------------------------------------------------------------
// Config structs (matching rinku.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Global defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Registered pipeline files, runnable by name.
    #[serde(default)]
    pub pipelines: Vec<PipelineEntry>,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// How run results are printed.
    #[serde(default)]
    pub output: OutputFormat,

    /// Print every resolved step, not just the final result.
    #[serde(default)]
    pub show_steps: bool,
}

/// Result rendering format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// `[[pipelines]]` entry — a named pipeline file in the config registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineEntry {
    /// Name used with `rinku run --name`.
    pub name: String,
    /// Path to the pipeline definition on disk.
    pub path: String,
    /// Optional one-line description shown by `rinku list`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl AppConfig {
    /// Look up a registered pipeline by name.
    pub fn find_pipeline(&self, name: &str) -> Option<&PipelineEntry> {
        self.pipelines.iter().find(|p| p.name == name)
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.rinku/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| RinkuError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.rinku/rinku.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| RinkuError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| RinkuError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    init_config_in(&config_dir()?)
}

/// Write a default config file into `dir`, creating it if needed.
pub fn init_config_in(dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(dir).map_err(|e| RinkuError::io(dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| RinkuError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| RinkuError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}
