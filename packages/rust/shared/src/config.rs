//! Application configuration for nbpress.
//!
//! User config lives at `~/.nbpress/nbpress.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{NbpressError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "nbpress.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".nbpress";

/// Paper formats accepted by the Playwright `pdf` command.
pub const PAPER_FORMATS: &[&str] = &[
    "Letter", "Legal", "Tabloid", "Ledger", "A0", "A1", "A2", "A3", "A4", "A5", "A6",
];

// ---------------------------------------------------------------------------
// Config structs (matching nbpress.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Default file locations and cleanup behavior.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// External tool commands.
    #[serde(default)]
    pub tools: ToolsConfig,

    /// PDF rendering options.
    #[serde(default)]
    pub render: RenderConfig,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Notebook converted when no input is given on the command line.
    #[serde(default = "default_input")]
    pub input: String,

    /// PDF written when no output is given on the command line.
    #[serde(default = "default_output")]
    pub output: String,

    /// Keep the filtered notebook and HTML after a successful run.
    #[serde(default)]
    pub keep_intermediates: bool,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            input: default_input(),
            output: default_output(),
            keep_intermediates: false,
        }
    }
}

fn default_input() -> String {
    "pipeline2.ipynb".into()
}
fn default_output() -> String {
    "pipeline2.pdf".into()
}

/// `[tools]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// Executable providing the `nbconvert` subcommand.
    #[serde(default = "default_jupyter_cmd")]
    pub jupyter_cmd: String,

    /// Python interpreter used for `pip` and `playwright`.
    #[serde(default = "default_python_cmd")]
    pub python_cmd: String,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            jupyter_cmd: default_jupyter_cmd(),
            python_cmd: default_python_cmd(),
        }
    }
}

fn default_jupyter_cmd() -> String {
    "jupyter".into()
}
fn default_python_cmd() -> String {
    "python3".into()
}

/// `[render]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Page size passed to the renderer.
    #[serde(default = "default_paper_format")]
    pub paper_format: String,

    /// Install playwright and chromium when they are missing.
    #[serde(default = "default_true")]
    pub auto_install: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            paper_format: default_paper_format(),
            auto_install: true,
        }
    }
}

fn default_paper_format() -> String {
    "A4".into()
}
fn default_true() -> bool {
    true
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.nbpress/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| NbpressError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.nbpress/nbpress.toml`).
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
    let content = std::fs::read_to_string(path).map_err(|e| NbpressError::io(path, e))?;

    let config: AppConfig = toml::from_str(&content)
        .map_err(|e| NbpressError::config(format!("failed to parse {}: {e}", path.display())))?;

    validate_config(&config)?;
    Ok(config)
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| NbpressError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| NbpressError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| NbpressError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Reject configs that would only fail later inside an external tool.
pub fn validate_config(config: &AppConfig) -> Result<()> {
    if config.tools.jupyter_cmd.trim().is_empty() {
        return Err(NbpressError::config("tools.jupyter_cmd must not be empty"));
    }
    if config.tools.python_cmd.trim().is_empty() {
        return Err(NbpressError::config("tools.python_cmd must not be empty"));
    }

    let format = &config.render.paper_format;
    if !PAPER_FORMATS
        .iter()
        .any(|known| known.eq_ignore_ascii_case(format))
    {
        return Err(NbpressError::config(format!(
            "unknown render.paper_format '{format}', expected one of: {}",
            PAPER_FORMATS.join(", ")
        )));
    }

    Ok(())
}
