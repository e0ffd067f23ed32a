//! Application configuration for ThreatVault.
//!
//! User config lives at `~/.threatvault/threatvault.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, ThreatVaultError};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "threatvault.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".threatvault";

// ---------------------------------------------------------------------------
// Config structs (matching threatvault.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Input collection locations.
    #[serde(default)]
    pub inputs: InputsConfig,

    /// Vault output settings.
    #[serde(default)]
    pub output: OutputConfig,
}

/// `[inputs]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputsConfig {
    /// Directory holding the input JSON collections.
    #[serde(default = "default_input_dir")]
    pub dir: String,

    /// File name of the tools collection inside `dir`.
    #[serde(default = "default_tools_file")]
    pub tools_file: String,

    /// File name of the groups collection inside `dir`.
    #[serde(default = "default_groups_file")]
    pub groups_file: String,
}

impl Default for InputsConfig {
    fn default() -> Self {
        Self {
            dir: default_input_dir(),
            tools_file: default_tools_file(),
            groups_file: default_groups_file(),
        }
    }
}

fn default_input_dir() -> String {
    "inputs".into()
}
fn default_tools_file() -> String {
    "Threat Group Card - All tools.json".into()
}
fn default_groups_file() -> String {
    "Threat Group Card - All groups.json".into()
}

/// `[output]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory the Markdown vault is written into.
    #[serde(default = "default_output_dir")]
    pub dir: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
        }
    }
}

fn default_output_dir() -> String {
    "output".into()
}

impl AppConfig {
    /// Resolved path of the tools collection file.
    pub fn tools_path(&self) -> PathBuf {
        Path::new(&self.inputs.dir).join(&self.inputs.tools_file)
    }

    /// Resolved path of the groups collection file.
    pub fn groups_path(&self) -> PathBuf {
        Path::new(&self.inputs.dir).join(&self.inputs.groups_file)
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.threatvault/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| ThreatVaultError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.threatvault/threatvault.toml`).
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
    let content = std::fs::read_to_string(path).map_err(|e| ThreatVaultError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        ThreatVaultError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| ThreatVaultError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| ThreatVaultError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| ThreatVaultError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}
