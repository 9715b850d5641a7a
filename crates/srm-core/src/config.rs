use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Retry policy parameters (optional section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts per list refresh (including the first).
    pub max_attempts: u32,
    /// Delay in seconds between attempts (e.g. 1.0 = 1s).
    pub delay_secs: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay_secs: 1.0,
        }
    }
}

/// Action-name family the deployment understands: `getData`/`addData`/… or
/// `getUsers`/`addUser`/….
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VocabularyPreset {
    #[default]
    Data,
    Users,
}

/// How write payloads are encoded: JSON body (default) or form-encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WriteEncoding {
    #[default]
    Json,
    Form,
}

/// Global configuration loaded from `~/.config/srm/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SrmConfig {
    /// Endpoint URL of the deployed web app. The CLI `--endpoint` flag
    /// overrides this.
    #[serde(default)]
    pub endpoint_url: Option<String>,
    /// Wall-clock timeout per request in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Field that identifies a record (an id column or row number).
    #[serde(default = "default_id_field")]
    pub id_field: String,
    /// Action-name family of the deployment.
    #[serde(default)]
    pub vocabulary: VocabularyPreset,
    /// Write payload encoding of the deployment.
    #[serde(default)]
    pub write_encoding: WriteEncoding,
    /// Optional retry policy; if missing, built-in defaults are used.
    #[serde(default)]
    pub retry: Option<RetryConfig>,
}

fn default_timeout_secs() -> u64 {
    20
}

fn default_id_field() -> String {
    "id".to_string()
}

impl Default for SrmConfig {
    fn default() -> Self {
        Self {
            endpoint_url: None,
            timeout_secs: default_timeout_secs(),
            id_field: default_id_field(),
            vocabulary: VocabularyPreset::default(),
            write_encoding: WriteEncoding::default(),
            retry: None,
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("srm")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<SrmConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = SrmConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }
    load_from(&path)
}

/// Load configuration from an explicit path (no default-file creation).
pub fn load_from(path: &Path) -> Result<SrmConfig> {
    let data = fs::read_to_string(path)?;
    let cfg: SrmConfig = toml::from_str(&data)?;
    Ok(cfg)
}
