use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// HTTP settings for page and script fetches (optional section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    pub connect_timeout_secs: u64,
    /// Whole-transfer timeout per request.
    pub timeout_secs: u64,
    #[serde(default)]
    pub user_agent: Option<String>,
    /// Larger bodies are dropped like any other fetch error.
    pub max_body_bytes: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 5,
            timeout_secs: 5,
            user_agent: None,
            max_body_bytes: 16 * 1024 * 1024,
        }
    }
}

/// Retry policy parameters (optional section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts per fetch (including the first).
    pub max_attempts: u32,
    /// Base delay in seconds for exponential backoff (e.g. 0.25 = 250ms).
    pub base_delay_secs: f64,
    pub max_delay_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_secs: 0.5,
            max_delay_secs: 10,
        }
    }
}

/// Global configuration loaded from `~/.config/scriptdex/config.toml`.
/// Command-line flags override these values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptdexConfig {
    /// Directory receiving one file per distinct script body.
    pub output_dir: PathBuf,
    /// JSON index written at the end of the run.
    pub index_file: PathBuf,
    /// Crawl recursion depth; the start page is depth 1.
    pub max_depth: u32,
    /// Concurrent page workers.
    pub workers: usize,
    /// Links containing any of these substrings are not followed.
    #[serde(default)]
    pub filter_words: Vec<String>,
    #[serde(default)]
    pub fetch: Option<FetchConfig>,
    #[serde(default)]
    pub retry: Option<RetryConfig>,
}

impl Default for ScriptdexConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("output"),
            index_file: PathBuf::from("meta.json"),
            max_depth: 4,
            workers: 8,
            filter_words: Vec::new(),
            fetch: None,
            retry: None,
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("scriptdex")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<ScriptdexConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = ScriptdexConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: ScriptdexConfig = toml::from_str(&data)?;
    Ok(cfg)
}
