//! CLI configuration at `<config_dir>/schedule/config.toml`.
//!
//! Every key is optional. Command-line flags take precedence over the file,
//! and the file over built-in defaults.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::debug;
use serde::Deserialize;

const DEFAULT_OWNER: &str = "student";
const DEFAULT_TIMEZONE: &str = "UTC";
const DEFAULT_UPCOMING_LIMIT: usize = 5;

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliConfig {
    /// JSON file holding every stored schedule.
    pub data_file: Option<PathBuf>,
    /// JSON file holding notes. Defaults to `notes.json` next to the data file.
    pub notes_file: Option<PathBuf>,
    /// Owner id used when `--owner` is not given.
    pub owner: Option<String>,
    /// IANA zone for `--start`/`--end` values without an offset.
    pub timezone: Option<String>,
    pub upcoming_limit: Option<usize>,
}

impl CliConfig {
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("schedule").join("config.toml"))
    }

    /// Load the config file.
    ///
    /// An explicitly given path must exist; a missing file at the default
    /// location yields the default config.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => match Self::default_path() {
                Some(path) if path.exists() => path,
                _ => return Ok(Self::default()),
            },
        };

        debug!("loading config from {}", path.display());
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }
}

/// Effective settings after merging flags, config file and defaults.
#[derive(Debug, Clone)]
pub struct Settings {
    pub data_file: PathBuf,
    pub notes_file: PathBuf,
    pub owner: String,
    pub timezone: String,
    pub upcoming_limit: usize,
}

impl Settings {
    pub fn resolve(data: Option<PathBuf>, owner: Option<String>, config: CliConfig) -> Self {
        let data_file = data
            .or(config.data_file.map(|p| expand_home(&p)))
            .unwrap_or_else(default_data_file);
        let notes_file = config
            .notes_file
            .map(|p| expand_home(&p))
            .unwrap_or_else(|| data_file.with_file_name("notes.json"));

        Self {
            data_file,
            notes_file,
            owner: owner
                .or(config.owner)
                .unwrap_or_else(|| DEFAULT_OWNER.to_string()),
            timezone: config
                .timezone
                .unwrap_or_else(|| DEFAULT_TIMEZONE.to_string()),
            upcoming_limit: config.upcoming_limit.unwrap_or(DEFAULT_UPCOMING_LIMIT),
        }
    }
}

fn default_data_file() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("schedule"))
        .unwrap_or_else(|| PathBuf::from("."))
        .join("schedules.json")
}

/// Expand a leading `~/` to the home directory.
fn expand_home(path: &Path) -> PathBuf {
    match (path.strip_prefix("~"), dirs::home_dir()) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path.to_path_buf(),
    }
}
