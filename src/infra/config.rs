use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    pub claude_dir: PathBuf,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config dir not found")]
    ConfigDirNotFound,

    #[error("failed to read config: {0}")]
    Read(#[source] io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("failed to write config: {0}")]
    Write(#[source] io::Error),
}

pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    let Some(base) = dirs::config_dir() else {
        return Err(ConfigError::ConfigDirNotFound);
    };
    Ok(base.join("ccsweep").join("config.json"))
}

/// `Ok(None)` when no config exists yet (first run).
pub fn load_config() -> Result<Option<Config>, ConfigError> {
    let path = config_file_path()?;
    let raw = match fs::read_to_string(&path) {
        Ok(raw) => raw,
        Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(error) => return Err(ConfigError::Read(error)),
    };
    Ok(Some(serde_json::from_str(&raw)?))
}

pub fn save_config(config: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_file_path()?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(ConfigError::Write)?;
    }
    let text = serde_json::to_string_pretty(config)?;
    fs::write(&path, text).map_err(ConfigError::Write)?;
    Ok(path)
}

#[derive(Debug, Error)]
pub enum PromptError {
    #[error("failed to read input: {0}")]
    Read(#[source] io::Error),
}

/// First-run prompt for the Claude root. Empty input takes the default;
/// a leading `~` expands against the home directory.
pub fn prompt_for_claude_dir() -> Result<PathBuf, PromptError> {
    let default_dir = default_claude_dir();

    let mut out = io::stdout().lock();
    let _ = writeln!(out, "ccsweep - first run setup");
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "Enter the path to your Claude directory (default: {})",
        default_dir.display()
    );
    let _ = write!(out, "Path [press Enter for default]: ");
    let _ = out.flush();

    let mut input = String::new();
    io::stdin()
        .lock()
        .read_line(&mut input)
        .map_err(PromptError::Read)?;

    let input = input.trim();
    if input.is_empty() {
        return Ok(default_dir);
    }
    Ok(expand_home(input))
}

pub fn default_claude_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".claude")
}

fn expand_home(input: &str) -> PathBuf {
    if let Some(rest) = input.strip_prefix('~') {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest.trim_start_matches('/'));
        }
    }
    PathBuf::from(input)
}
