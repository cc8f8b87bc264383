use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

#[cfg(windows)]
pub fn config_dir() -> PathBuf {
    std::env::var("APPDATA")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
        .join("demask")
}

#[cfg(not(windows))]
pub fn config_dir() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(".config")
        .join("demask")
}

fn config_file_path() -> PathBuf {
    config_dir().join("config.toml")
}

/// Persistent defaults; command-line flags win over every entry here.
#[derive(Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub marker: Option<char>,
    #[serde(default)]
    pub placeholder_stem: Option<String>,
    #[serde(default)]
    pub exclude: Vec<String>,
}

pub fn load_config() -> Result<Config> {
    let path = config_file_path();
    if path.exists() {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        toml::from_str(&content).context("failed to parse config")
    } else {
        Ok(Config::default())
    }
}
