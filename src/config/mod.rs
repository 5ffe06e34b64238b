use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::infrastructure::abi::DEFAULT_OPENCHAIN_URL;

pub mod logging;

pub use logging::{init_tracing, LogConfig};

fn default_lookup_timeout_ms() -> u64 {
    2_000
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Fragment database; defaults to `<data_dir>/fragments.sqlite3`
    #[serde(default)]
    pub candidate_db: Option<PathBuf>,

    #[serde(default = "default_lookup_timeout_ms")]
    pub lookup_timeout_ms: u64,

    /// Fall back to OpenChain when the local store has nothing
    #[serde(default)]
    pub remote_lookup: bool,

    #[serde(default)]
    pub openchain_url: Option<String>,

    #[serde(default)]
    pub abi_paths: Vec<String>,

    #[serde(default)]
    pub log: LogConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            candidate_db: None,
            lookup_timeout_ms: default_lookup_timeout_ms(),
            remote_lookup: false,
            openchain_url: None,
            abi_paths: Vec::new(),
            log: LogConfig::default(),
        }
    }
}

impl Config {
    pub fn lookup_timeout(&self) -> Duration {
        Duration::from_millis(self.lookup_timeout_ms)
    }

    pub fn openchain_url(&self) -> &str {
        self.openchain_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or(DEFAULT_OPENCHAIN_URL)
    }

    pub fn candidate_db_path(&self) -> Option<PathBuf> {
        self.candidate_db.clone().or_else(fragments_db_path)
    }

    /// Configured import roots, with `~/` expanded
    pub fn abi_roots(&self) -> Vec<PathBuf> {
        self.abi_paths.iter().map(|p| expand_home(p)).collect()
    }
}

pub fn load() -> Config {
    let Some(path) = config_path() else {
        return Config::default();
    };
    load_from(&path).unwrap_or_default()
}

pub fn load_from(path: &Path) -> Result<Config> {
    let content =
        fs::read_to_string(path).with_context(|| format!("read config {}", path.display()))?;
    toml::from_str::<Config>(&content).with_context(|| format!("parse config {}", path.display()))
}

pub fn config_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os("LOGDECODE_CONFIG").map(PathBuf::from) {
        return Some(path);
    }
    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from) {
        return Some(xdg.join("logdecode").join("config.toml"));
    }
    if let Some(home) = std::env::var_os("HOME").map(PathBuf::from) {
        return Some(home.join(".config").join("logdecode").join("config.toml"));
    }

    directories::ProjectDirs::from("io", "logdecode", "logdecode")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

pub fn data_dir() -> Option<PathBuf> {
    if let Some(xdg) = std::env::var_os("XDG_DATA_HOME").map(PathBuf::from) {
        return Some(xdg.join("logdecode"));
    }
    if let Some(home) = std::env::var_os("HOME").map(PathBuf::from) {
        return Some(home.join(".local").join("share").join("logdecode"));
    }
    directories::ProjectDirs::from("io", "logdecode", "logdecode")
        .map(|dirs| dirs.data_dir().to_path_buf())
}

pub fn fragments_db_path() -> Option<PathBuf> {
    data_dir().map(|dir| dir.join("fragments.sqlite3"))
}

fn expand_home(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), std::env::var_os("HOME")) {
        (Some(rest), Some(home)) => PathBuf::from(home).join(rest),
        _ => PathBuf::from(path),
    }
}
