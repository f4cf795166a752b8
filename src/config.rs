use crate::constants::{
    BACKEND_URL_ENV, CONFIG_PATH_ENV, DEFAULT_BACKEND_URL, LEGACY_BACKEND_URL_ENV, LOG_LEVEL_ENV,
    PROMPT_PATH,
};
use crate::errors::{ChatError, ChatResult};
use once_cell::sync::Lazy;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::{
    env, fs,
    path::{Path, PathBuf},
    sync::{PoisonError, RwLock},
};

const LOG_LEVELS: [&str; 6] = ["off", "error", "warn", "info", "debug", "trace"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the backend; `/prompt` is appended to it.
    pub backend_url: String,
    pub request_timeout_secs: Option<u64>,
    pub log_level: String,
    pub log_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            request_timeout_secs: None,
            log_level: "info".to_string(),
            log_dir: default_log_dir(),
        }
    }
}

impl Config {
    pub fn prompt_url(&self) -> ChatResult<Url> {
        let base = self.backend_url.trim().trim_end_matches('/');
        Url::parse(&format!("{}/{}", base, PROMPT_PATH)).map_err(|e| {
            ChatError::config_error(format!("Invalid backend URL '{}': {}", self.backend_url, e))
        })
    }

    /// Overlays environment values, using `lookup` so tests need not touch the process env.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = lookup(BACKEND_URL_ENV).or_else(|| lookup(LEGACY_BACKEND_URL_ENV));
        if let Some(url) = url.filter(|u| !u.trim().is_empty()) {
            self.backend_url = url.trim().to_string();
        }
        if let Some(level) = lookup(LOG_LEVEL_ENV).filter(|l| !l.trim().is_empty()) {
            self.log_level = level.trim().to_lowercase();
        }
    }
}

static CONFIG: Lazy<RwLock<Config>> = Lazy::new(|| RwLock::new(Config::default()));

/// Resolves defaults, the config file and the environment, then installs the
/// result as the process-wide config.
pub fn initialize_config() -> ChatResult<Config> {
    let path = match env::var(CONFIG_PATH_ENV) {
        Ok(p) if !p.trim().is_empty() => Some(PathBuf::from(p)),
        _ => default_config_path(),
    };

    let mut config = match path {
        Some(ref p) => load_config_file(p)?,
        None => Config::default(),
    };
    config.apply_env(|key| env::var(key).ok());
    validate_config(&config)?;

    *CONFIG.write().unwrap_or_else(PoisonError::into_inner) = config.clone();
    Ok(config)
}

/// Reads a JSON config file; a missing file yields the defaults.
pub fn load_config_file(path: &Path) -> ChatResult<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }

    let config_str = fs::read_to_string(path)
        .map_err(|e| ChatError::config_error(format!("Failed to read config file: {}", e)))?;

    serde_json::from_str(&config_str)
        .map_err(|e| ChatError::config_error(format!("Failed to parse config: {}", e)))
}

pub fn validate_config(config: &Config) -> ChatResult<()> {
    if config.backend_url.trim().is_empty() {
        return Err(ChatError::config_error("Backend URL is required"));
    }

    let url = config.prompt_url()?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ChatError::config_error(format!(
            "Backend URL must be http or https, got '{}'",
            url.scheme()
        )));
    }

    if !LOG_LEVELS.contains(&config.log_level.as_str()) {
        return Err(ChatError::config_error(format!(
            "Unknown log level '{}'",
            config.log_level
        )));
    }

    if config.request_timeout_secs == Some(0) {
        return Err(ChatError::config_error(
            "request_timeout_secs must be greater than 0",
        ));
    }

    Ok(())
}

pub fn get_config() -> Config {
    CONFIG
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("parley").join("config.json"))
}

fn default_log_dir() -> PathBuf {
    dirs::cache_dir()
        .map(|dir| dir.join("parley"))
        .unwrap_or_else(|| PathBuf::from("."))
}
