use std::{
    fmt::Display,
    fs,
    path::{Path, PathBuf},
    str::FromStr,
    time::Duration,
};

use color_eyre::{eyre::eyre, Result};
use dirs::config_dir;
use serde::{Deserialize, Serialize};
use splitvault_coordinator::StorageEndpoint;

/// Service configuration: `~/.config/splitvault/config.toml` (platform-specific),
/// then environment overrides.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Raise log verbosity to debug. Keys and payloads are never logged either way.
    pub debug: bool,
    pub coordinator: CoordinatorConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct CoordinatorConfig {
    pub listen_port: u16,
    /// Deadline for each call to the storage service.
    pub timeout_secs: u64,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            listen_port: 8080,
            timeout_secs: 10,
        }
    }
}

/// The storage service's address. The storage service listens on `port`, and the
/// coordinator dials `host:port`.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct StorageConfig {
    pub host: String,
    pub port: u16,
    pub store_path: String,
    pub retrieve_path: String,
    /// Mixed into identifier hashes. Not a secret.
    pub salt: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 8081,
            store_path: "/store".to_string(),
            retrieve_path: "/retrieve".to_string(),
            salt: String::new(),
        }
    }
}

impl Config {
    /// Apply environment overrides. Values that fail to parse are errors.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup("DEBUG") {
            self.debug = parse_bool("DEBUG", &raw)?;
        }
        override_from(&lookup, "LISTEN_PORT", &mut self.coordinator.listen_port)?;
        override_from(&lookup, "CONTEXT_TIMEOUT", &mut self.coordinator.timeout_secs)?;
        override_from(&lookup, "STORAGE_HOST", &mut self.storage.host)?;
        override_from(&lookup, "STORAGE_PORT", &mut self.storage.port)?;
        override_from(&lookup, "STORAGE_STORE_URI", &mut self.storage.store_path)?;
        override_from(&lookup, "STORAGE_RETRIEVE_URI", &mut self.storage.retrieve_path)?;
        override_from(&lookup, "STORAGE_SALT", &mut self.storage.salt)?;
        Ok(())
    }

    pub fn storage_endpoint(&self) -> StorageEndpoint {
        StorageEndpoint {
            base_url: format!("http://{}:{}", self.storage.host, self.storage.port),
            store_path: self.storage.store_path.clone(),
            retrieve_path: self.storage.retrieve_path.clone(),
            timeout: Duration::from_secs(self.coordinator.timeout_secs),
        }
    }
}

/// Load config from `path` (or the default location) and apply process env overrides.
pub fn load(path: Option<&Path>) -> Result<Config> {
    let mut config = match path {
        Some(path) => load_from_path(path)?,
        None => match default_path() {
            Ok(path) => load_from_path(path)?,
            // Headless hosts may have no config dir; run on defaults + env.
            Err(_) => Config::default(),
        },
    };
    config.apply_env(|name| std::env::var(name).ok())?;
    Ok(config)
}

/// Load config from a given path; if missing or empty, return defaults.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<Config> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(Config::default());
    }
    let contents = fs::read_to_string(path)?;
    if contents.trim().is_empty() {
        return Ok(Config::default());
    }
    let cfg: Config = toml::from_str(&contents)?;
    Ok(cfg)
}

/// Resolve the default config path (platform aware).
pub fn default_path() -> Result<PathBuf> {
    let base = config_dir().ok_or_else(|| eyre!("no config dir available"))?;
    Ok(base.join("splitvault").join("config.toml"))
}

/// Write `config` to the default path unless a file is already there.
pub fn write_default_if_missing(config: &Config) -> Result<PathBuf> {
    write_if_missing(config, &default_path()?)
}

fn write_if_missing(config: &Config, path: &Path) -> Result<PathBuf> {
    if path.exists() {
        return Ok(path.to_path_buf());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let body = toml::to_string_pretty(config)?;
    fs::write(path, body)?;
    Ok(path.to_path_buf())
}

fn override_from<F, T>(lookup: &F, name: &str, slot: &mut T) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    if let Some(raw) = lookup(name) {
        *slot = raw
            .parse()
            .map_err(|e| eyre!("invalid value for {name}: {raw:?} ({e})"))?;
    }
    Ok(())
}

fn parse_bool(name: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "t" | "true" | "yes" => Ok(true),
        "0" | "f" | "false" | "no" | "" => Ok(false),
        _ => Err(eyre!("invalid value for {name}: {raw:?}")),
    }
}
