//! Shared application settings (database location, permissions, cache).
//!
//! The settings file lives at `~/.config/comicdex/settings.toml`. Values are
//! resolved from built-in defaults, then the file, then `COMICDEX_*`
//! environment variables; frontends apply their own overrides last.

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

const ENV_PREFIX: &str = "COMICDEX";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("I/O error on {path}: {source}")]
    Io { path: PathBuf, source: io::Error },

    #[error("invalid settings file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("cannot serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid value {value:?} for {key}")]
    Env { key: String, value: String },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub auth: AuthSettings,
    pub cache: CacheSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    /// `None` means [`default_database_path`].
    pub path: Option<PathBuf>,
    pub pool_size: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
    /// Mutations require the `<prefix>.write` capability.
    pub permission_prefix: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    pub enabled: bool,
    pub ttl_secs: u64,
    pub sweep_secs: u64,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            path: None,
            pool_size: 4,
        }
    }
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            permission_prefix: "comicdex".to_string(),
        }
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_secs: 300,
            sweep_secs: 60,
        }
    }
}

impl DatabaseSettings {
    pub fn resolved_path(&self) -> PathBuf {
        self.path.clone().unwrap_or_else(default_database_path)
    }
}

impl CacheSettings {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_secs.max(1))
    }
}

impl Settings {
    /// Override fields from `COMICDEX_<SECTION>_<KEY>` variables, reading
    /// them through `lookup` (normally `std::env::var`).
    pub fn apply_env(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), SettingsError> {
        let var = |section: &str, key: &str| {
            let name = format!("{ENV_PREFIX}_{section}_{key}");
            lookup(&name).map(|value| (name, value))
        };

        if let Some((_, v)) = var("DATABASE", "PATH") {
            self.database.path = (!v.is_empty()).then(|| PathBuf::from(v));
        }
        if let Some((k, v)) = var("DATABASE", "POOL_SIZE") {
            self.database.pool_size = parse(k, v)?;
        }
        if let Some((_, v)) = var("AUTH", "PERMISSION_PREFIX") {
            self.auth.permission_prefix = v;
        }
        if let Some((k, v)) = var("CACHE", "ENABLED") {
            self.cache.enabled = parse(k, v)?;
        }
        if let Some((k, v)) = var("CACHE", "TTL_SECS") {
            self.cache.ttl_secs = parse(k, v)?;
        }
        if let Some((k, v)) = var("CACHE", "SWEEP_SECS") {
            self.cache.sweep_secs = parse(k, v)?;
        }
        Ok(())
    }
}

fn parse<T: std::str::FromStr>(key: String, value: String) -> Result<T, SettingsError> {
    value
        .trim()
        .parse()
        .map_err(|_| SettingsError::Env { key, value })
}

/// Canonical path to the shared settings file: `~/.config/comicdex/settings.toml`.
pub fn settings_path() -> PathBuf {
    let config = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    config.join("comicdex").join("settings.toml")
}

/// Default catalog database: `~/.local/share/comicdex/catalog.db` or the
/// platform equivalent.
pub fn default_database_path() -> PathBuf {
    let data = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
    data.join("comicdex").join("catalog.db")
}

/// Defaults, then the settings file, then the environment.
pub fn load_settings() -> Result<Settings, SettingsError> {
    let mut settings = load_settings_from(&settings_path())?;
    settings.apply_env(|name| std::env::var(name).ok())?;
    Ok(settings)
}

/// Read settings from `path`. A missing file yields the defaults.
pub fn load_settings_from(path: &Path) -> Result<Settings, SettingsError> {
    let contents = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Settings::default()),
        Err(source) => {
            return Err(SettingsError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    toml::from_str(&contents).map_err(|source| SettingsError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Save settings to the shared settings file.
pub fn save_settings(settings: &Settings) -> Result<(), SettingsError> {
    save_settings_to(&settings_path(), settings)
}

/// Write settings atomically through a temp file and rename.
pub fn save_settings_to(path: &Path, settings: &Settings) -> Result<(), SettingsError> {
    let io_err = |source: io::Error| SettingsError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }
    let serialized = toml::to_string_pretty(settings)?;
    let tmp = path.with_extension("toml.tmp");
    std::fs::write(&tmp, &serialized).map_err(io_err)?;
    std::fs::rename(&tmp, path).map_err(io_err)?;
    Ok(())
}

/// Load the full settings file as a pretty-printed TOML string for display.
pub fn load_settings_string() -> Option<String> {
    let contents = std::fs::read_to_string(settings_path()).ok()?;
    let doc: toml::Value = contents.parse().ok()?;
    toml::to_string_pretty(&doc).ok()
}

#[cfg(test)]
#[path = "tests/settings_tests.rs"]
mod tests;
