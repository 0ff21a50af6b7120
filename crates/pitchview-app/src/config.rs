// Configuration loading and parsing (config/pitchview.toml).

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

pub const CONFIG_FILE: &str = "pitchview.toml";

/// Pitch tracking data does not exist before this date.
pub const TRACKING_ERA_START: (i32, u32, u32) = (2008, 1, 1);

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no Pitchview config at {path}")]
    Missing { path: PathBuf },

    #[error("{path} is not valid TOML: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("config field `{field}` {message}")]
    Invalid { field: String, message: String },

    #[error("could not install the default config at {path}: {source}")]
    Install {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot resolve the working directory: {0}")]
    WorkingDir(std::io::Error),
}

// ---------------------------------------------------------------------------
// Config structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub savant: SavantConfig,
    pub register: RegisterConfig,
    pub dates: DatesConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SavantConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterConfig {
    pub base_url: String,
    /// Shard suffixes, one character each (`people-{c}.csv`).
    pub shards: String,
    pub cache_file: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatesConfig {
    pub earliest: NaiveDate,
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

fn config_path(base_dir: &Path) -> PathBuf {
    base_dir.join("config").join(CONFIG_FILE)
}

/// Load and validate `config/pitchview.toml` relative to `base_dir`.
pub(crate) fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let path = config_path(base_dir);
    let text = std::fs::read_to_string(&path)
        .map_err(|_| ConfigError::Missing { path: path.clone() })?;
    let config: Config =
        toml::from_str(&text).map_err(|source| ConfigError::Parse { path, source })?;

    validate(&config)?;

    Ok(config)
}

/// Seed `config/pitchview.toml` from `defaults/pitchview.toml` on first run.
///
/// Returns the installed path, or `None` when a config already exists or no
/// default is shipped alongside the binary. An existing config is never
/// overwritten.
pub fn install_default_config(base_dir: &Path) -> Result<Option<PathBuf>, ConfigError> {
    let source = base_dir.join("defaults").join(CONFIG_FILE);
    let target = config_path(base_dir);
    if target.exists() || !source.is_file() {
        return Ok(None);
    }

    let install_err = |e| ConfigError::Install {
        path: target.clone(),
        source: e,
    };
    if let Some(dir) = target.parent() {
        std::fs::create_dir_all(dir).map_err(install_err)?;
    }
    let mut dest = match std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&target)
    {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => return Ok(None),
        Err(e) => return Err(install_err(e)),
    };
    let mut defaults = std::fs::File::open(&source).map_err(install_err)?;
    std::io::copy(&mut defaults, &mut dest).map_err(install_err)?;

    info!("Installed default config at {}", target.display());
    Ok(Some(target))
}

/// Load config relative to the current working directory, installing the
/// default config first if there is none.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(ConfigError::WorkingDir)?;
    install_default_config(&cwd)?;
    load_config_from(&cwd)
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    let urls = [
        ("savant.base_url", &config.savant.base_url),
        ("register.base_url", &config.register.base_url),
    ];
    for (field, url) in urls {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::Invalid {
                field: field.into(),
                message: format!("must be an http(s) URL, got {url:?}"),
            });
        }
    }

    if config.savant.timeout_secs == 0 {
        return Err(ConfigError::Invalid {
            field: "savant.timeout_secs".into(),
            message: "must be greater than 0".into(),
        });
    }

    let shards = &config.register.shards;
    if shards.is_empty() || !shards.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ConfigError::Invalid {
            field: "register.shards".into(),
            message: format!("must be a non-empty run of hex digits, got {shards:?}"),
        });
    }

    if config.register.cache_file.trim().is_empty() {
        return Err(ConfigError::Invalid {
            field: "register.cache_file".into(),
            message: "must not be empty".into(),
        });
    }

    let (y, m, d) = TRACKING_ERA_START;
    let era_start = NaiveDate::from_ymd_opt(y, m, d).unwrap_or(NaiveDate::MIN);
    if config.dates.earliest < era_start {
        return Err(ConfigError::Invalid {
            field: "dates.earliest".into(),
            message: format!("must be on or after {era_start}, got {}", config.dates.earliest),
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
