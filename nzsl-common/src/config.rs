//! Configuration loading and resolution
//!
//! Every setting resolves in this priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable (bound to the argument by clap)
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! The first two tiers arrive here already merged as [`Overrides`]. A missing
//! TOML file at the default location is not an error; the service starts on
//! compiled defaults.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};
use url::Url;

/// Page template root of the NZSL online dictionary
pub const DEFAULT_BASE_URL: &str = "https://nzsl.vuw.ac.nz/signs/";

/// Environment variable naming the TOML config file
pub const CONFIG_ENV_VAR: &str = "NZSL_CONFIG";

const DEFAULT_RAW_CORPUS_DIR: &str = "./data";
const DEFAULT_NORMALIZED_CORPUS_DIR: &str = "./data2";
const DEFAULT_VIDEO_DIR: &str = "./downloads";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3000;

/// Settings loaded from the TOML config file
///
/// All keys are optional; anything left out falls through to compiled
/// defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    /// Sign page root, e.g. `https://nzsl.vuw.ac.nz/signs/`
    #[serde(default)]
    pub base_url: Option<String>,

    /// Directory of raw per-sign JSON documents (reducer input)
    #[serde(default)]
    pub raw_corpus_dir: Option<PathBuf>,

    /// Directory the reducer writes normalized records into
    #[serde(default)]
    pub normalized_corpus_dir: Option<PathBuf>,

    /// Directory scanned by gloss lookups (defaults to the raw corpus)
    #[serde(default)]
    pub lookup_dir: Option<PathBuf>,

    /// Directory downloaded videos land in
    #[serde(default)]
    pub video_dir: Option<PathBuf>,

    #[serde(default)]
    pub host: Option<String>,

    #[serde(default)]
    pub port: Option<u16>,

    /// Outbound HTTP timeout; unset means no timeout
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,

    #[serde(default)]
    pub user_agent: Option<String>,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Values supplied on the command line or through the environment
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub base_url: Option<String>,
    pub raw_corpus_dir: Option<PathBuf>,
    pub normalized_corpus_dir: Option<PathBuf>,
    pub lookup_dir: Option<PathBuf>,
    pub video_dir: Option<PathBuf>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub request_timeout_secs: Option<u64>,
    pub log_level: Option<String>,
}

/// Fully resolved runtime settings
#[derive(Debug, Clone)]
pub struct Settings {
    pub base_url: Url,
    pub raw_corpus_dir: PathBuf,
    pub normalized_corpus_dir: PathBuf,
    pub lookup_dir: PathBuf,
    pub video_dir: PathBuf,
    pub host: String,
    pub port: u16,
    pub request_timeout: Option<Duration>,
    pub user_agent: String,
    pub log_level: String,
}

impl Settings {
    /// Merge overrides over the TOML file over compiled defaults
    pub fn resolve(overrides: &Overrides, file: &TomlConfig) -> Result<Self> {
        let base_url = overrides
            .base_url
            .as_deref()
            .or(file.base_url.as_deref())
            .unwrap_or(DEFAULT_BASE_URL);
        let base_url = normalize_base_url(base_url)?;

        let raw_corpus_dir = pick(&overrides.raw_corpus_dir, &file.raw_corpus_dir)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_RAW_CORPUS_DIR));
        let normalized_corpus_dir =
            pick(&overrides.normalized_corpus_dir, &file.normalized_corpus_dir)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_NORMALIZED_CORPUS_DIR));
        let lookup_dir = pick(&overrides.lookup_dir, &file.lookup_dir)
            .unwrap_or_else(|| raw_corpus_dir.clone());
        let video_dir = pick(&overrides.video_dir, &file.video_dir)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_VIDEO_DIR));

        let host = pick(&overrides.host, &file.host).unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = overrides.port.or(file.port).unwrap_or(DEFAULT_PORT);

        let request_timeout = match overrides.request_timeout_secs.or(file.request_timeout_secs) {
            Some(0) => {
                return Err(Error::Config(
                    "request_timeout_secs must be greater than zero".to_string(),
                ))
            }
            Some(secs) => Some(Duration::from_secs(secs)),
            None => None,
        };

        let user_agent = file
            .user_agent
            .clone()
            .unwrap_or_else(|| concat!("nzsl-fetch/", env!("CARGO_PKG_VERSION")).to_string());

        let log_level = overrides
            .log_level
            .clone()
            .unwrap_or_else(|| file.logging.level.clone());

        Ok(Self {
            base_url,
            raw_corpus_dir,
            normalized_corpus_dir,
            lookup_dir,
            video_dir,
            host,
            port,
            request_timeout,
            user_agent,
            log_level,
        })
    }

    /// `host:port` string for the HTTP listener
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn pick<T: Clone>(first: &Option<T>, second: &Option<T>) -> Option<T> {
    first.clone().or_else(|| second.clone())
}

/// Validate a sign page root and make sure it ends with `/`
///
/// Without the trailing slash, joining an id would replace the last path
/// segment instead of appending to it.
pub fn normalize_base_url(raw: &str) -> Result<Url> {
    let mut url = Url::parse(raw.trim())
        .map_err(|e| Error::Config(format!("Invalid base_url '{}': {}", raw, e)))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(Error::Config(format!(
            "base_url must use http or https, got '{}'",
            url.scheme()
        )));
    }

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }

    Ok(url)
}

/// Where the TOML config came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Named on the command line or via `NZSL_CONFIG`; must exist
    Explicit(PathBuf),
    /// Platform config directory; may be absent
    Default(PathBuf),
    /// No config directory on this platform
    None,
}

/// Locate the TOML config file
///
/// Priority: command-line argument, then `NZSL_CONFIG`, then
/// `<config_dir>/nzsl-fetch/config.toml`.
pub fn resolve_config_path(cli_arg: Option<&Path>) -> ConfigSource {
    if let Some(path) = cli_arg {
        return ConfigSource::Explicit(path.to_path_buf());
    }

    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            return ConfigSource::Explicit(PathBuf::from(path));
        }
    }

    match dirs::config_dir() {
        Some(dir) => ConfigSource::Default(dir.join("nzsl-fetch").join("config.toml")),
        None => ConfigSource::None,
    }
}

/// Load the TOML config file named by `source`
///
/// A missing default file yields an empty config. A missing explicit file,
/// or any file that fails to parse, is an error.
pub fn load_toml_config(source: &ConfigSource) -> Result<TomlConfig> {
    let path = match source {
        ConfigSource::Explicit(path) => {
            if !path.exists() {
                return Err(Error::ConfigNotFound(path.clone()));
            }
            path
        }
        ConfigSource::Default(path) => {
            if !path.exists() {
                warn!(
                    "Config file {} not found, using compiled defaults",
                    path.display()
                );
                return Ok(TomlConfig::default());
            }
            path
        }
        ConfigSource::None => {
            info!("No config directory available, using compiled defaults");
            return Ok(TomlConfig::default());
        }
    };

    let content = std::fs::read_to_string(path)?;
    let config: TomlConfig = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path.display(), e)))?;

    info!("Loaded configuration from {}", path.display());
    Ok(config)
}
