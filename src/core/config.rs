//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.homestead/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.

use log::{LevelFilter, debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct HomesteadConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GeneralConfig {
    pub log_level: Option<String>,
    pub log_file: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ApiConfig {
    pub base_url: Option<String>,
    /// Raw cookie sent with every API request, e.g. `access_token=...`.
    pub session_cookie: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct StorageConfig {
    pub base_url: Option<String>,
    pub bucket: Option<String>,
    pub auth_token: Option<String>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:3000";
pub const DEFAULT_STORAGE_BASE_URL: &str = "https://firebasestorage.googleapis.com";
pub const DEFAULT_STORAGE_BUCKET: &str = "homestead.appspot.com";
pub const DEFAULT_LOG_FILE: &str = "homestead.log";
pub const DEFAULT_LOG_LEVEL: LevelFilter = LevelFilter::Debug;

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub api_base_url: String,
    pub session_cookie: Option<String>,
    pub storage_base_url: String,
    pub storage_bucket: String,
    pub storage_auth_token: Option<String>,
    pub log_level: LevelFilter,
    pub log_file: PathBuf,
}

/// Values given on the command line (None = not specified).
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub api_url: Option<String>,
    pub log_level: Option<String>,
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading
// ============================================================================

/// Returns `~/.homestead`, the directory for config and the session cache.
pub fn home_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".homestead"))
}

/// Returns the path to `~/.homestead/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    home_dir().map(|dir| dir.join("config.toml"))
}

/// Load config from `~/.homestead/config.toml`.
///
/// If the file doesn't exist, generates a commented-out default and
/// returns `HomesteadConfig::default()`. If it exists but is malformed,
/// returns `ConfigError::Parse`.
pub fn load_config() -> Result<HomesteadConfig, ConfigError> {
    let path = match config_path() {
        Some(p) => p,
        None => {
            warn!("Could not determine home directory, using default config");
            return Ok(HomesteadConfig::default());
        }
    };
    load_config_from(&path)
}

pub fn load_config_from(path: &Path) -> Result<HomesteadConfig, ConfigError> {
    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(path);
        return Ok(HomesteadConfig::default());
    }

    let contents = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: HomesteadConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", redacted(&config));
    Ok(config)
}

/// Debug view of the config without secrets.
fn redacted(config: &HomesteadConfig) -> String {
    format!(
        "api.base_url={:?} api.session_cookie={} storage.base_url={:?} storage.bucket={:?} storage.auth_token={}",
        config.api.base_url,
        if config.api.session_cookie.is_some() { "<set>" } else { "<unset>" },
        config.storage.base_url,
        config.storage.bucket,
        if config.storage.auth_token.is_some() { "<set>" } else { "<unset>" },
    )
}

/// Generates a commented-out default config file at the given path.
fn generate_default_config(path: &Path) {
    let default_content = r#"# Homestead Configuration
# All settings are optional. Defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [general]
# log_level = "debug"                 # "error", "warn", "info", "debug", "trace", "off"
# log_file = "homestead.log"

# [api]
# base_url = "http://localhost:3000"  # Or set HOMESTEAD_API_URL
# session_cookie = "access_token=..." # Or set HOMESTEAD_SESSION_COOKIE

# [storage]
# base_url = "https://firebasestorage.googleapis.com"
# bucket = "my-project.appspot.com"   # Or set HOMESTEAD_STORAGE_BUCKET
# auth_token = "..."                  # Or set HOMESTEAD_STORAGE_TOKEN
"#;

    if let Some(parent) = path.parent()
        && let Err(e) = fs::create_dir_all(parent)
    {
        warn!("Failed to create config directory: {}", e);
        return;
    }
    if let Err(e) = fs::write(path, default_content) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
pub fn resolve(config: &HomesteadConfig, cli: &CliOverrides) -> ResolvedConfig {
    resolve_with_env(config, cli, |key| std::env::var(key).ok())
}

/// Same as `resolve`, with the environment lookup injected.
pub fn resolve_with_env(
    config: &HomesteadConfig,
    cli: &CliOverrides,
    env: impl Fn(&str) -> Option<String>,
) -> ResolvedConfig {
    // API base URL: CLI → env → config → default
    let api_base_url = cli
        .api_url
        .clone()
        .or_else(|| env("HOMESTEAD_API_URL"))
        .or_else(|| config.api.base_url.clone())
        .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());

    let session_cookie = env("HOMESTEAD_SESSION_COOKIE").or_else(|| config.api.session_cookie.clone());

    let storage_base_url = env("HOMESTEAD_STORAGE_URL")
        .or_else(|| config.storage.base_url.clone())
        .unwrap_or_else(|| DEFAULT_STORAGE_BASE_URL.to_string());

    let storage_bucket = env("HOMESTEAD_STORAGE_BUCKET")
        .or_else(|| config.storage.bucket.clone())
        .unwrap_or_else(|| DEFAULT_STORAGE_BUCKET.to_string());

    let storage_auth_token =
        env("HOMESTEAD_STORAGE_TOKEN").or_else(|| config.storage.auth_token.clone());

    // Log level: CLI → env → config → default. Unparseable values fall through.
    let log_level = [
        cli.log_level.clone(),
        env("HOMESTEAD_LOG_LEVEL"),
        config.general.log_level.clone(),
    ]
    .into_iter()
    .flatten()
    .find_map(|level| parse_level(&level))
    .unwrap_or(DEFAULT_LOG_LEVEL);

    let log_file = config
        .general
        .log_file
        .clone()
        .unwrap_or_else(|| DEFAULT_LOG_FILE.to_string())
        .into();

    ResolvedConfig {
        api_base_url: api_base_url.trim_end_matches('/').to_string(),
        session_cookie,
        storage_base_url: storage_base_url.trim_end_matches('/').to_string(),
        storage_bucket,
        storage_auth_token,
        log_level,
        log_file,
    }
}

fn parse_level(level: &str) -> Option<LevelFilter> {
    match level.parse() {
        Ok(filter) => Some(filter),
        Err(_) => {
            warn!("Ignoring unknown log level '{}'", level);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_default_config_parses() {
        let config = HomesteadConfig::default();
        assert!(config.api.base_url.is_none());
        assert!(config.storage.bucket.is_none());
    }

    #[test]
    fn test_resolve_uses_defaults_when_empty() {
        let resolved = resolve_with_env(&HomesteadConfig::default(), &CliOverrides::default(), no_env);
        assert_eq!(resolved.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(resolved.storage_base_url, DEFAULT_STORAGE_BASE_URL);
        assert_eq!(resolved.storage_bucket, DEFAULT_STORAGE_BUCKET);
        assert_eq!(resolved.log_level, DEFAULT_LOG_LEVEL);
        assert_eq!(resolved.log_file, PathBuf::from(DEFAULT_LOG_FILE));
        assert!(resolved.session_cookie.is_none());
    }

    #[test]
    fn test_resolve_config_values_override_defaults() {
        let config = HomesteadConfig {
            general: GeneralConfig {
                log_level: Some("warn".to_string()),
                log_file: Some("/tmp/h.log".to_string()),
            },
            api: ApiConfig {
                base_url: Some("https://estate.example.com/".to_string()),
                session_cookie: Some("access_token=abc".to_string()),
            },
            storage: StorageConfig {
                bucket: Some("my-bucket".to_string()),
                ..Default::default()
            },
        };
        let resolved = resolve_with_env(&config, &CliOverrides::default(), no_env);
        assert_eq!(resolved.api_base_url, "https://estate.example.com");
        assert_eq!(resolved.session_cookie.as_deref(), Some("access_token=abc"));
        assert_eq!(resolved.storage_bucket, "my-bucket");
        assert_eq!(resolved.log_level, LevelFilter::Warn);
        assert_eq!(resolved.log_file, PathBuf::from("/tmp/h.log"));
    }

    #[test]
    fn test_env_beats_config_and_cli_beats_env() {
        let config = HomesteadConfig {
            api: ApiConfig {
                base_url: Some("http://from-config".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };
        let env = |key: &str| match key {
            "HOMESTEAD_API_URL" => Some("http://from-env".to_string()),
            "HOMESTEAD_STORAGE_BUCKET" => Some("env-bucket".to_string()),
            _ => None,
        };

        let resolved = resolve_with_env(&config, &CliOverrides::default(), env);
        assert_eq!(resolved.api_base_url, "http://from-env");
        assert_eq!(resolved.storage_bucket, "env-bucket");

        let cli = CliOverrides {
            api_url: Some("http://from-cli".to_string()),
            log_level: Some("info".to_string()),
        };
        let resolved = resolve_with_env(&config, &cli, env);
        assert_eq!(resolved.api_base_url, "http://from-cli");
        assert_eq!(resolved.log_level, LevelFilter::Info);
    }

    #[test]
    fn test_bad_log_level_falls_through() {
        let cli = CliOverrides {
            log_level: Some("loud".to_string()),
            ..Default::default()
        };
        let config = HomesteadConfig {
            general: GeneralConfig {
                log_level: Some("error".to_string()),
                log_file: None,
            },
            ..Default::default()
        };
        let resolved = resolve_with_env(&config, &cli, no_env);
        assert_eq!(resolved.log_level, LevelFilter::Error);
    }

    #[test]
    fn test_toml_round_trip() {
        let toml_str = r#"
[general]
log_level = "trace"

[api]
base_url = "http://localhost:3000"
session_cookie = "access_token=xyz"

[storage]
bucket = "estate-app.appspot.com"
auth_token = "tok"
"#;
        let config: HomesteadConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.log_level.as_deref(), Some("trace"));
        assert_eq!(config.api.session_cookie.as_deref(), Some("access_token=xyz"));
        assert_eq!(config.storage.bucket.as_deref(), Some("estate-app.appspot.com"));
        assert!(config.storage.base_url.is_none());
    }

    #[test]
    fn test_sparse_toml_parses() {
        let toml_str = r#"
[api]
base_url = "http://api"
"#;
        let config: HomesteadConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.api.base_url.as_deref(), Some("http://api"));
        assert!(config.general.log_level.is_none());
        assert!(config.storage.bucket.is_none());
    }

    #[test]
    fn test_missing_file_generates_default() {
        let dir = std::env::temp_dir().join(format!("homestead-config-{}", std::process::id()));
        let path = dir.join("config.toml");
        let _ = fs::remove_dir_all(&dir);

        let config = load_config_from(&path).unwrap();
        assert!(config.api.base_url.is_none());
        let generated = fs::read_to_string(&path).unwrap();
        assert!(generated.starts_with("# Homestead Configuration"));
        // the generated file is all comments, so it parses as empty
        let reparsed = load_config_from(&path).unwrap();
        assert!(reparsed.api.base_url.is_none());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let dir = std::env::temp_dir().join(format!("homestead-bad-config-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        fs::write(&path, "[api\nbase_url = 3").unwrap();

        assert!(matches!(load_config_from(&path), Err(ConfigError::Parse(_))));
        let _ = fs::remove_dir_all(&dir);
    }
}
