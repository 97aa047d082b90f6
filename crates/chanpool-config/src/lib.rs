//! Configuration for the chanpool controller.
//!
//! Layered loading (built-in defaults, TOML file, environment), API key
//! resolution, and translation to `chanpool_core::ControllerConfig` plus
//! the list of managed groups.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use chanpool_core::{ControllerConfig, GroupConfig, NameTemplate, TlsVerification};

/// Prefix for chanpool's own environment variables (`CHANPOOL_SERVER__HOST`).
pub const ENV_PREFIX: &str = "CHANPOOL_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no API key configured (set server.api_key, server.api_key_env, or TS_API_KEY)")]
    NoCredentials,

    #[error("no channel groups configured (set groups.chat.parent or groups.training.parent)")]
    NoGroups,

    #[error("config file not found: {}", path.display())]
    Missing { path: PathBuf },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Milliseconds between ticks of each group.
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub groups: Groups,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            server: ServerSection::default(),
            groups: Groups::default(),
        }
    }
}

/// How to reach the WebQuery endpoint.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerSection {
    #[serde(default = "default_host")]
    pub host: String,

    /// WebQuery HTTP(S) port.
    #[serde(default = "default_query_port")]
    pub query_port: u16,

    /// Voice port of the virtual server to manage.
    #[serde(default = "default_server_port")]
    pub server_port: u16,

    /// Virtual server id; skips the lookup by `server_port`.
    pub server_id: Option<u64>,

    #[serde(default)]
    pub https: bool,

    /// Accept self-signed certificates.
    #[serde(default)]
    pub insecure: bool,

    /// Path to a custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// API key in plaintext. Prefer `api_key_env`.
    pub api_key: Option<String>,

    /// Environment variable name containing the API key.
    pub api_key_env: Option<String>,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: default_host(),
            query_port: default_query_port(),
            server_port: default_server_port(),
            server_id: None,
            https: false,
            insecure: false,
            ca_cert: None,
            timeout: default_timeout(),
            api_key: None,
            api_key_env: None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Groups {
    #[serde(default)]
    pub chat: ChatGroup,

    #[serde(default)]
    pub training: TrainingGroup,
}

/// Rotating-name group. Disabled while `parent` is unset.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChatGroup {
    pub parent: Option<u64>,

    #[serde(default = "default_chat_names")]
    pub names: Vec<String>,
}

impl Default for ChatGroup {
    fn default() -> Self {
        Self {
            parent: None,
            names: default_chat_names(),
        }
    }
}

/// Sequentially numbered group. Disabled while `parent` is unset.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TrainingGroup {
    pub parent: Option<u64>,

    /// Name template; `{n}` is replaced by the channel's position.
    #[serde(default = "default_template")]
    pub template: String,

    pub max_channels: Option<usize>,
}

impl Default for TrainingGroup {
    fn default() -> Self {
        Self {
            parent: None,
            template: default_template(),
            max_channels: None,
        }
    }
}

fn default_interval_ms() -> u64 {
    2000
}
fn default_host() -> String {
    "localhost".into()
}
fn default_query_port() -> u16 {
    10080
}
fn default_server_port() -> u16 {
    9987
}
fn default_timeout() -> u64 {
    10
}
fn default_template() -> String {
    "Training {n}".into()
}
fn default_chat_names() -> Vec<String> {
    [
        "Alpha", "Bravo", "Charlie", "Delta", "Echo", "Foxtrot", "Golf", "Hotel", "India",
        "Juliett", "Kilo", "Lima", "Mike", "November", "Oscar", "Papa", "Quebec", "Romeo",
        "Sierra", "Tango", "Uniform", "Victor", "Whiskey", "X-ray", "Yankee", "Zulu",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("org", "chanpool", "chanpool").map_or_else(
        || {
            let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
            p.push(".config");
            p.push("chanpool");
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

// ── Config loading ──────────────────────────────────────────────────

/// Map the environment names used by existing deployments onto config keys.
fn legacy_env_key(key: &str) -> Option<&'static str> {
    match key.to_ascii_lowercase().as_str() {
        "ts_host" => Some("server.host"),
        "ts_queryport" => Some("server.query_port"),
        "ts_serverport" => Some("server.server_port"),
        "ts_api_key" => Some("server.api_key"),
        "chat_parent_id" => Some("groups.chat.parent"),
        "training_parent_id" => Some("groups.training.parent"),
        _ => None,
    }
}

/// Build the provider stack: defaults, TOML, legacy env names, `CHANPOOL_*`.
pub fn figment(path: &Path) -> Figment {
    Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::raw().filter_map(|key| legacy_env_key(key.as_str()).map(Into::into)))
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
}

/// Load the config from `path` (or the platform default) plus environment.
///
/// A missing default file is fine; a missing explicit `path` is an error.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let path = match path {
        Some(p) if !p.exists() => {
            return Err(ConfigError::Missing {
                path: p.to_path_buf(),
            });
        }
        Some(p) => p.to_path_buf(),
        None => config_path(),
    };

    let config: Config = figment(&path).extract()?;
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write it to `path`.
pub fn save_config(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Translation to runtime types ────────────────────────────────────

/// Everything the controller needs to run.
#[derive(Debug, Clone)]
pub struct Settings {
    pub controller: ControllerConfig,
    pub interval: Duration,
    pub groups: Vec<GroupConfig>,
}

/// Resolve the API key: `api_key_env` first, then the plaintext value.
pub fn resolve_api_key(server: &ServerSection) -> Result<SecretString, ConfigError> {
    if let Some(ref env_name) = server.api_key_env {
        if let Ok(val) = std::env::var(env_name) {
            return Ok(SecretString::from(val));
        }
    }

    if let Some(ref key) = server.api_key {
        return Ok(SecretString::from(key.clone()));
    }

    Err(ConfigError::NoCredentials)
}

/// The enabled groups, in a fixed order (chat, then training).
pub fn resolve_groups(groups: &Groups) -> Result<Vec<GroupConfig>, ConfigError> {
    let mut out = Vec::new();

    if let Some(parent) = groups.chat.parent {
        out.push(GroupConfig::rotating("chat", parent, groups.chat.names.clone()));
    }

    if let Some(parent) = groups.training.parent {
        let template =
            NameTemplate::new(groups.training.template.clone()).ok_or_else(|| {
                ConfigError::Validation {
                    field: "groups.training.template".into(),
                    reason: format!(
                        "'{}' has no {{n}} placeholder",
                        groups.training.template
                    ),
                }
            })?;
        out.push(GroupConfig::sequential(
            "training",
            parent,
            template,
            groups.training.max_channels,
        ));
    }

    let mut parents = HashSet::new();
    if let Some(dup) = out.iter().find(|g| !parents.insert(g.parent)) {
        return Err(ConfigError::Validation {
            field: format!("groups.{}.parent", dup.label),
            reason: format!("channel {} is managed by more than one group", dup.parent),
        });
    }

    if out.is_empty() {
        return Err(ConfigError::NoGroups);
    }
    Ok(out)
}

/// Build the runtime [`Settings`] from a loaded config.
pub fn resolve(cfg: &Config) -> Result<Settings, ConfigError> {
    let server = &cfg.server;

    if server.host.trim().is_empty() {
        return Err(ConfigError::Validation {
            field: "server.host".into(),
            reason: "must not be empty".into(),
        });
    }
    if cfg.interval_ms == 0 {
        return Err(ConfigError::Validation {
            field: "interval_ms".into(),
            reason: "must be greater than zero".into(),
        });
    }

    let scheme = if server.https { "https" } else { "http" };
    let raw_url = format!("{scheme}://{}:{}", server.host.trim(), server.query_port);
    let url: url::Url = raw_url.parse().map_err(|_| ConfigError::Validation {
        field: "server.host".into(),
        reason: format!("invalid URL: {raw_url}"),
    })?;

    let tls = if server.insecure {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = server.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    };

    let api_key = resolve_api_key(server)?;
    let groups = resolve_groups(&cfg.groups)?;

    Ok(Settings {
        controller: ControllerConfig {
            url,
            api_key,
            server_port: server.server_port,
            server_id: server.server_id,
            tls,
            timeout: Duration::from_secs(server.timeout),
        },
        interval: Duration::from_millis(cfg.interval_ms),
        groups,
    })
}
