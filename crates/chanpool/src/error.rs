//! CLI error types with miette diagnostics.
//!
//! Maps `ConfigError` and `CoreError` into user-facing errors with help text.

use miette::Diagnostic;
use thiserror::Error;

use chanpool_config::ConfigError;
use chanpool_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONFIG: i32 = 5;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to WebQuery at {url}: {reason}")]
    #[diagnostic(
        code(chanpool::connection_failed),
        help(
            "Check that the TeamSpeak server is running with WebQuery enabled.\n\
             URL: {url}\n\
             Set server.host / server.query_port, or TS_HOST / TS_QUERYPORT."
        )
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("Request timed out")]
    #[diagnostic(
        code(chanpool::timeout),
        help("Increase server.timeout or check server responsiveness.")
    )]
    Timeout,

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(chanpool::auth_failed),
        help("Verify the WebQuery API key (server.api_key, server.api_key_env, or TS_API_KEY).")
    )]
    AuthFailed { message: String },

    #[error("No API key configured")]
    #[diagnostic(
        code(chanpool::no_credentials),
        help(
            "Set TS_API_KEY, or server.api_key_env / server.api_key in the config file.\n\
             Create a key with: apikeyadd scope=manage lifetime=0 (ServerQuery)"
        )
    )]
    NoCredentials,

    // ── Resources ────────────────────────────────────────────────────
    #[error("Group '{name}' is not configured")]
    #[diagnostic(
        code(chanpool::unknown_group),
        help("Configured groups: {available}")
    )]
    UnknownGroup { name: String, available: String },

    #[error("Channel {id} not found")]
    #[diagnostic(code(chanpool::not_found))]
    ChannelNotFound { id: String },

    // ── API ──────────────────────────────────────────────────────────
    #[error("API error: {message}")]
    #[diagnostic(code(chanpool::api_error))]
    ApiError { message: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(chanpool::validation))]
    Validation { field: String, reason: String },

    #[error("No channel groups are enabled")]
    #[diagnostic(
        code(chanpool::no_groups),
        help("Set groups.chat.parent and/or groups.training.parent (or CHAT_PARENT_ID / TRAINING_PARENT_ID).")
    )]
    NoGroups,

    #[error("Configuration file not found: {path}")]
    #[diagnostic(
        code(chanpool::no_config),
        help("Create one with: chanpool config init")
    )]
    NoConfig { path: String },

    #[error("Configuration file already exists: {path}")]
    #[diagnostic(
        code(chanpool::config_exists),
        help("Use --force to overwrite it.")
    )]
    ConfigExists { path: String },

    #[error("Configuration could not be loaded")]
    #[diagnostic(code(chanpool::config))]
    Config(#[source] ConfigError),

    // ── IO / Serialization ────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render JSON: {0}")]
    #[diagnostic(code(chanpool::json))]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout => exit_code::TIMEOUT,
            Self::AuthFailed { .. } | Self::NoCredentials => exit_code::AUTH,
            Self::UnknownGroup { .. } | Self::ChannelNotFound { .. } => exit_code::NOT_FOUND,
            Self::Validation { .. } => exit_code::USAGE,
            Self::NoGroups
            | Self::NoConfig { .. }
            | Self::ConfigExists { .. }
            | Self::Config(_) => exit_code::CONFIG,
            Self::ApiError { .. } | Self::Io(_) | Self::Json(_) => exit_code::GENERAL,
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            ConfigError::NoCredentials => Self::NoCredentials,
            ConfigError::NoGroups => Self::NoGroups,
            ConfigError::Missing { path } => Self::NoConfig {
                path: path.display().to_string(),
            },
            ConfigError::Io(e) => Self::Io(e),
            other => Self::Config(other),
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => Self::ConnectionFailed { url, reason },
            CoreError::AuthenticationFailed { message } => Self::AuthFailed { message },
            CoreError::Timeout => Self::Timeout,
            CoreError::ChannelNotFound { id } => Self::ChannelNotFound { id: id.to_string() },
            CoreError::Config { message } => Self::Validation {
                field: "config".into(),
                reason: message,
            },
            // A failed snapshot or mutation surfaces as its root cause.
            CoreError::SnapshotFetch { source, .. } | CoreError::Mutation { source, .. } => {
                Self::from(*source)
            }
            CoreError::Api { message, .. } | CoreError::Internal(message) => {
                Self::ApiError { message }
            }
        }
    }
}
