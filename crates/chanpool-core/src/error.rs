// ── Core error types ──
//
// Domain errors for the reconciliation layer. Consumers never see HTTP
// status codes or JSON failures directly; the `From<chanpool_api::Error>`
// impl translates them.

use thiserror::Error;

use crate::model::ChannelId;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to server at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Server request timed out")]
    Timeout,

    // ── Tick errors ──────────────────────────────────────────────────
    /// The channel list could not be read; the tick for `group` is skipped.
    #[error("Snapshot of group '{group}' failed: {source}")]
    SnapshotFetch {
        group: String,
        #[source]
        source: Box<CoreError>,
    },

    /// A single create/delete/rename/permission call failed.
    #[error("{operation} on channel {target} failed: {source}")]
    Mutation {
        operation: &'static str,
        target: String,
        #[source]
        source: Box<CoreError>,
    },

    #[error("Channel not found: {id}")]
    ChannelNotFound { id: ChannelId },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        /// WebQuery status code, if the server produced one.
        code: Option<u32>,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Wrap `self` as the failure of `operation` against `target`.
    pub(crate) fn during(self, operation: &'static str, target: impl ToString) -> Self {
        Self::Mutation {
            operation,
            target: target.to_string(),
            source: Box::new(self),
        }
    }

    /// Returns `true` for failures that stem from the connection itself
    /// rather than from a rejected request.
    pub fn is_connection(&self) -> bool {
        match self {
            Self::ConnectionFailed { .. } | Self::Timeout => true,
            Self::SnapshotFetch { source, .. } | Self::Mutation { source, .. } => {
                source.is_connection()
            }
            _ => false,
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<chanpool_api::Error> for CoreError {
    fn from(err: chanpool_api::Error) -> Self {
        match err {
            chanpool_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            chanpool_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map(|u| u.origin().ascii_serialization())
                            .unwrap_or_else(|| "<unknown>".into()),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        code: None,
                    }
                }
            }
            chanpool_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            chanpool_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            chanpool_api::Error::Query { code, message } => CoreError::Api {
                message,
                code: Some(code),
            },
            chanpool_api::Error::NoServerSelected => {
                CoreError::Internal("no virtual server selected".into())
            }
            chanpool_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}
