use thiserror::Error;

/// WebQuery status codes that mean the API key was rejected or lacks scope.
const AUTH_STATUS_CODES: [u32; 3] = [5122, 5123, 5124];

/// Top-level error type for the `chanpool-api` crate.
///
/// Covers transport failures, the WebQuery `{status}` envelope, and
/// decoding problems. `chanpool-core` maps these into domain errors.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// The server rejected the API key (missing, invalid, or wrong scope).
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS handshake or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Query ───────────────────────────────────────────────────────
    /// Non-zero status from the WebQuery envelope.
    #[error("Query error {code}: {message}")]
    Query { code: u32, message: String },

    /// A virtual-server scoped command was issued before a server was selected.
    #[error("No virtual server selected")]
    NoServerSelected,

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Build the error for a non-zero WebQuery status, routing API key
    /// rejections to [`Error::Authentication`].
    pub fn from_status(code: u32, message: String) -> Self {
        if AUTH_STATUS_CODES.contains(&code) {
            Self::Authentication { message }
        } else {
            Self::Query { code, message }
        }
    }

    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }

    /// Returns `true` if the server reported that the referenced channel
    /// does not exist (`768 invalid channelID`).
    pub fn is_invalid_channel(&self) -> bool {
        matches!(self, Self::Query { code: 768, .. })
    }

    /// The WebQuery status code, if the server produced one.
    pub fn query_code(&self) -> Option<u32> {
        match self {
            Self::Query { code, .. } => Some(*code),
            _ => None,
        }
    }
}
