// ── Runtime connection configuration ──
//
// Describes how to reach the WebQuery endpoint. Carries the API key and
// connection tuning but never touches disk; the config crate builds it.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use url::Url;

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(PathBuf),
    /// Skip verification (self-signed certs).
    DangerAcceptInvalid,
}

/// Configuration for connecting to one TeamSpeak server.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// WebQuery base URL (e.g., `http://ts.example.com:10080`).
    pub url: Url,
    /// WebQuery API key.
    pub api_key: SecretString,
    /// Voice port used to look up the virtual server.
    pub server_port: u16,
    /// Explicit virtual server id; skips the port lookup when set.
    pub server_id: Option<u64>,
    /// TLS verification strategy (HTTPS endpoints only).
    pub tls: TlsVerification,
    /// Per-request timeout.
    pub timeout: Duration,
}
