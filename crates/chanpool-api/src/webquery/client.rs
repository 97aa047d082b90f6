// WebQuery HTTP client
//
// Wraps `reqwest::Client` with WebQuery URL construction and envelope
// unwrapping. Endpoints are inherent methods in `channels` and `server`
// so this module stays focused on transport mechanics.

use secrecy::SecretString;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;
use crate::webquery::models::{QueryResponse, Status};

/// Raw HTTP client for a TeamSpeak 3 WebQuery endpoint.
///
/// Instance-level commands live at `{base}/{command}`; everything that
/// touches channels is scoped to a virtual server at
/// `{base}/{server_id}/{command}`. All methods return the unwrapped `body`
/// rows.
#[derive(Debug, Clone)]
pub struct WebQueryClient {
    http: reqwest::Client,
    base_url: Url,
    server_id: Option<u64>,
}

impl WebQueryClient {
    /// Create a client that authenticates with `api_key`.
    ///
    /// `base_url` is the WebQuery root, e.g. `http://ts.example.com:10080`.
    pub fn new(
        base_url: Url,
        api_key: &SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client(api_key)?;
        Ok(Self {
            http,
            base_url,
            server_id: None,
        })
    }

    /// Create a client around a pre-built `reqwest::Client`.
    ///
    /// The caller is responsible for the `x-api-key` header.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self {
            http,
            base_url,
            server_id: None,
        }
    }

    /// Scope subsequent channel commands to virtual server `server_id`.
    pub fn with_server(mut self, server_id: u64) -> Self {
        self.server_id = Some(server_id);
        self
    }

    /// The selected virtual server, if any.
    pub fn server_id(&self) -> Option<u64> {
        self.server_id
    }

    /// The WebQuery base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// `{base}/{command}` for instance-level commands.
    pub(crate) fn instance_url(&self, command: &str) -> Result<Url, Error> {
        let full = format!("{}/{command}", self.base_url.as_str().trim_end_matches('/'));
        Ok(Url::parse(&full)?)
    }

    /// `{base}/{sid}/{command}` for commands scoped to the selected server.
    pub(crate) fn server_url(&self, command: &str) -> Result<Url, Error> {
        let sid = self.server_id.ok_or(Error::NoServerSelected)?;
        let full = format!(
            "{}/{sid}/{command}",
            self.base_url.as_str().trim_end_matches('/')
        );
        Ok(Url::parse(&full)?)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send a GET request and unwrap the envelope.
    pub(crate) async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<Vec<T>, Error> {
        debug!("GET {}", url.path());

        let resp = self.http.get(url).send().await.map_err(Error::Transport)?;

        Self::parse_envelope(resp).await
    }

    /// Send a POST request with the parameters as a JSON object body and
    /// unwrap the envelope.
    pub(crate) async fn post<T: DeserializeOwned>(
        &self,
        url: Url,
        params: &[(&str, String)],
    ) -> Result<Vec<T>, Error> {
        debug!("POST {}", url.path());

        let body: serde_json::Map<String, serde_json::Value> = params
            .iter()
            .map(|(k, v)| ((*k).to_owned(), serde_json::Value::String(v.clone())))
            .collect();

        let resp = self
            .http
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(Error::Transport)?;

        Self::parse_envelope(resp).await
    }

    /// Parse the `{ body, status }` envelope, returning `body` on success.
    ///
    /// WebQuery answers errors with a 4xx status *and* a JSON envelope, so
    /// the envelope is consulted first; the HTTP status only matters when
    /// the body is not an envelope at all.
    async fn parse_envelope<T: DeserializeOwned>(
        resp: reqwest::Response,
    ) -> Result<Vec<T>, Error> {
        let http_status = resp.status();
        let body = resp.text().await.map_err(Error::Transport)?;

        let envelope: QueryResponse<T> = match serde_json::from_str(&body) {
            Ok(envelope) => envelope,
            Err(_)
                if http_status == reqwest::StatusCode::UNAUTHORIZED
                    || http_status == reqwest::StatusCode::FORBIDDEN =>
            {
                return Err(Error::Authentication {
                    message: format!("server answered HTTP {http_status}"),
                });
            }
            Err(e) => {
                return Err(Error::Deserialization {
                    message: e.to_string(),
                    body,
                });
            }
        };

        match envelope.status.code {
            Status::OK => Ok(envelope.body),
            Status::EMPTY_RESULT => Ok(Vec::new()),
            code => Err(Error::from_status(code, envelope.status.message)),
        }
    }
}
