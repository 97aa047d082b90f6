// ── Remote channel API seam ──
//
// The reconciler only ever talks to the server through `ChannelApi`.
// `WebQueryChannelApi` is the production implementation; tests inject
// an in-memory fake.

use async_trait::async_trait;
use tracing::{debug, info};

use chanpool_api::transport::{TlsMode, TransportConfig};
use chanpool_api::webquery::ChannelCreate;
use chanpool_api::WebQueryClient;

use crate::config::{ControllerConfig, TlsVerification};
use crate::error::CoreError;
use crate::model::{Channel, ChannelId};

/// Options for [`ChannelApi::create_channel`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CreateOptions {
    /// Keep the channel across server restarts until explicitly deleted.
    pub semi_permanent: bool,
}

/// The remote operations the controller needs. Every call is fallible
/// and suspends on I/O.
#[async_trait]
pub trait ChannelApi: Send + Sync {
    /// Every channel on the server, in server order.
    async fn list_channels(&self) -> Result<Vec<Channel>, CoreError>;

    async fn create_channel(
        &self,
        parent: ChannelId,
        name: &str,
        options: CreateOptions,
    ) -> Result<ChannelId, CoreError>;

    async fn delete_channel(&self, id: ChannelId) -> Result<(), CoreError>;

    async fn rename_channel(&self, id: ChannelId, name: &str) -> Result<(), CoreError>;

    async fn set_permission(&self, id: ChannelId, permission: &str, value: i32)
    -> Result<(), CoreError>;
}

// ── WebQuery implementation ──────────────────────────────────────

/// [`ChannelApi`] backed by a TeamSpeak WebQuery endpoint.
#[derive(Debug, Clone)]
pub struct WebQueryChannelApi {
    client: WebQueryClient,
}

impl WebQueryChannelApi {
    /// Wrap a client that already has a virtual server selected.
    pub fn new(client: WebQueryClient) -> Self {
        Self { client }
    }

    /// Build the HTTP client, verify the API key, and select the virtual
    /// server (by id, or by voice port lookup).
    pub async fn connect(config: &ControllerConfig) -> Result<Self, CoreError> {
        let transport = build_transport(config);
        let client = WebQueryClient::new(config.url.clone(), &config.api_key, &transport)?;

        let version = client.version().await?;
        debug!(version = %version.version, platform = %version.platform, "server reachable");

        let server_id = match config.server_id {
            Some(id) => id,
            None => client.server_id_by_port(config.server_port).await?,
        };
        info!(server_id, url = %config.url, "connected to server");

        Ok(Self::new(client.with_server(server_id)))
    }

    pub fn client(&self) -> &WebQueryClient {
        &self.client
    }
}

#[async_trait]
impl ChannelApi for WebQueryChannelApi {
    async fn list_channels(&self) -> Result<Vec<Channel>, CoreError> {
        let rows = self.client.list_channels().await?;
        Ok(rows.into_iter().map(Channel::from).collect())
    }

    async fn create_channel(
        &self,
        parent: ChannelId,
        name: &str,
        options: CreateOptions,
    ) -> Result<ChannelId, CoreError> {
        let req = ChannelCreate {
            name: name.to_owned(),
            parent: parent.get(),
            semi_permanent: options.semi_permanent,
        };
        let cid = self.client.create_channel(&req).await?;
        Ok(ChannelId::new(cid))
    }

    /// Never forced: a client who joined after the snapshot makes the
    /// server refuse the delete instead of being kicked.
    async fn delete_channel(&self, id: ChannelId) -> Result<(), CoreError> {
        self.client
            .delete_channel(id.get(), false)
            .await
            .map_err(|e| {
                if e.is_invalid_channel() {
                    CoreError::ChannelNotFound { id }
                } else {
                    e.into()
                }
            })
    }

    async fn rename_channel(&self, id: ChannelId, name: &str) -> Result<(), CoreError> {
        Ok(self.client.rename_channel(id.get(), name).await?)
    }

    async fn set_permission(
        &self,
        id: ChannelId,
        permission: &str,
        value: i32,
    ) -> Result<(), CoreError> {
        Ok(self
            .client
            .add_channel_permission(id.get(), permission, value)
            .await?)
    }
}

// ── Helpers ──────────────────────────────────────────────────────

/// Build a [`TransportConfig`] from the controller configuration.
fn build_transport(config: &ControllerConfig) -> TransportConfig {
    TransportConfig {
        tls: tls_to_transport(&config.tls),
        timeout: config.timeout,
    }
}

fn tls_to_transport(tls: &TlsVerification) -> TlsMode {
    match tls {
        TlsVerification::SystemDefaults => TlsMode::System,
        TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
        TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use serde_json::json;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn ok(body: serde_json::Value) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({
            "body": body,
            "status": { "code": 0, "message": "ok" }
        }))
    }

    fn config(server: &MockServer, server_id: Option<u64>) -> ControllerConfig {
        ControllerConfig {
            url: server.uri().parse().unwrap(),
            api_key: "key".to_string().into(),
            server_port: 9987,
            server_id,
            tls: TlsVerification::SystemDefaults,
            timeout: Duration::from_secs(5),
        }
    }

    async fn mount_version(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/version"))
            .respond_with(ok(json!([{ "version": "3.13.7", "platform": "Linux" }])))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn connect_resolves_server_by_port() {
        let server = MockServer::start().await;
        mount_version(&server).await;
        Mock::given(method("GET"))
            .and(path("/serveridgetbyport"))
            .and(query_param("virtualserver_port", "9987"))
            .respond_with(ok(json!([{ "server_id": "2" }])))
            .expect(1)
            .mount(&server)
            .await;

        let api = WebQueryChannelApi::connect(&config(&server, None)).await.unwrap();
        assert_eq!(api.client().server_id(), Some(2));
    }

    #[tokio::test]
    async fn connect_uses_explicit_server_id() {
        let server = MockServer::start().await;
        mount_version(&server).await;
        Mock::given(method("GET"))
            .and(path("/serveridgetbyport"))
            .respond_with(ok(json!([{ "server_id": "2" }])))
            .expect(0)
            .mount(&server)
            .await;

        let api = WebQueryChannelApi::connect(&config(&server, Some(7))).await.unwrap();
        assert_eq!(api.client().server_id(), Some(7));
    }

    #[tokio::test]
    async fn connect_reports_rejected_key() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({
                "status": { "code": 5122, "message": "invalid apikey" }
            })))
            .mount(&server)
            .await;

        let err = WebQueryChannelApi::connect(&config(&server, None))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::AuthenticationFailed { .. }));
    }

    fn api_for(server: &MockServer) -> WebQueryChannelApi {
        let key: secrecy::SecretString = "key".to_string().into();
        let client = WebQueryClient::new(
            server.uri().parse().unwrap(),
            &key,
            &TransportConfig::default(),
        )
        .unwrap()
        .with_server(1);
        WebQueryChannelApi::new(client)
    }

    #[tokio::test]
    async fn delete_is_never_forced() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/1/channeldelete"))
            .and(body_json(json!({ "cid": "12", "force": "0" })))
            .respond_with(ok(json!([])))
            .expect(1)
            .mount(&server)
            .await;

        api_for(&server).delete_channel(ChannelId::new(12)).await.unwrap();
    }

    #[tokio::test]
    async fn delete_of_occupied_channel_is_a_mutation_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/1/channeldelete"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "status": { "code": 772, "message": "channel not empty" }
            })))
            .mount(&server)
            .await;

        let err = api_for(&server)
            .delete_channel(ChannelId::new(12))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Api { code: Some(772), .. }));
    }

    #[tokio::test]
    async fn delete_of_vanished_channel_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/1/channeldelete"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "status": { "code": 768, "message": "invalid channelID" }
            })))
            .mount(&server)
            .await;

        let err = api_for(&server)
            .delete_channel(ChannelId::new(12))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::ChannelNotFound { id } if id == ChannelId::new(12)));
    }
}
