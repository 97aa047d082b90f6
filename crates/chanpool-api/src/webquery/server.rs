// Instance-level endpoints
//
// These are not scoped to a virtual server: `{base}/{command}`.

use tracing::debug;

use crate::error::Error;
use crate::webquery::client::WebQueryClient;
use crate::webquery::models::{ServerIdEntry, VersionInfo};

impl WebQueryClient {
    /// Server version. Doubles as a cheap reachability and API key check.
    ///
    /// `GET /version`
    pub async fn version(&self) -> Result<VersionInfo, Error> {
        let url = self.instance_url("version")?;
        let rows: Vec<VersionInfo> = self.get(url).await?;
        rows.into_iter().next().ok_or_else(|| Error::Deserialization {
            message: "empty version response".into(),
            body: String::new(),
        })
    }

    /// Resolve the virtual server listening on voice port `port`.
    ///
    /// `GET /serveridgetbyport?virtualserver_port={port}`
    pub async fn server_id_by_port(&self, port: u16) -> Result<u64, Error> {
        let mut url = self.instance_url("serveridgetbyport")?;
        url.query_pairs_mut()
            .append_pair("virtualserver_port", &port.to_string());
        debug!(port, "resolving virtual server by port");

        let rows: Vec<ServerIdEntry> = self.get(url).await?;
        rows.into_iter()
            .next()
            .map(|row| row.server_id)
            .ok_or(Error::Query {
                code: 1033,
                message: format!("no virtual server on port {port}"),
            })
    }
}
