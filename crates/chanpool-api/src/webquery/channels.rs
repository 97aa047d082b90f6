// Channel endpoints
//
// All scoped to the selected virtual server.

use tracing::debug;

use crate::error::Error;
use crate::webquery::client::WebQueryClient;
use crate::webquery::models::{ChannelCreate, CreatedChannel, QueryChannel};

impl WebQueryClient {
    /// List every channel on the server, in server order.
    ///
    /// `GET /{sid}/channellist?-flags`
    pub async fn list_channels(&self) -> Result<Vec<QueryChannel>, Error> {
        let mut url = self.server_url("channellist")?;
        url.set_query(Some("-flags"));
        self.get(url).await
    }

    /// Create a channel and return its id.
    ///
    /// `POST /{sid}/channelcreate`
    pub async fn create_channel(&self, req: &ChannelCreate) -> Result<u64, Error> {
        let url = self.server_url("channelcreate")?;
        debug!(name = %req.name, parent = req.parent, "creating channel");

        let rows: Vec<CreatedChannel> = self.post(url, &req.params()).await?;
        rows.into_iter()
            .next()
            .map(|row| row.cid)
            .ok_or_else(|| Error::Deserialization {
                message: "channelcreate returned no channel id".into(),
                body: String::new(),
            })
    }

    /// Delete a channel. `force` also kicks clients still inside it.
    ///
    /// `POST /{sid}/channeldelete`
    pub async fn delete_channel(&self, cid: u64, force: bool) -> Result<(), Error> {
        let url = self.server_url("channeldelete")?;
        debug!(cid, force, "deleting channel");

        let params = [
            ("cid", cid.to_string()),
            ("force", if force { "1" } else { "0" }.to_owned()),
        ];
        let _: Vec<serde_json::Value> = self.post(url, &params).await?;
        Ok(())
    }

    /// Rename a channel.
    ///
    /// `POST /{sid}/channeledit`
    pub async fn rename_channel(&self, cid: u64, name: &str) -> Result<(), Error> {
        let url = self.server_url("channeledit")?;
        debug!(cid, name, "renaming channel");

        let params = [("cid", cid.to_string()), ("channel_name", name.to_owned())];
        let _: Vec<serde_json::Value> = self.post(url, &params).await?;
        Ok(())
    }

    /// Add or overwrite a channel permission by its string id.
    ///
    /// `POST /{sid}/channeladdperm`
    pub async fn add_channel_permission(
        &self,
        cid: u64,
        permsid: &str,
        value: i32,
    ) -> Result<(), Error> {
        let url = self.server_url("channeladdperm")?;
        debug!(cid, permsid, value, "setting channel permission");

        let params = [
            ("cid", cid.to_string()),
            ("permsid", permsid.to_owned()),
            ("permvalue", value.to_string()),
        ];
        let _: Vec<serde_json::Value> = self.post(url, &params).await?;
        Ok(())
    }
}
