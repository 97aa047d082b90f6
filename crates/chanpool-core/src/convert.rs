// ── API-to-domain type conversions ──

use chanpool_api::webquery::QueryChannel;

use crate::model::{Channel, ChannelId};

impl From<QueryChannel> for Channel {
    fn from(raw: QueryChannel) -> Self {
        Self {
            id: ChannelId::new(raw.cid),
            parent: ChannelId::new(raw.pid),
            name: raw.channel_name,
            clients: raw.total_clients,
            permanent: raw.channel_flag_permanent,
            semi_permanent: raw.channel_flag_semi_permanent,
        }
    }
}
