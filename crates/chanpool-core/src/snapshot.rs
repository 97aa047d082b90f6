// ── Per-tick view of one parent group ──

use tracing::debug;

use crate::api::ChannelApi;
use crate::error::CoreError;
use crate::model::{Channel, ChannelId, GroupConfig};

/// The children of one parent group, captured from a single channel list
/// call, in the order the server returned them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelSnapshot {
    parent: ChannelId,
    channels: Vec<Channel>,
}

impl ChannelSnapshot {
    /// Filter a full server channel list down to the children of `parent`.
    pub fn from_channels(parent: ChannelId, all: impl IntoIterator<Item = Channel>) -> Self {
        let channels = all.into_iter().filter(|c| c.parent == parent).collect();
        Self { parent, channels }
    }

    /// Fetch the channel list exactly once and build the snapshot.
    ///
    /// A failed fetch aborts the tick for this group only.
    pub async fn fetch(api: &dyn ChannelApi, group: &GroupConfig) -> Result<Self, CoreError> {
        let all = api
            .list_channels()
            .await
            .map_err(|e| CoreError::SnapshotFetch {
                group: group.label.clone(),
                source: Box::new(e),
            })?;

        let snapshot = Self::from_channels(group.parent, all);
        debug!(
            group = %group.label,
            channels = snapshot.len(),
            empty = ?snapshot.empty_channels().iter().map(|c| c.name.as_str()).collect::<Vec<_>>(),
            "snapshot taken"
        );
        Ok(snapshot)
    }

    pub fn parent(&self) -> ChannelId {
        self.parent
    }

    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Unoccupied channels, in server order.
    pub fn empty_channels(&self) -> Vec<&Channel> {
        self.channels.iter().filter(|c| c.is_empty()).collect()
    }

    pub fn empty_count(&self) -> usize {
        self.channels.iter().filter(|c| c.is_empty()).count()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.channels.iter().map(|c| c.name.as_str())
    }
}
