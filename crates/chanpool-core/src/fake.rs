// In-memory `ChannelApi` for unit tests.
//
// Behaves like a tiny server: creates append to the channel list, deletes
// remove, renames edit in place. Like TeamSpeak, it refuses a create or
// rename that would give two siblings the same name. Every call is
// recorded so tests can assert on exact remote traffic.

#![allow(clippy::unwrap_used)]

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::api::{ChannelApi, CreateOptions};
use crate::error::CoreError;
use crate::model::{Channel, ChannelId};

pub(crate) fn channel(id: u64, parent: u64, name: &str, clients: u32) -> Channel {
    Channel {
        id: ChannelId::new(id),
        parent: ChannelId::new(parent),
        name: name.to_owned(),
        clients,
        permanent: false,
        semi_permanent: true,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    List,
    Create {
        parent: ChannelId,
        name: String,
        semi_permanent: bool,
    },
    Delete(ChannelId),
    Rename(ChannelId, String),
    SetPermission(ChannelId, String, i32),
}

#[derive(Default)]
struct State {
    channels: Vec<Channel>,
    next_id: u64,
    calls: Vec<Call>,
    fail_list: bool,
    fail_create: bool,
    fail_permission: bool,
    fail_delete: HashSet<ChannelId>,
    fail_rename: HashSet<ChannelId>,
}

pub(crate) struct FakeChannelApi {
    state: Mutex<State>,
}

fn rejected() -> CoreError {
    CoreError::Api {
        message: "rejected by fake".into(),
        code: Some(2568),
    }
}

/// TeamSpeak's "channel name is already in use".
pub(crate) const NAME_IN_USE: u32 = 771;

fn name_in_use() -> CoreError {
    CoreError::Api {
        message: "channel name is already in use".into(),
        code: Some(NAME_IN_USE),
    }
}

impl State {
    fn sibling_has_name(&self, parent: ChannelId, name: &str, except: Option<ChannelId>) -> bool {
        self.channels
            .iter()
            .any(|c| c.parent == parent && c.name == name && Some(c.id) != except)
    }
}

impl FakeChannelApi {
    pub(crate) fn new(channels: Vec<Channel>) -> Self {
        let next_id = channels.iter().map(|c| c.id.get()).max().unwrap_or(0) + 1;
        Self {
            state: Mutex::new(State {
                channels,
                next_id,
                ..State::default()
            }),
        }
    }

    pub(crate) fn channels(&self) -> Vec<Channel> {
        self.state.lock().unwrap().channels.clone()
    }

    pub(crate) fn children(&self, parent: u64) -> Vec<Channel> {
        self.channels()
            .into_iter()
            .filter(|c| c.parent.get() == parent)
            .collect()
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Recorded calls minus the list fetches.
    pub(crate) fn mutations(&self) -> Vec<Call> {
        self.calls().into_iter().filter(|c| *c != Call::List).collect()
    }

    pub(crate) fn list_calls(&self) -> usize {
        self.calls().iter().filter(|c| **c == Call::List).count()
    }

    pub(crate) fn clear_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }

    pub(crate) fn set_clients(&self, id: u64, clients: u32) {
        let mut state = self.state.lock().unwrap();
        if let Some(ch) = state.channels.iter_mut().find(|c| c.id.get() == id) {
            ch.clients = clients;
        }
    }

    pub(crate) fn fail_list(&self, fail: bool) {
        self.state.lock().unwrap().fail_list = fail;
    }

    pub(crate) fn fail_create(&self, fail: bool) {
        self.state.lock().unwrap().fail_create = fail;
    }

    pub(crate) fn fail_permission(&self, fail: bool) {
        self.state.lock().unwrap().fail_permission = fail;
    }

    pub(crate) fn fail_delete_of(&self, id: u64) {
        self.state.lock().unwrap().fail_delete.insert(ChannelId::new(id));
    }

    pub(crate) fn fail_rename_of(&self, id: u64) {
        self.state.lock().unwrap().fail_rename.insert(ChannelId::new(id));
    }
}

#[async_trait]
impl ChannelApi for FakeChannelApi {
    async fn list_channels(&self) -> Result<Vec<Channel>, CoreError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::List);
        if state.fail_list {
            return Err(CoreError::Timeout);
        }
        Ok(state.channels.clone())
    }

    async fn create_channel(
        &self,
        parent: ChannelId,
        name: &str,
        options: CreateOptions,
    ) -> Result<ChannelId, CoreError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Create {
            parent,
            name: name.to_owned(),
            semi_permanent: options.semi_permanent,
        });
        if state.fail_create {
            return Err(rejected());
        }
        if state.sibling_has_name(parent, name, None) {
            return Err(name_in_use());
        }

        let id = ChannelId::new(state.next_id);
        state.next_id += 1;
        state.channels.push(Channel {
            id,
            parent,
            name: name.to_owned(),
            clients: 0,
            permanent: false,
            semi_permanent: options.semi_permanent,
        });
        Ok(id)
    }

    async fn delete_channel(&self, id: ChannelId) -> Result<(), CoreError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Delete(id));
        if state.fail_delete.contains(&id) {
            return Err(rejected());
        }

        let before = state.channels.len();
        state.channels.retain(|c| c.id != id);
        if state.channels.len() == before {
            return Err(CoreError::ChannelNotFound { id });
        }
        Ok(())
    }

    async fn rename_channel(&self, id: ChannelId, name: &str) -> Result<(), CoreError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Rename(id, name.to_owned()));
        if state.fail_rename.contains(&id) {
            return Err(rejected());
        }

        let parent = state
            .channels
            .iter()
            .find(|c| c.id == id)
            .map(|c| c.parent)
            .ok_or(CoreError::ChannelNotFound { id })?;
        if state.sibling_has_name(parent, name, Some(id)) {
            return Err(name_in_use());
        }
        if let Some(ch) = state.channels.iter_mut().find(|c| c.id == id) {
            name.clone_into(&mut ch.name);
        }
        Ok(())
    }

    async fn set_permission(
        &self,
        id: ChannelId,
        permission: &str,
        value: i32,
    ) -> Result<(), CoreError> {
        let mut state = self.state.lock().unwrap();
        state
            .calls
            .push(Call::SetPermission(id, permission.to_owned(), value));
        if state.fail_permission {
            return Err(rejected());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sibling_names_are_unique() {
        let api = FakeChannelApi::new(vec![
            channel(1, 5, "Training 1", 0),
            channel(2, 5, "Training 2", 0),
            channel(3, 6, "Training 3", 0),
        ]);

        let err = api.rename_channel(ChannelId::new(2), "Training 1").await.unwrap_err();
        assert!(matches!(err, CoreError::Api { code: Some(NAME_IN_USE), .. }));

        let err = api
            .create_channel(ChannelId::new(5), "Training 2", CreateOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Api { code: Some(NAME_IN_USE), .. }));

        // Renaming to its own name, or to a name used under another parent, is fine.
        api.rename_channel(ChannelId::new(1), "Training 1").await.unwrap();
        api.rename_channel(ChannelId::new(2), "Training 3").await.unwrap();
        api.create_channel(ChannelId::new(6), "Training 1", CreateOptions::default())
            .await
            .unwrap();
    }
}
