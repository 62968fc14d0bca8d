//! In-memory `Directory` backed by fixed user and channel lists.

use anyhow::Result;
use async_trait::async_trait;

use crate::traits::Directory;
use crate::types::{ChannelRef, UserRef};

/// A `Directory` over a fixed set of entities.
///
/// Used by the console front end and by tests; real transports query their
/// own caches instead.
#[derive(Debug, Clone, Default)]
pub struct StaticDirectory {
    users: Vec<UserRef>,
    channels: Vec<ChannelRef>,
}

impl StaticDirectory {
    pub fn new(users: Vec<UserRef>, channels: Vec<ChannelRef>) -> Self {
        Self { users, channels }
    }

    pub fn with_user(mut self, user: UserRef) -> Self {
        self.users.push(user);
        self
    }

    pub fn with_channel(mut self, channel: ChannelRef) -> Self {
        self.channels.push(channel);
        self
    }
}

#[async_trait]
impl Directory for StaticDirectory {
    async fn user_by_id(&self, id: &str) -> Result<Option<UserRef>> {
        Ok(self.users.iter().find(|u| u.id == id).cloned())
    }

    async fn users_by_name(&self, name: &str) -> Result<Vec<UserRef>> {
        Ok(self.users.iter().filter(|u| u.name == name).cloned().collect())
    }

    async fn channel_by_id(&self, id: &str) -> Result<Option<ChannelRef>> {
        Ok(self.channels.iter().find(|c| c.id == id).cloned())
    }

    async fn channels_by_name(&self, name: &str) -> Result<Vec<ChannelRef>> {
        Ok(self.channels.iter().filter(|c| c.name == name).cloned().collect())
    }
}
