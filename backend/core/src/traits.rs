use std::sync::LazyLock;

use anyhow::Result;
use async_trait::async_trait;
use regex::Regex;
use tracing::trace;

use crate::types::{ChannelRef, MessageContext, UserRef};

static USER_MENTION_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<@!?(\d+)>").unwrap());
static CHANNEL_MENTION_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<#!?(\d+)>").unwrap());

/// Lookup service for users and channels known to the transport.
///
/// Implementors only provide the primitive lookups; `resolve_user` and
/// `resolve_channel` layer the token resolution order on top:
/// exact id, then mention syntax, then name. The first hit wins.
#[async_trait]
pub trait Directory: Send + Sync {
    async fn user_by_id(&self, id: &str) -> Result<Option<UserRef>>;

    async fn users_by_name(&self, name: &str) -> Result<Vec<UserRef>>;

    async fn channel_by_id(&self, id: &str) -> Result<Option<ChannelRef>>;

    async fn channels_by_name(&self, name: &str) -> Result<Vec<ChannelRef>>;

    /// Resolve a free-form token (`123`, `<@123>`, `<@!123>`, `ana`) to a user.
    async fn resolve_user(&self, token: &str) -> Result<Option<UserRef>> {
        if let Some(user) = self.user_by_id(token).await? {
            trace!(token, "user resolved by id");
            return Ok(Some(user));
        }
        if let Some(caps) = USER_MENTION_RE.captures(token) {
            trace!(token, "user token is a mention");
            return self.user_by_id(&caps[1]).await;
        }
        Ok(self.users_by_name(token).await?.into_iter().next())
    }

    /// Resolve a free-form token (`123`, `<#123>`, `general`) to a channel.
    async fn resolve_channel(&self, token: &str) -> Result<Option<ChannelRef>> {
        if let Some(channel) = self.channel_by_id(token).await? {
            trace!(token, "channel resolved by id");
            return Ok(Some(channel));
        }
        if let Some(caps) = CHANNEL_MENTION_RE.captures(token) {
            trace!(token, "channel token is a mention");
            return self.channel_by_id(&caps[1]).await;
        }
        Ok(self.channels_by_name(token).await?.into_iter().next())
    }
}

/// Side effects the dispatcher's guard chain asks the transport to perform.
#[async_trait]
pub trait ChannelActions: Send + Sync {
    /// Delete the message that invoked a command.
    async fn delete_message(&self, ctx: &MessageContext) -> Result<()>;

    /// Show a typing indicator in the message's channel.
    async fn start_typing(&self, ctx: &MessageContext) -> Result<()>;

    /// Whether the author holds `permission` in the message's channel.
    async fn has_permission(&self, ctx: &MessageContext, permission: &str) -> Result<bool>;
}
