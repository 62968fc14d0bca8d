use std::fmt;

use serde::{Deserialize, Serialize};

/// A user as seen by the chat transport.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserRef {
    pub id: String,
    pub name: String,
    /// True when the account is an automated bot account.
    #[serde(default)]
    pub bot: bool,
}

impl UserRef {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            bot: false,
        }
    }

    pub fn bot(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            bot: true,
            ..Self::new(id, name)
        }
    }

    /// Mention syntax understood by the transport (`<@ID>`).
    pub fn mention(&self) -> String {
        format!("<@{}>", self.id)
    }
}

impl fmt::Display for UserRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}

/// A text channel as seen by the chat transport.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChannelRef {
    pub id: String,
    pub name: String,
}

impl ChannelRef {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }

    /// Mention syntax understood by the transport (`<#ID>`).
    pub fn mention(&self) -> String {
        format!("<#{}>", self.id)
    }
}

impl fmt::Display for ChannelRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} ({})", self.name, self.id)
    }
}

/// Everything the dispatcher knows about one inbound message.
///
/// Built by the transport per message and handed to guards, the argument
/// parser (for `current_user` / `current_channel` defaults) and handlers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageContext {
    pub message_id: String,
    pub content: String,
    pub author: UserRef,
    pub channel: ChannelRef,
    /// Server (guild) the message was posted in; `None` for direct messages.
    pub server_id: Option<String>,
    /// Id of the account the dispatcher runs as, used to drop its own messages.
    pub self_id: Option<String>,
}

impl MessageContext {
    pub fn new(content: impl Into<String>, author: UserRef, channel: ChannelRef) -> Self {
        Self {
            message_id: String::new(),
            content: content.into(),
            author,
            channel,
            server_id: None,
            self_id: None,
        }
    }

    pub fn in_server(mut self, server_id: impl Into<String>) -> Self {
        self.server_id = Some(server_id.into());
        self
    }

    pub fn with_self_id(mut self, self_id: impl Into<String>) -> Self {
        self.self_id = Some(self_id.into());
        self
    }

    /// Direct messages have no server.
    pub fn is_private(&self) -> bool {
        self.server_id.is_none()
    }

    pub fn is_from_self(&self) -> bool {
        self.self_id.as_deref() == Some(self.author.id.as_str())
    }
}
