use std::time::Duration;

use {
    chrono::{DateTime, Utc},
    serde::{Deserialize, Serialize},
};

/// A channel username to follow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelRequest {
    pub name: String,
}

impl ChannelRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// A channel whose live chat feed has been located.
///
/// Only produced by the resolver once all three lookups succeeded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedChannel {
    pub name: String,
    pub channel_id: String,
    /// Live broadcast (video) id.
    pub stream_id: String,
    /// Active live chat id.
    pub chat_id: String,
}

/// Who posted a chat message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChatAuthor {
    pub channel_id: String,
    pub display_name: String,
    pub is_moderator: bool,
    pub is_owner: bool,
    pub is_member: bool,
}

/// A single live chat message. Ordered by `published_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub id: String,
    /// Name of the channel the message was posted in.
    pub channel: String,
    pub author: ChatAuthor,
    pub text: String,
    pub published_at: DateTime<Utc>,
}

/// One page returned by the message fetch.
#[derive(Debug, Clone, Default)]
pub struct MessagePage {
    pub items: Vec<ChatMessage>,
    /// Provider-suggested wait before the next fetch.
    pub polling_interval: Option<Duration>,
    /// Returned by the provider but not used for fetching.
    pub next_page_token: Option<String>,
}
