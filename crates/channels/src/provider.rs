use async_trait::async_trait;

use crate::{
    error::ProviderResult,
    types::{MessagePage, ResolvedChannel},
};

/// Lookups and message fetches against the streaming platform.
///
/// The lookup methods return `Ok(None)` when the provider answered but had
/// nothing (no such user, not live, no active chat). Credentials belong to
/// the implementation.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Username → channel id.
    async fn resolve_channel_id(&self, username: &str) -> ProviderResult<Option<String>>;

    /// Channel id → id of the broadcast currently live on it.
    async fn find_live_broadcast(&self, channel_id: &str) -> ProviderResult<Option<String>>;

    /// Broadcast id → active live chat id.
    async fn chat_feed_handle(&self, broadcast_id: &str) -> ProviderResult<Option<String>>;

    /// Fetch the current page of messages for `channel.chat_id`. Returned
    /// messages carry `channel.name`.
    async fn fetch_messages(&self, channel: &ResolvedChannel) -> ProviderResult<MessagePage>;
}
