//! Scripted provider and message builders shared by unit tests.

use std::{
    collections::{HashMap, VecDeque},
    sync::Mutex,
    time::Duration,
};

use {
    async_trait::async_trait,
    chrono::{DateTime, Utc},
};

use crate::{
    error::{ProviderError, ProviderResult},
    provider::ChatProvider,
    types::{ChatAuthor, ChatMessage, MessagePage, ResolvedChannel},
};

pub(crate) fn at_ms(ms: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(ms).unwrap_or_default()
}

pub(crate) fn message(id: &str, published_ms: i64) -> ChatMessage {
    ChatMessage {
        id: id.into(),
        channel: "chan".into(),
        author: ChatAuthor {
            channel_id: format!("author-{id}"),
            display_name: format!("viewer {id}"),
            ..Default::default()
        },
        text: format!("hello from {id}"),
        published_at: at_ms(published_ms),
    }
}

pub(crate) fn page(items: Vec<ChatMessage>, interval_ms: Option<u64>) -> MessagePage {
    MessagePage {
        items,
        polling_interval: interval_ms.map(Duration::from_millis),
        next_page_token: None,
    }
}

pub(crate) fn transport_error() -> ProviderError {
    ProviderError::transport("GET", std::io::Error::other("connection reset"))
}

/// Answers lookups from fixed tables. A key mapped to `None` is an empty
/// result, a missing key is a transport failure.
#[derive(Default)]
pub(crate) struct ScriptedProvider {
    channel_ids: HashMap<String, Option<String>>,
    broadcasts: HashMap<String, Option<String>>,
    chats: HashMap<String, Option<String>>,
    pages: Mutex<VecDeque<ProviderResult<MessagePage>>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedProvider {
    /// A provider where `name` resolves fully to `chat-<name>`.
    pub(crate) fn live(name: &str) -> Self {
        Self::default().with_live(name)
    }

    pub(crate) fn with_live(mut self, name: &str) -> Self {
        self.channel_ids
            .insert(name.into(), Some(format!("UC-{name}")));
        self.broadcasts
            .insert(format!("UC-{name}"), Some(format!("video-{name}")));
        self.chats
            .insert(format!("video-{name}"), Some(format!("chat-{name}")));
        self
    }

    pub(crate) fn with_channel_id(mut self, name: &str, id: Option<&str>) -> Self {
        self.channel_ids.insert(name.into(), id.map(String::from));
        self
    }

    pub(crate) fn with_broadcast(mut self, channel_id: &str, video: Option<&str>) -> Self {
        self.broadcasts
            .insert(channel_id.into(), video.map(String::from));
        self
    }

    pub(crate) fn without_broadcast(mut self, channel_id: &str) -> Self {
        self.broadcasts.remove(channel_id);
        self
    }

    pub(crate) fn with_chat(mut self, video: &str, chat: Option<&str>) -> Self {
        self.chats.insert(video.into(), chat.map(String::from));
        self
    }

    pub(crate) fn push_page(&self, page: ProviderResult<MessagePage>) {
        self.pages
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(page);
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn record(&self, call: String) {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(call);
    }

    fn lookup(
        table: &HashMap<String, Option<String>>,
        key: &str,
    ) -> ProviderResult<Option<String>> {
        table.get(key).cloned().ok_or_else(transport_error)
    }
}

#[async_trait]
impl ChatProvider for ScriptedProvider {
    async fn resolve_channel_id(&self, username: &str) -> ProviderResult<Option<String>> {
        self.record(format!("channel:{username}"));
        Self::lookup(&self.channel_ids, username)
    }

    async fn find_live_broadcast(&self, channel_id: &str) -> ProviderResult<Option<String>> {
        self.record(format!("broadcast:{channel_id}"));
        Self::lookup(&self.broadcasts, channel_id)
    }

    async fn chat_feed_handle(&self, broadcast_id: &str) -> ProviderResult<Option<String>> {
        self.record(format!("chat:{broadcast_id}"));
        Self::lookup(&self.chats, broadcast_id)
    }

    async fn fetch_messages(&self, channel: &ResolvedChannel) -> ProviderResult<MessagePage> {
        self.record(format!("messages:{}", channel.chat_id));
        self.pages
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front()
            .unwrap_or_else(|| Ok(MessagePage::default()))
    }
}
