use {
    async_trait::async_trait,
    reqwest::Client,
    secrecy::{ExposeSecret, Secret},
    serde::de::DeserializeOwned,
    streamchat_channels::{ChatProvider, MessagePage, ProviderResult, ResolvedChannel},
    streamchat_config::YoutubeConfig,
    tracing::{debug, trace},
};

use crate::{
    api::{ChannelItem, ListResponse, LiveChatPage, SearchItem, VideoItem},
    error::{Error, Result},
};

/// YouTube Data API v3 client for live chat lookups.
///
/// The API key is held here and appended to every request as `key`.
pub struct YoutubeClient {
    http: Client,
    base_url: String,
    api_key: Secret<String>,
    max_results: u32,
}

impl std::fmt::Debug for YoutubeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YoutubeClient")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .field("max_results", &self.max_results)
            .finish()
    }
}

impl YoutubeClient {
    pub fn new(config: &YoutubeConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(config.request_timeout())
            .build()?;
        Ok(Self::with_http(http, config))
    }

    /// Build on an existing HTTP client.
    pub fn with_http(http: Client, config: &YoutubeConfig) -> Self {
        Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_owned(),
            api_key: Secret::new(config.api_key_str().to_owned()),
            max_results: config.max_results,
        }
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T> {
        let url = format!("{}/{path}", self.base_url);
        debug!(%url, "youtube request");

        let resp = self
            .http
            .get(&url)
            .header("Accept", "application/json")
            .query(query)
            .query(&[("key", self.api_key.expose_secret().as_str())])
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Status { status, body });
        }

        Ok(resp.json().await?)
    }

    /// `GET /channels?forUsername=`: first item's id.
    pub async fn channel_id(&self, username: &str) -> Result<Option<String>> {
        let list: ListResponse<ChannelItem> = self
            .get("channels", &[("forUsername", username)])
            .await?;
        Ok(list.into_first().map(|c| c.id))
    }

    /// `GET /search` for a live video on the channel: first item's video id.
    pub async fn live_video_id(&self, channel_id: &str) -> Result<Option<String>> {
        let list: ListResponse<SearchItem> = self
            .get("search", &[
                ("part", "id"),
                ("eventType", "live"),
                ("type", "video"),
                ("channelId", channel_id),
            ])
            .await?;
        Ok(list.into_first().and_then(|s| s.id.video_id))
    }

    /// `GET /videos?part=liveStreamingDetails`: the active live chat id.
    pub async fn live_chat_id(&self, video_id: &str) -> Result<Option<String>> {
        let list: ListResponse<VideoItem> = self
            .get("videos", &[("part", "liveStreamingDetails"), ("id", video_id)])
            .await?;
        Ok(list
            .into_first()
            .and_then(|v| v.live_streaming_details)
            .and_then(|d| d.active_live_chat_id))
    }

    /// `GET /liveChat/messages`: the current page for a chat.
    pub async fn live_chat_messages(&self, chat_id: &str, channel: &str) -> Result<MessagePage> {
        let max_results = self.max_results.to_string();
        let mut query = vec![("part", "id,snippet,authorDetails")];
        if self.max_results > 0 {
            query.push(("maxResults", max_results.as_str()));
        }
        query.push(("liveChatId", chat_id));

        let raw: LiveChatPage = self.get("liveChat/messages", &query).await?;
        let page = raw.into_page(channel)?;
        trace!(
            channel,
            items = page.items.len(),
            interval = ?page.polling_interval,
            "live chat page"
        );
        Ok(page)
    }
}

#[async_trait]
impl ChatProvider for YoutubeClient {
    async fn resolve_channel_id(&self, username: &str) -> ProviderResult<Option<String>> {
        self.channel_id(username)
            .await
            .map_err(|e| e.into_provider("channels"))
    }

    async fn find_live_broadcast(&self, channel_id: &str) -> ProviderResult<Option<String>> {
        self.live_video_id(channel_id)
            .await
            .map_err(|e| e.into_provider("search"))
    }

    async fn chat_feed_handle(&self, broadcast_id: &str) -> ProviderResult<Option<String>> {
        self.live_chat_id(broadcast_id)
            .await
            .map_err(|e| e.into_provider("videos"))
    }

    async fn fetch_messages(&self, channel: &ResolvedChannel) -> ProviderResult<MessagePage> {
        self.live_chat_messages(&channel.chat_id, &channel.name)
            .await
            .map_err(|e| e.into_provider("liveChat/messages"))
    }
}
