//! Response bodies of the YouTube Data API v3 endpoints used here.
//!
//! Only the fields the overlay reads are modelled; everything else is ignored.

use std::time::Duration;

use {
    chrono::{DateTime, Utc},
    serde::Deserialize,
    streamchat_channels::{ChatAuthor, ChatMessage, MessagePage},
};

use crate::error::{Error, Result};

/// Generic `{ "items": [...] }` list envelope.
#[derive(Debug, Deserialize)]
pub struct ListResponse<T> {
    // `default = "Vec::new"` keeps serde from requiring `T: Default`.
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}

impl<T> ListResponse<T> {
    pub fn into_first(self) -> Option<T> {
        self.items.into_iter().next()
    }
}

/// `GET /channels` item.
#[derive(Debug, Deserialize)]
pub struct ChannelItem {
    pub id: String,
}

/// `GET /search` item.
#[derive(Debug, Deserialize)]
pub struct SearchItem {
    pub id: SearchItemId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchItemId {
    #[serde(default)]
    pub video_id: Option<String>,
}

/// `GET /videos` item.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoItem {
    #[serde(default)]
    pub live_streaming_details: Option<LiveStreamingDetails>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveStreamingDetails {
    #[serde(default)]
    pub active_live_chat_id: Option<String>,
}

/// `GET /liveChat/messages` page.
///
/// `items` stays optional so a page without it can be told apart from an
/// empty one.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveChatPage {
    pub items: Option<Vec<LiveChatItem>>,
    #[serde(default)]
    pub polling_interval_millis: Option<u64>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveChatItem {
    pub id: String,
    pub snippet: Snippet,
    #[serde(default)]
    pub author_details: AuthorDetails,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snippet {
    pub published_at: DateTime<Utc>,
    /// Absent for some event kinds (e.g. deleted messages).
    #[serde(default)]
    pub display_message: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AuthorDetails {
    pub channel_id: String,
    pub display_name: String,
    pub is_chat_moderator: bool,
    pub is_chat_owner: bool,
    pub is_chat_sponsor: bool,
}

impl LiveChatPage {
    /// Convert into a [`MessagePage`], stamping every message with the
    /// channel name it was polled for.
    pub fn into_page(self, channel: &str) -> Result<MessagePage> {
        let items = self
            .items
            .ok_or_else(|| Error::malformed("live chat page has no items"))?;
        Ok(MessagePage {
            items: items
                .into_iter()
                .map(|item| item.into_message(channel))
                .collect(),
            polling_interval: self.polling_interval_millis.map(Duration::from_millis),
            next_page_token: self.next_page_token,
        })
    }
}

impl LiveChatItem {
    fn into_message(self, channel: &str) -> ChatMessage {
        let author = self.author_details;
        ChatMessage {
            id: self.id,
            channel: channel.to_owned(),
            author: ChatAuthor {
                channel_id: author.channel_id,
                display_name: author.display_name,
                is_moderator: author.is_chat_moderator,
                is_owner: author.is_chat_owner,
                is_member: author.is_chat_sponsor,
            },
            text: self.snippet.display_message,
            published_at: self.snippet.published_at,
        }
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {
        super::*,
        streamchat_channels::{DEFAULT_POLL_INTERVAL, PollState},
    };

    #[test]
    fn live_chat_page_converts_to_messages() {
        let json = r#"{
            "kind": "youtube#liveChatMessageListResponse",
            "pollingIntervalMillis": 3120,
            "nextPageToken": "GOCx",
            "items": [{
                "id": "LCC.1",
                "snippet": {
                    "publishedAt": "2024-03-01T18:00:01.250Z",
                    "displayMessage": "hi chat"
                },
                "authorDetails": {
                    "channelId": "UCabc",
                    "displayName": "Ada",
                    "isChatModerator": true,
                    "isChatOwner": false,
                    "isChatSponsor": true
                }
            }]
        }"#;
        let page: LiveChatPage = serde_json::from_str(json).unwrap();
        let page = page.into_page("ada_streams").unwrap();

        assert_eq!(page.polling_interval, Some(Duration::from_millis(3120)));
        assert_eq!(page.next_page_token.as_deref(), Some("GOCx"));
        let msg = &page.items[0];
        assert_eq!(msg.id, "LCC.1");
        assert_eq!(msg.channel, "ada_streams");
        assert_eq!(msg.text, "hi chat");
        assert_eq!(msg.published_at.timestamp_millis(), 1_709_316_001_250);
        assert!(msg.author.is_moderator);
        assert!(!msg.author.is_owner);
        assert!(msg.author.is_member);
    }

    #[test]
    fn page_without_items_is_malformed() {
        let page: LiveChatPage =
            serde_json::from_str(r#"{"pollingIntervalMillis": 1000}"#).unwrap();
        assert!(matches!(
            page.into_page("x"),
            Err(Error::Malformed { .. })
        ));
    }

    const NO_ITEMS: &str = r#"{"pageInfo": {"totalResults": 0, "resultsPerPage": 5}}"#;

    #[test]
    fn channel_list_without_items_is_empty() {
        let list: ListResponse<ChannelItem> = serde_json::from_str(NO_ITEMS).unwrap();
        assert!(list.into_first().is_none());
    }

    #[test]
    fn search_list_without_items_is_empty() {
        let list: ListResponse<SearchItem> = serde_json::from_str(NO_ITEMS).unwrap();
        assert!(list.into_first().is_none());
    }

    #[test]
    fn video_list_without_items_is_empty() {
        let list: ListResponse<VideoItem> = serde_json::from_str(NO_ITEMS).unwrap();
        assert!(list.into_first().is_none());
    }

    #[test]
    fn search_item_carries_video_id() {
        let list: ListResponse<SearchItem> = serde_json::from_str(
            r#"{"items": [{"id": {"kind": "youtube#video", "videoId": "vid1"}}]}"#,
        )
        .unwrap();
        assert_eq!(
            list.into_first().and_then(|s| s.id.video_id).as_deref(),
            Some("vid1")
        );
    }

    #[test]
    fn zero_polling_interval_falls_back_to_default() {
        let page: LiveChatPage =
            serde_json::from_str(r#"{"items": [], "pollingIntervalMillis": 0}"#).unwrap();
        let page = page.into_page("x").unwrap();

        let outcome = PollState::new().advance(
            DateTime::from_timestamp_millis(0).unwrap(),
            page,
            DEFAULT_POLL_INTERVAL,
        );
        assert_eq!(outcome.next_wait, Duration::from_millis(5000));
    }

    #[test]
    fn video_without_live_details_has_no_chat() {
        let list: ListResponse<VideoItem> =
            serde_json::from_str(r#"{"items": [{"id": "v1"}]}"#).unwrap();
        let video = list.into_first().unwrap();
        assert!(video.live_streaming_details.is_none());
    }
}
