//! Config schema types (overlay presentation and the YouTube provider).

use std::time::Duration;

use {
    secrecy::{ExposeSecret, Secret},
    serde::{Deserialize, Serialize},
};

/// Default number of simultaneously visible messages.
pub const DEFAULT_LIMIT: usize = 30;

/// Default presentation pacing factor handed to display sinks.
pub const DEFAULT_SPEED: f64 = 0.2;

/// Default YouTube Data API base URL.
pub const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/youtube/v3";

/// Default page size requested from the live chat endpoint.
pub const DEFAULT_MAX_RESULTS: u32 = 2000;

/// Wait between polls when the provider does not suggest one.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 5000;

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamchatConfig {
    pub overlay: OverlayConfig,
    pub youtube: YoutubeConfig,
}

/// How delivered messages are presented.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OverlayConfig {
    /// Maximum number of visible messages; the oldest is evicted beyond this.
    pub limit: usize,
    /// Transition pacing in seconds. Only sinks interpret it.
    pub speed: f64,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            speed: DEFAULT_SPEED,
        }
    }
}

/// YouTube Data API provider settings and the channels to follow.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct YoutubeConfig {
    /// API key sent as the `key` query parameter.
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_option_secret"
    )]
    pub api_key: Option<Secret<String>>,

    /// Channel usernames to resolve.
    pub channels: Vec<String>,

    /// API base URL. Overridden in tests to point at a local mock server.
    pub base_url: String,

    /// `maxResults` for each live chat page.
    pub max_results: u32,

    /// Poll wait used when a page carries no `pollingIntervalMillis`, and
    /// after a failed poll.
    pub default_poll_interval_ms: u64,

    /// Per-request HTTP timeout.
    pub request_timeout_secs: u64,
}

impl YoutubeConfig {
    #[must_use]
    pub fn default_poll_interval(&self) -> Duration {
        Duration::from_millis(self.default_poll_interval_ms)
    }

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// The API key, or an empty string when none is configured.
    #[must_use]
    pub fn api_key_str(&self) -> &str {
        self.api_key
            .as_ref()
            .map(ExposeSecret::expose_secret)
            .map_or("", String::as_str)
    }
}

impl std::fmt::Debug for YoutubeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YoutubeConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("channels", &self.channels)
            .field("base_url", &self.base_url)
            .field("max_results", &self.max_results)
            .field("default_poll_interval_ms", &self.default_poll_interval_ms)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

impl Default for YoutubeConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            channels: Vec::new(),
            base_url: DEFAULT_BASE_URL.into(),
            max_results: DEFAULT_MAX_RESULTS,
            default_poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            request_timeout_secs: 30,
        }
    }
}

fn serialize_option_secret<S: serde::Serializer>(
    secret: &Option<Secret<String>>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match secret {
        Some(s) => serializer.serialize_some(s.expose_secret()),
        None => serializer.serialize_none(),
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = StreamchatConfig::default();
        assert_eq!(cfg.overlay.limit, 30);
        assert!((cfg.overlay.speed - 0.2).abs() < f64::EPSILON);
        assert_eq!(cfg.youtube.max_results, 2000);
        assert_eq!(
            cfg.youtube.default_poll_interval(),
            Duration::from_millis(5000)
        );
        assert!(cfg.youtube.api_key.is_none());
        assert_eq!(cfg.youtube.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let cfg: StreamchatConfig = toml::from_str(
            r#"
            [overlay]
            limit = 12

            [youtube]
            api_key = "AIza-test"
            channels = ["UnitedGamer101"]
            "#,
        )
        .unwrap();
        assert_eq!(cfg.overlay.limit, 12);
        assert!((cfg.overlay.speed - DEFAULT_SPEED).abs() < f64::EPSILON);
        assert_eq!(cfg.youtube.api_key_str(), "AIza-test");
        assert_eq!(cfg.youtube.channels, vec!["UnitedGamer101"]);
        assert_eq!(cfg.youtube.max_results, DEFAULT_MAX_RESULTS);
    }

    #[test]
    fn debug_redacts_api_key() {
        let cfg = YoutubeConfig {
            api_key: Some(Secret::new("super-secret".into())),
            ..Default::default()
        };
        let rendered = format!("{cfg:?}");
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("[REDACTED]"));
    }
}
