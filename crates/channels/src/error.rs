use std::error::Error as StdError;

/// Crate-wide result type for resolution.
pub type Result<T> = std::result::Result<T, Error>;

/// Result type returned by [`ChatProvider`](crate::provider::ChatProvider) calls.
pub type ProviderResult<T> = std::result::Result<T, ProviderError>;

/// Failure reported by the provider client for a single request.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The request never produced a usable response (network, HTTP status).
    #[error("provider request failed: {context}: {source}")]
    Transport {
        context: String,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },

    /// The response arrived but did not have the expected shape.
    #[error("malformed provider response: {message}")]
    Malformed { message: String },
}

impl ProviderError {
    #[must_use]
    pub fn transport(
        context: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self::Transport {
            context: context.into(),
            source: Box::new(source),
        }
    }

    #[must_use]
    pub fn malformed(message: impl std::fmt::Display) -> Self {
        Self::Malformed {
            message: message.to_string(),
        }
    }
}

/// Which resolution lookup failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionStage {
    ChannelId,
    LiveStream,
    LiveChat,
}

/// A channel that could not be resolved to a live chat feed.
///
/// `source` is `None` when the provider answered with an empty result.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unable to fetch channel id for {channel}")]
    ChannelId {
        channel: String,
        #[source]
        source: Option<ProviderError>,
    },

    #[error("unable to fetch live stream id for {channel} ({channel_id})")]
    LiveStream {
        channel: String,
        channel_id: String,
        #[source]
        source: Option<ProviderError>,
    },

    #[error("unable to fetch live chat id for {channel} ({channel_id}, {stream_id})")]
    LiveChat {
        channel: String,
        channel_id: String,
        stream_id: String,
        #[source]
        source: Option<ProviderError>,
    },
}

impl Error {
    #[must_use]
    pub fn stage(&self) -> ResolutionStage {
        match self {
            Self::ChannelId { .. } => ResolutionStage::ChannelId,
            Self::LiveStream { .. } => ResolutionStage::LiveStream,
            Self::LiveChat { .. } => ResolutionStage::LiveChat,
        }
    }

    /// Name of the channel that failed.
    #[must_use]
    pub fn channel(&self) -> &str {
        match self {
            Self::ChannelId { channel, .. }
            | Self::LiveStream { channel, .. }
            | Self::LiveChat { channel, .. } => channel,
        }
    }

    /// The provider failure behind this error, if it was not an empty result.
    #[must_use]
    pub fn provider_error(&self) -> Option<&ProviderError> {
        match self {
            Self::ChannelId { source, .. }
            | Self::LiveStream { source, .. }
            | Self::LiveChat { source, .. } => source.as_ref(),
        }
    }
}
