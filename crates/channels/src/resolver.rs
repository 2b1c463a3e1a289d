//! Channel username → live chat id, in three provider lookups.

use tracing::{debug, info, warn};

use crate::{
    Error, Result,
    error::{ProviderError, ProviderResult},
    provider::ChatProvider,
    types::{ChannelRequest, ResolvedChannel},
};

/// Treat an empty answer like a missing one.
fn found(
    result: ProviderResult<Option<String>>,
) -> std::result::Result<String, Option<ProviderError>> {
    match result {
        Ok(Some(value)) if !value.is_empty() => Ok(value),
        Ok(_) => Err(None),
        Err(e) => Err(Some(e)),
    }
}

/// Run the channel id, live broadcast and live chat lookups in order,
/// stopping at the first stage that fails or comes back empty.
pub async fn resolve_channel(
    provider: &dyn ChatProvider,
    request: &ChannelRequest,
) -> Result<ResolvedChannel> {
    let channel = request.name.as_str();

    let channel_id =
        found(provider.resolve_channel_id(channel).await).map_err(|source| Error::ChannelId {
            channel: channel.to_string(),
            source,
        })?;
    debug!(channel, %channel_id, "resolved channel id");

    let stream_id = found(provider.find_live_broadcast(&channel_id).await).map_err(|source| {
        Error::LiveStream {
            channel: channel.to_string(),
            channel_id: channel_id.clone(),
            source,
        }
    })?;
    debug!(channel, %channel_id, %stream_id, "found live broadcast");

    let chat_id = found(provider.chat_feed_handle(&stream_id).await).map_err(|source| {
        Error::LiveChat {
            channel: channel.to_string(),
            channel_id: channel_id.clone(),
            stream_id: stream_id.clone(),
            source,
        }
    })?;
    info!(channel, %channel_id, %stream_id, %chat_id, "live chat resolved");

    Ok(ResolvedChannel {
        name: channel.to_string(),
        channel_id,
        stream_id,
        chat_id,
    })
}

/// Log a resolution failure with its channel and provider cause.
pub(crate) fn log_failure(err: &Error) {
    match err.provider_error() {
        Some(cause) => warn!(channel = err.channel(), error = %cause, "{err}"),
        None => warn!(channel = err.channel(), "{err}"),
    }
}
