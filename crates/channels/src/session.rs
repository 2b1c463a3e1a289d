//! Wiring for a whole overlay session: one resolve-then-poll task per
//! channel and a shared dispatcher in front of the display sink.

use std::{sync::Arc, time::Duration};

use {
    tokio::task::{JoinHandle, JoinSet},
    tokio_util::sync::CancellationToken,
    tracing::{debug, info, warn},
};

use crate::{
    clock::{Clock, SystemClock},
    display::DisplaySink,
    poller::{DEFAULT_POLL_INTERVAL, Poller},
    provider::ChatProvider,
    resolver::{log_failure, resolve_channel},
    scheduler::{DeliverySender, Dispatcher},
    types::ChannelRequest,
};

/// What a session follows and how it paces polling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub channels: Vec<ChannelRequest>,
    pub default_poll_interval: Duration,
}

impl SessionConfig {
    pub fn new(channels: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            channels: channels.into_iter().map(ChannelRequest::new).collect(),
            default_poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl From<&streamchat_config::YoutubeConfig> for SessionConfig {
    fn from(cfg: &streamchat_config::YoutubeConfig) -> Self {
        Self {
            channels: cfg.channels.iter().map(ChannelRequest::new).collect(),
            default_poll_interval: cfg.default_poll_interval(),
        }
    }
}

/// Entry point for running the pipeline.
pub struct Overlay {
    config: SessionConfig,
    provider: Arc<dyn ChatProvider>,
    sink: Arc<dyn DisplaySink>,
    clock: Arc<dyn Clock>,
}

impl Overlay {
    pub fn new(
        config: SessionConfig,
        provider: Arc<dyn ChatProvider>,
        sink: Arc<dyn DisplaySink>,
    ) -> Self {
        Self {
            config,
            provider,
            sink,
            clock: Arc::new(SystemClock),
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Spawn the dispatcher and one task per channel.
    ///
    /// Channels are fully independent: a channel that fails to resolve ends
    /// its own task and nothing else.
    pub fn start(self) -> OverlayHandle {
        let cancel = CancellationToken::new();
        let (tx, dispatcher) = Dispatcher::new(self.sink);
        let dispatcher = tokio::spawn(dispatcher.run(cancel.clone()));

        info!(channels = self.config.channels.len(), "starting overlay session");
        let mut channels = JoinSet::new();
        for request in self.config.channels {
            channels.spawn(run_channel(
                request,
                Arc::clone(&self.provider),
                Arc::clone(&self.clock),
                tx.clone(),
                self.config.default_poll_interval,
                cancel.clone(),
            ));
        }
        // Only pollers hold senders now, so the dispatcher stops once they do.
        drop(tx);

        OverlayHandle {
            cancel,
            channels,
            dispatcher,
        }
    }
}

async fn run_channel(
    request: ChannelRequest,
    provider: Arc<dyn ChatProvider>,
    clock: Arc<dyn Clock>,
    deliveries: DeliverySender,
    default_interval: Duration,
    cancel: CancellationToken,
) {
    let resolved = tokio::select! {
        () = cancel.cancelled() => return,
        resolved = resolve_channel(provider.as_ref(), &request) => resolved,
    };
    let channel = match resolved {
        Ok(channel) => channel,
        Err(e) => {
            log_failure(&e);
            return;
        },
    };

    Poller::new(channel, provider, clock, deliveries)
        .with_default_interval(default_interval)
        .run(cancel)
        .await;
}

/// Running session.
pub struct OverlayHandle {
    cancel: CancellationToken,
    channels: JoinSet<()>,
    dispatcher: JoinHandle<()>,
}

impl OverlayHandle {
    /// Token that stops every task of this session when cancelled.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Wait for the session to end on its own: every channel failed to
    /// resolve or stopped, and every scheduled message was delivered.
    pub async fn wait(mut self) {
        while let Some(joined) = self.channels.join_next().await {
            if let Err(e) = joined {
                warn!(error = %e, "channel task panicked");
            }
        }
        debug!("all channel tasks finished");
        if let Err(e) = self.dispatcher.await {
            warn!(error = %e, "dispatcher task panicked");
        }
    }

    /// Cancel every task and wait for them to exit.
    pub async fn shutdown(self) {
        info!("stopping overlay session");
        self.cancel.cancel();
        self.wait().await;
    }
}
