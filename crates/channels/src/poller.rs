//! Per-channel polling loop.
//!
//! [`PollState::advance`] is the whole cycle as a pure step: it sorts and
//! filters a fetched page, moves the high-water mark, and returns the
//! deliveries plus the wait before the next fetch. [`Poller`] drives it
//! against a provider on a timer.

use std::{sync::Arc, time::Duration};

use {
    chrono::{DateTime, Utc},
    tokio_util::sync::CancellationToken,
    tracing::{debug, info, trace, warn},
};

use crate::{
    clock::Clock,
    provider::ChatProvider,
    scheduler::{DeliverySender, ScheduledMessage},
    types::{MessagePage, ResolvedChannel},
};

/// Wait before the next fetch when the provider suggests none.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(5000);

/// Poll bookkeeping for one channel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PollState {
    last_seen: Option<DateTime<Utc>>,
    last_fetch: Option<DateTime<Utc>>,
}

/// What one successful cycle produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleOutcome {
    /// New messages in publish order.
    pub deliveries: Vec<ScheduledMessage>,
    pub next_wait: Duration,
}

impl PollState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Newest publish time seen so far.
    pub fn last_seen(&self) -> Option<DateTime<Utc>> {
        self.last_seen
    }

    /// Start time of the previous successful cycle.
    pub fn last_fetch(&self) -> Option<DateTime<Utc>> {
        self.last_fetch
    }

    /// Apply a page fetched in a cycle that started at `now`.
    ///
    /// Messages at or before the high-water mark are dropped. Survivors are
    /// scheduled relative to the previous cycle's start; on the first cycle
    /// they are all immediate.
    pub fn advance(
        &mut self,
        now: DateTime<Utc>,
        page: MessagePage,
        default_interval: Duration,
    ) -> CycleOutcome {
        let MessagePage {
            mut items,
            polling_interval,
            ..
        } = page;
        // Stable: equal timestamps keep provider order.
        items.sort_by_key(|m| m.published_at);

        let seen_before = self.last_seen;
        if let Some(newest) = items.last().map(|m| m.published_at)
            && seen_before.is_none_or(|seen| newest > seen)
        {
            self.last_seen = Some(newest);
        }

        let origin = self.last_fetch;
        let deliveries = items
            .into_iter()
            .filter(|m| seen_before.is_none_or(|seen| m.published_at > seen))
            .map(|m| ScheduledMessage::new(m, origin))
            .collect();

        self.last_fetch = Some(now);

        CycleOutcome {
            deliveries,
            // A zero suggestion would mean refetching immediately.
            next_wait: polling_interval
                .filter(|wait| !wait.is_zero())
                .unwrap_or(default_interval),
        }
    }
}

/// Polls one resolved channel and feeds new messages to the dispatcher.
pub struct Poller {
    channel: ResolvedChannel,
    provider: Arc<dyn ChatProvider>,
    clock: Arc<dyn Clock>,
    deliveries: DeliverySender,
    default_interval: Duration,
    state: PollState,
}

impl Poller {
    pub fn new(
        channel: ResolvedChannel,
        provider: Arc<dyn ChatProvider>,
        clock: Arc<dyn Clock>,
        deliveries: DeliverySender,
    ) -> Self {
        Self {
            channel,
            provider,
            clock,
            deliveries,
            default_interval: DEFAULT_POLL_INTERVAL,
            state: PollState::new(),
        }
    }

    #[must_use]
    pub fn with_default_interval(mut self, interval: Duration) -> Self {
        self.default_interval = interval;
        self
    }

    pub fn channel(&self) -> &ResolvedChannel {
        &self.channel
    }

    pub fn state(&self) -> &PollState {
        &self.state
    }

    /// Fetch one page and hand its new messages to the dispatcher.
    ///
    /// Returns how long to wait before the next cycle. A failed fetch leaves
    /// the state untouched and retries after the default interval.
    pub async fn cycle(&mut self) -> Duration {
        let now = self.clock.now();
        let page = match self.provider.fetch_messages(&self.channel).await {
            Ok(page) => page,
            Err(e) => {
                warn!(
                    channel = %self.channel.name,
                    chat_id = %self.channel.chat_id,
                    error = %e,
                    retry_ms = self.default_interval.as_millis() as u64,
                    "live chat poll failed"
                );
                return self.default_interval;
            },
        };

        let fetched = page.items.len();
        let outcome = self.state.advance(now, page, self.default_interval);
        debug!(
            channel = %self.channel.name,
            fetched,
            new = outcome.deliveries.len(),
            wait_ms = outcome.next_wait.as_millis() as u64,
            "polled live chat"
        );

        for scheduled in outcome.deliveries {
            trace!(
                channel = %self.channel.name,
                id = %scheduled.message.id,
                delay_ms = scheduled.delay.as_millis() as u64,
                "scheduling message"
            );
            if self.deliveries.send(scheduled).await.is_err() {
                break;
            }
        }
        outcome.next_wait
    }

    /// Poll until cancelled or until the dispatcher goes away.
    pub async fn run(mut self, cancel: CancellationToken) {
        info!(
            channel = %self.channel.name,
            chat_id = %self.channel.chat_id,
            "starting live chat polling"
        );
        loop {
            let wait = tokio::select! {
                () = cancel.cancelled() => break,
                wait = self.cycle() => wait,
            };
            if self.deliveries.is_closed() {
                debug!(channel = %self.channel.name, "dispatcher closed");
                break;
            }
            tokio::select! {
                () = cancel.cancelled() => break,
                () = tokio::time::sleep(wait) => {},
            }
        }
        info!(channel = %self.channel.name, "live chat polling stopped");
    }
}
