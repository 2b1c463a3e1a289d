//! Paced delivery of chat messages to the display sink.
//!
//! Pollers turn each new message into a [`ScheduledMessage`] carrying its
//! presentation delay. A single [`Dispatcher`] task owns the [`Timeline`]
//! and releases messages to the sink once their delay has elapsed, so a
//! page of messages replays with the cadence it was originally posted at.

use std::{cmp::Ordering, collections::BinaryHeap, sync::Arc, time::Duration};

use {
    chrono::{DateTime, Utc},
    tokio::{sync::mpsc, time::Instant},
    tokio_util::sync::CancellationToken,
    tracing::{debug, trace},
};

use crate::{display::DisplaySink, types::ChatMessage};

/// Queue depth between pollers and the dispatcher.
pub const DISPATCH_CAPACITY: usize = 1024;

/// Sender half handed to pollers.
pub type DeliverySender = mpsc::Sender<ScheduledMessage>;

/// A message and how long to hold it before display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledMessage {
    pub message: ChatMessage,
    pub delay: Duration,
}

impl ScheduledMessage {
    /// Schedule `message` relative to the previous poll's fetch time.
    pub fn new(message: ChatMessage, previous_fetch: Option<DateTime<Utc>>) -> Self {
        let delay = presentation_delay(message.published_at, previous_fetch);
        Self { message, delay }
    }
}

/// Delay between the previous fetch and a message's publish time.
///
/// Zero on a channel's first poll, and zero for messages published before
/// the previous fetch (clock skew or provider lag).
#[must_use]
pub fn presentation_delay(
    published_at: DateTime<Utc>,
    previous_fetch: Option<DateTime<Utc>>,
) -> Duration {
    let Some(origin) = previous_fetch else {
        return Duration::ZERO;
    };
    (published_at - origin).to_std().unwrap_or(Duration::ZERO)
}

struct Pending {
    due: Instant,
    seq: u64,
    message: ChatMessage,
}

impl PartialEq for Pending {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Pending {}

impl PartialOrd for Pending {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Pending {
    // Reversed so the max-heap pops the earliest (due, seq) first.
    fn cmp(&self, other: &Self) -> Ordering {
        (other.due, other.seq).cmp(&(self.due, self.seq))
    }
}

/// Pending deliveries ordered by due time, then by scheduling order.
#[derive(Default)]
pub struct Timeline {
    heap: BinaryHeap<Pending>,
    next_seq: u64,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `scheduled` to become due at `now + delay`.
    pub fn schedule(&mut self, now: Instant, scheduled: ScheduledMessage) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Pending {
            due: now + scheduled.delay,
            seq,
            message: scheduled.message,
        });
    }

    /// Earliest due time, if anything is pending.
    pub fn next_due(&self) -> Option<Instant> {
        self.heap.peek().map(|p| p.due)
    }

    /// Remove and return the earliest message due at or before `now`.
    pub fn pop_due(&mut self, now: Instant) -> Option<ChatMessage> {
        if self.heap.peek()?.due > now {
            return None;
        }
        self.heap.pop().map(|p| p.message)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

/// Single cooperative task releasing scheduled messages to the sink.
pub struct Dispatcher {
    rx: mpsc::Receiver<ScheduledMessage>,
    sink: Arc<dyn DisplaySink>,
    timeline: Timeline,
}

impl Dispatcher {
    /// Create a dispatcher and the sender pollers feed it through.
    pub fn new(sink: Arc<dyn DisplaySink>) -> (DeliverySender, Self) {
        let (tx, rx) = mpsc::channel(DISPATCH_CAPACITY);
        (tx, Self {
            rx,
            sink,
            timeline: Timeline::new(),
        })
    }

    /// Run until cancelled, or until every sender is dropped and nothing
    /// is left pending.
    pub async fn run(mut self, cancel: CancellationToken) {
        let mut open = true;
        loop {
            let now = Instant::now();
            while let Some(message) = self.timeline.pop_due(now) {
                trace!(channel = %message.channel, id = %message.id, "delivering message");
                self.sink.deliver(message);
            }

            let wake = self.timeline.next_due();
            if !open && wake.is_none() {
                debug!("all pollers finished, dispatcher stopping");
                break;
            }

            tokio::select! {
                () = cancel.cancelled() => {
                    debug!(pending = self.timeline.len(), "dispatcher cancelled");
                    break;
                },
                incoming = self.rx.recv(), if open => match incoming {
                    Some(scheduled) => self.timeline.schedule(Instant::now(), scheduled),
                    None => open = false,
                },
                () = tokio::time::sleep_until(wake.unwrap_or(now)), if wake.is_some() => {},
            }
        }
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::{
            display::MemoryDisplay,
            test_support::{at_ms, message},
        },
        rstest::rstest,
    };

    #[rstest]
    #[case::first_poll(300, None, 0)]
    #[case::after_origin(300, Some(0), 300)]
    #[case::same_instant(100, Some(100), 0)]
    #[case::before_origin(50, Some(100), 0)]
    fn delay_from_previous_fetch(
        #[case] published: i64,
        #[case] origin: Option<i64>,
        #[case] expected_ms: u64,
    ) {
        assert_eq!(
            presentation_delay(at_ms(published), origin.map(at_ms)),
            Duration::from_millis(expected_ms)
        );
    }

    #[test]
    fn first_page_is_immediate() {
        let delays: Vec<_> = [0, 100, 250]
            .into_iter()
            .map(|ms| ScheduledMessage::new(message("m", ms), None).delay)
            .collect();
        assert_eq!(delays, vec![Duration::ZERO; 3]);
    }

    #[test]
    fn later_page_is_offset_from_previous_fetch() {
        let delays: Vec<_> = [300, 450]
            .into_iter()
            .map(|ms| ScheduledMessage::new(message("m", ms), Some(at_ms(0))).delay)
            .collect();
        assert_eq!(delays, vec![
            Duration::from_millis(300),
            Duration::from_millis(450)
        ]);
    }

    #[tokio::test(start_paused = true)]
    async fn timeline_orders_by_due_then_insertion() {
        let now = Instant::now();
        let mut timeline = Timeline::new();
        timeline.schedule(now, ScheduledMessage {
            message: message("late", 0),
            delay: Duration::from_millis(200),
        });
        timeline.schedule(now, ScheduledMessage {
            message: message("tie-a", 0),
            delay: Duration::from_millis(100),
        });
        timeline.schedule(now, ScheduledMessage {
            message: message("tie-b", 0),
            delay: Duration::from_millis(100),
        });

        assert_eq!(timeline.next_due(), Some(now + Duration::from_millis(100)));
        assert!(timeline.pop_due(now).is_none());

        let later = now + Duration::from_millis(500);
        let order: Vec<_> = std::iter::from_fn(|| timeline.pop_due(later))
            .map(|m| m.id)
            .collect();
        assert_eq!(order, vec!["tie-a", "tie-b", "late"]);
        assert!(timeline.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn dispatcher_releases_after_delay() {
        let display = Arc::new(MemoryDisplay::new(30));
        let (tx, dispatcher) = Dispatcher::new(display.clone());
        let task = tokio::spawn(dispatcher.run(CancellationToken::new()));

        tx.send(ScheduledMessage {
            message: message("now", 0),
            delay: Duration::ZERO,
        })
        .await
        .unwrap();
        tx.send(ScheduledMessage {
            message: message("soon", 300),
            delay: Duration::from_millis(300),
        })
        .await
        .unwrap();

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(display.ids(), vec!["now"]);

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(display.ids(), vec!["now", "soon"]);

        drop(tx);
        task.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn dispatcher_drains_pending_after_senders_close() {
        let display = Arc::new(MemoryDisplay::new(30));
        let (tx, dispatcher) = Dispatcher::new(display.clone());
        tx.send(ScheduledMessage {
            message: message("pending", 0),
            delay: Duration::from_secs(2),
        })
        .await
        .unwrap();
        drop(tx);

        dispatcher.run(CancellationToken::new()).await;
        assert_eq!(display.ids(), vec!["pending"]);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_dispatcher_drops_pending() {
        let display = Arc::new(MemoryDisplay::new(30));
        let (tx, dispatcher) = Dispatcher::new(display.clone());
        let cancel = CancellationToken::new();
        let task = tokio::spawn(dispatcher.run(cancel.clone()));

        tx.send(ScheduledMessage {
            message: message("never", 0),
            delay: Duration::from_secs(60),
        })
        .await
        .unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;
        cancel.cancel();
        task.await.unwrap();
        assert!(display.ids().is_empty());
    }
}
