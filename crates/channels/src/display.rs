//! Display sink contract and the bounded queue of visible messages.

use std::{collections::VecDeque, sync::Mutex};

use tracing::trace;

use crate::types::ChatMessage;

pub use streamchat_config::schema::{DEFAULT_LIMIT, DEFAULT_SPEED};

/// Presentation settings handed to sinks. `speed` is opaque to the pipeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayOptions {
    pub limit: usize,
    pub speed: f64,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            speed: DEFAULT_SPEED,
        }
    }
}

impl From<&streamchat_config::OverlayConfig> for DisplayOptions {
    fn from(cfg: &streamchat_config::OverlayConfig) -> Self {
        Self {
            limit: cfg.limit,
            speed: cfg.speed,
        }
    }
}

/// Receives messages from the dispatcher as they become due.
///
/// Called from the dispatcher task; implementations must not block.
pub trait DisplaySink: Send + Sync {
    fn deliver(&self, message: ChatMessage);
}

/// Visible messages in delivery order, capped at `limit`.
#[derive(Debug, Clone)]
pub struct DisplayQueue {
    limit: usize,
    entries: VecDeque<ChatMessage>,
}

impl DisplayQueue {
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            entries: VecDeque::with_capacity(limit.saturating_add(1)),
        }
    }

    /// Append `message`, evicting and returning the oldest entry if the
    /// queue grew past its limit.
    pub fn push(&mut self, message: ChatMessage) -> Option<ChatMessage> {
        self.entries.push_back(message);
        if self.entries.len() > self.limit {
            self.entries.pop_front()
        } else {
            None
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &ChatMessage> {
        self.entries.iter()
    }
}

/// In-memory sink keeping the visible queue for inspection.
#[derive(Debug)]
pub struct MemoryDisplay {
    // std Mutex: only locked for a push or a copy, never across `.await`.
    queue: Mutex<DisplayQueue>,
}

impl MemoryDisplay {
    pub fn new(limit: usize) -> Self {
        Self {
            queue: Mutex::new(DisplayQueue::new(limit)),
        }
    }

    /// Currently visible messages, oldest first.
    pub fn snapshot(&self) -> Vec<ChatMessage> {
        let queue = self.queue.lock().unwrap_or_else(|e| e.into_inner());
        queue.iter().cloned().collect()
    }

    /// Ids of the visible messages, oldest first.
    pub fn ids(&self) -> Vec<String> {
        let queue = self.queue.lock().unwrap_or_else(|e| e.into_inner());
        queue.iter().map(|m| m.id.clone()).collect()
    }
}

impl DisplaySink for MemoryDisplay {
    fn deliver(&self, message: ChatMessage) {
        let mut queue = self.queue.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(evicted) = queue.push(message) {
            trace!(id = %evicted.id, "evicted oldest message");
        }
    }
}
