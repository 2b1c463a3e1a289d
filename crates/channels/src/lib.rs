//! Live chat pipeline for streaming channels.
//!
//! Each channel username is resolved to an active live chat (channel id,
//! then live broadcast, then chat id), polled on the provider's suggested
//! interval, and its new messages are replayed to a display sink with their
//! original posting cadence. The sink keeps a bounded queue of visible
//! messages.

pub mod clock;
pub mod display;
pub mod error;
pub mod poller;
pub mod provider;
pub mod resolver;
pub mod scheduler;
pub mod session;
pub mod types;

#[cfg(test)]
pub(crate) mod test_support;

pub use {
    clock::{Clock, ManualClock, SystemClock},
    display::{DisplayOptions, DisplayQueue, DisplaySink, MemoryDisplay},
    error::{Error, ProviderError, ProviderResult, ResolutionStage, Result},
    poller::{CycleOutcome, DEFAULT_POLL_INTERVAL, PollState, Poller},
    provider::ChatProvider,
    resolver::resolve_channel,
    scheduler::{Dispatcher, ScheduledMessage, Timeline, presentation_delay},
    session::{Overlay, OverlayHandle, SessionConfig},
    types::{ChannelRequest, ChatAuthor, ChatMessage, MessagePage, ResolvedChannel},
};
