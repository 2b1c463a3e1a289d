//! Terminal display sink: prints each message as it becomes due.

use std::{io::Write, sync::Mutex};

use {
    clap::ValueEnum,
    streamchat_channels::{ChatMessage, DisplayOptions, DisplayQueue, DisplaySink},
    tracing::{trace, warn},
};

const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const RESET: &str = "\x1b[0m";

/// How delivered messages are written to stdout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// `[channel] [mod] author: text`
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

pub struct TerminalDisplay {
    format: OutputFormat,
    queue: Mutex<DisplayQueue>,
}

impl TerminalDisplay {
    pub fn new(options: DisplayOptions, format: OutputFormat) -> Self {
        trace!(limit = options.limit, speed = options.speed, "terminal display");
        Self {
            format,
            queue: Mutex::new(DisplayQueue::new(options.limit)),
        }
    }

    fn render(&self, message: &ChatMessage) -> String {
        match self.format {
            OutputFormat::Text => render_text(message),
            OutputFormat::Json => serde_json::to_string(message).unwrap_or_default(),
        }
    }
}

impl DisplaySink for TerminalDisplay {
    fn deliver(&self, message: ChatMessage) {
        let line = self.render(&message);
        let mut stdout = std::io::stdout().lock();
        if let Err(e) = writeln!(stdout, "{line}") {
            warn!(error = %e, "failed to write message");
        }

        let mut queue = self.queue.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(evicted) = queue.push(message) {
            trace!(id = %evicted.id, "message scrolled out");
        }
    }
}

/// Badges in the order they are shown.
fn badges(message: &ChatMessage) -> impl Iterator<Item = &'static str> {
    let author = &message.author;
    [
        (author.is_owner, "[owner]"),
        (author.is_moderator, "[mod]"),
        (author.is_member, "[member]"),
    ]
    .into_iter()
    .filter_map(|(on, badge)| on.then_some(badge))
}

fn render_text(message: &ChatMessage) -> String {
    let mut line = format!("{DIM}[{}]{RESET} ", message.channel);
    for badge in badges(message) {
        line.push_str(badge);
        line.push(' ');
    }
    line.push_str(&format!(
        "{BOLD}{}{RESET}: {}",
        message.author.display_name, message.text
    ));
    line
}
