//! Semantic validation of a loaded configuration.

use crate::schema::StreamchatConfig;

/// Severity level for a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
        }
    }
}

/// A single validation diagnostic.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Dotted path, e.g. "overlay.limit"
    pub path: &'static str,
    pub message: String,
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}: {}", self.severity, self.path, self.message)
    }
}

/// Result of validating a configuration.
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub diagnostics: Vec<Diagnostic>,
}

impl ValidationResult {
    /// Returns `true` if any diagnostic is an error.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    /// Count diagnostics by severity.
    #[must_use]
    pub fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }

    fn push(&mut self, severity: Severity, path: &'static str, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic {
            severity,
            path,
            message: message.into(),
        });
    }
}

/// Check values that parse fine but cannot drive a session.
#[must_use]
pub fn validate(config: &StreamchatConfig) -> ValidationResult {
    let mut result = ValidationResult::default();

    if config.overlay.limit == 0 {
        result.push(
            Severity::Error,
            "overlay.limit",
            "must be at least 1 or nothing is ever visible",
        );
    }
    if !config.overlay.speed.is_finite() || config.overlay.speed < 0.0 {
        result.push(
            Severity::Error,
            "overlay.speed",
            format!("must be a non-negative number, got {}", config.overlay.speed),
        );
    }

    let yt = &config.youtube;
    if yt.api_key_str().is_empty() {
        result.push(Severity::Error, "youtube.api_key", "no API key configured");
    }
    if yt.channels.is_empty() {
        result.push(Severity::Error, "youtube.channels", "no channels configured");
    }
    if yt.channels.iter().any(|c| c.trim().is_empty()) {
        result.push(
            Severity::Warning,
            "youtube.channels",
            "blank channel names will fail to resolve",
        );
    }
    if yt.default_poll_interval_ms == 0 {
        result.push(
            Severity::Error,
            "youtube.default_poll_interval_ms",
            "must be greater than zero",
        );
    }
    if yt.max_results == 0 {
        result.push(
            Severity::Warning,
            "youtube.max_results",
            "zero lets the provider choose the page size",
        );
    }
    if !(yt.base_url.starts_with("https://") || yt.base_url.starts_with("http://")) {
        result.push(
            Severity::Error,
            "youtube.base_url",
            format!("not an http(s) URL: {}", yt.base_url),
        );
    }

    result
}
