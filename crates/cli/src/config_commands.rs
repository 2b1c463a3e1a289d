use {
    anyhow::Result,
    streamchat_config::{Severity, StreamchatConfig, validate},
};

/// ANSI color codes.
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// Print the diagnostics for the effective configuration.
///
/// Returns `false` when there are errors.
pub fn check(config: &StreamchatConfig, source: Option<&std::path::Path>) -> Result<bool> {
    if let Some(path) = source {
        eprintln!("Checking {}\n", path.display());
    } else {
        eprintln!("No config file found; checking defaults and overrides.\n");
    }

    let result = validate(config);
    for d in &result.diagnostics {
        let (color, label) = match d.severity {
            Severity::Error => (RED, "error"),
            Severity::Warning => (YELLOW, "warning"),
        };
        eprintln!("  {BOLD}{color}{label}{RESET} {}: {}", d.path, d.message);
    }

    let errors = result.count(Severity::Error);
    let warnings = result.count(Severity::Warning);

    if !result.diagnostics.is_empty() {
        eprintln!();
    }

    if errors == 0 && warnings == 0 {
        eprintln!("No issues found.");
    } else {
        eprintln!("{errors} error(s), {warnings} warning(s)");
    }

    println!("{}", serde_json::to_string_pretty(&redacted(config)?)?);

    Ok(errors == 0)
}

/// Effective config as JSON with the API key masked.
fn redacted(config: &StreamchatConfig) -> Result<serde_json::Value> {
    let mut value = serde_json::to_value(config)?;
    if let Some(key) = value.pointer_mut("/youtube/api_key") {
        *key = serde_json::Value::String("[REDACTED]".into());
    }
    Ok(value)
}
