use std::path::{Path, PathBuf};

use {
    secrecy::Secret,
    tracing::{debug, warn},
};

use crate::{
    env_subst::substitute_env,
    error::{Error, Result},
    schema::StreamchatConfig,
};

/// Standard config file names, checked in order.
const CONFIG_FILENAMES: &[&str] = &[
    "streamchat.toml",
    "streamchat.yaml",
    "streamchat.yml",
    "streamchat.json",
];

/// Load config from the given path (any supported format).
pub fn load_config(path: &Path) -> Result<StreamchatConfig> {
    let raw = std::fs::read_to_string(path).map_err(|e| Error::read(path, e))?;
    parse_config(&substitute_env(&raw), path)
}

/// Load config from `explicit` when given, otherwise from the first file
/// found in standard locations.
///
/// Search order without an explicit path:
/// 1. `./streamchat.{toml,yaml,yml,json}`
/// 2. `<user config dir>/streamchat/streamchat.{toml,yaml,yml,json}`
///
/// A missing file is not an error and yields the defaults; an explicit path
/// that cannot be read or parsed is.
pub fn discover_and_load(explicit: Option<&Path>) -> Result<StreamchatConfig> {
    if let Some(path) = explicit {
        debug!(path = %path.display(), "loading config");
        return load_config(path);
    }

    let Some(path) = find_config_file() else {
        debug!("no config file found, using defaults");
        return Ok(StreamchatConfig::default());
    };
    debug!(path = %path.display(), "loading config");
    match load_config(&path) {
        Ok(cfg) => Ok(cfg),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to load config, using defaults");
            Ok(StreamchatConfig::default())
        },
    }
}

/// Find the first config file in standard locations.
pub fn find_config_file() -> Option<PathBuf> {
    let local = CONFIG_FILENAMES
        .iter()
        .map(PathBuf::from)
        .find(|p| p.exists());
    if local.is_some() {
        return local;
    }

    let dir = config_dir()?;
    CONFIG_FILENAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|p| p.exists())
}

/// Returns the user-global config directory (`~/.config/streamchat/`).
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "streamchat").map(|d| d.config_dir().to_path_buf())
}

/// Apply `STREAMCHAT_*` and `YOUTUBE_API_KEY` environment overrides.
pub fn apply_env_overrides(config: &mut StreamchatConfig) {
    apply_env_overrides_with(config, |name| std::env::var(name).ok());
}

fn apply_env_overrides_with(
    config: &mut StreamchatConfig,
    lookup: impl Fn(&str) -> Option<String>,
) {
    if let Some(key) = lookup("YOUTUBE_API_KEY").filter(|k| !k.is_empty()) {
        config.youtube.api_key = Some(Secret::new(key));
    }
    if let Some(list) = lookup("STREAMCHAT_CHANNELS") {
        config.youtube.channels = list
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();
    }
    if let Some(url) = lookup("STREAMCHAT_BASE_URL") {
        config.youtube.base_url = url;
    }
    if let Some(raw) = lookup("STREAMCHAT_LIMIT") {
        match raw.parse() {
            Ok(limit) => config.overlay.limit = limit,
            Err(e) => warn!(value = %raw, error = %e, "ignoring invalid STREAMCHAT_LIMIT"),
        }
    }
    if let Some(raw) = lookup("STREAMCHAT_SPEED") {
        match raw.parse() {
            Ok(speed) => config.overlay.speed = speed,
            Err(e) => warn!(value = %raw, error = %e, "ignoring invalid STREAMCHAT_SPEED"),
        }
    }
}

fn parse_config(raw: &str, path: &Path) -> Result<StreamchatConfig> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match ext {
        "toml" => Ok(toml::from_str(raw)?),
        "yaml" | "yml" => Ok(serde_yaml::from_str(raw)?),
        "json" => Ok(serde_json::from_str(raw)?),
        _ => Err(Error::UnsupportedFormat {
            extension: ext.to_string(),
        }),
    }
}
