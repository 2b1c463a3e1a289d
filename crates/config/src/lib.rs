//! Configuration loading, validation and env substitution.
//!
//! Config files: `streamchat.toml`, `streamchat.yaml`, or `streamchat.json`
//! Searched in `./` then `~/.config/streamchat/`.
//!
//! Supports `${ENV_VAR}` and `${ENV_VAR:-default}` substitution in the raw text.

pub mod env_subst;
pub mod error;
pub mod loader;
pub mod schema;
pub mod validate;

pub use {
    error::{Error, Result},
    loader::{apply_env_overrides, config_dir, discover_and_load, find_config_file, load_config},
    schema::{OverlayConfig, StreamchatConfig, YoutubeConfig},
    validate::{Diagnostic, Severity, ValidationResult, validate},
};
