//! YouTube Data API v3 implementation of the live chat provider.

pub mod api;
pub mod client;
pub mod error;

pub use {
    client::YoutubeClient,
    error::{Error, Result},
};
