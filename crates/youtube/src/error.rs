use {streamchat_channels::ProviderError, thiserror::Error};

#[derive(Debug, Error)]
pub enum Error {
    #[error("YouTube request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("YouTube API returned HTTP {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("malformed YouTube response: {message}")]
    Malformed { message: String },
}

impl Error {
    #[must_use]
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed {
            message: message.into(),
        }
    }

    /// Convert into the pipeline's error, naming the endpoint involved.
    pub(crate) fn into_provider(self, endpoint: &str) -> ProviderError {
        match self {
            Self::Malformed { message } => {
                ProviderError::malformed(format!("{endpoint}: {message}"))
            },
            // A body that did not decode is a shape problem, not a network one.
            Self::Transport(e) if e.is_decode() => {
                ProviderError::malformed(format!("{endpoint}: {e}"))
            },
            other => ProviderError::transport(endpoint, other),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
