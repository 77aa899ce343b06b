use thiserror::Error;

/// Classification of a failed fetch. All kinds are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidRequest,
    Transport,
    Decode,
    Unknown,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidRequest => "invalid_request",
            ErrorKind::Transport => "transport",
            ErrorKind::Decode => "decode",
            ErrorKind::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fetch errors. The `Display` text is the user-visible detail.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Invalid URL")]
    InvalidRequest,

    /// Connection refused, DNS failure, timeout and the like.
    #[error("{0}")]
    Transport(String),

    #[error("Failed to decode response")]
    Decode,

    #[error("Failed to fetch weather")]
    Unknown,
}

impl FetchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FetchError::InvalidRequest => ErrorKind::InvalidRequest,
            FetchError::Transport(_) => ErrorKind::Transport,
            FetchError::Decode => ErrorKind::Decode,
            FetchError::Unknown => ErrorKind::Unknown,
        }
    }
}
