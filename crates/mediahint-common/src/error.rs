//! Common error types used throughout mediahint.
//!
//! Provider failures are classified here so they can be logged precisely, but
//! the engine collapses every variant into "no usable data from this provider".

/// Common error type for mediahint.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The request never produced a response (timeout, DNS, connection reset).
    #[error("{provider} transport error: {message}")]
    Transport {
        provider: &'static str,
        message: String,
    },

    /// The provider answered with a non-success HTTP status.
    #[error("{provider} returned HTTP {status}")]
    Status { provider: &'static str, status: u16 },

    /// The response body did not have the expected shape.
    #[error("{provider} response could not be decoded: {message}")]
    Decode {
        provider: &'static str,
        message: String,
    },

    /// The query was superseded and its work aborted.
    #[error("request cancelled")]
    Cancelled,

    /// The provider is missing credentials or is disabled.
    #[error("{0} is not configured")]
    NotConfigured(&'static str),

    /// Invalid input was provided.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl Error {
    /// Create a new Transport error.
    pub fn transport<S: Into<String>>(provider: &'static str, msg: S) -> Self {
        Self::Transport {
            provider,
            message: msg.into(),
        }
    }

    /// Create a new Decode error.
    pub fn decode<S: Into<String>>(provider: &'static str, msg: S) -> Self {
        Self::Decode {
            provider,
            message: msg.into(),
        }
    }

    /// Create a new InvalidInput error.
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Returns `true` if this error only reflects a superseded query.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::transport("omdb", "connection reset");
        assert_eq!(err.to_string(), "omdb transport error: connection reset");

        let err = Error::Status {
            provider: "anilist",
            status: 503,
        };
        assert_eq!(err.to_string(), "anilist returned HTTP 503");

        let err = Error::NotConfigured("tmdb");
        assert_eq!(err.to_string(), "tmdb is not configured");
    }

    #[test]
    fn test_cancelled_detection() {
        assert!(Error::Cancelled.is_cancelled());
        assert!(!Error::decode("itunes", "missing results").is_cancelled());
    }
}
