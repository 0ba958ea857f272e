use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Malformed caller input: unparsable URL, unknown endpoint, no query at all
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The article source could not be reached or answered with a failure
    #[error("News API request failed: {0}")]
    Upstream(String),

    /// A single article could not be summarized
    #[error("Summarization failed: {0}")]
    Summarization(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Whether this error aborts a whole request rather than one article
    pub fn is_batch_scope(&self) -> bool {
        !matches!(self, Error::Summarization(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_scope() {
        assert!(Error::InvalidInput("bad url".into()).is_batch_scope());
        assert!(Error::Upstream("apiKeyInvalid".into()).is_batch_scope());
        assert!(!Error::Summarization("timeout".into()).is_batch_scope());
    }

    #[test]
    fn test_upstream_message() {
        let err = Error::Upstream("Your API key is invalid.".into());
        assert_eq!(err.to_string(), "News API request failed: Your API key is invalid.");
    }
}
