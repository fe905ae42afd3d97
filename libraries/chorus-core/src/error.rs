/// Core error types for Chorus
use thiserror::Error;

/// Result type alias using `ChorusError`
pub type Result<T> = std::result::Result<T, ChorusError>;

/// Errors reported by the collaborators behind the core traits
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChorusError {
    /// Voice-call transport failure (join, play, pause, volume, ...)
    #[error("Transport error: {0}")]
    Transport(String),

    /// No active voice call exists in the chat
    #[error("No active voice call in chat {0}")]
    NoActiveCall(String),

    /// Metadata or audio extraction failed
    #[error("Resolver error: {0}")]
    Resolver(String),

    /// Search returned nothing for the query
    #[error("No results found for: {0}")]
    NoResults(String),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl ChorusError {
    /// Create a transport error
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create a resolver error
    pub fn resolver(msg: impl Into<String>) -> Self {
        Self::Resolver(msg.into())
    }

    /// Create a no-results error
    pub fn no_results(query: impl Into<String>) -> Self {
        Self::NoResults(query.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_include_context() {
        assert_eq!(
            ChorusError::transport("socket closed").to_string(),
            "Transport error: socket closed"
        );
        assert_eq!(
            ChorusError::no_results("lofi beats").to_string(),
            "No results found for: lofi beats"
        );
        assert_eq!(
            ChorusError::NoActiveCall("-100".into()).to_string(),
            "No active voice call in chat -100"
        );
    }
}
