/// Console error types
use chorus_playback::PlaybackError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConsoleError>;

#[derive(Debug, Error)]
pub enum ConsoleError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unknown command: {0} (try `help`)")]
    UnknownCommand(String),

    #[error("Usage: {0}")]
    Usage(&'static str),

    #[error("Invalid number: {0}")]
    InvalidNumber(String),

    #[error("Nothing to pick from; run `search` first")]
    NoSearchResults,

    #[error("No search result #{0}")]
    NoSuchResult(usize),

    #[error(transparent)]
    Playback(#[from] PlaybackError),

    #[error(transparent)]
    Transport(#[from] chorus_core::ChorusError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<config::ConfigError> for ConsoleError {
    fn from(err: config::ConfigError) -> Self {
        ConsoleError::Config(err.to_string())
    }
}
