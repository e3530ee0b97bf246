use thiserror::Error;

use super::config::ConfigError;
use crate::playback::PlaybackError;
use crate::water::DecodeError;

#[derive(Debug, Error)]
pub enum EventError {
    #[error("invalid `{event}` event: {source}")]
    Invalid {
        event: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Error)]
pub enum ViewError {
    #[error("water data: {0}")]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Event(#[from] EventError),
    #[error("playback: {0}")]
    Playback(#[from] PlaybackError),
    #[error("config: {0}")]
    Config(#[from] ConfigError),
}
