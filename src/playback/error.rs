use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackError {
    /// The position control went away while playing.
    #[error("playback target is gone")]
    MissingTarget,
    #[error("speed multiplier must be positive")]
    InvalidSpeed,
}
