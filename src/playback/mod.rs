mod error;
pub mod scheduler;
pub mod slider;

pub use error::PlaybackError;
pub use scheduler::{Playback, PlaybackMode, PlaybackSettings, SpeedScaling};
pub use slider::{PositionSlider, RangeSelection, SharedSlider};
