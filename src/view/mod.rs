pub mod config;
mod error;
pub mod events;
pub mod map_view;

pub use config::{Config, ConfigError};
pub use error::{EventError, ViewError};
pub use events::{BoatViewPayload, EventSink, InboundEvent, OutboundEvent};
pub use map_view::MapView;
