pub mod codec;
mod error;
pub mod layer;
pub mod palette;
pub mod types;
pub mod visibility;

pub use codec::{decode, encode};
pub use error::DecodeError;
pub use layer::{MarkerLayer, MarkerShape, MarkerStyle, StyledMarker, VariantCounts};
pub use palette::{color_for, size_for, Rgb};
pub use types::{VectorDataset, VectorReading};
pub use visibility::{classify, RenderVariant, VisibilityFilter};
