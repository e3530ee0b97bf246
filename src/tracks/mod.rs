pub mod boat_view;
pub mod types;
pub mod window;

pub use boat_view::{BoatMarker, BoatView, BoatViewState};
pub use types::{BoatId, TrackPoint, TrackedObject};
pub use window::{window_points, window_track, CurrentPosition, TrackWindow};
