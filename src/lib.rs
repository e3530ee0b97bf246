//! Current-vector and boat-track rendering core for an interactive map view.
//!
//! The host view layer feeds [`view::InboundEvent`]s into a [`view::MapView`]
//! and forwards the [`view::OutboundEvent`]s it pushes. Drawing goes through
//! [`render::DrawContext`].

pub mod geo;
pub mod playback;
pub mod render;
pub mod tracks;
pub mod view;
pub mod water;
