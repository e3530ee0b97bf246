//! Named events exchanged with the host view layer.
//!
//! Both directions use `{ "event": <name>, "payload": {...} }` when
//! serialized, and [`InboundEvent::from_named`] accepts the name and payload
//! separately, the way a push-event channel delivers them.

use chrono::{DateTime, Utc};
use log::debug;
use serde::{Deserialize, Serialize};
use strum_macros::IntoStaticStr;
use tokio::sync::mpsc::UnboundedSender;

use super::error::EventError;
use crate::geo::Bounds;
use crate::tracks::{BoatId, TrackPoint, TrackedObject};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoatViewPayload {
    pub boat_id: BoatId,
    pub coordinates: Vec<TrackPoint>,
    pub track_color: String,
}

impl From<BoatViewPayload> for TrackedObject {
    fn from(payload: BoatViewPayload) -> Self {
        TrackedObject::new(payload.boat_id, payload.coordinates, payload.track_color)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, IntoStaticStr)]
#[serde(tag = "event", content = "payload", rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum InboundEvent {
    /// Replace every tracked boat.
    BoatViews { boat_views: Vec<BoatViewPayload> },
    AddBoatView { boat_view: BoatViewPayload },
    ClearBoatViews {},
    SetBoatVisible { boat_id: BoatId, visible: bool },
    /// Time window for all boats. Ignored unless all three are set.
    MapState {
        #[serde(default)]
        range_start_at: Option<DateTime<Utc>>,
        #[serde(default)]
        range_end_at: Option<DateTime<Utc>>,
        #[serde(default)]
        inspect_at: Option<DateTime<Utc>>,
    },
    AddWaterMarkers { water_data: Vec<u8> },
    ClearWaterMarkers {},
    /// Pan or zoom reported by the map widget.
    ViewportChanged { bounds: Bounds, zoom_level: f64 },
    /// Recentre the map at the default zoom.
    MapView { latitude: f64, longitude: f64 },
    AnimateTime {
        play: bool,
        #[serde(default)]
        speed: Option<u32>,
    },
    Scrub { position: u64 },
    /// `None` means the position control was removed.
    SetPositionBound {
        #[serde(default)]
        max: Option<u64>,
    },
    ConfigureRange { min: f64, max: f64 },
    SelectRange { min: f64, max: f64 },
    SetRangeEnabled { enabled: bool },
}

impl InboundEvent {
    pub fn from_named(name: &str, payload: serde_json::Value) -> Result<Self, EventError> {
        serde_json::from_value(serde_json::json!({ "event": name, "payload": payload })).map_err(
            |source| EventError::Invalid {
                event: name.to_string(),
                source,
            },
        )
    }

    pub fn name(&self) -> &'static str {
        self.into()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, IntoStaticStr)]
#[serde(tag = "event", content = "payload", rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum OutboundEvent {
    ChangeBounds {
        bounds: Bounds,
        position: u64,
        zoom_level: f64,
    },
    UpdateRange {
        min: f64,
        max: f64,
    },
    SetPosition {
        #[serde(skip_serializing_if = "Option::is_none")]
        position: Option<u64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        zoom_level: Option<f64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        play: Option<bool>,
    },
}

impl OutboundEvent {
    pub fn name(&self) -> &'static str {
        self.into()
    }

    /// The payload alone, for channels that carry the name separately.
    pub fn payload(&self) -> Result<serde_json::Value, serde_json::Error> {
        let mut value = serde_json::to_value(self)?;
        Ok(value["payload"].take())
    }
}

/// Where outbound events go. The host transport sits behind this.
pub trait EventSink: Send + Sync {
    fn push(&self, event: OutboundEvent);
}

impl EventSink for UnboundedSender<OutboundEvent> {
    fn push(&self, event: OutboundEvent) {
        if let Err(e) = self.send(event) {
            debug!("dropping {} event, receiver closed", e.0.name());
        }
    }
}
