use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use std::sync::{Arc, Mutex as StdMutex};
use uuid::Uuid;

use super::config::Config;
use super::error::ViewError;
use super::events::{EventSink, InboundEvent, OutboundEvent};
use crate::geo::{Bounds, LatLng, SharedViewport, ViewportState};
use crate::playback::{Playback, PlaybackMode, PositionSlider, RangeSelection, SharedSlider};
use crate::render::{DrawContext, Projection};
use crate::tracks::{BoatId, BoatView, BoatViewState, TrackedObject};
use crate::water::{self, MarkerLayer, VisibilityFilter};

#[derive(Debug, Clone, Copy, PartialEq)]
struct TimeWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    inspect: DateTime<Utc>,
}

/// Everything one map view owns: the current dataset, the tracked boats, the
/// playback timer and the controls it drives.
pub struct MapView {
    id: Uuid,
    config: Config,
    filter: VisibilityFilter,
    viewport: SharedViewport,
    slider: SharedSlider,
    range: RangeSelection,
    water: Option<MarkerLayer>,
    boats: Vec<BoatView>,
    time_window: Option<TimeWindow>,
    playback: Playback,
    sink: Arc<dyn EventSink>,
}

impl MapView {
    pub fn new(config: Config, sink: Arc<dyn EventSink>) -> Result<Self, ViewError> {
        let settings = config.playback.settings()?;
        let viewport = Arc::new(StdMutex::new(ViewportState::new(
            config.map.center(),
            config.map.zoom,
        )));
        let slider = Arc::new(StdMutex::new(PositionSlider::default()));
        let playback = Playback::new(settings, slider.clone(), viewport.clone(), sink.clone());
        let id = Uuid::new_v4();
        info!("map view {} created", id);

        Ok(Self {
            id,
            filter: config.map.visibility_filter(),
            config,
            viewport,
            slider,
            range: RangeSelection::default(),
            water: None,
            boats: Vec::new(),
            time_window: None,
            playback,
            sink,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub async fn handle_named(
        &mut self,
        name: &str,
        payload: serde_json::Value,
    ) -> Result<(), ViewError> {
        let event = InboundEvent::from_named(name, payload)?;
        self.handle(event).await
    }

    pub async fn handle(&mut self, event: InboundEvent) -> Result<(), ViewError> {
        debug!("view {}: {}", self.id, event.name());
        match event {
            InboundEvent::BoatViews { boat_views } => {
                self.reset_boats(boat_views.into_iter().map(TrackedObject::from).collect())
            }
            InboundEvent::AddBoatView { boat_view } => self.add_boat(boat_view.into()),
            InboundEvent::ClearBoatViews {} => self.clear_boats(),
            InboundEvent::SetBoatVisible { boat_id, visible } => {
                if !self.set_boat_visible(&boat_id, visible) {
                    debug!("no boat {} to toggle", boat_id);
                }
            }
            InboundEvent::MapState {
                range_start_at: Some(start),
                range_end_at: Some(end),
                inspect_at: Some(inspect),
            } => self.set_time(start, end, inspect),
            InboundEvent::MapState { .. } => debug!("incomplete map state ignored"),
            InboundEvent::AddWaterMarkers { water_data } => {
                self.install_water_data(&water_data)?;
            }
            InboundEvent::ClearWaterMarkers {} => self.clear_water(),
            InboundEvent::ViewportChanged { bounds, zoom_level } => {
                self.viewport_changed(bounds, zoom_level)
            }
            InboundEvent::MapView {
                latitude,
                longitude,
            } => self.recenter(LatLng::new(latitude, longitude)),
            InboundEvent::AnimateTime { play, speed } => self.animate(play, speed).await?,
            InboundEvent::Scrub { position } => self.scrub(position),
            InboundEvent::SetPositionBound { max } => self.set_position_bound(max),
            InboundEvent::ConfigureRange { min, max } => self.configure_range(min, max),
            InboundEvent::SelectRange { min, max } => self.select_range(min, max),
            InboundEvent::SetRangeEnabled { enabled } => self.range.enabled = enabled,
        }
        Ok(())
    }

    // water markers

    /// Decode and install a dataset, replacing the previous one. On error the
    /// previous dataset stays.
    pub fn install_water_data(&mut self, buf: &[u8]) -> Result<usize, ViewError> {
        let dataset = water::decode(buf).inspect_err(|e| {
            warn!("view {}: rejecting water data: {}", self.id, e);
        })?;
        let count = dataset.len();
        self.water = Some(MarkerLayer::new(dataset, self.config.markers, self.filter));
        info!("view {}: installed {} water readings", self.id, count);
        Ok(count)
    }

    pub fn clear_water(&mut self) {
        if self.water.take().is_some() {
            info!("view {}: water markers cleared", self.id);
        }
    }

    pub fn water(&self) -> Option<&MarkerLayer> {
        self.water.as_ref()
    }

    /// Redraw the water layer for the current zoom. Returns the number of
    /// markers drawn.
    pub fn repaint<C, P>(&self, ctx: &mut C, projection: &P) -> usize
    where
        C: DrawContext + ?Sized,
        P: Projection + ?Sized,
    {
        match &self.water {
            Some(layer) => layer.repaint(ctx, projection, self.viewport().zoom_level),
            None => 0,
        }
    }

    // boats

    pub fn reset_boats(&mut self, objects: Vec<TrackedObject>) {
        self.boats = objects.into_iter().map(|o| self.new_boat_view(o)).collect();
        info!("view {}: tracking {} boats", self.id, self.boats.len());
    }

    /// Adds a boat, replacing any boat with the same id.
    pub fn add_boat(&mut self, object: TrackedObject) {
        let view = self.new_boat_view(object);
        match self.boats.iter_mut().find(|b| b.id() == view.id()) {
            Some(existing) => *existing = view,
            None => self.boats.push(view),
        }
    }

    pub fn clear_boats(&mut self) {
        self.boats.clear();
    }

    pub fn set_boat_visible(&mut self, id: &BoatId, visible: bool) -> bool {
        match self.boats.iter_mut().find(|b| b.id() == id) {
            Some(boat) => {
                boat.set_visible(visible);
                true
            }
            None => false,
        }
    }

    pub fn set_time(&mut self, start: DateTime<Utc>, end: DateTime<Utc>, inspect: DateTime<Utc>) {
        self.time_window = Some(TimeWindow {
            start,
            end,
            inspect,
        });
        for boat in &mut self.boats {
            boat.set_time(start, inspect);
        }
    }

    pub fn boat_states(&self) -> Vec<BoatViewState> {
        self.boats.iter().map(BoatView::state).collect()
    }

    /// Latest time range as `(start, end, inspect)`.
    pub fn time_window(&self) -> Option<(DateTime<Utc>, DateTime<Utc>, DateTime<Utc>)> {
        self.time_window.map(|w| (w.start, w.end, w.inspect))
    }

    fn new_boat_view(&self, object: TrackedObject) -> BoatView {
        let mut view = BoatView::new(object);
        if let Some(window) = self.time_window {
            view.set_time(window.start, window.inspect);
        }
        view
    }

    // viewport

    pub fn viewport(&self) -> ViewportState {
        *self.viewport.lock().unwrap()
    }

    pub fn viewport_changed(&mut self, bounds: Bounds, zoom_level: f64) {
        {
            let mut viewport = self.viewport.lock().unwrap();
            viewport.bounds = Some(bounds);
            viewport.zoom_level = zoom_level;
        }
        let position = self.slider.lock().unwrap().position;
        self.sink.push(OutboundEvent::ChangeBounds {
            bounds,
            position,
            zoom_level,
        });
    }

    pub fn recenter(&mut self, center: LatLng) {
        let mut viewport = self.viewport.lock().unwrap();
        viewport.center = center;
        viewport.zoom_level = self.config.map.zoom;
    }

    // playback

    pub fn slider(&self) -> PositionSlider {
        *self.slider.lock().unwrap()
    }

    pub fn playback_mode(&self) -> PlaybackMode {
        self.playback.mode()
    }

    pub async fn animate(&mut self, play: bool, speed: Option<u32>) -> Result<(), ViewError> {
        if play {
            let speed = speed.unwrap_or(self.config.playback.default_speed);
            self.playback.start(speed).await?;
        } else {
            self.playback.stop().await;
            self.sink.push(OutboundEvent::SetPosition {
                position: None,
                zoom_level: None,
                play: Some(false),
            });
        }
        Ok(())
    }

    pub fn scrub(&mut self, position: u64) {
        let position = self.slider.lock().unwrap().set_position(position);
        self.sink.push(OutboundEvent::SetPosition {
            position: Some(position),
            zoom_level: Some(self.viewport().zoom_level),
            play: None,
        });
    }

    pub fn set_position_bound(&mut self, max: Option<u64>) {
        self.slider.lock().unwrap().set_max(max);
    }

    // range

    pub fn range(&self) -> RangeSelection {
        self.range
    }

    pub fn configure_range(&mut self, min: f64, max: f64) {
        let (min, max) = self.range.configure(min, max);
        self.sink.push(OutboundEvent::UpdateRange { min, max });
    }

    pub fn select_range(&mut self, min: f64, max: f64) {
        if let Some((min, max)) = self.range.select(min, max) {
            self.sink.push(OutboundEvent::UpdateRange { min, max });
        }
    }

    /// Stop the playback timer. Call before dropping the view.
    pub async fn shutdown(&mut self) {
        self.playback.stop().await;
        info!("map view {} shut down", self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{CommandRecorder, WebMercator};
    use crate::tracks::TrackPoint;
    use crate::water::{encode, VectorDataset, VectorReading};
    use chrono::TimeZone;
    use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};

    fn view() -> (MapView, UnboundedReceiver<OutboundEvent>) {
        let (tx, rx) = unbounded_channel();
        (MapView::new(Config::default(), Arc::new(tx)).unwrap(), rx)
    }

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn boat(id: i64, lng: f64) -> TrackedObject {
        let points = (0..3)
            .map(|i| TrackPoint {
                latitude: 42.0,
                longitude: lng,
                timestamp: at(i * 10),
                heading_radians: None,
            })
            .collect();
        TrackedObject::new(BoatId::Number(id), points, "blue".into())
    }

    fn dataset_bytes() -> Vec<u8> {
        encode(&VectorDataset::new(vec![
            VectorReading {
                latitude: 42.27,
                longitude: -70.997,
                magnitude: 1.0,
                direction_deg: 10.0,
            },
            VectorReading {
                latitude: 42.271,
                longitude: -70.996,
                magnitude: 0.01,
                direction_deg: 0.0,
            },
        ]))
    }

    #[test]
    fn bad_water_data_keeps_previous_dataset() {
        let (mut view, _rx) = view();
        assert_eq!(view.install_water_data(&dataset_bytes()).unwrap(), 2);

        let mut truncated = dataset_bytes();
        truncated.pop();
        assert!(matches!(
            view.install_water_data(&truncated),
            Err(ViewError::Decode(_))
        ));
        assert_eq!(view.water().unwrap().dataset().len(), 2);
    }

    #[test]
    fn new_dataset_replaces_old_one() {
        let (mut view, _rx) = view();
        view.install_water_data(&dataset_bytes()).unwrap();
        view.install_water_data(&[]).unwrap();

        let mut recorder = CommandRecorder::new();
        let projection = WebMercator::new(view.viewport().center, 14.0, 256.0, 256.0);
        assert_eq!(view.repaint(&mut recorder, &projection), 0);
        assert!(recorder.commands().is_empty());
    }

    #[test]
    fn repaint_follows_zoom() {
        let (mut view, _rx) = view();
        view.install_water_data(&dataset_bytes()).unwrap();
        let projection = WebMercator::new(view.viewport().center, 14.0, 256.0, 256.0);

        let mut recorder = CommandRecorder::new();
        assert_eq!(view.repaint(&mut recorder, &projection), 2);

        view.viewport_changed(Bounds::default(), 9.0);
        recorder.clear();
        assert_eq!(view.repaint(&mut recorder, &projection), 1);
    }

    #[test]
    fn boats_added_after_map_state_are_windowed() {
        let (mut view, _rx) = view();
        view.set_time(at(0), at(100), at(10));
        view.add_boat(boat(1, -70.0));

        let states = view.boat_states();
        assert_eq!(states[0].path.len(), 2);
        assert!(states[0].marker.is_some());
    }

    #[test]
    fn adding_a_known_id_replaces_it() {
        let (mut view, _rx) = view();
        view.reset_boats(vec![boat(1, -70.0), boat(2, -71.0)]);
        view.add_boat(boat(1, -72.0));

        let states = view.boat_states();
        assert_eq!(states.len(), 2);
        assert_eq!(states[0].boat_id, BoatId::Number(1));
        view.set_time(at(0), at(100), at(0));
        assert_eq!(view.boat_states()[0].path[0].lng, -72.0);
    }

    #[test]
    fn viewport_change_reports_slider_position() {
        let (mut view, mut rx) = view();
        view.set_position_bound(Some(50));
        view.scrub(12);
        let bounds = Bounds {
            min_lat: 42.0,
            max_lat: 42.5,
            min_lon: -71.0,
            max_lon: -70.5,
        };
        view.viewport_changed(bounds, 13.0);

        assert_eq!(
            rx.try_recv().unwrap(),
            OutboundEvent::SetPosition {
                position: Some(12),
                zoom_level: Some(14.0),
                play: None
            }
        );
        assert_eq!(
            rx.try_recv().unwrap(),
            OutboundEvent::ChangeBounds {
                bounds,
                position: 12,
                zoom_level: 13.0
            }
        );
    }

    #[test]
    fn recenter_resets_zoom() {
        let (mut view, _rx) = view();
        view.viewport_changed(Bounds::default(), 8.0);
        view.recenter(LatLng::new(41.0, -71.0));
        let viewport = view.viewport();
        assert_eq!(viewport.center, LatLng::new(41.0, -71.0));
        assert_eq!(viewport.zoom_level, 14.0);
    }

    #[test]
    fn range_events() {
        let (mut view, mut rx) = view();
        view.configure_range(0.0, 3600.0);
        view.select_range(600.0, 1200.0);
        view.range.enabled = false;
        view.select_range(0.0, 10.0);

        assert_eq!(
            rx.try_recv().unwrap(),
            OutboundEvent::UpdateRange {
                min: 0.0,
                max: 3600.0
            }
        );
        assert_eq!(
            rx.try_recv().unwrap(),
            OutboundEvent::UpdateRange {
                min: 600.0,
                max: 1200.0
            }
        );
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn pause_reports_play_false() {
        let (mut view, mut rx) = view();
        view.set_position_bound(Some(100));
        view.animate(true, None).await.unwrap();
        assert_eq!(view.playback_mode(), PlaybackMode::Running { speed: 1 });

        view.animate(false, None).await.unwrap();
        assert_eq!(view.playback_mode(), PlaybackMode::Stopped);
        assert_eq!(
            rx.try_recv().unwrap(),
            OutboundEvent::SetPosition {
                position: None,
                zoom_level: None,
                play: Some(false)
            }
        );
    }
}
