use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use super::error::PlaybackError;
use super::slider::{PositionSlider, SharedSlider};
use crate::geo::SharedViewport;
use crate::view::events::{EventSink, OutboundEvent};

/// Shortest tick period, whatever the speed.
pub const MIN_TICK_INTERVAL: Duration = Duration::from_millis(1);

/// How the speed multiplier turns into motion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeedScaling {
    /// Interval shrinks with speed, one step per tick.
    Rate,
    /// Fixed interval, `speed` steps per tick.
    Step,
    /// Both: effective speed grows with the square of the multiplier.
    #[default]
    Compound,
}

impl SpeedScaling {
    /// Never shorter than [`MIN_TICK_INTERVAL`].
    pub fn interval(self, base: Duration, speed: NonZeroU32) -> Duration {
        let period = match self {
            SpeedScaling::Step => base,
            SpeedScaling::Rate | SpeedScaling::Compound => base / speed.get(),
        };
        period.max(MIN_TICK_INTERVAL)
    }

    pub fn step(self, speed: NonZeroU32) -> u64 {
        match self {
            SpeedScaling::Rate => 1,
            SpeedScaling::Step | SpeedScaling::Compound => u64::from(speed.get()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackSettings {
    pub base_interval: Duration,
    pub scaling: SpeedScaling,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            base_interval: Duration::from_secs(1),
            scaling: SpeedScaling::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum PlaybackMode {
    Stopped,
    Running { speed: u32 },
}

#[derive(Debug)]
struct WorkerHandle {
    stop_tx: oneshot::Sender<()>,
    join: JoinHandle<()>,
}

/// Moves the shared position slider forward on a timer.
///
/// At most one timer task exists per instance: `start` stops the previous
/// one and waits for it before spawning.
pub struct Playback {
    settings: PlaybackSettings,
    slider: SharedSlider,
    viewport: SharedViewport,
    sink: Arc<dyn EventSink>,
    mode: Arc<StdMutex<PlaybackMode>>,
    worker: Option<WorkerHandle>,
}

impl Playback {
    pub fn new(
        settings: PlaybackSettings,
        slider: SharedSlider,
        viewport: SharedViewport,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            settings,
            slider,
            viewport,
            sink,
            mode: Arc::new(StdMutex::new(PlaybackMode::Stopped)),
            worker: None,
        }
    }

    pub fn mode(&self) -> PlaybackMode {
        *self.mode.lock().unwrap()
    }

    pub fn is_running(&self) -> bool {
        matches!(self.mode(), PlaybackMode::Running { .. })
    }

    /// Safe to call when already stopped.
    pub async fn stop(&mut self) {
        if let Some(worker) = self.worker.take() {
            let _ = worker.stop_tx.send(());
            match worker.join.await {
                Ok(()) => debug!("playback timer cancelled"),
                Err(e) => warn!("playback timer exited abnormally: {}", e),
            }
        }
        *self.mode.lock().unwrap() = PlaybackMode::Stopped;
    }

    pub async fn start(&mut self, speed: u32) -> Result<(), PlaybackError> {
        let speed = NonZeroU32::new(speed).ok_or(PlaybackError::InvalidSpeed)?;
        self.stop().await;

        let run = PlaybackRun {
            slider: self.slider.clone(),
            viewport: self.viewport.clone(),
            sink: self.sink.clone(),
            period: self.settings.scaling.interval(self.settings.base_interval, speed),
            step: self.settings.scaling.step(speed),
        };
        info!(
            "playback started at {}x: {} per tick every {:?}",
            speed, run.step, run.period
        );

        *self.mode.lock().unwrap() = PlaybackMode::Running { speed: speed.get() };

        let (stop_tx, stop_rx) = oneshot::channel();
        let mode = self.mode.clone();
        let join = tokio::spawn(async move {
            let _reset = StopOnExit(mode);
            run.run(stop_rx).await;
        });

        self.worker = Some(WorkerHandle { stop_tx, join });
        Ok(())
    }
}

impl Drop for Playback {
    fn drop(&mut self) {
        if let Some(worker) = self.worker.take() {
            let _ = worker.stop_tx.send(());
        }
    }
}

/// Marks playback stopped when the timer task ends, including by panic.
struct StopOnExit(Arc<StdMutex<PlaybackMode>>);

impl Drop for StopOnExit {
    fn drop(&mut self) {
        let mut mode = self.0.lock().unwrap_or_else(|e| e.into_inner());
        *mode = PlaybackMode::Stopped;
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Tick {
    Advanced(u64),
    Finished,
}

/// One read-check-advance step under the slider lock. Stops `step + 1`
/// short of the bound instead of landing on it.
fn tick(slider: &StdMutex<PositionSlider>, step: u64) -> Result<Tick, PlaybackError> {
    let mut slider = slider.lock().unwrap();
    let max = slider.max.ok_or(PlaybackError::MissingTarget)?;

    if slider.position.saturating_add(step + 1) >= max {
        return Ok(Tick::Finished);
    }
    Ok(Tick::Advanced(slider.step_up(step)))
}

struct PlaybackRun {
    slider: SharedSlider,
    viewport: SharedViewport,
    sink: Arc<dyn EventSink>,
    period: Duration,
    step: u64,
}

impl PlaybackRun {
    async fn run(self, mut stop_rx: oneshot::Receiver<()>) {
        let mut ticker = interval_at(Instant::now() + self.period, self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            let should_stop = tokio::select! {
                _ = ticker.tick() => false,
                _ = &mut stop_rx => true,
            };
            if should_stop {
                return;
            }

            match tick(&self.slider, self.step) {
                Ok(Tick::Advanced(position)) => {
                    let zoom_level = self.viewport.lock().unwrap().zoom_level;
                    debug!("playback position {}", position);
                    self.sink.push(OutboundEvent::SetPosition {
                        position: Some(position),
                        zoom_level: Some(zoom_level),
                        play: Some(true),
                    });
                }
                Ok(Tick::Finished) => {
                    info!("playback reached the end of the range");
                    return;
                }
                Err(e) => {
                    warn!("{}, stopping playback", e);
                    return;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::{LatLng, ViewportState};
    use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};
    use tokio::time::sleep;

    struct Fixture {
        playback: Playback,
        slider: SharedSlider,
        events: UnboundedReceiver<OutboundEvent>,
    }

    fn fixture(max: Option<u64>, settings: PlaybackSettings) -> Fixture {
        let slider = Arc::new(StdMutex::new(PositionSlider { position: 0, max }));
        let viewport = Arc::new(StdMutex::new(ViewportState::new(LatLng::new(42.0, -70.0), 14.0)));
        let (tx, events) = unbounded_channel();
        Fixture {
            playback: Playback::new(settings, slider.clone(), viewport, Arc::new(tx)),
            slider,
            events,
        }
    }

    fn positions(events: &mut UnboundedReceiver<OutboundEvent>) -> Vec<u64> {
        let mut out = Vec::new();
        while let Ok(event) = events.try_recv() {
            if let OutboundEvent::SetPosition {
                position: Some(p), ..
            } = event
            {
                out.push(p);
            }
        }
        out
    }

    #[test]
    fn guard_band() {
        let slider = StdMutex::new(PositionSlider::new(10));
        let mut seen = Vec::new();
        while let Ok(Tick::Advanced(p)) = tick(&slider, 2) {
            seen.push(p);
        }
        assert_eq!(seen, vec![2, 4, 6, 8]);
        assert_eq!(tick(&slider, 2), Ok(Tick::Finished));
    }

    #[test]
    fn tiny_range_finishes_immediately() {
        let slider = StdMutex::new(PositionSlider::new(2));
        assert_eq!(tick(&slider, 3), Ok(Tick::Finished));
        assert_eq!(slider.lock().unwrap().position, 0);
    }

    #[test]
    fn detached_slider_is_missing_target() {
        let slider = StdMutex::new(PositionSlider::default());
        assert_eq!(tick(&slider, 1), Err(PlaybackError::MissingTarget));
    }

    #[tokio::test(start_paused = true)]
    async fn advances_by_speed_and_stops_before_the_end() {
        let mut f = fixture(Some(10), PlaybackSettings::default());
        f.playback.start(2).await.unwrap();
        assert_eq!(f.playback.mode(), PlaybackMode::Running { speed: 2 });

        sleep(Duration::from_millis(1200)).await;
        assert_eq!(positions(&mut f.events), vec![2, 4]);

        sleep(Duration::from_secs(10)).await;
        assert_eq!(positions(&mut f.events), vec![6, 8]);
        assert_eq!(f.slider.lock().unwrap().position, 8);
        assert_eq!(f.playback.mode(), PlaybackMode::Stopped);
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_carry_zoom_and_play_flag() {
        let mut f = fixture(Some(100), PlaybackSettings::default());
        f.playback.start(1).await.unwrap();
        sleep(Duration::from_millis(1500)).await;

        assert_eq!(
            f.events.try_recv().unwrap(),
            OutboundEvent::SetPosition {
                position: Some(1),
                zoom_level: Some(14.0),
                play: Some(true)
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn restart_keeps_a_single_timer() {
        let mut f = fixture(Some(100), PlaybackSettings::default());
        f.playback.start(1).await.unwrap();
        f.playback.start(1).await.unwrap();

        sleep(Duration::from_millis(3500)).await;
        assert_eq!(positions(&mut f.events), vec![1, 2, 3]);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_cancels_pending_tick() {
        let mut f = fixture(Some(100), PlaybackSettings::default());
        f.playback.start(1).await.unwrap();
        sleep(Duration::from_millis(1500)).await;
        f.playback.stop().await;
        f.playback.stop().await;

        sleep(Duration::from_secs(5)).await;
        assert_eq!(positions(&mut f.events), vec![1]);
        assert!(!f.playback.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn stop_when_idle_is_a_no_op() {
        let mut f = fixture(Some(100), PlaybackSettings::default());
        f.playback.stop().await;
        assert_eq!(f.playback.mode(), PlaybackMode::Stopped);
    }

    #[tokio::test(start_paused = true)]
    async fn removed_control_stops_playback() {
        let mut f = fixture(Some(100), PlaybackSettings::default());
        f.playback.start(1).await.unwrap();
        sleep(Duration::from_millis(1500)).await;
        f.slider.lock().unwrap().set_max(None);

        sleep(Duration::from_secs(3)).await;
        assert_eq!(positions(&mut f.events), vec![1]);
        assert_eq!(f.playback.mode(), PlaybackMode::Stopped);
        assert_eq!(f.slider.lock().unwrap().position, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_speed_is_rejected() {
        let mut f = fixture(Some(100), PlaybackSettings::default());
        assert_eq!(f.playback.start(0).await, Err(PlaybackError::InvalidSpeed));
        assert!(!f.playback.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn step_scaling_keeps_the_base_interval() {
        let settings = PlaybackSettings {
            base_interval: Duration::from_secs(1),
            scaling: SpeedScaling::Step,
        };
        let mut f = fixture(Some(100), settings);
        f.playback.start(3).await.unwrap();
        sleep(Duration::from_millis(2500)).await;
        assert_eq!(positions(&mut f.events), vec![3, 6]);
    }

    #[tokio::test(start_paused = true)]
    async fn rate_scaling_moves_one_step_faster() {
        let settings = PlaybackSettings {
            base_interval: Duration::from_secs(1),
            scaling: SpeedScaling::Rate,
        };
        let mut f = fixture(Some(100), settings);
        f.playback.start(4).await.unwrap();
        sleep(Duration::from_millis(1100)).await;
        assert_eq!(positions(&mut f.events), vec![1, 2, 3, 4]);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_cancels_the_timer() {
        let mut f = fixture(Some(100), PlaybackSettings::default());
        f.playback.start(1).await.unwrap();
        let Fixture {
            playback,
            slider,
            mut events,
        } = f;
        drop(playback);

        sleep(Duration::from_secs(5)).await;
        assert!(positions(&mut events).is_empty());
        assert_eq!(slider.lock().unwrap().position, 0);
    }

    #[test]
    fn interval_never_reaches_zero() {
        let speed = NonZeroU32::new(2_000_000_000).unwrap();
        assert_eq!(
            SpeedScaling::Rate.interval(Duration::from_secs(1), speed),
            MIN_TICK_INTERVAL
        );
        assert_eq!(
            SpeedScaling::Compound.interval(Duration::from_secs(1), speed),
            MIN_TICK_INTERVAL
        );
    }

    #[tokio::test(start_paused = true)]
    async fn huge_speed_still_ticks_and_stops() {
        let settings = PlaybackSettings {
            base_interval: Duration::from_secs(1),
            scaling: SpeedScaling::Rate,
        };
        let mut f = fixture(Some(5), settings);
        f.playback.start(2_000_000_000).await.unwrap();
        sleep(Duration::from_secs(5)).await;

        assert_eq!(positions(&mut f.events), vec![1, 2, 3]);
        assert_eq!(f.playback.mode(), PlaybackMode::Stopped);
        f.playback.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn huge_compound_speed_finishes_cleanly() {
        let mut f = fixture(Some(10), PlaybackSettings::default());
        f.playback.start(2_000_000_000).await.unwrap();
        sleep(Duration::from_secs(5)).await;

        assert!(positions(&mut f.events).is_empty());
        assert_eq!(f.playback.mode(), PlaybackMode::Stopped);
        assert!(!f.playback.is_running());
    }
}
