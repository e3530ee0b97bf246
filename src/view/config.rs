use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::geo::LatLng;
use crate::playback::{PlaybackSettings, SpeedScaling};
use crate::water::{MarkerStyle, VisibilityFilter};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid playback.base_interval `{value}`: {message}")]
    Interval { value: String, message: String },
    #[error("playback.default_speed must be positive")]
    Speed,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub map: MapConfig,
    pub markers: MarkerStyle,
    pub playback: PlaybackConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub center: [f64; 2],
    pub zoom: f64,
    pub far_zoom_threshold: f64,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            center: [42.27, -70.997],
            zoom: 14.0,
            far_zoom_threshold: crate::water::visibility::DEFAULT_FAR_ZOOM_THRESHOLD,
        }
    }
}

impl MapConfig {
    pub fn center(&self) -> LatLng {
        LatLng::new(self.center[0], self.center[1])
    }

    pub fn visibility_filter(&self) -> VisibilityFilter {
        VisibilityFilter::new(self.far_zoom_threshold)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Humantime duration, e.g. `1s` or `750ms`.
    pub base_interval: String,
    pub default_speed: u32,
    pub scaling: SpeedScaling,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            base_interval: "1s".to_string(),
            default_speed: 1,
            scaling: SpeedScaling::default(),
        }
    }
}

impl PlaybackConfig {
    pub fn base_interval(&self) -> Result<Duration, ConfigError> {
        let interval = humantime::parse_duration(self.base_interval.trim()).map_err(|e| {
            ConfigError::Interval {
                value: self.base_interval.clone(),
                message: e.to_string(),
            }
        })?;
        if interval.is_zero() {
            return Err(ConfigError::Interval {
                value: self.base_interval.clone(),
                message: "must be non-zero".to_string(),
            });
        }
        Ok(interval)
    }

    pub fn settings(&self) -> Result<PlaybackSettings, ConfigError> {
        if self.default_speed == 0 {
            return Err(ConfigError::Speed);
        }
        Ok(PlaybackSettings {
            base_interval: self.base_interval()?,
            scaling: self.scaling,
        })
    }
}

impl Config {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse and validate. An empty document gives the defaults.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: Config = if yaml.trim().is_empty() {
            Config::default()
        } else {
            serde_yaml::from_str(yaml)?
        };
        config.playback.settings()?;
        Ok(config)
    }
}
