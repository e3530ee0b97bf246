use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Channel-wise interpolation, rounded to the nearest integer.
    pub fn lerp(self, other: Rgb, t: f32) -> Rgb {
        let channel = |from: u8, to: u8| {
            let from = f32::from(from);
            (from + (f32::from(to) - from) * t).round().clamp(0.0, 255.0) as u8
        };
        Rgb::new(
            channel(self.r, other.r),
            channel(self.g, other.g),
            channel(self.b, other.b),
        )
    }
}

/// CSS `rgb(r, g, b)` form, which is what canvas stroke styles take.
impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({}, {}, {})", self.r, self.g, self.b)
    }
}

pub const BLUE: Rgb = Rgb::new(0, 0, 255);
pub const CYAN: Rgb = Rgb::new(0, 255, 255);
pub const GREEN: Rgb = Rgb::new(0, 127, 0);
pub const YELLOW: Rgb = Rgb::new(255, 255, 0);
pub const RED: Rgb = Rgb::new(255, 0, 0);

/// Magnitude thresholds (m/s) and the color each one starts at.
pub const COLOR_STOPS: [(f32, Rgb); 5] = [
    (0.0, BLUE),
    (0.56, CYAN),
    (1.13, GREEN),
    (1.69, YELLOW),
    (2.25, RED),
];

/// Magnitude at which markers reach full size.
pub const FULL_SIZE_MAGNITUDE: f32 = 0.56;
pub const MIN_SIZE: f32 = 0.4;

/// Marker color for a magnitude. Anything outside the table, including NaN
/// and negative values, takes the last stop's color.
pub fn color_for(magnitude: f32) -> Rgb {
    COLOR_STOPS
        .windows(2)
        .find_map(|pair| {
            let (lower, from) = pair[0];
            let (upper, to) = pair[1];
            (magnitude >= lower && magnitude < upper)
                .then(|| from.lerp(to, (magnitude - lower) / (upper - lower)))
        })
        .unwrap_or(COLOR_STOPS[COLOR_STOPS.len() - 1].1)
}

/// Size multiplier in (0, 1]. Grows linearly from [`MIN_SIZE`] up to
/// [`FULL_SIZE_MAGNITUDE`] and stays at 1 beyond it.
pub fn size_for(magnitude: f32) -> f32 {
    if magnitude > 0.0 && magnitude <= FULL_SIZE_MAGNITUDE {
        MIN_SIZE + (magnitude / FULL_SIZE_MAGNITUDE) * (1.0 - MIN_SIZE)
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn control_points_are_exact() {
        assert_eq!(color_for(0.0), BLUE);
        assert_eq!(color_for(0.56), CYAN);
        assert_eq!(color_for(1.13), GREEN);
        assert_eq!(color_for(1.69), YELLOW);
    }

    #[test]
    fn clamps_to_last_stop() {
        for magnitude in [2.25, 2.5, 10.0, f32::INFINITY] {
            assert_eq!(color_for(magnitude), RED);
        }
    }

    #[test]
    fn below_table_uses_last_stop() {
        assert_eq!(color_for(-0.1), RED);
        assert_eq!(color_for(f32::NAN), RED);
    }

    #[test]
    fn interpolates_between_stops() {
        // halfway blue -> cyan
        assert_eq!(color_for(0.28), Rgb::new(0, 128, 255));
        // a quarter of the way yellow -> red
        assert_eq!(color_for(1.83), Rgb::new(255, 191, 0));
    }

    #[test]
    fn css_form() {
        assert_eq!(CYAN.to_string(), "rgb(0, 255, 255)");
    }

    #[test]
    fn size_ramp() {
        assert_relative_eq!(size_for(0.28), 0.7, epsilon = 1e-6);
        assert_relative_eq!(size_for(0.56), 1.0);
        assert_relative_eq!(size_for(1e-6), MIN_SIZE, epsilon = 1e-5);
        assert_relative_eq!(size_for(3.0), 1.0);
        assert_relative_eq!(size_for(0.0), 1.0);
    }
}
