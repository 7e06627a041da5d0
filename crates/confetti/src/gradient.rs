use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// A color breakpoint of a [`GradientCurve`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct GradientStop {
    /// Normalized progress in `[0, 1]` at which this color applies.
    pub time: f32,
    /// Linear RGB color.
    pub color: [f32; 3],
}

impl GradientStop {
    /// Creates a new gradient stop.
    pub fn new(time: f32, color: [f32; 3]) -> Self {
        Self { time, color }
    }
}

/// A piecewise-linear RGB ramp over normalized progress, used for particle tint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<GradientStop>", into = "Vec<GradientStop>")]
pub struct GradientCurve {
    stops: Vec<GradientStop>,
}

impl Default for GradientCurve {
    fn default() -> Self {
        Self::white()
    }
}

impl GradientCurve {
    /// Builds a gradient from its stops.
    pub fn new(stops: Vec<GradientStop>) -> Result<Self, ConfigError> {
        validate_stops(&stops)?;
        Ok(Self { stops })
    }

    /// A constant white gradient.
    pub fn white() -> Self {
        Self::solid([1.0, 1.0, 1.0])
    }

    /// A single-stop gradient that is `color` everywhere.
    pub fn solid(color: [f32; 3]) -> Self {
        Self {
            stops: vec![GradientStop::new(0.0, color)],
        }
    }

    /// Builds a gradient from a timeline and a flat `r, g, b` array holding
    /// three channels per timeline entry.
    pub fn from_parts(timeline: &[f32], colors: &[f32]) -> Result<Self, ConfigError> {
        if timeline.len() * 3 != colors.len() {
            return Err(ConfigError::GradientColorMismatch {
                timeline: timeline.len(),
                colors: colors.len(),
            });
        }
        let stops = timeline
            .iter()
            .zip(colors.chunks_exact(3))
            .map(|(&time, rgb)| GradientStop::new(time, [rgb[0], rgb[1], rgb[2]]))
            .collect();
        Self::new(stops)
    }

    /// The gradient's stops, ordered by time.
    pub fn stops(&self) -> &[GradientStop] {
        &self.stops
    }

    /// Replaces the stops. On error the gradient is left untouched.
    pub fn set_stops(&mut self, stops: Vec<GradientStop>) -> Result<(), ConfigError> {
        validate_stops(&stops)?;
        self.stops = stops;
        Ok(())
    }

    /// Whether the color changes over progress.
    pub fn is_animated(&self) -> bool {
        self.stops.len() > 1
    }

    /// The flat `r, g, b` channel array, three entries per stop.
    pub fn flat_colors(&self) -> Vec<f32> {
        self.stops.iter().flat_map(|stop| stop.color).collect()
    }

    /// Interpolated color at `progress`, clamped to the first and last stops.
    pub fn color_at(&self, progress: f32) -> [f32; 3] {
        let stops = &self.stops;
        let Some(end) = stops.iter().position(|s| s.time > progress) else {
            return stops[stops.len() - 1].color;
        };
        if end == 0 {
            return stops[0].color;
        }

        let start = stops[end - 1];
        let end = stops[end];
        let span = end.time - start.time;
        if span <= 0.0 {
            return end.color;
        }
        let factor = (progress - start.time) / span;
        [
            start.color[0] + (end.color[0] - start.color[0]) * factor,
            start.color[1] + (end.color[1] - start.color[1]) * factor,
            start.color[2] + (end.color[2] - start.color[2]) * factor,
        ]
    }
}

impl TryFrom<Vec<GradientStop>> for GradientCurve {
    type Error = ConfigError;

    fn try_from(stops: Vec<GradientStop>) -> Result<Self, Self::Error> {
        Self::new(stops)
    }
}

impl From<GradientCurve> for Vec<GradientStop> {
    fn from(gradient: GradientCurve) -> Self {
        gradient.stops
    }
}

fn validate_stops(stops: &[GradientStop]) -> Result<(), ConfigError> {
    if stops.is_empty() {
        return Err(ConfigError::EmptyGradient);
    }
    let mut previous = f32::NEG_INFINITY;
    for (index, stop) in stops.iter().enumerate() {
        if stop.time < previous || stop.time.is_nan() {
            return Err(ConfigError::UnorderedGradient {
                index,
                time: stop.time,
            });
        }
        previous = stop.time;
    }
    Ok(())
}
