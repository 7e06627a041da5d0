use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// A single breakpoint of an [`AttributeCurve`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct CurvePoint {
    /// Normalized progress in `[0, 1]` at which this point applies.
    pub time: f32,
    /// Scale factor reached at [`time`](Self::time).
    pub scale: f32,
}

impl CurvePoint {
    /// Creates a new curve point.
    pub fn new(time: f32, scale: f32) -> Self {
        Self { time, scale }
    }
}

/// A piecewise-linear function from normalized progress to a scale factor.
///
/// Every "scaled" emitter attribute is modulated by one of these over a
/// particle's lifetime (or over the emitter's phase for emitter-level
/// attributes). A curve always has at least one point and its times never
/// decrease; both are checked when the curve is built or deserialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<CurvePoint>", into = "Vec<CurvePoint>")]
pub struct AttributeCurve {
    points: Vec<CurvePoint>,
}

impl Default for AttributeCurve {
    fn default() -> Self {
        Self::constant(1.0)
    }
}

impl AttributeCurve {
    /// Builds a curve from its breakpoints.
    pub fn new(points: Vec<CurvePoint>) -> Result<Self, ConfigError> {
        validate_points(&points)?;
        Ok(Self { points })
    }

    /// A single-point curve that evaluates to `scale` everywhere.
    pub fn constant(scale: f32) -> Self {
        Self {
            points: vec![CurvePoint::new(0.0, scale)],
        }
    }

    /// A two-point curve going from `from` at progress `0` to `to` at progress `1`.
    pub fn linear(from: f32, to: f32) -> Self {
        Self {
            points: vec![CurvePoint::new(0.0, from), CurvePoint::new(1.0, to)],
        }
    }

    /// Builds a curve from parallel timeline and scaling arrays.
    pub fn from_parts(timeline: &[f32], scaling: &[f32]) -> Result<Self, ConfigError> {
        if timeline.len() != scaling.len() {
            return Err(ConfigError::CurveLengthMismatch {
                timeline: timeline.len(),
                scaling: scaling.len(),
            });
        }
        let points = timeline
            .iter()
            .zip(scaling)
            .map(|(&time, &scale)| CurvePoint::new(time, scale))
            .collect();
        Self::new(points)
    }

    /// The curve's breakpoints, ordered by time.
    pub fn points(&self) -> &[CurvePoint] {
        &self.points
    }

    /// Replaces the breakpoints. On error the curve is left untouched.
    pub fn set_points(&mut self, points: Vec<CurvePoint>) -> Result<(), ConfigError> {
        validate_points(&points)?;
        self.points = points;
        Ok(())
    }

    /// Number of breakpoints. Never zero.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the curve has no points. Built curves hold at least one.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Whether the curve can change value over progress, i.e. has more than one point.
    pub fn is_animated(&self) -> bool {
        self.points.len() > 1
    }

    /// Evaluates the curve at `progress`.
    ///
    /// Progress before the first point returns the first scale and progress past
    /// the last point returns the last scale. Adjacent points sharing a time act
    /// as a step to the later point.
    pub fn evaluate(&self, progress: f32) -> f32 {
        let points = &self.points;
        let Some(end) = points.iter().position(|p| p.time > progress) else {
            // non-empty by construction
            return points[points.len() - 1].scale;
        };
        if end == 0 {
            return points[0].scale;
        }

        let start = points[end - 1];
        let end = points[end];
        let span = end.time - start.time;
        if span <= 0.0 {
            return end.scale;
        }
        start.scale + (end.scale - start.scale) * ((progress - start.time) / span)
    }
}

impl TryFrom<Vec<CurvePoint>> for AttributeCurve {
    type Error = ConfigError;

    fn try_from(points: Vec<CurvePoint>) -> Result<Self, Self::Error> {
        Self::new(points)
    }
}

impl From<AttributeCurve> for Vec<CurvePoint> {
    fn from(curve: AttributeCurve) -> Self {
        curve.points
    }
}

fn validate_points(points: &[CurvePoint]) -> Result<(), ConfigError> {
    if points.is_empty() {
        return Err(ConfigError::EmptyCurve);
    }
    let mut previous = f32::NEG_INFINITY;
    for (index, point) in points.iter().enumerate() {
        if !point.time.is_finite() || !point.scale.is_finite() {
            return Err(ConfigError::NonFiniteCurve { index });
        }
        if point.time < previous {
            return Err(ConfigError::UnorderedCurve {
                index,
                time: point.time,
            });
        }
        previous = point.time;
    }
    Ok(())
}
