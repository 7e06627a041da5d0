use std::fmt;
use std::str::FromStr;

use bevy::math::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::asset::serde_helpers::is_false;
use crate::error::ConfigError;

// rejection attempts before falling back to the polar transform
const MAX_REJECTION_ATTEMPTS: usize = 16;

/// The region around the emitter's anchor in which particles are spawned.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SpawnShape {
    /// All particles spawn at the anchor.
    #[default]
    Point,
    /// Particles spawn along the segment from the anchor to `(width, height)`.
    Line,
    /// Particles spawn inside a `width × height` rectangle centered on the anchor.
    Rectangle,
    /// Particles spawn inside (or on the edge of) an ellipse centered on the anchor.
    Ellipse,
}

impl SpawnShape {
    /// The lowercase name used by the text format.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Point => "point",
            Self::Line => "line",
            Self::Rectangle => "rectangle",
            Self::Ellipse => "ellipse",
        }
    }
}

impl fmt::Display for SpawnShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SpawnShape {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "point" => Ok(Self::Point),
            "line" => Ok(Self::Line),
            // older files call the rectangle a square
            "rectangle" | "square" => Ok(Self::Rectangle),
            "ellipse" => Ok(Self::Ellipse),
            other => Err(ConfigError::UnknownSpawnShape(other.to_string())),
        }
    }
}

/// Which half of an ellipse's boundary edge spawning uses.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EllipseSide {
    /// The full boundary.
    #[default]
    Both,
    /// Angles in `(-180°, 0°]`, so offsets have `dy <= 0`.
    Top,
    /// Angles in `[0°, 180°)`, so offsets have `dy >= 0`.
    Bottom,
}

impl EllipseSide {
    /// The lowercase name used by the text format.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Both => "both",
            Self::Top => "top",
            Self::Bottom => "bottom",
        }
    }
}

impl fmt::Display for EllipseSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EllipseSide {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "both" => Ok(Self::Both),
            "top" => Ok(Self::Top),
            "bottom" => Ok(Self::Bottom),
            other => Err(ConfigError::UnknownEllipseSide(other.to_string())),
        }
    }
}

/// Spawn geometry configuration of an emitter.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq)]
pub struct SpawnShapeValue {
    /// The spawn region.
    #[serde(default)]
    pub shape: SpawnShape,
    /// For ellipses: spawn on the boundary only.
    #[serde(default, skip_serializing_if = "is_false")]
    pub edges_only: bool,
    /// For ellipse edges: which half of the boundary to use.
    #[serde(default)]
    pub side: EllipseSide,
}

impl SpawnShapeValue {
    /// A spawn configuration for `shape` with default edge settings.
    pub fn new(shape: SpawnShape) -> Self {
        Self {
            shape,
            ..Default::default()
        }
    }

    /// An ellipse spawning only on its boundary, restricted to `side`.
    pub fn ellipse_edges(side: EllipseSide) -> Self {
        Self {
            shape: SpawnShape::Ellipse,
            edges_only: true,
            side,
        }
    }
}

/// The result of sampling a spawn shape.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SpawnSample {
    /// Offset from the emitter's anchor.
    pub offset: Vec2,
    /// Angle in degrees of an ellipse edge sample, so callers can align a
    /// particle's direction with it.
    pub edge_angle: Option<f32>,
}

impl SpawnSample {
    fn at(offset: Vec2) -> Self {
        Self {
            offset,
            edge_angle: None,
        }
    }
}

/// Samples a spawn offset for the given shape and current spawn size.
///
/// Deterministic for a given generator state. Degenerate sizes (zero-width
/// line, zero-radius ellipse) produce defined results without looping.
pub fn sample<R: Rng + ?Sized>(
    value: &SpawnShapeValue,
    width: f32,
    height: f32,
    rng: &mut R,
) -> SpawnSample {
    match value.shape {
        SpawnShape::Point => SpawnSample::default(),
        SpawnShape::Rectangle => SpawnSample::at(Vec2::new(
            width * rng.random::<f32>() - width / 2.0,
            height * rng.random::<f32>() - height / 2.0,
        )),
        SpawnShape::Line => {
            let t = rng.random::<f32>();
            if width == 0.0 {
                SpawnSample::at(Vec2::new(0.0, height * t))
            } else {
                SpawnSample::at(Vec2::new(width * t, height * t))
            }
        }
        SpawnShape::Ellipse => {
            let radius = Vec2::new(width / 2.0, height / 2.0);
            if radius.x == 0.0 || radius.y == 0.0 {
                return SpawnSample::default();
            }
            if value.edges_only {
                sample_ellipse_edge(value.side, radius, rng)
            } else {
                SpawnSample::at(sample_unit_disk(rng) * radius)
            }
        }
    }
}

fn sample_ellipse_edge<R: Rng + ?Sized>(side: EllipseSide, radius: Vec2, rng: &mut R) -> SpawnSample {
    let angle = match side {
        EllipseSide::Top => -180.0 * rng.random::<f32>(),
        EllipseSide::Bottom => 180.0 * rng.random::<f32>(),
        EllipseSide::Both => 360.0 * rng.random::<f32>(),
    };
    let (sin, cos) = angle.to_radians().sin_cos();
    SpawnSample {
        offset: Vec2::new(cos * radius.x, sin * radius.y),
        edge_angle: Some(angle),
    }
}

fn sample_unit_disk<R: Rng + ?Sized>(rng: &mut R) -> Vec2 {
    for _ in 0..MAX_REJECTION_ATTEMPTS {
        let point = Vec2::new(
            rng.random::<f32>() * 2.0 - 1.0,
            rng.random::<f32>() * 2.0 - 1.0,
        );
        if point.length_squared() <= 1.0 {
            return point;
        }
    }
    let radius = rng.random::<f32>().sqrt();
    let (sin, cos) = (std::f32::consts::TAU * rng.random::<f32>()).sin_cos();
    Vec2::new(cos * radius, sin * radius)
}
