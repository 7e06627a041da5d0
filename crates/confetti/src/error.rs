use thiserror::Error;

/// Errors raised when an emitter is configured with values it cannot simulate.
///
/// These are contract violations detected eagerly, when a curve, gradient or
/// emitter is built. Nothing is coerced silently.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// A curve was given no points.
    #[error("curve must contain at least one point")]
    EmptyCurve,
    /// A curve point's time is earlier than the point before it.
    #[error("curve point {index} has time {time}, which is earlier than the previous point")]
    UnorderedCurve {
        /// Index of the offending point.
        index: usize,
        /// Its time.
        time: f32,
    },
    /// A curve point contains NaN or an infinity.
    #[error("curve point {index} is not finite")]
    NonFiniteCurve {
        /// Index of the offending point.
        index: usize,
    },
    /// The timeline and scaling arrays of a curve differ in length.
    #[error("curve has {timeline} timeline entries but {scaling} scaling entries")]
    CurveLengthMismatch {
        /// Number of timeline entries.
        timeline: usize,
        /// Number of scaling entries.
        scaling: usize,
    },
    /// A gradient was given no stops.
    #[error("gradient must contain at least one stop")]
    EmptyGradient,
    /// A gradient stop's time is earlier than the stop before it.
    #[error("gradient stop {index} has time {time}, which is earlier than the previous stop")]
    UnorderedGradient {
        /// Index of the offending stop.
        index: usize,
        /// Its time.
        time: f32,
    },
    /// The flat color array does not hold three channels per timeline entry.
    #[error("gradient has {timeline} timeline entries but {colors} color channels (expected {})", .timeline * 3)]
    GradientColorMismatch {
        /// Number of timeline entries.
        timeline: usize,
        /// Number of color channels.
        colors: usize,
    },
    /// A spawn shape name was not recognized.
    #[error("unknown spawn shape \"{0}\"")]
    UnknownSpawnShape(String),
    /// An ellipse side name was not recognized.
    #[error("unknown ellipse side \"{0}\"")]
    UnknownEllipseSide(String),
    /// An emitter name spans several lines and cannot be saved as text.
    #[error("emitter name {0:?} contains a line break")]
    MultiLineName(String),
    /// A range bound of the named attribute is NaN or infinite.
    #[error("attribute \"{attribute}\" has a non-finite range")]
    NonFiniteRange {
        /// The attribute whose range is invalid.
        attribute: &'static str,
    },
}
