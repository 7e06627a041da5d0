use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::asset::serde_helpers::is_false;
use crate::curve::AttributeCurve;

/// A minimum/maximum range of `f32` values, used to randomize particle properties.
///
/// When sampled, a uniformly random value between [`min`](Self::min) and
/// [`max`](Self::max) is selected. A range with `min == max` is a constant.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Range {
    /// Lower bound of the range. Defaults to `0.0`.
    #[serde(default)]
    pub min: f32,
    /// Upper bound of the range. Defaults to `0.0`.
    #[serde(default)]
    pub max: f32,
}

impl Range {
    /// Creates a new range with the given bounds.
    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// A range that always samples `value`.
    pub fn constant(value: f32) -> Self {
        Self {
            min: value,
            max: value,
        }
    }

    /// A range that always samples `0.0`.
    pub fn zero() -> Self {
        Self::constant(0.0)
    }

    /// Whether both bounds are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.min.is_finite() && self.max.is_finite()
    }

    /// Draws `min + (max - min) * u` with `u` uniform in `[0, 1)`.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        self.min + (self.max - self.min) * rng.random::<f32>()
    }

    /// Multiplies both bounds by `factor`.
    pub fn scale(&mut self, factor: f32) {
        self.min *= factor;
        self.max *= factor;
    }

    /// Returns the range with both bounds negated.
    pub fn negated(self) -> Self {
        Self {
            min: -self.min,
            max: -self.max,
        }
    }

    /// Returns the range mirrored across `axis`.
    pub fn reflected(self, axis: f32) -> Self {
        Self {
            min: 2.0 * axis - self.min,
            max: 2.0 * axis - self.max,
        }
    }
}

/// A value sampled once per activation from a uniform range.
///
/// [`active`](Self::active) says whether the feature is used at all (is there
/// an emission delay, are particles offset on X...). Attributes an emitter
/// cannot work without are marked [`always_active`](Self::always_active), which
/// overrides `active`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RangedValue {
    /// Whether this attribute is used. Ignored when `always_active` is set.
    #[serde(default, skip_serializing_if = "is_false")]
    pub active: bool,
    /// Structural flag set by the emitter for required attributes. Not serialized.
    #[serde(skip)]
    pub always_active: bool,
    /// The sampled range.
    #[serde(default)]
    pub low: Range,
}

impl RangedValue {
    /// An active value sampled from `min..max`.
    pub fn new(min: f32, max: f32) -> Self {
        Self {
            active: true,
            always_active: false,
            low: Range::new(min, max),
        }
    }

    /// An active value that always samples `value`.
    pub fn constant(value: f32) -> Self {
        Self::new(value, value)
    }

    /// An inactive value.
    pub fn inactive() -> Self {
        Self::default()
    }

    /// Returns this value marked as always active.
    pub fn required(mut self) -> Self {
        self.always_active = true;
        self
    }

    /// Whether the attribute participates in simulation.
    pub fn is_active(&self) -> bool {
        self.always_active || self.active
    }

    /// Sets the sampled range.
    pub fn set_low(&mut self, min: f32, max: f32) {
        self.low = Range::new(min, max);
    }

    /// Samples the range, regardless of whether the value is active.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        self.low.sample(rng)
    }

    /// Samples the range when active, otherwise returns `0.0` without touching `rng`.
    pub fn sample_if_active<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        if self.is_active() {
            self.sample(rng)
        } else {
            0.0
        }
    }

    /// Permanently scales the range by `factor`.
    pub fn scale(&mut self, factor: f32) {
        self.low.scale(factor);
    }
}

/// A [`RangedValue`] that varies over progress.
///
/// Two endpoints are sampled independently on activation: `low` gives the
/// at-birth baseline and `high` gives either the total change (`relative`) or
/// the absolute value reached when the curve is at `1.0` (not `relative`).
/// The value at a given progress is `base + delta * curve(progress)`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ScaledValue {
    /// Activation gate and the `low` range.
    #[serde(default)]
    pub ranged: RangedValue,
    /// The `high` range.
    #[serde(default)]
    pub high: Range,
    /// Scale factor over progress applied to the sampled delta.
    #[serde(default)]
    pub curve: AttributeCurve,
    /// If `true`, `high` is a delta added to `low`; otherwise it is an absolute end value.
    #[serde(default, skip_serializing_if = "is_false")]
    pub relative: bool,
    /// For life and life offset: sample per particle instead of once per emitter phase.
    #[serde(default, skip_serializing_if = "is_false")]
    pub independent: bool,
}

impl ScaledValue {
    /// An active value going from `low` to `high` (absolute) along `curve`.
    pub fn new(low: Range, high: Range, curve: AttributeCurve) -> Self {
        Self {
            ranged: RangedValue {
                active: true,
                always_active: false,
                low,
            },
            high,
            curve,
            relative: false,
            independent: false,
        }
    }

    /// An active value that is `value` for the whole lifetime.
    pub fn constant(value: f32) -> Self {
        Self::new(
            Range::constant(value),
            Range::constant(value),
            AttributeCurve::constant(1.0),
        )
    }

    /// An active value interpolated linearly from `from` to `to`.
    pub fn linear(from: f32, to: f32) -> Self {
        Self::new(
            Range::constant(from),
            Range::constant(to),
            AttributeCurve::linear(0.0, 1.0),
        )
    }

    /// An inactive value.
    pub fn inactive() -> Self {
        Self::default()
    }

    /// Returns this value marked as always active.
    pub fn required(mut self) -> Self {
        self.ranged.always_active = true;
        self
    }

    /// Returns this value with the relative flag set.
    pub fn relative(mut self, relative: bool) -> Self {
        self.relative = relative;
        self
    }

    /// Returns this value with the independent flag set.
    pub fn independent(mut self, independent: bool) -> Self {
        self.independent = independent;
        self
    }

    /// Whether the attribute participates in simulation.
    pub fn is_active(&self) -> bool {
        self.ranged.is_active()
    }

    /// Turns the attribute on or off.
    pub fn set_active(&mut self, active: bool) {
        self.ranged.active = active;
    }

    /// The `low` range.
    pub fn low(&self) -> Range {
        self.ranged.low
    }

    /// Sets the `low` range.
    pub fn set_low(&mut self, min: f32, max: f32) {
        self.ranged.set_low(min, max);
    }

    /// Sets the `high` range.
    pub fn set_high(&mut self, min: f32, max: f32) {
        self.high = Range::new(min, max);
    }

    /// Curve scale at `progress`.
    pub fn scale_at(&self, progress: f32) -> f32 {
        self.curve.evaluate(progress)
    }

    /// Samples `(base, delta)`, converting an absolute `high` into a delta.
    pub fn sample_pair<R: Rng + ?Sized>(&self, rng: &mut R) -> (f32, f32) {
        let base = self.ranged.sample(rng);
        let mut delta = self.high.sample(rng);
        if !self.relative {
            delta -= base;
        }
        (base, delta)
    }

    /// `base + delta * curve(progress)`.
    pub fn at(&self, progress: f32, base: f32, delta: f32) -> f32 {
        base + delta * self.curve.evaluate(progress)
    }

    /// Samples a fresh [`AnimatedValue`] whose current value is taken at progress `0`.
    pub fn animate<R: Rng + ?Sized>(&self, rng: &mut R) -> AnimatedValue {
        let (base, delta) = self.sample_pair(rng);
        AnimatedValue {
            base,
            delta,
            current: self.at(0.0, base, delta),
        }
    }

    /// Permanently scales both ranges by `factor`.
    pub fn scale(&mut self, factor: f32) {
        self.ranged.scale(factor);
        self.high.scale(factor);
    }

    /// Negates both ranges.
    pub fn negate(&mut self) {
        self.ranged.low = self.ranged.low.negated();
        self.high = self.high.negated();
    }

    /// Mirrors sampled values across `axis`. A relative high range only
    /// changes sign.
    pub fn reflect(&mut self, axis: f32) {
        self.ranged.low = self.ranged.low.reflected(axis);
        self.high = if self.relative {
            self.high.negated()
        } else {
            self.high.reflected(axis)
        };
    }

    /// Copies both ranges of `other`, leaving the curve and flags untouched.
    pub fn match_ranges(&mut self, other: &ScaledValue) {
        self.ranged.low = other.ranged.low;
        self.high = other.high;
    }
}

/// The per-particle state of one scaled attribute.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AnimatedValue {
    /// Value sampled from the `low` range at activation.
    pub base: f32,
    /// Change reached when the curve is at `1.0`.
    pub delta: f32,
    /// Value at the particle's current progress.
    pub current: f32,
}

impl AnimatedValue {
    /// A value that never changes.
    pub fn fixed(value: f32) -> Self {
        Self {
            base: value,
            delta: 0.0,
            current: value,
        }
    }

    /// Recomputes [`current`](Self::current) from a curve scale factor.
    pub fn update(&mut self, scale: f32) -> f32 {
        self.current = self.base + self.delta * scale;
        self.current
    }
}
