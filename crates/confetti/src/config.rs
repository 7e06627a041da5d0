use serde::{Deserialize, Serialize};

use crate::asset::serde_helpers::{default_true, is_false, is_true, is_zero_usize};
use crate::curve::AttributeCurve;
use crate::error::ConfigError;
use crate::gradient::GradientCurve;
use crate::spawn::SpawnShapeValue;
use crate::value::{Range, RangedValue, ScaledValue};

macro_rules! serde_default {
    ($name:ident, $ty:ty, $val:expr) => {
        ::paste::paste! {
            fn [<default_ $name>]() -> $ty { $val }
            fn [<is_default_ $name>](v: &$ty) -> bool { *v == [<default_ $name>]() }
        }
    };
}

serde_default!(max_particles, usize, 128);

/// Bounds on the number of live particles of an emitter.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ParticleCount {
    /// Particles are topped up to this many on every emitting step. Defaults to `0`.
    #[serde(default, skip_serializing_if = "is_zero_usize")]
    pub min: usize,
    /// Capacity of the emitter's pool. Defaults to `128`.
    #[serde(
        default = "default_max_particles",
        skip_serializing_if = "is_default_max_particles"
    )]
    pub max: usize,
}

impl Default for ParticleCount {
    fn default() -> Self {
        Self {
            min: 0,
            max: default_max_particles(),
        }
    }
}

/// Behavior switches of an emitter.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct EmitterOptions {
    /// Live particles follow the emitter when it moves.
    #[serde(default, skip_serializing_if = "is_false")]
    pub attached: bool,
    /// The emitter loops forever instead of completing after one phase.
    #[serde(default, skip_serializing_if = "is_false")]
    pub continuous: bool,
    /// Particle rotation is offset by the particle's direction.
    #[serde(default, skip_serializing_if = "is_false")]
    pub aligned: bool,
    /// Additive blending. Defaults to `true`.
    #[serde(default = "default_true", skip_serializing_if = "is_true")]
    pub additive: bool,
    /// Hint for the renderer to draw this emitter behind others.
    #[serde(default, skip_serializing_if = "is_false")]
    pub behind_others: bool,
    /// Colors are handed to the renderer with premultiplied alpha.
    #[serde(default, skip_serializing_if = "is_false")]
    pub premultiplied_alpha: bool,
}

impl Default for EmitterOptions {
    fn default() -> Self {
        Self {
            attached: false,
            continuous: false,
            aligned: false,
            additive: true,
            behind_others: false,
            premultiplied_alpha: false,
        }
    }
}

/// The full declarative description of one emitter.
///
/// Times are in seconds, rates in particles per second and angles in degrees.
/// Emitter-level attributes (`delay`, `duration`, `emission`, `life`,
/// `life_offset`, `spawn_width`, `spawn_height`) are sampled once per phase and
/// scaled over the phase's progress. All others are sampled per particle and
/// scaled over the particle's life.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EmitterConfig {
    /// Display name, used to look emitters up inside an effect.
    pub name: String,
    /// Time before each phase starts emitting.
    pub delay: RangedValue,
    /// Length of one emission phase. Always active.
    pub duration: RangedValue,
    pub count: ParticleCount,
    /// Particles per second. Always active.
    pub emission: ScaledValue,
    /// Particle lifetime. Always active.
    pub life: ScaledValue,
    /// Time each new particle is fast-forwarded by.
    pub life_offset: ScaledValue,
    pub x_offset: RangedValue,
    pub y_offset: RangedValue,
    pub spawn_shape: SpawnShapeValue,
    /// Always active.
    pub spawn_width: ScaledValue,
    /// Always active.
    pub spawn_height: ScaledValue,
    /// Always active.
    pub size: ScaledValue,
    pub speed: ScaledValue,
    pub direction: ScaledValue,
    pub rotation: ScaledValue,
    /// Horizontal velocity added to every particle.
    pub wind: ScaledValue,
    /// Vertical velocity added to every particle.
    pub gravity: ScaledValue,
    pub tint: GradientCurve,
    /// Always active.
    pub opacity: ScaledValue,
    pub options: EmitterOptions,
    /// Seed for the emitter's random generator. When unset the generator is
    /// seeded from the operating system.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fixed_seed: Option<u64>,
}

impl Default for EmitterConfig {
    fn default() -> Self {
        let mut config = Self {
            name: "Untitled".to_string(),
            delay: RangedValue::inactive(),
            duration: RangedValue::constant(1.0),
            count: ParticleCount::default(),
            emission: ScaledValue::new(
                Range::zero(),
                Range::constant(10.0),
                AttributeCurve::default(),
            ),
            life: ScaledValue::new(
                Range::zero(),
                Range::constant(1.0),
                AttributeCurve::default(),
            ),
            life_offset: ScaledValue::inactive(),
            x_offset: RangedValue::inactive(),
            y_offset: RangedValue::inactive(),
            spawn_shape: SpawnShapeValue::default(),
            spawn_width: ScaledValue::constant(0.0),
            spawn_height: ScaledValue::constant(0.0),
            size: ScaledValue::new(
                Range::zero(),
                Range::constant(32.0),
                AttributeCurve::default(),
            ),
            speed: ScaledValue::new(
                Range::zero(),
                Range::constant(80.0),
                AttributeCurve::default(),
            ),
            direction: ScaledValue::new(
                Range::zero(),
                Range::new(1.0, 360.0),
                AttributeCurve::default(),
            ),
            rotation: ScaledValue::new(
                Range::new(1.0, 360.0),
                Range::constant(180.0),
                AttributeCurve::linear(0.0, 1.0),
            )
            .relative(true),
            wind: ScaledValue::inactive(),
            gravity: ScaledValue::inactive(),
            tint: GradientCurve::white(),
            opacity: ScaledValue {
                curve: fade_in_out(),
                ..ScaledValue::new(
                    Range::zero(),
                    Range::constant(1.0),
                    AttributeCurve::default(),
                )
            },
            options: EmitterOptions::default(),
            fixed_seed: None,
        };
        config.mark_required();
        config
    }
}

fn fade_in_out() -> AttributeCurve {
    AttributeCurve::from_parts(&[0.0, 0.2, 0.8, 1.0], &[0.0, 1.0, 1.0, 0.0])
        .unwrap_or_default()
}

impl EmitterConfig {
    /// A default configuration with the given name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Flags the attributes an emitter cannot run without as always active.
    ///
    /// The flag is structural and not serialized, so it must be re-applied to
    /// every deserialized configuration. Emitters do this on construction.
    pub fn mark_required(&mut self) {
        self.duration.always_active = true;
        self.duration.active = true;
        for value in [
            &mut self.emission,
            &mut self.life,
            &mut self.size,
            &mut self.opacity,
            &mut self.spawn_width,
            &mut self.spawn_height,
        ] {
            value.ranged.always_active = true;
            value.ranged.active = true;
        }
    }

    /// Rejects names with line breaks and ranges holding NaN or an infinity.
    ///
    /// Curves and gradients are validated when they are built, so only the
    /// name and the sampled ranges are checked here.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.contains(['\n', '\r']) {
            return Err(ConfigError::MultiLineName(self.name.clone()));
        }
        let ranged = [
            ("delay", &self.delay),
            ("duration", &self.duration),
            ("x_offset", &self.x_offset),
            ("y_offset", &self.y_offset),
        ];
        for (attribute, value) in ranged {
            if !value.low.is_finite() {
                return Err(ConfigError::NonFiniteRange { attribute });
            }
        }
        for (attribute, value) in self.scaled_values() {
            if !value.low().is_finite() || !value.high.is_finite() {
                return Err(ConfigError::NonFiniteRange { attribute });
            }
        }
        Ok(())
    }

    /// Every scaled attribute with its name, in text format order.
    pub fn scaled_values(&self) -> [(&'static str, &ScaledValue); 12] {
        [
            ("emission", &self.emission),
            ("life", &self.life),
            ("life_offset", &self.life_offset),
            ("spawn_width", &self.spawn_width),
            ("spawn_height", &self.spawn_height),
            ("size", &self.size),
            ("speed", &self.speed),
            ("direction", &self.direction),
            ("rotation", &self.rotation),
            ("wind", &self.wind),
            ("gravity", &self.gravity),
            ("opacity", &self.opacity),
        ]
    }
}
