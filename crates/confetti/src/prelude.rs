pub use crate::ConfettiPlugin;

pub use crate::asset::{
    ParticleEffectAsset, text_format::FormatError, versioning::VersionStatus,
};
pub use crate::config::{EmitterConfig, EmitterOptions, ParticleCount};
pub use crate::curve::{AttributeCurve, CurvePoint};
pub use crate::effect::ParticleEffect;
pub use crate::emitter::{EmitterPhase, ParticleEmitter};
pub use crate::error::ConfigError;
pub use crate::gradient::{GradientCurve, GradientStop};
pub use crate::instance::{BlendMode, ParticleInstance};
pub use crate::runtime::{EffectRuntime, ParticleEffect2D};
pub use crate::spawn::{EllipseSide, SpawnShape, SpawnShapeValue};
pub use crate::value::{Range as ParticleRange, RangedValue, ScaledValue};
