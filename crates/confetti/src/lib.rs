//! A real-time 2D particle emission engine for Bevy.
//!
//! Effects are described declaratively by [`EmitterConfig`]s: emission rate,
//! particle lifetime, spawn geometry and curves that shape size, speed,
//! direction, rotation, wind, gravity, tint and opacity over time. A
//! [`ParticleEmitter`] turns one configuration into a bounded pool of live
//! particles, aging, spawning and retiring them once per update. A
//! [`ParticleEffect`] groups emitters that move together.
//!
//! The simulation core has no dependency on the ECS and can be driven by hand:
//!
//! ```
//! use confetti::{EmitterConfig, ParticleEmitter};
//!
//! let mut emitter = ParticleEmitter::new(EmitterConfig::default()).unwrap();
//! emitter.start();
//! emitter.update(1.0 / 60.0);
//! assert_eq!(emitter.active_count(), 1);
//! ```
//!
//! [`ConfettiPlugin`] loads [`ParticleEffectAsset`]s from `.ron` and `.p`
//! files and simulates every [`ParticleEffect2D`] entity from [`Time`].

pub mod asset;
pub mod config;
pub mod curve;
pub mod effect;
pub mod emitter;
pub mod error;
pub mod gradient;
pub mod instance;
pub mod pool;
pub mod prelude;
pub mod runtime;
pub mod spawn;
pub mod spawning;
pub mod value;

use bevy::prelude::*;

use asset::{ParticleEffectAsset, ParticleEffectAssetLoader, ParticleTextAssetLoader};
use spawning::{
    cleanup_particle_effects, reload_particle_effects, setup_particle_effects,
    update_particle_effects,
};

pub struct ConfettiPlugin;

impl Plugin for ConfettiPlugin {
    fn build(&self, app: &mut App) {
        app.init_asset::<ParticleEffectAsset>()
            .init_asset_loader::<ParticleEffectAssetLoader>()
            .init_asset_loader::<ParticleTextAssetLoader>();

        app.add_systems(
            Update,
            (
                reload_particle_effects,
                setup_particle_effects,
                update_particle_effects,
                cleanup_particle_effects,
            )
                .chain(),
        );
    }
}

pub use asset::text_format::FormatError;
pub use config::{EmitterConfig, EmitterOptions, ParticleCount};
pub use curve::{AttributeCurve, CurvePoint};
pub use effect::ParticleEffect;
pub use emitter::{EmitterPhase, MAX_STEP, ParticleEmitter, UpdateFlags};
pub use error::ConfigError;
pub use gradient::{GradientCurve, GradientStop};
pub use instance::{BlendMode, ParticleInstance};
pub use pool::{Particle, ParticlePool};
pub use runtime::{EffectRuntime, ParticleEffect2D};
pub use spawn::{EllipseSide, SpawnSample, SpawnShape, SpawnShapeValue};
pub use value::{AnimatedValue, Range, RangedValue, ScaledValue};
