use bevy::prelude::*;

use crate::asset::ParticleEffectAsset;
use crate::effect::ParticleEffect;

/// Plays a [`ParticleEffectAsset`] at the entity's [`Transform`].
#[derive(Component)]
#[require(Transform)]
pub struct ParticleEffect2D {
    pub handle: Handle<ParticleEffectAsset>,
}

/// The live simulation of a [`ParticleEffect2D`], inserted once its asset is loaded.
#[derive(Component)]
pub struct EffectRuntime {
    pub effect: ParticleEffect,
    pub paused: bool,
}

impl EffectRuntime {
    /// Wraps an effect and starts it.
    pub fn new(mut effect: ParticleEffect) -> Self {
        effect.start();
        Self {
            effect,
            paused: false,
        }
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn toggle(&mut self) {
        self.paused = !self.paused;
    }

    /// Drops every particle and starts the effect over.
    pub fn restart(&mut self) {
        self.effect.reset();
        self.paused = false;
    }

    pub fn is_complete(&self) -> bool {
        self.effect.is_complete()
    }
}
