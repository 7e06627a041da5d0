use bevy::math::Rect;

use crate::asset::text_format::{self, FormatError};
use crate::config::EmitterConfig;
use crate::emitter::ParticleEmitter;
use crate::error::ConfigError;
use crate::instance::ParticleInstance;

/// A group of emitters that make up one visual effect and move together.
#[derive(Debug, Clone, Default)]
pub struct ParticleEffect {
    /// The effect's emitters, in draw order.
    pub emitters: Vec<ParticleEmitter>,
}

impl ParticleEffect {
    pub fn new(emitters: Vec<ParticleEmitter>) -> Self {
        Self { emitters }
    }

    /// Builds one emitter per configuration.
    pub fn from_configs(
        configs: impl IntoIterator<Item = EmitterConfig>,
    ) -> Result<Self, ConfigError> {
        let emitters = configs
            .into_iter()
            .map(ParticleEmitter::new)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { emitters })
    }

    pub fn start(&mut self) {
        for emitter in &mut self.emitters {
            emitter.start();
        }
    }

    pub fn reset(&mut self) {
        for emitter in &mut self.emitters {
            emitter.reset();
        }
    }

    pub fn update(&mut self, delta_seconds: f32) {
        for emitter in &mut self.emitters {
            emitter.update(delta_seconds);
        }
    }

    pub fn set_position(&mut self, x: f32, y: f32) {
        for emitter in &mut self.emitters {
            emitter.set_position(x, y);
        }
    }

    pub fn allow_completion(&mut self) {
        for emitter in &mut self.emitters {
            emitter.allow_completion();
        }
    }

    /// Whether every emitter has completed. An empty effect is complete.
    pub fn is_complete(&self) -> bool {
        self.emitters.iter().all(ParticleEmitter::is_complete)
    }

    /// The first emitter with the given name.
    pub fn find_emitter(&self, name: &str) -> Option<&ParticleEmitter> {
        self.emitters.iter().find(|emitter| emitter.name() == name)
    }

    pub fn find_emitter_mut(&mut self, name: &str) -> Option<&mut ParticleEmitter> {
        self.emitters.iter_mut().find(|emitter| emitter.name() == name)
    }

    /// Scales the size and motion of every emitter by `scale`.
    pub fn scale_effect(&mut self, scale: f32) {
        for emitter in &mut self.emitters {
            emitter.scale_size(scale, scale);
            emitter.scale_motion(scale);
        }
    }

    pub fn flip_x(&mut self) {
        for emitter in &mut self.emitters {
            emitter.flip_x();
        }
    }

    pub fn flip_y(&mut self) {
        for emitter in &mut self.emitters {
            emitter.flip_y();
        }
    }

    /// Live particles across all emitters.
    pub fn active_count(&self) -> usize {
        self.emitters.iter().map(ParticleEmitter::active_count).sum()
    }

    /// Appends the instances of every emitter to `out`, emitters in order.
    pub fn write_instances(&self, out: &mut Vec<ParticleInstance>) {
        for emitter in &self.emitters {
            emitter.write_instances(out);
        }
    }

    /// Union of the emitters' bounds.
    pub fn bounding_box(&self) -> Option<Rect> {
        self.emitters
            .iter()
            .filter_map(ParticleEmitter::bounding_box)
            .reduce(|a, b| a.union(b))
    }

    /// Writes every emitter in the text format.
    pub fn save(&self) -> String {
        text_format::save_effect(&self.configs())
    }

    /// Reads an effect written by [`save`](Self::save). The effect is not started.
    pub fn load(text: &str) -> Result<Self, FormatError> {
        let configs = text_format::load_effect(text)?;
        Ok(Self::from_configs(configs)?)
    }

    /// The configurations of all emitters, in order.
    pub fn configs(&self) -> Vec<EmitterConfig> {
        self.emitters
            .iter()
            .map(|emitter| emitter.config().clone())
            .collect()
    }
}
