use bytemuck::{Pod, Zeroable};

use crate::config::EmitterOptions;
use crate::pool::Particle;

/// How a renderer should blend an emitter's particles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BlendMode {
    /// `src * alpha + dst`.
    #[default]
    Additive,
    /// `src * alpha + dst * (1 - alpha)`.
    Alpha,
    /// `src + dst * (1 - alpha)`, with colors already multiplied by alpha.
    Premultiplied,
}

impl BlendMode {
    /// The blend mode matching an emitter's options.
    pub fn from_options(options: &EmitterOptions) -> Self {
        if options.premultiplied_alpha {
            Self::Premultiplied
        } else if options.additive {
            Self::Additive
        } else {
            Self::Alpha
        }
    }
}

/// One particle as handed to a renderer, laid out for direct upload.
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct ParticleInstance {
    pub position: [f32; 2],
    pub size: f32,
    /// Degrees.
    pub rotation: f32,
    pub color: [f32; 4], // rgba
}

impl ParticleInstance {
    /// Builds the instance of a live particle.
    ///
    /// With premultiplied alpha the color channels are multiplied by the
    /// opacity, and additive emitters get an alpha of `0` so the blend
    /// equation adds them.
    pub fn from_particle(particle: &Particle, options: &EmitterOptions) -> Self {
        let [r, g, b] = particle.tint;
        let alpha = particle.opacity.current;
        let color = if options.premultiplied_alpha {
            let out_alpha = if options.additive { 0.0 } else { alpha };
            [r * alpha, g * alpha, b * alpha, out_alpha]
        } else {
            [r, g, b, alpha]
        };
        Self {
            position: particle.position.to_array(),
            size: particle.size.current,
            rotation: particle.rotation.current,
            color,
        }
    }
}
