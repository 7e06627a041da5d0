use bevy::log::{debug, trace};
use bevy::math::{Rect, Vec2};
use bitflags::bitflags;
use rand::SeedableRng;
use rand::rngs::SmallRng;

use crate::config::{EmitterConfig, EmitterOptions};
use crate::error::ConfigError;
use crate::gradient::GradientCurve;
use crate::instance::{BlendMode, ParticleInstance};
use crate::pool::{Particle, ParticlePool};
use crate::spawn::{self, SpawnShapeValue};
use crate::value::{AnimatedValue, RangedValue, ScaledValue};

/// Longest time step a single update simulates, in seconds.
pub const MAX_STEP: f32 = 0.25;

bitflags! {
    /// Per-particle work done while aging, computed once per phase from the
    /// emitter's configuration.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct UpdateFlags: u32 {
        /// Size changes over life.
        const SIZE = 1 << 0;
        /// Rotation is recomputed every step.
        const ROTATION = 1 << 1;
        /// Direction changes over life.
        const DIRECTION = 1 << 2;
        /// Particles move along their direction.
        const SPEED = 1 << 3;
        /// Speed changes over life.
        const SPEED_CURVE = 1 << 4;
        /// Particles are pushed horizontally.
        const WIND = 1 << 5;
        /// Particles are pushed vertically.
        const GRAVITY = 1 << 6;
        /// Opacity changes over life.
        const OPACITY = 1 << 7;
        /// Tint changes over life.
        const TINT = 1 << 8;
    }
}

impl UpdateFlags {
    /// Computes the flags for a configuration.
    pub fn from_config(config: &EmitterConfig) -> Self {
        let animated = |value: &ScaledValue| value.is_active() && value.curve.is_animated();
        let mut flags = Self::empty();
        flags.set(Self::SIZE, animated(&config.size));
        flags.set(Self::DIRECTION, animated(&config.direction));
        flags.set(
            Self::ROTATION,
            animated(&config.rotation)
                || (config.rotation.is_active()
                    && config.options.aligned
                    && flags.contains(Self::DIRECTION)),
        );
        flags.set(Self::SPEED, config.speed.is_active());
        flags.set(Self::SPEED_CURVE, animated(&config.speed));
        flags.set(Self::WIND, config.wind.is_active());
        flags.set(Self::GRAVITY, config.gravity.is_active());
        flags.set(Self::OPACITY, animated(&config.opacity));
        flags.set(Self::TINT, config.tint.is_animated());
        flags
    }
}

/// Where an emitter is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EmitterPhase {
    /// Not started. Existing particles still age.
    #[default]
    Idle,
    /// Waiting for the phase delay to elapse.
    Delaying,
    /// Spawning particles.
    Emitting,
    /// The last phase ended. Existing particles still age.
    Complete,
}

// base/delta pairs sampled once per phase
#[derive(Debug, Clone, Copy, Default)]
struct PhaseValues {
    emission: (f32, f32),
    life: (f32, f32),
    life_offset: (f32, f32),
    spawn_width: (f32, f32),
    spawn_height: (f32, f32),
}

macro_rules! attribute_accessors {
    ($($name:ident: $ty:ty),* $(,)?) => {
        ::paste::paste! {
            $(
                #[doc = concat!("The `", stringify!($name), "` attribute.")]
                pub fn $name(&self) -> &$ty {
                    &self.config.$name
                }

                #[doc = concat!("Mutable access to the `", stringify!($name), "` attribute. Emitter-level values take effect on the next phase.")]
                pub fn [<$name _mut>](&mut self) -> &mut $ty {
                    &mut self.config.$name
                }
            )*
        }
    };
}

/// A single particle emitter: configuration, phase state and particle pool.
///
/// Call [`start`](Self::start) once, then [`update`](Self::update) every
/// frame. Read the live particles with [`iter`](Self::iter) or hand them to a
/// renderer with [`write_instances`](Self::write_instances).
#[derive(Debug, Clone)]
pub struct ParticleEmitter {
    config: EmitterConfig,
    pool: ParticlePool,
    rng: SmallRng,
    flags: UpdateFlags,
    phase: EmitterPhase,
    position: Vec2,
    delay_remaining: f32,
    phase_elapsed: f32,
    phase_duration: f32,
    emission_accumulator: f32,
    first_activation_pending: bool,
    completion_allowed: bool,
    phase_values: PhaseValues,
}

impl ParticleEmitter {
    /// Builds an idle emitter from a configuration.
    ///
    /// Required attributes are flagged as always active, and ranges are
    /// validated.
    pub fn new(mut config: EmitterConfig) -> Result<Self, ConfigError> {
        config.mark_required();
        config.validate()?;
        let rng = match config.fixed_seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_os_rng(),
        };
        let flags = UpdateFlags::from_config(&config);
        Ok(Self {
            pool: ParticlePool::new(config.count.max),
            config,
            rng,
            flags,
            phase: EmitterPhase::Idle,
            position: Vec2::ZERO,
            delay_remaining: 0.0,
            phase_elapsed: 0.0,
            phase_duration: 0.0,
            emission_accumulator: 0.0,
            first_activation_pending: false,
            completion_allowed: false,
            phase_values: PhaseValues::default(),
        })
    }

    /// The emitter's configuration.
    pub fn config(&self) -> &EmitterConfig {
        &self.config
    }

    /// Replaces the whole configuration. Live particles are dropped and the
    /// emitter goes back to idle. On error nothing changes.
    pub fn set_config(&mut self, mut config: EmitterConfig) -> Result<(), ConfigError> {
        config.mark_required();
        config.validate()?;
        if let Some(seed) = config.fixed_seed {
            self.rng = SmallRng::seed_from_u64(seed);
        }
        self.pool.set_capacity(config.count.max);
        self.flags = UpdateFlags::from_config(&config);
        self.config = config;
        self.phase = EmitterPhase::Idle;
        self.emission_accumulator = 0.0;
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.config.name = name.into();
    }

    /// Begins emitting: the first emitting step will force one activation.
    pub fn start(&mut self) {
        self.first_activation_pending = true;
        self.completion_allowed = false;
        self.phase_elapsed = 0.0;
        self.phase_duration = 0.0;
        self.restart();
        self.phase = EmitterPhase::Delaying;
    }

    /// Drops all particles and starts over.
    pub fn reset(&mut self) {
        self.emission_accumulator = 0.0;
        self.pool.clear();
        self.start();
    }

    // samples a new phase, carrying over any time spent past the old one
    fn restart(&mut self) {
        let rng = &mut self.rng;
        let config = &self.config;

        self.delay_remaining = config.delay.sample_if_active(rng);
        self.phase_elapsed = (self.phase_elapsed - self.phase_duration).max(0.0);
        self.phase_duration = config.duration.sample(rng).max(0.0);

        let values = &mut self.phase_values;
        values.emission = config.emission.sample_pair(rng);
        if !config.life.independent {
            values.life = config.life.sample_pair(rng);
        }
        if !config.life_offset.independent {
            values.life_offset = if config.life_offset.is_active() {
                config.life_offset.sample_pair(rng)
            } else {
                (0.0, 0.0)
            };
        }
        values.spawn_width = config.spawn_width.sample_pair(rng);
        values.spawn_height = config.spawn_height.sample_pair(rng);

        self.flags = UpdateFlags::from_config(config);
    }

    /// Advances the simulation by `delta_seconds`, clamped to `[0, MAX_STEP]`.
    pub fn update(&mut self, delta_seconds: f32) {
        let dt = if delta_seconds.is_finite() {
            delta_seconds.clamp(0.0, MAX_STEP)
        } else {
            0.0
        };

        let config = &self.config;
        let flags = self.flags;
        self.pool
            .retain_mut(|particle| age_particle(particle, dt, config, flags));

        if matches!(self.phase, EmitterPhase::Idle | EmitterPhase::Complete) {
            return;
        }

        if self.delay_remaining > 0.0 {
            self.phase = EmitterPhase::Delaying;
            self.delay_remaining -= dt;
            return;
        }
        self.phase = EmitterPhase::Emitting;

        if self.first_activation_pending {
            self.first_activation_pending = false;
            self.add_particles(1);
        }

        if self.phase_elapsed < self.phase_duration {
            self.phase_elapsed += dt;
        } else if self.config.options.continuous && !self.completion_allowed {
            self.restart();
            debug!(
                "emitter \"{}\" looped, next phase lasts {}s",
                self.config.name, self.phase_duration
            );
            if self.delay_remaining > 0.0 {
                self.phase = EmitterPhase::Delaying;
                return;
            }
        } else {
            self.phase = EmitterPhase::Complete;
            debug!("emitter \"{}\" completed", self.config.name);
            return;
        }

        self.emit(dt);

        let active = self.pool.active_count();
        if active < self.config.count.min {
            self.add_particles(self.config.count.min - active);
        }
    }

    fn emit(&mut self, dt: f32) {
        let (base, delta) = self.phase_values.emission;
        let rate = self.config.emission.at(self.phase_progress(), base, delta);
        self.emission_accumulator += dt;
        if rate <= 0.0 {
            self.emission_accumulator = 0.0;
            return;
        }

        let demand = (self.emission_accumulator * rate).floor();
        if demand < 1.0 {
            return;
        }
        self.emission_accumulator -= demand / rate;
        let demand = demand as usize;
        let spawned = self.add_particles(demand);
        if spawned < demand {
            trace!(
                "emitter \"{}\" pool is full, dropped {} particles",
                self.config.name,
                demand - spawned
            );
        }
    }

    // progress through the current phase, 1 for zero-length phases
    fn phase_progress(&self) -> f32 {
        if self.phase_duration <= 0.0 {
            return 1.0;
        }
        (self.phase_elapsed / self.phase_duration).clamp(0.0, 1.0)
    }

    /// Activates up to `count` particles, bounded by free capacity. Returns
    /// how many were activated.
    pub fn add_particles(&mut self, count: usize) -> usize {
        let count = count.min(self.pool.free_count());
        for _ in 0..count {
            self.activate_particle();
        }
        count
    }

    fn activate_particle(&mut self) {
        let percent = self.phase_progress();
        let rng = &mut self.rng;
        let config = &self.config;

        let (life_base, life_delta) = if config.life.independent {
            config.life.sample_pair(rng)
        } else {
            self.phase_values.life
        };
        let total_life = config.life.at(percent, life_base, life_delta);

        let (offset_base, offset_delta) = if !config.life_offset.is_active() {
            (0.0, 0.0)
        } else if config.life_offset.independent {
            config.life_offset.sample_pair(rng)
        } else {
            self.phase_values.life_offset
        };
        let life_offset = config.life_offset.at(percent, offset_base, offset_delta);

        let mut particle = Particle {
            remaining_life: total_life,
            total_life,
            size: animate_if_active(&config.size, rng),
            rotation: animate_if_active(&config.rotation, rng),
            speed: animate_if_active(&config.speed, rng),
            direction: animate_if_active(&config.direction, rng),
            opacity: animate_if_active(&config.opacity, rng),
            wind: animate_if_active(&config.wind, rng),
            gravity: animate_if_active(&config.gravity, rng),
            tint: config.tint.color_at(0.0),
            position: self.position,
        };

        particle.position.x += config.x_offset.sample_if_active(rng);
        particle.position.y += config.y_offset.sample_if_active(rng);

        let (width_base, width_delta) = self.phase_values.spawn_width;
        let (height_base, height_delta) = self.phase_values.spawn_height;
        let width = config.spawn_width.at(percent, width_base, width_delta);
        let height = config.spawn_height.at(percent, height_base, height_delta);
        let sample = spawn::sample(&config.spawn_shape, width, height, rng);
        particle.position += sample.offset;

        if let Some(angle) = sample.edge_angle {
            if !self.flags.contains(UpdateFlags::DIRECTION) {
                particle.direction = AnimatedValue::fixed(angle);
            }
        }
        if config.options.aligned && config.rotation.is_active() {
            particle.rotation.current += particle.direction.current;
        }

        let Some(index) = self.pool.activate(particle) else {
            return;
        };

        if life_offset > 0.0 && total_life > 0.0 {
            let flags = self.flags;
            if let Some(particle) = self.pool.get_mut(index) {
                // never fast-forward a particle to its death
                let offset = life_offset.min(particle.total_life * (1.0 - f32::EPSILON));
                if !age_particle(particle, offset, config, flags) {
                    self.pool.retire(index);
                }
            }
        }
    }

    /// Stops looping and ends the current phase so the emitter winds down.
    /// Cleared by the next [`start`](Self::start).
    pub fn allow_completion(&mut self) {
        self.completion_allowed = true;
        self.phase_elapsed = self.phase_duration;
    }

    /// Whether the emitter has finished and all of its particles are gone.
    ///
    /// Always `false` for continuous emitters unless completion was allowed.
    pub fn is_complete(&self) -> bool {
        if self.config.options.continuous && !self.completion_allowed {
            return false;
        }
        if self.delay_remaining > 0.0 {
            return false;
        }
        self.phase_elapsed >= self.phase_duration && self.pool.is_empty()
    }

    /// Progress through the current phase in `[0, 1]`, `0` while delaying.
    pub fn percent_complete(&self) -> f32 {
        if self.delay_remaining > 0.0 {
            return 0.0;
        }
        if self.phase_duration <= 0.0 {
            return 1.0;
        }
        (self.phase_elapsed / self.phase_duration).min(1.0)
    }

    pub fn phase(&self) -> EmitterPhase {
        self.phase
    }

    /// Moves the emitter's anchor. Attached emitters drag their live particles along.
    pub fn set_position(&mut self, x: f32, y: f32) {
        let position = Vec2::new(x, y);
        if self.config.options.attached {
            let offset = position - self.position;
            self.pool
                .for_each_active_mut(|particle| particle.position += offset);
        }
        self.position = position;
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    attribute_accessors!(
        delay: RangedValue,
        duration: RangedValue,
        emission: ScaledValue,
        life: ScaledValue,
        life_offset: ScaledValue,
        x_offset: RangedValue,
        y_offset: RangedValue,
        spawn_shape: SpawnShapeValue,
        spawn_width: ScaledValue,
        spawn_height: ScaledValue,
        size: ScaledValue,
        speed: ScaledValue,
        direction: ScaledValue,
        rotation: ScaledValue,
        wind: ScaledValue,
        gravity: ScaledValue,
        tint: GradientCurve,
        opacity: ScaledValue,
    );

    pub fn min_particle_count(&self) -> usize {
        self.config.count.min
    }

    pub fn set_min_particle_count(&mut self, min: usize) {
        self.config.count.min = min;
    }

    pub fn max_particle_count(&self) -> usize {
        self.config.count.max
    }

    /// Resizes the pool. All live particles are dropped.
    pub fn set_max_particle_count(&mut self, max: usize) {
        debug!(
            "emitter \"{}\" pool resized from {} to {}",
            self.config.name, self.config.count.max, max
        );
        self.config.count.max = max;
        self.pool.set_capacity(max);
    }

    pub fn options(&self) -> &EmitterOptions {
        &self.config.options
    }

    /// Options that affect aging take effect on the next phase.
    pub fn options_mut(&mut self) -> &mut EmitterOptions {
        &mut self.config.options
    }

    pub fn blend_mode(&self) -> BlendMode {
        BlendMode::from_options(&self.config.options)
    }

    pub fn active_count(&self) -> usize {
        self.pool.active_count()
    }

    pub fn pool(&self) -> &ParticlePool {
        &self.pool
    }

    /// Live particles with their slot index, in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &Particle)> + '_ {
        self.pool.iter()
    }

    pub fn for_each_active(&self, f: impl FnMut(usize, &Particle)) {
        self.pool.for_each_active(f);
    }

    /// Appends one instance per live particle to `out`, in slot order.
    pub fn write_instances(&self, out: &mut Vec<ParticleInstance>) {
        out.reserve(self.pool.active_count());
        out.extend(
            self.pool
                .iter()
                .map(|(_, particle)| ParticleInstance::from_particle(particle, &self.config.options)),
        );
    }

    /// Axis-aligned bounds of all live particles, each expanded by half its size.
    pub fn bounding_box(&self) -> Option<Rect> {
        self.pool.iter().fold(None, |bounds, (_, particle)| {
            let half = Vec2::splat(particle.size.current.abs() / 2.0);
            let rect =
                Rect::from_corners(particle.position - half, particle.position + half);
            Some(match bounds {
                Some(bounds) => bounds.union(rect),
                None => rect,
            })
        })
    }

    /// Scales the size attribute by `scale_x`, the horizontal spawn extent by
    /// `scale_x` and the vertical spawn extent by `scale_y`.
    pub fn scale_size(&mut self, scale_x: f32, scale_y: f32) {
        let config = &mut self.config;
        config.size.scale(scale_x);
        config.x_offset.scale(scale_x);
        config.spawn_width.scale(scale_x);
        config.y_offset.scale(scale_y);
        config.spawn_height.scale(scale_y);
    }

    /// Scales speed, wind and gravity.
    pub fn scale_motion(&mut self, scale: f32) {
        let config = &mut self.config;
        config.speed.scale(scale);
        config.wind.scale(scale);
        config.gravity.scale(scale);
    }

    /// Mirrors the emitter vertically.
    pub fn flip_y(&mut self) {
        let config = &mut self.config;
        config.direction.negate();
        config.rotation.negate();
        config.wind.negate();
        config.gravity.negate();
        config.y_offset.low = config.y_offset.low.negated();
    }

    /// Mirrors the emitter horizontally: directions `d` become `180 - d`.
    pub fn flip_x(&mut self) {
        let config = &mut self.config;
        config.direction.reflect(90.0);
        config.rotation.negate();
        config.wind.negate();
        config.x_offset.low = config.x_offset.low.negated();
    }

    /// Copies the size and spawn extent ranges of `other`.
    pub fn match_size(&mut self, other: &ParticleEmitter) {
        self.match_x_size(other);
        self.match_y_size(other);
    }

    /// Copies the size, x offset and spawn width ranges of `other`.
    pub fn match_x_size(&mut self, other: &ParticleEmitter) {
        let config = &mut self.config;
        config.size.match_ranges(&other.config.size);
        config.spawn_width.match_ranges(&other.config.spawn_width);
        config.x_offset.low = other.config.x_offset.low;
    }

    /// Copies the y offset and spawn height ranges of `other`.
    pub fn match_y_size(&mut self, other: &ParticleEmitter) {
        let config = &mut self.config;
        config.spawn_height.match_ranges(&other.config.spawn_height);
        config.y_offset.low = other.config.y_offset.low;
    }

    /// Copies the speed, wind and gravity ranges of `other`.
    pub fn match_motion(&mut self, other: &ParticleEmitter) {
        let config = &mut self.config;
        config.speed.match_ranges(&other.config.speed);
        config.wind.match_ranges(&other.config.wind);
        config.gravity.match_ranges(&other.config.gravity);
    }

    /// Reseeds the random generator.
    pub fn reseed(&mut self, seed: u64) {
        self.rng = SmallRng::seed_from_u64(seed);
    }
}

fn animate_if_active(value: &ScaledValue, rng: &mut SmallRng) -> AnimatedValue {
    if value.is_active() {
        value.animate(rng)
    } else {
        AnimatedValue::default()
    }
}

// returns false once the particle has died
fn age_particle(particle: &mut Particle, dt: f32, config: &EmitterConfig, flags: UpdateFlags) -> bool {
    particle.remaining_life -= dt;
    if particle.remaining_life <= 0.0 {
        return false;
    }
    let progress = particle.progress();

    if flags.contains(UpdateFlags::SIZE) {
        particle.size.update(config.size.scale_at(progress));
    }
    if flags.contains(UpdateFlags::DIRECTION) {
        particle.direction.update(config.direction.scale_at(progress));
    }
    if flags.contains(UpdateFlags::ROTATION) {
        particle.rotation.update(config.rotation.scale_at(progress));
        if config.options.aligned {
            particle.rotation.current += particle.direction.current;
        }
    }
    if flags.contains(UpdateFlags::OPACITY) {
        particle.opacity.update(config.opacity.scale_at(progress));
    }
    if flags.contains(UpdateFlags::TINT) {
        particle.tint = config.tint.color_at(progress);
    }

    let mut velocity = Vec2::ZERO;
    if flags.contains(UpdateFlags::SPEED) {
        if flags.contains(UpdateFlags::SPEED_CURVE) {
            particle.speed.update(config.speed.scale_at(progress));
        }
        let (sin, cos) = particle.direction.current.to_radians().sin_cos();
        velocity += Vec2::new(cos, sin) * particle.speed.current;
    }
    if flags.contains(UpdateFlags::WIND) {
        velocity.x += particle.wind.update(config.wind.scale_at(progress));
    }
    if flags.contains(UpdateFlags::GRAVITY) {
        velocity.y += particle.gravity.update(config.gravity.scale_at(progress));
    }
    particle.position += velocity * dt;
    true
}
