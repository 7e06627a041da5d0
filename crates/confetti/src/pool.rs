use bevy::math::Vec2;

use crate::value::AnimatedValue;

const WORD_BITS: usize = u64::BITS as usize;

/// A live particle.
///
/// Particles are only created by emitter activation, so every field of a slot
/// is overwritten whenever it is reused.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Particle {
    /// Seconds left before the particle is retired.
    pub remaining_life: f32,
    /// Lifetime the particle was born with, in seconds.
    pub total_life: f32,
    pub size: AnimatedValue,
    /// Degrees.
    pub rotation: AnimatedValue,
    /// Units per second along [`direction`](Self::direction).
    pub speed: AnimatedValue,
    /// Degrees.
    pub direction: AnimatedValue,
    pub opacity: AnimatedValue,
    /// Horizontal velocity in units per second.
    pub wind: AnimatedValue,
    /// Vertical velocity in units per second.
    pub gravity: AnimatedValue,
    /// Linear RGB.
    pub tint: [f32; 3],
    pub position: Vec2,
}

impl Particle {
    /// Normalized age, `0` at birth and `1` at death.
    pub fn progress(&self) -> f32 {
        if self.total_life <= 0.0 {
            return 1.0;
        }
        1.0 - self.remaining_life / self.total_life
    }
}

/// A fixed-capacity arena of particles with an occupancy bitmask.
///
/// Slot indices are stable while a particle is alive. Iteration order is slot
/// order, not activation order.
#[derive(Debug, Clone, Default)]
pub struct ParticlePool {
    slots: Vec<Particle>,
    occupied: Vec<u64>,
    capacity: usize,
    active: usize,
    // no word below this one has a free bit
    free_hint: usize,
}

impl ParticlePool {
    /// Creates an empty pool holding at most `capacity` particles.
    pub fn new(capacity: usize) -> Self {
        let mut pool = Self::default();
        pool.set_capacity(capacity);
        pool
    }

    /// Reallocates the pool. All occupants are dropped.
    pub fn set_capacity(&mut self, capacity: usize) {
        let words = capacity.div_ceil(WORD_BITS);
        self.slots = vec![Particle::default(); capacity];
        self.occupied = vec![0; words];
        // padding bits of the last word are permanently marked occupied
        let tail = capacity % WORD_BITS;
        if tail != 0 {
            if let Some(last) = self.occupied.last_mut() {
                *last = !0u64 << tail;
            }
        }
        self.capacity = capacity;
        self.active = 0;
        self.free_hint = 0;
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn active_count(&self) -> usize {
        self.active
    }

    pub fn free_count(&self) -> usize {
        self.capacity - self.active
    }

    pub fn is_full(&self) -> bool {
        self.active == self.capacity
    }

    pub fn is_empty(&self) -> bool {
        self.active == 0
    }

    /// Whether slot `index` holds a live particle.
    pub fn is_active(&self, index: usize) -> bool {
        index < self.capacity && self.occupied[index / WORD_BITS] & (1u64 << (index % WORD_BITS)) != 0
    }

    /// Stores `particle` in the lowest free slot and returns its index, or
    /// `None` when the pool is full.
    pub fn activate(&mut self, particle: Particle) -> Option<usize> {
        if self.is_full() {
            return None;
        }
        let word = (self.free_hint..self.occupied.len()).find(|&w| self.occupied[w] != !0u64)?;
        let bit = (!self.occupied[word]).trailing_zeros() as usize;
        let index = word * WORD_BITS + bit;

        self.occupied[word] |= 1u64 << bit;
        self.slots[index] = particle;
        self.active += 1;
        self.free_hint = word;
        Some(index)
    }

    /// Frees slot `index`. Returns `false` if it was not active.
    ///
    /// The slot's contents are left as they are until the next activation.
    pub fn retire(&mut self, index: usize) -> bool {
        if !self.is_active(index) {
            return false;
        }
        let word = index / WORD_BITS;
        self.occupied[word] &= !(1u64 << (index % WORD_BITS));
        self.active -= 1;
        self.free_hint = self.free_hint.min(word);
        true
    }

    /// The particle in slot `index`, if it is active.
    pub fn get(&self, index: usize) -> Option<&Particle> {
        self.is_active(index).then(|| &self.slots[index])
    }

    /// Mutable access to the particle in slot `index`, if it is active.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut Particle> {
        if self.is_active(index) {
            Some(&mut self.slots[index])
        } else {
            None
        }
    }

    /// Active particles with their slot index, in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &Particle)> + '_ {
        self.occupied_indices().map(|index| (index, &self.slots[index]))
    }

    /// Calls `f` for every active particle, in slot order.
    pub fn for_each_active(&self, mut f: impl FnMut(usize, &Particle)) {
        for (index, particle) in self.iter() {
            f(index, particle);
        }
    }

    /// Calls `f` for every active particle, retiring those for which it returns `false`.
    pub fn retain_mut(&mut self, mut f: impl FnMut(&mut Particle) -> bool) {
        for word in 0..self.occupied.len() {
            let mut bits = self.occupied[word] & self.valid_mask(word);
            while bits != 0 {
                let bit = bits.trailing_zeros() as usize;
                bits &= bits - 1;
                let index = word * WORD_BITS + bit;
                if !f(&mut self.slots[index]) {
                    self.retire(index);
                }
            }
        }
    }

    /// Calls `f` for every active particle with mutable access, in slot order.
    pub fn for_each_active_mut(&mut self, mut f: impl FnMut(&mut Particle)) {
        self.retain_mut(|particle| {
            f(particle);
            true
        });
    }

    /// Retires every particle.
    pub fn clear(&mut self) {
        for word in 0..self.occupied.len() {
            self.occupied[word] = !self.valid_mask(word);
        }
        self.active = 0;
        self.free_hint = 0;
    }

    fn valid_mask(&self, word: usize) -> u64 {
        let start = word * WORD_BITS;
        let valid = self.capacity.saturating_sub(start).min(WORD_BITS);
        if valid == WORD_BITS {
            !0
        } else {
            (1u64 << valid) - 1
        }
    }

    fn occupied_indices(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.occupied.len()).flat_map(move |word| {
            let mut bits = self.occupied[word] & self.valid_mask(word);
            std::iter::from_fn(move || {
                if bits == 0 {
                    return None;
                }
                let bit = bits.trailing_zeros() as usize;
                bits &= bits - 1;
                Some(word * WORD_BITS + bit)
            })
        })
    }
}
