use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::batch::Quad;
use crate::coords::Vec2;
use crate::paint::Color;
use crate::raster::Texture;
use crate::tessellate::Geometry;
use crate::transform::AffineMatrix;

use super::emission::{EmissionArea, uniform};
use super::pool::{Particle, ParticlePool};
use super::ramp::{Lerp, Ramp};

/// Where a new particle lands in draw order.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum InsertMode {
    /// Appended; drawn over existing particles.
    #[default]
    Top,
    /// Prepended; drawn under existing particles.
    Bottom,
    /// Uniformly random slot.
    Random,
}

/// How particles pick from the quad list.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum QuadSelection {
    /// Walk the list as the particle ages.
    #[default]
    OverLifetime,
    /// Fixed at spawn, cycling through the list.
    RoundRobin,
    /// Fixed at spawn, uniformly random.
    Random,
}

/// Emitter and per-particle configuration.
///
/// Ranges are `(min, max)` and sampled uniformly per particle at spawn.
#[derive(Debug, Clone, PartialEq)]
pub struct ParticleSettings {
    /// Particles per second.
    pub emission_rate: f32,
    /// Seconds the emitter runs after `start`; `None` runs until stopped.
    pub emitter_lifetime: Option<f32>,
    pub particle_lifetime: (f32, f32),
    pub emission_area: EmissionArea,
    /// Radians.
    pub direction: f32,
    /// Full angular spread around `direction`, radians.
    pub spread: f32,
    pub speed: (f32, f32),
    pub linear_acceleration: (Vec2, Vec2),
    pub radial_acceleration: (f32, f32),
    pub tangential_acceleration: (f32, f32),
    pub linear_damping: (f32, f32),
    pub rotation: (f32, f32),
    /// Spin at birth and at death, radians per second.
    pub spin: (f32, f32),
    pub spin_variation: f32,
    pub sizes: Ramp<f32>,
    /// How much of the size ramp is randomly skipped, in [0, 1].
    pub size_variation: f32,
    pub colors: Ramp<Color>,
    pub quads: Vec<Quad>,
    pub quad_selection: QuadSelection,
    /// Rotation and scale pivot inside the quad; `None` is the quad center.
    pub offset: Option<Vec2>,
    /// Face along the velocity instead of integrating spin.
    pub relative_rotation: bool,
    pub insert_mode: InsertMode,
}

impl Default for ParticleSettings {
    fn default() -> Self {
        Self {
            emission_rate: 0.0,
            emitter_lifetime: None,
            particle_lifetime: (1.0, 1.0),
            emission_area: EmissionArea::default(),
            direction: 0.0,
            spread: 0.0,
            speed: (0.0, 0.0),
            linear_acceleration: (Vec2::zero(), Vec2::zero()),
            radial_acceleration: (0.0, 0.0),
            tangential_acceleration: (0.0, 0.0),
            linear_damping: (0.0, 0.0),
            rotation: (0.0, 0.0),
            spin: (0.0, 0.0),
            spin_variation: 0.0,
            sizes: Ramp::constant(1.0),
            size_variation: 0.0,
            colors: Ramp::constant(Color::white()),
            quads: Vec::new(),
            quad_selection: QuadSelection::default(),
            offset: None,
            relative_rotation: false,
            insert_mode: InsertMode::default(),
        }
    }
}

/// Particle emitter over a fixed-capacity pool.
///
/// States: active (emitting), paused (frozen, only while active) and stopped.
/// Stopping ends emission but live particles keep aging out.
#[derive(Debug, Clone)]
pub struct ParticleSystem {
    texture: Texture,
    settings: ParticleSettings,
    pool: ParticlePool,
    rng: StdRng,

    position: Vec2,
    prev_position: Vec2,

    active: bool,
    paused: bool,
    emitter_life: f32,
    emit_counter: f32,
    next_quad: usize,
}

impl ParticleSystem {
    pub fn new(texture: Texture, capacity: usize) -> Self {
        Self::with_rng(texture, capacity, StdRng::from_entropy())
    }

    /// Deterministic system for reproducible simulations.
    pub fn with_seed(texture: Texture, capacity: usize, seed: u64) -> Self {
        Self::with_rng(texture, capacity, StdRng::seed_from_u64(seed))
    }

    fn with_rng(texture: Texture, capacity: usize, rng: StdRng) -> Self {
        Self {
            texture,
            settings: ParticleSettings::default(),
            pool: ParticlePool::new(capacity),
            rng,
            position: Vec2::zero(),
            prev_position: Vec2::zero(),
            active: capacity > 0,
            paused: false,
            emitter_life: 0.0,
            emit_counter: 0.0,
            next_quad: 0,
        }
    }

    /// A stopped, empty system with the same texture, capacity, position and settings.
    pub fn clone_settings(&self) -> Self {
        let mut clone = Self::with_rng(self.texture, self.pool.capacity(), StdRng::from_entropy());
        clone.settings = self.settings.clone();
        clone.position = self.position;
        clone.prev_position = self.position;
        clone.stop();
        clone
    }

    // ── configuration ─────────────────────────────────────────────────────

    #[inline]
    pub fn settings(&self) -> &ParticleSettings {
        &self.settings
    }

    #[inline]
    pub fn settings_mut(&mut self) -> &mut ParticleSettings {
        &mut self.settings
    }

    #[inline]
    pub fn set_emission_rate(&mut self, rate: f32) {
        self.settings.emission_rate = rate.max(0.0);
    }

    /// Also restarts the emitter clock.
    pub fn set_emitter_lifetime(&mut self, lifetime: Option<f32>) {
        self.settings.emitter_lifetime = lifetime;
        self.emitter_life = lifetime.unwrap_or(0.0);
    }

    #[inline]
    pub fn set_particle_lifetime(&mut self, min: f32, max: f32) {
        self.settings.particle_lifetime = (min, max);
    }

    #[inline]
    pub fn set_speed(&mut self, min: f32, max: f32) {
        self.settings.speed = (min, max);
    }

    /// Ignored when `sizes` is empty. Stops past the eighth are dropped.
    pub fn set_sizes(&mut self, sizes: &[f32]) {
        match Ramp::new(sizes) {
            Some(r) => self.settings.sizes = r,
            None => log::debug!("ParticleSystem::set_sizes: empty list ignored"),
        }
    }

    /// Ignored when `colors` is empty. Stops past the eighth are dropped.
    pub fn set_colors(&mut self, colors: &[Color]) {
        match Ramp::new(colors) {
            Some(r) => self.settings.colors = r,
            None => log::debug!("ParticleSystem::set_colors: empty list ignored"),
        }
    }

    pub fn set_quads(&mut self, quads: Vec<Quad>) {
        self.settings.quads = quads;
        self.next_quad = 0;
    }

    #[inline]
    pub fn set_texture(&mut self, texture: Texture) {
        self.texture = texture;
    }

    #[inline]
    pub fn texture(&self) -> Texture {
        self.texture
    }

    /// Resizes the pool; particles past the new size are dropped. Zero is ignored.
    pub fn set_buffer_size(&mut self, size: usize) {
        if size == 0 {
            log::warn!("ParticleSystem::set_buffer_size: size must be at least 1");
            return;
        }
        self.pool.set_capacity(size);
    }

    #[inline]
    pub fn buffer_size(&self) -> usize {
        self.pool.capacity()
    }

    #[inline]
    pub fn count(&self) -> usize {
        self.pool.count()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pool.is_empty()
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.pool.is_full()
    }

    /// Live particles in draw order.
    pub fn particles(&self) -> impl Iterator<Item = Particle> + '_ {
        self.pool.iter()
    }

    // ── emitter position ──────────────────────────────────────────────────

    /// Moves the emitter; particles emitted during the next update are spread
    /// along the path from the previous position.
    #[inline]
    pub fn move_to(&mut self, x: f32, y: f32) {
        self.position = Vec2::new(x, y);
    }

    /// Teleports the emitter without interpolation.
    #[inline]
    pub fn set_position(&mut self, x: f32, y: f32) {
        self.position = Vec2::new(x, y);
        self.prev_position = self.position;
    }

    #[inline]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    // ── state ─────────────────────────────────────────────────────────────

    pub fn start(&mut self) {
        if self.pool.capacity() > 0 {
            self.active = true;
        }
    }

    pub fn stop(&mut self) {
        self.active = false;
        self.paused = false;
        self.emitter_life = self.settings.emitter_lifetime.unwrap_or(0.0);
        self.emit_counter = 0.0;
    }

    pub fn pause(&mut self) {
        if self.active {
            self.paused = true;
        }
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    /// Removes every particle and rewinds the emitter clock. Active state is kept.
    pub fn reset(&mut self) {
        self.pool.clear();
        self.emitter_life = self.settings.emitter_lifetime.unwrap_or(0.0);
        self.emit_counter = 0.0;
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.active
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    #[inline]
    pub fn is_stopped(&self) -> bool {
        !self.active
    }

    // ── simulation ────────────────────────────────────────────────────────

    /// Emits up to `n` particles at the current position. Only while active;
    /// requests beyond the free capacity are dropped.
    pub fn emit(&mut self, n: usize) {
        if !self.active {
            return;
        }
        let n = n.min(self.pool.capacity() - self.pool.count());
        for _ in 0..n {
            self.spawn(1.0);
        }
    }

    /// Advances the simulation by `dt` seconds.
    pub fn update(&mut self, dt: f32) {
        if dt <= 0.0 || !dt.is_finite() || self.paused {
            return;
        }

        self.pool.age(dt);
        self.integrate(dt);

        if self.active {
            if self.settings.emitter_lifetime.is_some() {
                self.emitter_life -= dt;
                if self.emitter_life <= 0.0 {
                    self.stop();
                }
            }
            if self.active && self.settings.emission_rate > 0.0 {
                self.emit_due(dt);
            }
        }

        self.prev_position = self.position;
    }

    /// Spawns the particles owed for `dt` more seconds of emission, spread
    /// along the emitter path. Particles that do not fit are dropped; the
    /// counter keeps only the fraction of an interval left over.
    fn emit_due(&mut self, dt: f32) {
        let interval = 1.0 / self.settings.emission_rate;
        self.emit_counter += dt;

        let due = (self.emit_counter / interval).floor();
        if !due.is_finite() || due < 1.0 {
            if !self.emit_counter.is_finite() {
                self.emit_counter = 0.0;
            }
            return;
        }

        let free = self.pool.capacity() - self.pool.count();
        let n = (due as usize).min(free);
        let total = self.emit_counter - interval;
        for k in 0..n {
            let remaining = self.emit_counter - (k + 1) as f32 * interval;
            let t = if total > 0.0 { 1.0 - remaining / total } else { 1.0 };
            self.spawn(t.clamp(0.0, 1.0));
        }

        self.emit_counter %= interval;
    }

    fn integrate(&mut self, dt: f32) {
        let relative = self.settings.relative_rotation;
        let c = self.pool.columns_mut();

        for i in 0..c.x.len() {
            let pos = Vec2::new(c.x[i], c.y[i]);
            let radial = (pos - Vec2::new(c.origin_x[i], c.origin_y[i])).normalized();
            let tangential = radial.perp();

            let accel = radial * c.radial_acceleration[i]
                + tangential * c.tangential_acceleration[i]
                + Vec2::new(c.ax[i], c.ay[i]);
            let v = (Vec2::new(c.vx[i], c.vy[i]) + accel * dt) * (1.0 / (1.0 + c.damping[i] * dt));

            c.vx[i] = v.x;
            c.vy[i] = v.y;
            c.x[i] += v.x * dt;
            c.y[i] += v.y * dt;

            if relative {
                c.rotation[i] = v.y.atan2(v.x);
            } else {
                let t = if c.lifetime[i] > 0.0 { 1.0 - c.life[i] / c.lifetime[i] } else { 1.0 };
                c.rotation[i] += Lerp::lerp(c.spin_start[i], c.spin_end[i], t) * dt;
            }
        }
    }

    /// Spawns one particle at fraction `t` of the way from the previous to the
    /// current emitter position.
    fn spawn(&mut self, t: f32) {
        if self.pool.is_full() {
            return;
        }

        let s = &self.settings;
        let rng = &mut self.rng;

        let emitter = self.prev_position.lerp(self.position, t);
        let life = uniform(rng, s.particle_lifetime.0, s.particle_lifetime.1);
        let offset = s.emission_area.sample(rng);
        let pos = emitter + offset;

        let mut direction = s.direction + uniform(rng, -s.spread * 0.5, s.spread * 0.5);
        if s.emission_area.direction_relative_to_center {
            direction += offset.y.atan2(offset.x);
        }
        let velocity = Vec2::from_angle(direction) * uniform(rng, s.speed.0, s.speed.1);

        let (amin, amax) = s.linear_acceleration;
        let size_offset = uniform(rng, 0.0, s.size_variation);
        let size_interval = (1.0 - uniform(rng, 0.0, s.size_variation)) - size_offset;

        let rotation = if s.relative_rotation {
            velocity.y.atan2(velocity.x)
        } else {
            uniform(rng, s.rotation.0, s.rotation.1)
        };

        let quad_index = match (s.quads.len(), s.quad_selection) {
            (0, _) | (_, QuadSelection::OverLifetime) => 0,
            (n, QuadSelection::RoundRobin) => {
                let q = self.next_quad % n;
                self.next_quad = (q + 1) % n;
                q
            }
            (n, QuadSelection::Random) => rng.gen_range(0..n),
        };

        let p = Particle {
            x: pos.x,
            y: pos.y,
            origin_x: emitter.x,
            origin_y: emitter.y,
            vx: velocity.x,
            vy: velocity.y,
            ax: uniform(rng, amin.x, amax.x),
            ay: uniform(rng, amin.y, amax.y),
            radial_acceleration: uniform(rng, s.radial_acceleration.0, s.radial_acceleration.1),
            tangential_acceleration: uniform(
                rng,
                s.tangential_acceleration.0,
                s.tangential_acceleration.1,
            ),
            damping: uniform(rng, s.linear_damping.0, s.linear_damping.1),
            life,
            lifetime: life,
            rotation,
            spin_start: spin_variation(rng, s.spin.0, s.spin.1, s.spin_variation),
            spin_end: spin_variation(rng, s.spin.1, s.spin.0, s.spin_variation),
            size_offset,
            size_interval,
            quad_index: quad_index as u32,
        };

        let slot = match s.insert_mode {
            InsertMode::Top => self.pool.count(),
            InsertMode::Bottom => 0,
            InsertMode::Random => rng.gen_range(0..=self.pool.count()),
        };
        self.pool.insert(slot, &p);
    }

    // ── projection ────────────────────────────────────────────────────────

    /// One textured quad per live particle, in pool order.
    pub fn draw_data(&self) -> Geometry {
        let s = &self.settings;
        let full = Quad::full(&self.texture);
        let mut geo = Geometry::with_capacity(self.pool.count() * 4, self.pool.count() * 6);

        for p in self.pool.iter() {
            let t = p.age_fraction();
            let color = s.colors.sample(t);
            let size = s.sizes.sample(p.size_offset + t * p.size_interval);

            let quad = match s.quads.len() {
                0 => full,
                n => {
                    let i = match s.quad_selection {
                        QuadSelection::OverLifetime => ((t * n as f32) as usize).min(n - 1),
                        _ => p.quad_index as usize % n,
                    };
                    s.quads[i]
                }
            };

            let pivot = s.offset.unwrap_or(quad.size() * 0.5);
            let m = AffineMatrix::from_transform(
                p.x, p.y, p.rotation, size, size, pivot.x, pivot.y, 0.0, 0.0,
            );
            geo.push_quad(quad.corners().map(|c| m.transform_point(c)), quad.uvs(), color);
        }
        geo
    }
}

/// Uniform in `inner ± outer/2 · variation`.
fn spin_variation<R: Rng + ?Sized>(rng: &mut R, inner: f32, outer: f32, variation: f32) -> f32 {
    let half = outer * 0.5 * variation;
    uniform(rng, inner - half, inner + half)
}
