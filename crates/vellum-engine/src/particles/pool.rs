/// Defines the column set once: the flat [`Particle`] record, the column
/// storage and the per-column operations all come from the same list.
macro_rules! particle_columns {
    ($($(#[$doc:meta])* $name:ident: $ty:ty),* $(,)?) => {
        /// One particle, as read from or written to a [`ParticlePool`].
        #[derive(Debug, Copy, Clone, Default, PartialEq)]
        pub struct Particle {
            $($(#[$doc])* pub $name: $ty,)*
        }

        #[derive(Debug, Clone, Default)]
        struct Columns {
            $($name: Vec<$ty>,)*
        }

        /// Mutable view of every live column, each of length `count`.
        pub struct ParticleColumnsMut<'a> {
            $(pub $name: &'a mut [$ty],)*
        }

        impl Columns {
            fn with_capacity(n: usize) -> Self {
                Self { $($name: Vec::with_capacity(n),)* }
            }

            fn reserve_exact(&mut self, additional: usize) {
                $(self.$name.reserve_exact(additional);)*
            }

            fn push(&mut self, p: &Particle) {
                $(self.$name.push(p.$name);)*
            }

            fn insert(&mut self, i: usize, p: &Particle) {
                $(self.$name.insert(i, p.$name);)*
            }

            fn swap_remove(&mut self, i: usize) {
                $(self.$name.swap_remove(i);)*
            }

            fn truncate(&mut self, n: usize) {
                $(self.$name.truncate(n);)*
            }

            fn get(&self, i: usize) -> Particle {
                Particle { $($name: self.$name[i],)* }
            }

            fn view_mut(&mut self) -> ParticleColumnsMut<'_> {
                ParticleColumnsMut { $($name: &mut self.$name,)* }
            }
        }
    };
}

particle_columns! {
    x: f32,
    y: f32,
    /// Emission point, used for radial and tangential acceleration.
    origin_x: f32,
    origin_y: f32,
    vx: f32,
    vy: f32,
    ax: f32,
    ay: f32,
    radial_acceleration: f32,
    tangential_acceleration: f32,
    damping: f32,
    /// Seconds left.
    life: f32,
    /// Seconds at spawn.
    lifetime: f32,
    rotation: f32,
    spin_start: f32,
    spin_end: f32,
    /// Phase of the size ramp at spawn.
    size_offset: f32,
    /// Span of the size ramp covered over the lifetime.
    size_interval: f32,
    quad_index: u32,
}

impl Particle {
    /// Age as a fraction of the lifetime, in [0, 1].
    #[inline]
    pub fn age_fraction(&self) -> f32 {
        if self.lifetime > 0.0 {
            (1.0 - self.life / self.lifetime).clamp(0.0, 1.0)
        } else {
            1.0
        }
    }
}

/// Fixed-capacity structure-of-arrays particle storage.
///
/// Invariant: every column holds exactly `count` live entries and
/// `count <= capacity`.
#[derive(Debug, Clone, Default)]
pub struct ParticlePool {
    cols: Columns,
    count: usize,
    capacity: usize,
}

impl ParticlePool {
    pub fn new(capacity: usize) -> Self {
        Self {
            cols: Columns::with_capacity(capacity),
            count: 0,
            capacity,
        }
    }

    #[inline]
    pub fn count(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.count >= self.capacity
    }

    /// Changes the capacity. Particles past the new capacity are dropped.
    pub fn set_capacity(&mut self, capacity: usize) {
        if capacity < self.count {
            self.cols.truncate(capacity);
            self.count = capacity;
        } else {
            self.cols.reserve_exact(capacity - self.count);
        }
        self.capacity = capacity;
    }

    /// Appends a particle (drawn last). Returns `false` when full.
    pub fn push(&mut self, p: &Particle) -> bool {
        self.insert(self.count, p)
    }

    /// Inserts at `index`, shifting later particles up one slot. Returns `false` when full.
    ///
    /// `index` is clamped to `count`.
    pub fn insert(&mut self, index: usize, p: &Particle) -> bool {
        if self.is_full() {
            return false;
        }
        let index = index.min(self.count);
        if index == self.count {
            self.cols.push(p);
        } else {
            self.cols.insert(index, p);
        }
        self.count += 1;
        true
    }

    /// Removes `index` by moving the last live particle into it.
    pub fn swap_remove(&mut self, index: usize) {
        if index < self.count {
            self.cols.swap_remove(index);
            self.count -= 1;
        }
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<Particle> {
        (index < self.count).then(|| self.cols.get(index))
    }

    pub fn clear(&mut self) {
        self.cols.truncate(0);
        self.count = 0;
    }

    /// Decrements every remaining life by `dt` and removes expired particles.
    ///
    /// Walks from the back so a particle moved into a freed slot has already
    /// been aged this pass. Returns how many were removed.
    pub fn age(&mut self, dt: f32) -> usize {
        let before = self.count;
        for i in (0..self.count).rev() {
            self.cols.life[i] -= dt;
            if self.cols.life[i] <= 0.0 {
                self.swap_remove(i);
            }
        }
        before - self.count
    }

    /// Column slices of the live particles.
    #[inline]
    pub fn columns_mut(&mut self) -> ParticleColumnsMut<'_> {
        self.cols.view_mut()
    }

    /// Iterates live particles in draw order.
    pub fn iter(&self) -> impl Iterator<Item = Particle> + '_ {
        (0..self.count).map(|i| self.cols.get(i))
    }
}
