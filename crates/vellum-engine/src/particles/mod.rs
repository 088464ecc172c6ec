//! CPU particle simulation.
//!
//! Storage is a structure-of-arrays [`ParticlePool`]: one column per
//! attribute, live particles packed into `[0, count)`. Dead particles are
//! removed by moving the last live one into their slot, so removal is O(1)
//! and survivors may change order.
//!
//! A [`ParticleSystem`] owns a pool plus its [`ParticleSettings`], emits
//! into the pool, integrates it in [`ParticleSystem::update`] and projects
//! it into quads with [`ParticleSystem::draw_data`].

mod emission;
mod pool;
mod ramp;
mod system;

pub use emission::{AreaDistribution, EmissionArea};
pub use pool::{Particle, ParticleColumnsMut, ParticlePool};
pub use ramp::{Lerp, MAX_RAMP_STOPS, Ramp};
pub use system::{InsertMode, ParticleSettings, ParticleSystem, QuadSelection};
