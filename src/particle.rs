use anyhow::Result;
use garden_common::{FieldParams, Vec2};
use rand::distr::Uniform;
use rand::prelude::*;

/// A moving circular particle in surface-local coordinates.
/// Velocity is in units per frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
}

/// Generates exactly `n` particles with uniformly random position, radius,
/// and velocity, drawn from the ranges in `params`. Velocity components are
/// symmetric around zero so particles drift in any direction.
///
/// The random source is injected so callers (and tests) control determinism.
/// `n == 0` yields an empty collection.
pub fn spawn_particles(n: u32, params: &FieldParams, rng: &mut impl Rng) -> Result<Vec<Particle>> {
    if n == 0 {
        return Ok(Vec::new());
    }

    let x_dist = Uniform::new(0.0f32, params.surface_width)?;
    let y_dist = Uniform::new(0.0f32, params.surface_height)?;
    let r_dist = Uniform::new(params.radius_min, params.radius_max)?;
    let v_dist = Uniform::new(-params.velocity_half_range, params.velocity_half_range)?;

    let particles = (0..n)
        .map(|_| Particle {
            pos: Vec2::new(rng.sample(x_dist), rng.sample(y_dist)),
            vel: Vec2::new(rng.sample(v_dist), rng.sample(v_dist)),
            radius: rng.sample(r_dist),
        })
        .collect();

    Ok(particles)
}
