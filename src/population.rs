//! Particle population management.
//!
//! Owns the dynamic collection of live particles and runs the per-tick
//! cycle: cull expired particles, convert the continuous spawn rate into
//! discrete births through a fractional accumulator, then integrate the
//! survivors. Newly born particles start integrating on the next tick, so a
//! particle observed right after a tick is exactly as old as the updates it
//! has received.
//!
//! Steady-state size settles around `bornRate * lifeTime`; nothing bounds it
//! beyond that.

use rand::rngs::SmallRng;

use crate::params::Params;
use crate::particle::Particle;

/// The particle collection plus spawn bookkeeping.
#[derive(Debug, Default)]
pub struct Population {
    particles: Vec<Particle>,
    spawn_accumulator: f32,
}

impl Population {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run one simulation tick.
    ///
    /// `dt` must already be clamped by the caller (see
    /// [`crate::time::clamp_delta`]); the population applies it as-is.
    pub fn tick(&mut self, dt: f32, params: &Params, rng: &mut SmallRng) {
        // Cull: order-preserving removal of everything that died last tick.
        self.particles.retain(|p| p.live);

        // Accrue spawn budget. The fractional remainder persists across
        // ticks, so rates below one per tick are honored without drift.
        self.spawn_accumulator += dt * params.born_rate;
        let existing = self.particles.len();
        if self.spawn_accumulator >= 1.0 {
            let born = self.spawn_accumulator as u32;
            self.spawn_accumulator -= born as f32;
            for _ in 0..born {
                self.particles.push(Particle::spawn(params, rng));
            }
        }

        // Integrate the particles that predate this tick's births.
        for p in &mut self.particles[..existing] {
            p.update(dt, params);
        }
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Current fractional spawn budget. Exposed for inspection and tests.
    pub fn spawn_accumulator(&self) -> f32 {
        self.spawn_accumulator
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;
    use rand::SeedableRng;

    fn params_with(born_rate: f32) -> Params {
        Params {
            emitter_center: Vec2::new(400.0, 300.0),
            born_rate,
            ..Params::default()
        }
    }

    #[test]
    fn test_fractional_spawn_accumulation() {
        // bornRate 0.5 at dt = 1 over four ticks must spawn exactly two,
        // not zero and not four. Long lifetime so none die in between.
        let mut params = params_with(0.5);
        params.life_time = 100.0;
        let mut rng = SmallRng::seed_from_u64(1);
        let mut pop = Population::new();
        for _ in 0..4 {
            pop.tick(1.0, &params, &mut rng);
        }
        assert_eq!(pop.len(), 2);
        assert_eq!(pop.spawn_accumulator(), 0.0);
    }

    #[test]
    fn test_cull_removes_dead_particles() {
        let mut params = params_with(100.0);
        params.life_time = 0.05;
        let mut rng = SmallRng::seed_from_u64(2);
        let mut pop = Population::new();

        pop.tick(0.1, &params, &mut rng);
        assert!(pop.len() > 0);

        // One more tick ages everything past its lifetime, the next removes.
        pop.tick(0.1, &params, &mut rng);
        pop.tick(0.0, &params, &mut rng);
        for p in pop.particles() {
            assert!(p.live);
        }
    }

    #[test]
    fn test_population_stays_bounded_by_rate_times_lifetime() {
        let mut params = params_with(300.0);
        params.life_time = 0.15;
        let mut rng = SmallRng::seed_from_u64(3);
        let mut pop = Population::new();
        for _ in 0..20 {
            pop.tick(0.1, &params, &mut rng);
        }
        // Steady churn settles near bornRate * lifeTime = 45.
        assert!(pop.len() <= 100, "population grew to {}", pop.len());
    }

    #[test]
    fn test_spawn_scenario() {
        // Spec scenario: 300/sec at dt = 0.1 from empty spawns 30 particles,
        // all within the emitter disk, at rest and unaged.
        let mut params = params_with(300.0);
        params.emitter_radius = 300.0;
        params.velocity_radius = 0.0;
        params.life_time = 2.0;
        params.friction = 0.0;
        params.force = 0.0;
        params.spinning = 0.0;
        params.rotate = 0.0;

        let mut rng = SmallRng::seed_from_u64(4);
        let mut pop = Population::new();
        pop.tick(0.1, &params, &mut rng);

        assert_eq!(pop.len(), 30);
        for p in pop.particles() {
            assert!((p.pos - params.emitter_center).length() <= 300.0 + 0.001);
            assert_eq!(p.vel, Vec2::ZERO);
            assert_eq!(p.age, 0.0);
            assert!(p.live);
        }
    }

    #[test]
    fn test_zero_rate_spawns_nothing() {
        let params = params_with(0.0);
        let mut rng = SmallRng::seed_from_u64(5);
        let mut pop = Population::new();
        for _ in 0..10 {
            pop.tick(0.1, &params, &mut rng);
        }
        assert!(pop.is_empty());
    }
}
