//! A single simulated particle.
//!
//! Particles spawn inside the emitter disk, integrate forward with a plain
//! Euler step and die when their age reaches the lifetime captured at spawn.
//! Death is two-phase: `update` only flips the `live` flag, the population
//! manager removes the carcass on its next cull pass.

use glam::Vec2;
use rand::rngs::SmallRng;
use rand::Rng;

use crate::params::Params;

/// Random point inside a disk of radius `max_rad`, sampled with independent
/// uniform radius and uniform angle. This biases density toward the center;
/// the bias is a deliberate part of the emitter's look and must not be
/// replaced with area-uniform sampling.
pub fn random_point_in_disk(rng: &mut SmallRng, max_rad: f32) -> Vec2 {
    let rad = rng.gen::<f32>() * max_rad.max(0.0);
    let angle = rng.gen::<f32>() * std::f32::consts::TAU;
    Vec2::new(angle.cos() * rad, angle.sin() * rad)
}

fn rotate_deg(v: Vec2, degrees: f32) -> Vec2 {
    let (s, c) = degrees.to_radians().sin_cos();
    Vec2::new(c * v.x - s * v.y, s * v.x + c * v.y)
}

/// One live (or recently dead) particle.
#[derive(Debug, Clone)]
pub struct Particle {
    /// Position in window pixels.
    pub pos: Vec2,
    /// Velocity in pixels per second.
    pub vel: Vec2,
    /// Seconds since spawn.
    pub age: f32,
    /// Lifetime captured from the parameters at spawn time.
    pub life_time: f32,
    /// False once `age >= life_time`; the particle is culled later.
    pub live: bool,
}

impl Particle {
    /// Spawn a new particle from the current parameter snapshot.
    ///
    /// Position is disk-sampled around the emitter center, velocity is
    /// disk-sampled around zero with the `velRad` bound.
    pub fn spawn(params: &Params, rng: &mut SmallRng) -> Self {
        Self {
            pos: params.emitter_center + random_point_in_disk(rng, params.emitter_radius),
            vel: random_point_in_disk(rng, params.velocity_radius),
            age: 0.0,
            life_time: params.life_time,
            live: true,
        }
    }

    /// Advance the particle by `dt` seconds. No-op on dead particles.
    ///
    /// Steering forces (radial plus tangential) only apply while the particle
    /// is inside the emitter disk; outside it coasts under its existing
    /// velocity and friction.
    pub fn update(&mut self, dt: f32, params: &Params) {
        if !self.live {
            return;
        }

        self.vel = rotate_deg(self.vel, params.rotate * dt);

        let mut acc = Vec2::ZERO;
        let delta = self.pos - params.emitter_center;
        let len = delta.length();
        if len > 0.0 && len <= params.emitter_radius {
            let dir = delta / len;
            acc += dir * params.force;
            acc += Vec2::new(-dir.y, dir.x) * params.spinning;
        }

        self.vel += acc * dt;
        self.vel *= 1.0 - params.friction;
        self.pos += self.vel * dt;

        self.age += dt;
        if self.age >= self.life_time {
            self.live = false;
        }
    }

    /// Age as a fraction of lifetime, used as the draw hue.
    pub fn age_fraction(&self) -> f32 {
        if self.life_time > 0.0 {
            (self.age / self.life_time).clamp(0.0, 1.0)
        } else {
            1.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn test_params() -> Params {
        Params {
            emitter_center: Vec2::new(400.0, 300.0),
            ..Params::default()
        }
    }

    #[test]
    fn test_spawn_is_live_inside_emitter() {
        let params = test_params();
        let mut rng = SmallRng::seed_from_u64(1);
        for _ in 0..200 {
            let p = Particle::spawn(&params, &mut rng);
            assert!(p.live);
            assert_eq!(p.age, 0.0);
            assert!(p.age < p.life_time);
            let dist = (p.pos - params.emitter_center).length();
            assert!(dist <= params.emitter_radius + 0.001);
        }
    }

    #[test]
    fn test_spawn_with_zero_velocity_radius() {
        let mut params = test_params();
        params.velocity_radius = 0.0;
        let mut rng = SmallRng::seed_from_u64(2);
        let p = Particle::spawn(&params, &mut rng);
        assert_eq!(p.vel, Vec2::ZERO);
    }

    #[test]
    fn test_update_advances_age_by_exactly_dt() {
        let params = test_params();
        let mut rng = SmallRng::seed_from_u64(3);
        let mut p = Particle::spawn(&params, &mut rng);
        p.update(0.016, &params);
        assert!((p.age - 0.016).abs() < f32::EPSILON);
        p.update(0.1, &params);
        assert!((p.age - 0.116).abs() < 1e-6);
    }

    #[test]
    fn test_death_is_monotonic() {
        let params = test_params();
        let mut rng = SmallRng::seed_from_u64(4);
        let mut p = Particle::spawn(&params, &mut rng);
        p.age = p.life_time - 0.01;
        p.update(0.05, &params);
        assert!(!p.live);

        // Dead particles are inert: age and state never move again.
        let age = p.age;
        p.update(1.0, &params);
        assert!(!p.live);
        assert_eq!(p.age, age);
    }

    #[test]
    fn test_friction_attenuates_speed() {
        let mut params = test_params();
        params.force = 0.0;
        params.spinning = 0.0;
        params.rotate = 0.0;
        params.friction = 0.05;
        let mut p = Particle {
            pos: params.emitter_center + Vec2::new(10.0, 0.0),
            vel: Vec2::new(120.0, -40.0),
            age: 0.0,
            life_time: 10.0,
            live: true,
        };
        let mut last = p.vel.length();
        for _ in 0..50 {
            p.update(0.016, &params);
            let speed = p.vel.length();
            assert!(speed <= last + f32::EPSILON);
            last = speed;
        }
    }

    #[test]
    fn test_rotation_preserves_speed() {
        let mut params = test_params();
        params.rotate = 90.0;
        params.friction = 0.0;
        let mut p = Particle {
            pos: params.emitter_center + Vec2::new(params.emitter_radius * 2.0, 0.0),
            vel: Vec2::new(50.0, 0.0),
            age: 0.0,
            life_time: 10.0,
            live: true,
        };
        p.update(0.5, &params);
        assert!((p.vel.length() - 50.0).abs() < 0.001);
    }

    #[test]
    fn test_no_steering_outside_emitter() {
        let mut params = test_params();
        params.force = 1000.0;
        params.spinning = 1000.0;
        params.friction = 0.0;
        let vel = Vec2::new(3.0, 4.0);
        let mut p = Particle {
            pos: params.emitter_center + Vec2::new(params.emitter_radius + 50.0, 0.0),
            vel,
            age: 0.0,
            life_time: 10.0,
            live: true,
        };
        p.update(0.1, &params);
        assert!((p.vel - vel).length() < 1e-4);
    }

    #[test]
    fn test_disk_sampling_center_bias() {
        // Uniform-radius sampling puts roughly half the points inside half
        // the radius (area-uniform sampling would put a quarter there).
        let mut rng = SmallRng::seed_from_u64(5);
        let n = 4000;
        let inner = (0..n)
            .filter(|_| random_point_in_disk(&mut rng, 100.0).length() < 50.0)
            .count();
        assert!(inner > n * 4 / 10, "inner fraction too small: {inner}/{n}");
    }
}
