use glam::Vec3;
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::config::ParticleConfig;

/// Particles below this height are recycled to the top of the field.
pub const FLOOR: f32 = -10.0;
/// Respawned particles start at least this high.
pub const RESPAWN_BASE: f32 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub position: Vec3,
    /// Fall distance per tick. Fixed at creation.
    pub velocity: f32,
}

/// Fixed-size field of falling petals.
#[derive(Debug)]
pub struct ParticleField {
    particles: Vec<Particle>,
    respawn_height: f32,
    size: f32,
    rng: StdRng,
}

impl ParticleField {
    pub fn new(config: &ParticleConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    pub fn seeded(config: &ParticleConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: &ParticleConfig, mut rng: StdRng) -> Self {
        let half = config.spread * 0.5;
        let [v_min, v_max] = config.velocity_range;
        let particles = (0..config.count)
            .map(|_| Particle {
                position: Vec3::new(
                    rng.gen_range(-half..half),
                    rng.gen_range(0.0..config.respawn_height),
                    rng.gen_range(-half..half),
                ),
                velocity: sample(&mut rng, v_min, v_max),
            })
            .collect();

        Self {
            particles,
            respawn_height: config.respawn_height,
            size: config.size,
            rng,
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Point size for the sink.
    pub fn size(&self) -> f32 {
        self.size
    }

    pub fn respawn_height(&self) -> f32 {
        self.respawn_height
    }

    /// Moves every particle down by its own velocity. Velocity is applied per
    /// tick, not per second. Only `y` is recycled on respawn.
    pub fn advance(&mut self) {
        for particle in &mut self.particles {
            particle.position.y -= particle.velocity;
            if particle.position.y < FLOOR {
                particle.position.y = self.rng.gen::<f32>() * self.respawn_height + RESPAWN_BASE;
            }
        }
    }
}

// `gen_range` panics on an empty range, which a fixed velocity config produces.
fn sample(rng: &mut StdRng, min: f32, max: f32) -> f32 {
    if max > min {
        rng.gen_range(min..max)
    } else {
        min
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(count: usize) -> ParticleConfig {
        ParticleConfig {
            count,
            ..ParticleConfig::default()
        }
    }

    #[test]
    fn initial_distribution_stays_in_bounds() {
        let field = ParticleField::seeded(&config(1000), 7);
        assert_eq!(field.len(), 1000);
        for p in field.particles() {
            assert!((-50.0..50.0).contains(&p.position.x));
            assert!((-50.0..50.0).contains(&p.position.z));
            assert!((0.0..50.0).contains(&p.position.y));
            assert!((0.01..0.03).contains(&p.velocity));
        }
    }

    #[test]
    fn height_invariant_holds_after_every_advance() {
        let mut field = ParticleField::seeded(&config(200), 11);
        let ceiling = field.respawn_height() + RESPAWN_BASE;
        // Enough ticks for the slowest particle to cross the floor at least once.
        for _ in 0..7000 {
            field.advance();
            for p in field.particles() {
                assert!(p.position.y >= FLOOR && p.position.y < ceiling);
            }
        }
    }

    #[test]
    fn respawn_only_touches_height() {
        let mut field = ParticleField::seeded(&config(1), 3);
        field.particles[0].position = Vec3::new(4.0, FLOOR + 0.001, -2.5);
        let velocity = field.particles[0].velocity;

        field.advance();

        let p = field.particles[0];
        assert_eq!(p.position.x, 4.0);
        assert_eq!(p.position.z, -2.5);
        assert_eq!(p.velocity, velocity);
        assert!(p.position.y >= RESPAWN_BASE);
    }

    #[test]
    fn fixed_velocity_range_is_accepted() {
        let field = ParticleField::seeded(
            &ParticleConfig {
                count: 4,
                velocity_range: [0.02, 0.02],
                ..ParticleConfig::default()
            },
            1,
        );
        assert!(field.particles().iter().all(|p| p.velocity == 0.02));
    }
}
