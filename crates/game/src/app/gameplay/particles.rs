use engine::content::PropKind;
use engine::{SimpleRng, Vec3};
use tracing::debug;

const PARTICLE_SEED: u64 = 0x9e37_79b9_7f4a_7c15;

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct ParticleTuning {
    pub(crate) burst_count: usize,
    pub(crate) gravity: f32,
    pub(crate) initial_opacity: f32,
    pub(crate) fade_per_second: f32,
    pub(crate) cull_below_y: f32,
    /// Horizontal launch speed is drawn from `[-spread / 2, spread / 2)` per axis.
    pub(crate) horizontal_spread: f32,
    pub(crate) min_lift: f32,
    pub(crate) lift_range: f32,
}

impl Default for ParticleTuning {
    fn default() -> Self {
        Self {
            burst_count: 8,
            gravity: 20.0,
            initial_opacity: 0.8,
            fade_per_second: 1.2,
            cull_below_y: -5.0,
            horizontal_spread: 8.0,
            min_lift: 2.0,
            lift_range: 6.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Particle {
    pub(crate) position: Vec3,
    pub(crate) velocity: Vec3,
    pub(crate) opacity: f32,
    /// Source prop, so the renderer can tint debris like the thing it came from.
    pub(crate) source: PropKind,
}

/// Owns every live debris particle and ages them together once per tick.
#[derive(Debug)]
pub(crate) struct ParticleSystem {
    tuning: ParticleTuning,
    rng: SimpleRng,
    particles: Vec<Particle>,
    bursts: u64,
}

impl Default for ParticleSystem {
    fn default() -> Self {
        Self::new(ParticleTuning::default(), PARTICLE_SEED)
    }
}

impl ParticleSystem {
    pub(crate) fn new(tuning: ParticleTuning, seed: u64) -> Self {
        Self {
            tuning,
            rng: SimpleRng::new(seed),
            particles: Vec::new(),
            bursts: 0,
        }
    }

    pub(crate) fn burst(&mut self, origin: Vec3, source: PropKind) {
        let tuning = self.tuning;
        let spawn_at = origin + Vec3::new(0.0, 0.5, 0.0);
        for _ in 0..tuning.burst_count {
            let velocity = Vec3::new(
                (self.rng.next_f32() - 0.5) * tuning.horizontal_spread,
                self.rng.next_f32() * tuning.lift_range + tuning.min_lift,
                (self.rng.next_f32() - 0.5) * tuning.horizontal_spread,
            );
            self.particles.push(Particle {
                position: spawn_at,
                velocity,
                opacity: tuning.initial_opacity,
                source,
            });
        }
        self.bursts += 1;
        debug!(kind = source.name(), bursts = self.bursts, "particle_burst");
    }

    pub(crate) fn update(&mut self, dt_seconds: f32) {
        let tuning = self.tuning;
        for particle in &mut self.particles {
            particle.velocity.y -= tuning.gravity * dt_seconds;
            particle.position += particle.velocity * dt_seconds;
            particle.opacity -= tuning.fade_per_second * dt_seconds;
        }
        self.particles
            .retain(|particle| particle.opacity > 0.0 && particle.position.y >= tuning.cull_below_y);
    }

    pub(crate) fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Bursts spawned since creation, including ones that have fully faded.
    #[cfg(test)]
    pub(crate) fn burst_count(&self) -> u64 {
        self.bursts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    #[test]
    fn burst_spawns_configured_count_moving_upward() {
        let mut particles = ParticleSystem::default();
        particles.burst(Vec3::ground(3.0, 4.0), PropKind::Crate);

        assert_eq!(particles.particles().len(), 8);
        assert_eq!(particles.burst_count(), 1);
        for particle in particles.particles() {
            assert!(particle.velocity.y >= 2.0 && particle.velocity.y < 8.0);
            assert!(particle.velocity.x.abs() <= 4.0);
            assert!(particle.velocity.z.abs() <= 4.0);
            assert_eq!(particle.opacity, 0.8);
        }
    }

    #[test]
    fn particles_fade_out_and_are_removed() {
        let mut particles = ParticleSystem::default();
        particles.burst(Vec3::ZERO, PropKind::Grass);

        let first_y = particles.particles()[0].position.y;
        particles.update(DT);
        assert!(particles.particles()[0].position.y > first_y);

        for _ in 0..60 {
            particles.update(DT);
        }
        assert!(particles.particles().is_empty());
        assert_eq!(particles.burst_count(), 1);
    }

    #[test]
    fn fallen_particles_are_culled_before_fading() {
        let tuning = ParticleTuning {
            fade_per_second: 0.0,
            ..ParticleTuning::default()
        };
        let mut particles = ParticleSystem::new(tuning, 7);
        particles.burst(Vec3::ZERO, PropKind::Grass);

        for _ in 0..600 {
            particles.update(DT);
        }
        assert!(particles.particles().is_empty());
    }
}
