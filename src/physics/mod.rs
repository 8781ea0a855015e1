use crate::field::ParticleField;
use crate::particle::{random_velocity, Particle, Position};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Tunables for one simulation step.
///
/// Every factor is applied once per step, not scaled by elapsed time, so
/// the visible speed follows the display refresh rate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsSettings {
    /// Pointer influence radius in logical pixels.
    pub repel_radius: f64,
    /// Velocity added per step at full force.
    pub repel_strength: f64,
    /// Per-step velocity multiplier.
    pub damping: f64,
    /// Below this speed a particle gets a fresh heading.
    pub min_speed: f64,
    pub reset_speed_min: f64,
    pub reset_speed_max: f64,
    /// How far past an edge a particle travels before wrapping.
    pub wrap_margin: f64,
}

impl Default for PhysicsSettings {
    fn default() -> Self {
        Self {
            repel_radius: 80.0,
            repel_strength: 0.35,
            damping: 0.998,
            min_speed: 0.08,
            reset_speed_min: 0.12,
            reset_speed_max: 0.3,
            wrap_margin: 5.0,
        }
    }
}

/// Linear falloff: 1 at the pointer, 0 at `radius` and beyond.
pub fn repulsion_force(distance: f64, radius: f64) -> f64 {
    if distance >= radius {
        0.0
    } else {
        (radius - distance) / radius
    }
}

/// Toroidal wrap on one axis with a margin past each edge.
fn wrap_axis(value: f64, extent: f64, margin: f64) -> f64 {
    if value < -margin {
        extent + margin
    } else if value > extent + margin {
        -margin
    } else {
        value
    }
}

#[derive(Debug, Clone, Default)]
pub struct Simulator {
    pub settings: PhysicsSettings,
}

impl Simulator {
    pub fn new(settings: PhysicsSettings) -> Self {
        Self { settings }
    }

    /// Advances every particle by one discrete step.
    pub fn step(&self, field: &mut ParticleField) {
        let ParticleField {
            particles,
            viewport,
            pointer,
            rng,
            ..
        } = field;

        for particle in particles.iter_mut() {
            self.repel(particle, pointer);

            particle.position += particle.velocity;
            particle.velocity *= self.settings.damping;

            if particle.speed() < self.settings.min_speed {
                self.revive(particle, rng);
            }

            let margin = self.settings.wrap_margin;
            particle.position.x = wrap_axis(particle.position.x, viewport.width, margin);
            particle.position.y = wrap_axis(particle.position.y, viewport.height, margin);
        }
    }

    fn repel(&self, particle: &mut Particle, pointer: &Position) {
        let radius = self.settings.repel_radius;
        let delta = particle.position - pointer;
        let distance_sq = delta.norm_squared();

        if distance_sq < radius * radius {
            let distance = if distance_sq == 0.0 {
                1.0
            } else {
                distance_sq.sqrt()
            };
            let force = repulsion_force(distance, radius);
            particle.velocity += delta * (force * self.settings.repel_strength / distance);
        }
    }

    /// Anti-stagnation: random heading, speed uniform in the reset range.
    fn revive<R: Rng + ?Sized>(&self, particle: &mut Particle, rng: &mut R) {
        let min = self.settings.reset_speed_min;
        let max = self.settings.reset_speed_max;
        let speed = min + rng.gen::<f64>() * (max - min);
        particle.velocity = random_velocity(rng, speed);
    }
}
