use nalgebra::Vector2;
use rand::Rng;
use std::f64::consts::TAU;

pub type Position = Vector2<f64>;
pub type Velocity = Vector2<f64>;

/// Lower bound of the speed a freshly spawned particle gets.
pub const SPAWN_SPEED_MIN: f64 = 0.15;
/// Width of the spawn speed range, so spawn speeds fall in [0.15, 0.5).
pub const SPAWN_SPEED_SPAN: f64 = 0.35;

/// A single drifting dot.
///
/// Particles carry no identity beyond their index in the field; the whole
/// collection is thrown away and respawned whenever the viewport changes.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub position: Position,
    pub velocity: Velocity,
    /// Disc radius in logical pixels, always > 0.
    pub radius: f64,
    /// Fill opacity in [0, 1].
    pub alpha: f64,
}

impl Particle {
    pub fn new(position: Position, velocity: Velocity, radius: f64, alpha: f64) -> Self {
        Self {
            position,
            velocity,
            radius,
            alpha: alpha.clamp(0.0, 1.0),
        }
    }

    /// Spawns a particle somewhere inside `[0, width) x [0, height)`.
    ///
    /// Heading is uniform over the full circle, speed in [0.15, 0.5),
    /// radius in [1, 3.2) and opacity in [0.35, 0.7).
    pub fn spawn<R: Rng + ?Sized>(rng: &mut R, width: f64, height: f64) -> Self {
        // Scaling a unit sample keeps a zero-sized viewport valid.
        let position = Position::new(rng.gen::<f64>() * width, rng.gen::<f64>() * height);
        let speed = SPAWN_SPEED_MIN + rng.gen::<f64>() * SPAWN_SPEED_SPAN;
        let velocity = random_velocity(rng, speed);

        Self {
            position,
            velocity,
            radius: 1.0 + rng.gen::<f64>() * 2.2,
            alpha: 0.35 + rng.gen::<f64>() * 0.35,
        }
    }

    pub fn speed(&self) -> f64 {
        self.velocity.norm()
    }
}

/// A velocity of the given magnitude pointing in a uniformly random direction.
pub fn random_velocity<R: Rng + ?Sized>(rng: &mut R, speed: f64) -> Velocity {
    let angle = rng.gen::<f64>() * TAU;
    Velocity::new(angle.cos() * speed, angle.sin() * speed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_spawn_ranges() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1_000 {
            let p = Particle::spawn(&mut rng, 640.0, 480.0);
            assert!(p.position.x >= 0.0 && p.position.x < 640.0);
            assert!(p.position.y >= 0.0 && p.position.y < 480.0);
            assert!(p.speed() >= SPAWN_SPEED_MIN - 1e-9);
            assert!(p.speed() < SPAWN_SPEED_MIN + SPAWN_SPEED_SPAN + 1e-9);
            assert!(p.radius >= 1.0 && p.radius < 3.2);
            assert!(p.alpha >= 0.35 && p.alpha < 0.7);
        }
    }

    #[test]
    fn test_spawn_in_empty_viewport() {
        let mut rng = StdRng::seed_from_u64(1);
        let p = Particle::spawn(&mut rng, 0.0, 0.0);
        assert_eq!(p.position, Position::new(0.0, 0.0));
    }

    #[test]
    fn test_random_velocity_magnitude() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..100 {
            let v = random_velocity(&mut rng, 0.25);
            assert!((v.norm() - 0.25).abs() < 1e-12);
        }
    }

    #[test]
    fn test_new_clamps_alpha() {
        let p = Particle::new(Position::zeros(), Velocity::zeros(), 1.0, 1.7);
        assert_eq!(p.alpha, 1.0);
    }
}
