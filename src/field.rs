//! Simulation state: the particle collection plus everything it reacts to.

use crate::palette::Palette;
use crate::particle::{Particle, Position};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// One particle per this many square logical pixels.
pub const AREA_PER_PARTICLE: f64 = 18_000.0;
pub const MIN_PARTICLES: usize = 40;
pub const MAX_PARTICLES: usize = 140;

/// Coordinate used on both axes for the pointer before any movement has been
/// observed. Far enough off-canvas that no particle is ever inside the repel
/// radius.
pub const POINTER_OFFSCREEN: f64 = -9_999.0;

pub fn pointer_sentinel() -> Position {
    Position::new(POINTER_OFFSCREEN, POINTER_OFFSCREEN)
}

/// Logical size of the host viewport and its device pixel ratio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    pub dpr: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64, dpr: f64) -> Self {
        Self {
            width: sanitize_extent(width),
            height: sanitize_extent(height),
            dpr: sanitize_dpr(dpr),
        }
    }

    /// Builds a viewport from a physical window size and its scale factor.
    pub fn from_physical(width: u32, height: u32, scale_factor: f64) -> Self {
        let dpr = sanitize_dpr(scale_factor);
        Self::new(f64::from(width) / dpr, f64::from(height) / dpr, dpr)
    }

    /// Backing-store resolution: logical size times dpr, floored.
    pub fn backing_size(&self) -> (u32, u32) {
        (
            (self.width * self.dpr).floor() as u32,
            (self.height * self.dpr).floor() as u32,
        )
    }
}

fn sanitize_extent(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

/// Missing, non-finite or sub-unit ratios all fall back to 1.
fn sanitize_dpr(dpr: f64) -> f64 {
    if dpr.is_finite() {
        dpr.max(1.0)
    } else {
        1.0
    }
}

/// Number of particles for a viewport: one per 18000 px², clamped to [40, 140].
pub fn particle_count(width: f64, height: f64) -> usize {
    let base = (width * height / AREA_PER_PARTICLE).round();
    if base.is_nan() || base <= MIN_PARTICLES as f64 {
        MIN_PARTICLES
    } else {
        (base as usize).min(MAX_PARTICLES)
    }
}

pub struct ParticleField {
    pub particles: Vec<Particle>,
    pub viewport: Viewport,
    pub pointer: Position,
    pub palette: Palette,
    pub(crate) rng: StdRng,
}

impl ParticleField {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// A field whose spawns and resets are reproducible.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            particles: Vec::new(),
            viewport: Viewport::new(0.0, 0.0, 1.0),
            pointer: pointer_sentinel(),
            palette: Palette::default(),
            rng,
        }
    }

    pub fn width(&self) -> f64 {
        self.viewport.width
    }

    pub fn height(&self) -> f64 {
        self.viewport.height
    }

    pub fn dpr(&self) -> f64 {
        self.viewport.dpr
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Adopts a new viewport and regenerates every particle from scratch.
    ///
    /// Prior positions and velocities are discarded even when the particle
    /// count does not change.
    pub fn resize(&mut self, width: f64, height: f64, dpr: f64) {
        self.viewport = Viewport::new(width, height, dpr);
        let count = particle_count(self.viewport.width, self.viewport.height);

        let Self {
            particles,
            viewport,
            rng,
            ..
        } = self;
        *particles = (0..count)
            .map(|_| Particle::spawn(rng, viewport.width, viewport.height))
            .collect();

        log::debug!(
            "field resized to {:.0}x{:.0} @{:.2}x, {} particles",
            viewport.width,
            viewport.height,
            viewport.dpr,
            count
        );
    }

    pub fn resize_to(&mut self, viewport: Viewport) {
        self.resize(viewport.width, viewport.height, viewport.dpr);
    }

    pub fn set_pointer(&mut self, x: f64, y: f64) {
        self.pointer = Position::new(x, y);
    }

    pub fn clear_pointer(&mut self) {
        self.pointer = pointer_sentinel();
    }
}

impl Default for ParticleField {
    fn default() -> Self {
        Self::new()
    }
}
