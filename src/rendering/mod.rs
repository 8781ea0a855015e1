mod canvas;

pub use canvas::RasterCanvas;

use crate::field::ParticleField;
use crate::palette::{Palette, Rgba};
use crate::particle::Position;
use serde::{Deserialize, Serialize};

/// A 2D drawing target addressed in logical coordinates.
///
/// Implementations map logical space onto their backing store themselves.
pub trait DrawSurface {
    /// Adopts a new logical size and device pixel ratio.
    fn resize(&mut self, width: f64, height: f64, dpr: f64);
    fn clear(&mut self);
    fn stroke_line(&mut self, from: Position, to: Position, color: Rgba, width: f64);
    fn fill_disc(&mut self, center: Position, radius: f64, color: Rgba);
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    /// Particles farther apart than this are not connected.
    pub max_connection_distance: f64,
    /// Connector opacity for two particles at the same spot.
    pub connector_alpha: f64,
    pub line_width: f64,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            max_connection_distance: 110.0,
            connector_alpha: 0.12,
            line_width: 1.0,
        }
    }
}

/// Opacity of the connector between two particles `distance` apart.
/// Falls linearly to 0 at `max_distance`.
pub fn connector_alpha(distance: f64, max_distance: f64, base_alpha: f64) -> f64 {
    if distance >= max_distance {
        0.0
    } else {
        base_alpha * (1.0 - distance / max_distance)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Renderer {
    pub settings: RenderSettings,
}

impl Renderer {
    pub fn new(settings: RenderSettings) -> Self {
        Self { settings }
    }

    /// Paints one frame: connectors first so they sit beneath the dots.
    ///
    /// The connector pass checks every unordered pair. With at most 140
    /// particles that is 9,730 checks per frame.
    pub fn draw<S: DrawSurface + ?Sized>(&self, field: &ParticleField, surface: &mut S) {
        surface.clear();
        self.draw_connectors(field, surface);
        self.draw_dots(field, &field.palette, surface);
    }

    fn draw_connectors<S: DrawSurface + ?Sized>(&self, field: &ParticleField, surface: &mut S) {
        let max = self.settings.max_connection_distance;
        let max_sq = max * max;
        let line = field.palette.line;

        for (i, p1) in field.particles.iter().enumerate() {
            for p2 in &field.particles[i + 1..] {
                let distance_sq = (p1.position - p2.position).norm_squared();
                if distance_sq < max_sq {
                    let alpha =
                        connector_alpha(distance_sq.sqrt(), max, self.settings.connector_alpha);
                    surface.stroke_line(
                        p1.position,
                        p2.position,
                        Rgba::new(line, alpha),
                        self.settings.line_width,
                    );
                }
            }
        }
    }

    fn draw_dots<S: DrawSurface + ?Sized>(
        &self,
        field: &ParticleField,
        palette: &Palette,
        surface: &mut S,
    ) {
        for particle in &field.particles {
            surface.fill_disc(
                particle.position,
                particle.radius,
                Rgba::new(palette.dot, particle.alpha),
            );
        }
    }
}

/// One recorded drawing call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear,
    Line {
        from: Position,
        to: Position,
        color: Rgba,
        width: f64,
    },
    Disc {
        center: Position,
        radius: f64,
        color: Rgba,
    },
}

/// A surface that keeps the calls of the most recent frame instead of
/// rasterizing them. Useful for headless runs and for inspecting frames.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    pub commands: Vec<DrawCommand>,
    pub frames: u64,
    pub size: (f64, f64, f64),
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> impl Iterator<Item = &DrawCommand> {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Line { .. }))
    }

    pub fn discs(&self) -> impl Iterator<Item = &DrawCommand> {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Disc { .. }))
    }
}

impl DrawSurface for RecordingSurface {
    fn resize(&mut self, width: f64, height: f64, dpr: f64) {
        self.size = (width, height, dpr);
    }

    fn clear(&mut self) {
        self.commands.clear();
        self.commands.push(DrawCommand::Clear);
        self.frames += 1;
    }

    fn stroke_line(&mut self, from: Position, to: Position, color: Rgba, width: f64) {
        self.commands.push(DrawCommand::Line {
            from,
            to,
            color,
            width,
        });
    }

    fn fill_disc(&mut self, center: Position, radius: f64, color: Rgba) {
        self.commands.push(DrawCommand::Disc {
            center,
            radius,
            color,
        });
    }
}
