//! Pointer and viewport tracking.
//!
//! Host events land here and are written straight into the field:
//! last write wins, nothing is queued or throttled.

use crate::field::{ParticleField, Viewport};
use winit::event::WindowEvent;

/// What a window event changed, if anything.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputChange {
    Pointer,
    Viewport(Viewport),
}

#[derive(Debug, Clone)]
pub struct InputTracker {
    viewport: Viewport,
    /// Reset the pointer to its off-canvas sentinel when it leaves the window.
    pub clear_on_leave: bool,
}

impl InputTracker {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            clear_on_leave: false,
        }
    }

    /// Latest known viewport.
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Records a pointer position in logical window coordinates.
    pub fn pointer_moved(&mut self, field: &mut ParticleField, x: f64, y: f64) {
        field.set_pointer(x, y);
    }

    pub fn pointer_left(&mut self, field: &mut ParticleField) {
        if self.clear_on_leave {
            field.clear_pointer();
        }
    }

    /// Stores the new viewport and rebuilds the field for it.
    pub fn viewport_changed(&mut self, field: &mut ParticleField, viewport: Viewport) {
        self.viewport = viewport;
        field.resize_to(viewport);
    }

    /// Translates a winit event. Resize events only update the tracked
    /// viewport here; the caller applies it so the drawing surface can
    /// follow along.
    pub fn handle_window_event(
        &mut self,
        field: &mut ParticleField,
        event: &WindowEvent,
    ) -> Option<InputChange> {
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                let logical = position.to_logical::<f64>(self.viewport.dpr);
                self.pointer_moved(field, logical.x, logical.y);
                Some(InputChange::Pointer)
            }
            WindowEvent::CursorLeft { .. } => {
                self.pointer_left(field);
                Some(InputChange::Pointer)
            }
            WindowEvent::Resized(size) => {
                self.viewport = Viewport::from_physical(size.width, size.height, self.viewport.dpr);
                Some(InputChange::Viewport(self.viewport))
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                let (w, h) = physical_extent(self.viewport);
                self.viewport = Viewport::from_physical(w, h, *scale_factor);
                Some(InputChange::Viewport(self.viewport))
            }
            _ => None,
        }
    }
}

/// Physical pixel size the current viewport was derived from.
fn physical_extent(viewport: Viewport) -> (u32, u32) {
    (
        (viewport.width * viewport.dpr).round() as u32,
        (viewport.height * viewport.dpr).round() as u32,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::pointer_sentinel;
    use crate::particle::Position;

    #[test]
    fn test_pointer_last_write_wins() {
        let mut field = ParticleField::with_seed(0);
        let mut input = InputTracker::new(Viewport::new(800.0, 600.0, 1.0));

        input.pointer_moved(&mut field, 10.0, 20.0);
        input.pointer_moved(&mut field, 30.0, 40.0);
        input.pointer_moved(&mut field, -100.0, 5_000.0);
        assert_eq!(field.pointer, Position::new(-100.0, 5_000.0));
    }

    #[test]
    fn test_pointer_left_respects_setting() {
        let mut field = ParticleField::with_seed(0);
        let mut input = InputTracker::new(Viewport::new(800.0, 600.0, 1.0));

        input.pointer_moved(&mut field, 10.0, 20.0);
        input.pointer_left(&mut field);
        assert_eq!(field.pointer, Position::new(10.0, 20.0));

        input.clear_on_leave = true;
        input.pointer_left(&mut field);
        assert_eq!(field.pointer, pointer_sentinel());
    }

    #[test]
    fn test_viewport_change_rebuilds_field() {
        let mut field = ParticleField::with_seed(0);
        let mut input = InputTracker::new(Viewport::new(200.0, 100.0, 1.0));
        field.resize_to(input.viewport());
        assert_eq!(field.len(), 40);

        input.viewport_changed(&mut field, Viewport::new(1280.0, 720.0, 2.0));
        assert_eq!(field.len(), 51);
        assert_eq!(field.dpr(), 2.0);
        assert_eq!(input.viewport(), Viewport::new(1280.0, 720.0, 2.0));
    }

    #[test]
    fn test_physical_extent_round_trips() {
        let viewport = Viewport::from_physical(1366, 768, 1.25);
        assert_eq!(physical_extent(viewport), (1366, 768));
    }
}
