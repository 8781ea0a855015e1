//! Wires the field, simulator, renderer, palette and input tracking to one
//! drawing surface and one frame driver.

use crate::app_settings::AppSettings;
use crate::field::{ParticleField, Viewport};
use crate::input::{InputChange, InputTracker};
use crate::palette::PaletteProvider;
use crate::physics::Simulator;
use crate::rendering::{DrawSurface, Renderer};
use crate::scheduler::{FrameDriver, FrameHandle, Scheduler};
use crate::theme::ThemeChange;
use winit::event::WindowEvent;

pub struct Backdrop<D: FrameDriver, S: DrawSurface, P: PaletteProvider> {
    field: ParticleField,
    simulator: Simulator,
    renderer: Renderer,
    scheduler: Scheduler<D>,
    input: InputTracker,
    palette: P,
    surface: S,
    reduced_motion: bool,
}

impl<D: FrameDriver, S: DrawSurface, P: PaletteProvider> Backdrop<D, S, P> {
    /// Attaches to `surface`. Without one there is nothing to animate and
    /// `None` comes back; callers treat that as the feature being off.
    ///
    /// Colors are resolved once here. The loop is not started.
    pub fn mount(
        surface: Option<S>,
        driver: D,
        palette: P,
        mut field: ParticleField,
        settings: &AppSettings,
        viewport: Viewport,
    ) -> Option<Self> {
        let Some(surface) = surface else {
            log::info!("no drawing surface, particle background disabled");
            return None;
        };

        palette.refresh(&mut field.palette);

        let mut input = InputTracker::new(viewport);
        input.clear_on_leave = settings.clear_pointer_on_leave;

        Some(Self {
            field,
            simulator: Simulator::new(settings.physics.clone()),
            renderer: Renderer::new(settings.render.clone()),
            scheduler: Scheduler::new(driver),
            input,
            palette,
            surface,
            reduced_motion: settings.reduced_motion,
        })
    }

    /// (Re)starts the loop: cancels any pending frame, rebuilds the field
    /// for the current viewport and requests the first frame.
    pub fn start(&mut self) {
        self.scheduler.stop();
        let viewport = self.input.viewport();
        self.apply_viewport(viewport);
        self.scheduler.start();
        log::debug!("animation loop started with {} particles", self.field.len());
    }

    pub fn stop(&mut self) {
        if self.scheduler.is_running() {
            log::debug!("animation loop stopped");
        }
        self.scheduler.stop();
    }

    /// Runs one iteration if `handle` is the live frame: step, draw, then
    /// request the next frame. Stale handles are ignored.
    pub fn on_frame(&mut self, handle: FrameHandle) -> bool {
        if !self.scheduler.begin_frame(handle) {
            return false;
        }
        self.simulator.step(&mut self.field);
        self.renderer.draw(&self.field, &mut self.surface);
        self.scheduler.end_frame();
        true
    }

    /// Paints the current state without advancing it.
    pub fn redraw(&mut self) {
        self.renderer.draw(&self.field, &mut self.surface);
    }

    pub fn on_pointer_moved(&mut self, x: f64, y: f64) {
        self.input.pointer_moved(&mut self.field, x, y);
    }

    pub fn on_pointer_left(&mut self) {
        self.input.pointer_left(&mut self.field);
    }

    pub fn on_resize(&mut self, viewport: Viewport) {
        self.apply_viewport(viewport);
    }

    /// Feeds a window event through the input tracker.
    pub fn handle_window_event(&mut self, event: &WindowEvent) -> Option<InputChange> {
        let change = self.input.handle_window_event(&mut self.field, event)?;
        if let InputChange::Viewport(viewport) = change {
            self.apply_viewport(viewport);
        }
        Some(change)
    }

    /// Re-resolves colors for the new theme and repaints right away.
    pub fn on_theme_change(&mut self, change: ThemeChange) {
        self.palette.apply_theme(change.theme);
        if self.palette.refresh(&mut self.field.palette) {
            log::debug!(
                "palette refreshed for {} theme: dot {} line {}",
                change.theme,
                self.field.palette.dot,
                self.field.palette.line
            );
        }
        self.redraw();
    }

    /// A reduced-motion preference change restarts the loop; it does not
    /// pause it.
    pub fn on_reduced_motion_change(&mut self, reduced: bool) {
        self.reduced_motion = reduced;
        log::info!("reduced motion preference now {}, restarting", reduced);
        self.start();
    }

    pub fn reduced_motion(&self) -> bool {
        self.reduced_motion
    }

    pub fn is_running(&self) -> bool {
        self.scheduler.is_running()
    }

    pub fn viewport(&self) -> Viewport {
        self.input.viewport()
    }

    pub fn field(&self) -> &ParticleField {
        &self.field
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn driver_mut(&mut self) -> &mut D {
        self.scheduler.driver_mut()
    }

    fn apply_viewport(&mut self, viewport: Viewport) {
        self.input.viewport_changed(&mut self.field, viewport);
        let viewport = self.field.viewport;
        self.surface.resize(viewport.width, viewport.height, viewport.dpr);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::{FixedPalette, Palette, Rgb};
    use crate::rendering::RecordingSurface;
    use crate::scheduler::ManualFrameDriver;

    type TestBackdrop = Backdrop<ManualFrameDriver, RecordingSurface, FixedPalette>;

    fn mount(palette: FixedPalette) -> TestBackdrop {
        Backdrop::mount(
            Some(RecordingSurface::new()),
            ManualFrameDriver::new(),
            palette,
            ParticleField::with_seed(21),
            &AppSettings::default(),
            Viewport::new(1280.0, 720.0, 2.0),
        )
        .unwrap()
    }

    #[test]
    fn test_missing_surface_disables() {
        let backdrop: Option<TestBackdrop> = Backdrop::mount(
            None,
            ManualFrameDriver::new(),
            FixedPalette::empty(),
            ParticleField::with_seed(0),
            &AppSettings::default(),
            Viewport::new(800.0, 600.0, 1.0),
        );
        assert!(backdrop.is_none());
    }

    #[test]
    fn test_mount_resolves_palette_but_does_not_start() {
        let backdrop = mount(FixedPalette::new("1,1,1", "2,2,2"));
        assert_eq!(backdrop.field().palette.dot, Rgb::new(1, 1, 1));
        assert!(!backdrop.is_running());
        assert_eq!(backdrop.surface().frames, 0);
    }

    #[test]
    fn test_start_sizes_field_and_surface() {
        let mut backdrop = mount(FixedPalette::empty());
        backdrop.start();

        assert_eq!(backdrop.field().len(), 51);
        assert_eq!(backdrop.surface().size, (1280.0, 720.0, 2.0));
        assert_eq!(backdrop.driver_mut().pending(), 1);
    }

    #[test]
    fn test_theme_change_redraws_immediately() {
        let mut backdrop = mount(FixedPalette::empty());
        backdrop.start();
        let before = backdrop.field().particles.clone();

        backdrop.on_theme_change(ThemeChange {
            theme: crate::theme::Theme::Light,
        });
        assert_eq!(backdrop.surface().frames, 1);
        // Redraw only; nothing moved.
        assert_eq!(backdrop.field().particles, before);
        assert_eq!(backdrop.field().palette, Palette::default());
    }

    #[test]
    fn test_reduced_motion_restarts_loop() {
        let mut backdrop = mount(FixedPalette::empty());
        backdrop.start();
        let before = backdrop.field().particles.clone();

        backdrop.on_reduced_motion_change(true);
        assert!(backdrop.reduced_motion());
        assert!(backdrop.is_running());
        assert_eq!(backdrop.driver_mut().pending(), 1);
        assert_ne!(backdrop.field().particles, before);
    }
}
