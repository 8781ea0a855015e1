//! Native host: one window, one softbuffer surface, the backdrop painted
//! into it on every redraw.

use crate::app_settings::AppSettings;
use crate::backdrop::Backdrop;
use crate::clock::FrameClock;
use crate::error::BackdropError;
use crate::field::{ParticleField, Viewport};
use crate::palette::{Rgb, ThemePalette};
use crate::rendering::RasterCanvas;
use crate::scheduler::{FrameDriver, FrameHandle, HandleSequence};
use crate::theme::{Theme, ThemeChange, ThemeController, ThemeSheet, BACKGROUND_TOKEN};
use std::num::NonZeroU32;
use std::rc::Rc;
use std::time::Duration;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, Event, KeyEvent, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop, EventLoopWindowTarget};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowBuilder};

const FALLBACK_BACKGROUND: Rgb = Rgb::new(11, 15, 25);
const FPS_REPORT_INTERVAL: Duration = Duration::from_millis(500);

/// Frame driver backed by the window's redraw requests.
///
/// winit coalesces redraw requests, so at most one is outstanding; a
/// cancelled handle simply stops being the one `take_due` returns.
pub struct WindowFrameDriver {
    window: Rc<Window>,
    handles: HandleSequence,
    pending: Option<FrameHandle>,
}

impl WindowFrameDriver {
    pub fn new(window: Rc<Window>) -> Self {
        Self {
            window,
            handles: HandleSequence::default(),
            pending: None,
        }
    }

    /// The frame due on this redraw, if any. Redraws the platform sends on
    /// its own (exposure, resize) return `None`.
    pub fn take_due(&mut self) -> Option<FrameHandle> {
        self.pending.take()
    }
}

impl FrameDriver for WindowFrameDriver {
    fn request_frame(&mut self) -> FrameHandle {
        let handle = self.handles.next_handle();
        self.pending = Some(handle);
        self.window.request_redraw();
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if self.pending == Some(handle) {
            self.pending = None;
        }
    }
}

/// The window's raster surface.
struct WindowSurface {
    _context: softbuffer::Context<Rc<Window>>,
    surface: softbuffer::Surface<Rc<Window>, Rc<Window>>,
    size: (u32, u32),
}

impl WindowSurface {
    fn new(window: &Rc<Window>) -> Result<Self, BackdropError> {
        let context = softbuffer::Context::new(Rc::clone(window)).map_err(BackdropError::Surface)?;
        let surface =
            softbuffer::Surface::new(&context, Rc::clone(window)).map_err(BackdropError::Surface)?;
        Ok(Self {
            _context: context,
            surface,
            size: (0, 0),
        })
    }

    fn present(&mut self, window: &Window, canvas: &RasterCanvas) -> Result<(), BackdropError> {
        let size = window.inner_size();
        let (Some(width), Some(height)) = (NonZeroU32::new(size.width), NonZeroU32::new(size.height))
        else {
            // Minimized.
            return Ok(());
        };

        if self.size != (size.width, size.height) {
            self.surface
                .resize(width, height)
                .map_err(BackdropError::Present)?;
            self.size = (size.width, size.height);
        }

        let mut buffer = self.surface.buffer_mut().map_err(BackdropError::Present)?;
        canvas.blit_into(&mut buffer, size.width, size.height);
        window.pre_present_notify();
        buffer.present().map_err(BackdropError::Present)
    }
}

type WindowBackdrop = Backdrop<WindowFrameDriver, RasterCanvas, ThemePalette>;

struct App {
    window: Rc<Window>,
    presenter: Option<WindowSurface>,
    backdrop: Option<WindowBackdrop>,
    themes: ThemeController,
    sheet: ThemeSheet,
    clock: FrameClock,
    settings: AppSettings,
}

fn background_for(sheet: &ThemeSheet, theme: Theme) -> Rgb {
    sheet
        .token(theme, BACKGROUND_TOKEN)
        .and_then(|raw| raw.trim().parse().ok())
        .unwrap_or(FALLBACK_BACKGROUND)
}

impl App {
    fn new(window: Rc<Window>, settings: AppSettings) -> Self {
        let system = window.theme().map(Theme::from).unwrap_or(Theme::Dark);
        let themes = ThemeController::new(settings.theme, system);
        let sheet = settings.themes.clone();

        let presenter = if settings.enabled {
            match WindowSurface::new(&window) {
                Ok(presenter) => Some(presenter),
                Err(e) => {
                    log::warn!("{}", e);
                    None
                }
            }
        } else {
            None
        };

        let canvas = presenter
            .as_ref()
            .map(|_| RasterCanvas::new(background_for(&sheet, themes.active())));
        let field = match settings.seed {
            Some(seed) => ParticleField::with_seed(seed),
            None => ParticleField::new(),
        };
        let size = window.inner_size();
        let viewport = Viewport::from_physical(size.width, size.height, window.scale_factor());

        let mut backdrop = Backdrop::mount(
            canvas,
            WindowFrameDriver::new(Rc::clone(&window)),
            ThemePalette::new(sheet.clone(), themes.active()),
            field,
            &settings,
            viewport,
        );
        if let Some(backdrop) = backdrop.as_mut() {
            backdrop.start();
            backdrop.on_theme_change(themes.initial());
            log::info!(
                "particle background running: {:.0}x{:.0} @{:.2}x, {} theme",
                viewport.width,
                viewport.height,
                viewport.dpr,
                themes.active()
            );
        }

        Self {
            window,
            presenter,
            backdrop,
            themes,
            sheet,
            clock: FrameClock::new(60.0),
            settings,
        }
    }

    fn window_event(&mut self, event: WindowEvent, target: &EventLoopWindowTarget<()>) {
        match event {
            WindowEvent::CloseRequested => target.exit(),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => self.handle_key(code, target),
            WindowEvent::ThemeChanged(theme) => {
                if let Some(change) = self.themes.system_changed(theme.into()) {
                    self.apply_theme(change);
                }
            }
            WindowEvent::RedrawRequested => self.redraw_requested(),
            other => {
                if let Some(backdrop) = self.backdrop.as_mut() {
                    backdrop.handle_window_event(&other);
                }
            }
        }
    }

    fn handle_key(&mut self, code: KeyCode, target: &EventLoopWindowTarget<()>) {
        match code {
            KeyCode::Escape => target.exit(),
            KeyCode::KeyT => {
                let change = self.themes.toggle();
                self.apply_theme(change);
            }
            KeyCode::KeyM => {
                if let Some(backdrop) = self.backdrop.as_mut() {
                    let reduced = !backdrop.reduced_motion();
                    backdrop.on_reduced_motion_change(reduced);
                }
            }
            _ => {}
        }
    }

    fn apply_theme(&mut self, change: ThemeChange) {
        let background = background_for(&self.sheet, change.theme);
        if let Some(backdrop) = self.backdrop.as_mut() {
            backdrop.surface_mut().set_background(background);
            backdrop.on_theme_change(change);
        }
        self.present();
    }

    fn redraw_requested(&mut self) {
        let Some(backdrop) = self.backdrop.as_mut() else {
            return;
        };

        if let Some(handle) = backdrop.driver_mut().take_due() {
            if backdrop.on_frame(handle) {
                self.clock.tick();
                self.report_fps();
            }
        }
        self.present();
    }

    fn present(&mut self) {
        let (Some(presenter), Some(backdrop)) = (self.presenter.as_mut(), self.backdrop.as_mut())
        else {
            return;
        };

        if let Err(e) = presenter.present(&self.window, backdrop.surface()) {
            log::warn!("{}; disabling particle background", e);
            backdrop.stop();
            self.backdrop = None;
            self.presenter = None;
        }
    }

    fn report_fps(&mut self) {
        if !self.settings.show_fps {
            return;
        }
        if let Some(fps) = self.clock.report_due(FPS_REPORT_INTERVAL) {
            self.window
                .set_title(&format!("{} - FPS: {:.1}", self.settings.window.title, fps));
        }
    }
}

/// Opens the window and runs until it is closed.
pub fn run(settings: AppSettings) -> Result<(), BackdropError> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let window = Rc::new(
        WindowBuilder::new()
            .with_title(&settings.window.title)
            .with_inner_size(LogicalSize::new(
                settings.window.width,
                settings.window.height,
            ))
            .build(&event_loop)?,
    );

    let mut app = App::new(window, settings);

    event_loop.run(move |event, target| {
        if let Event::WindowEvent { event, window_id } = event {
            if window_id == app.window.id() {
                app.window_event(event, target);
            }
        }
    })?;

    Ok(())
}
