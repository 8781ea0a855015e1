//! Ambient particle background: drifting dots joined by faint connectors,
//! pushed aside by the pointer and recolored with the active theme.

pub mod app;
pub mod app_settings;
pub mod backdrop;
pub mod clock;
pub mod error;
pub mod field;
pub mod input;
pub mod palette;
pub mod particle;
pub mod physics;
pub mod rendering;
pub mod scheduler;
pub mod theme;

pub use app_settings::AppSettings;
pub use backdrop::Backdrop;
pub use error::{BackdropError, SettingsError};
pub use field::{ParticleField, Viewport};
pub use palette::{Palette, PaletteProvider};
pub use physics::Simulator;
pub use rendering::{DrawSurface, Renderer};
pub use scheduler::{FrameDriver, Scheduler};
