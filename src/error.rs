//! Error types for the host window and settings.
//!
//! None of these reach the animation itself: a surface failure disables the
//! background instead of tearing the window down.

use std::fmt;

/// Errors that can occur while bringing up or presenting the window surface.
#[derive(Debug)]
pub enum BackdropError {
    /// Failed to create the event loop.
    EventLoop(winit::error::EventLoopError),
    /// Failed to create the window.
    Window(winit::error::OsError),
    /// The raster surface could not be acquired.
    Surface(softbuffer::SoftBufferError),
    /// The frame could not be handed to the window.
    Present(softbuffer::SoftBufferError),
}

impl fmt::Display for BackdropError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackdropError::EventLoop(e) => write!(f, "Failed to create event loop: {}", e),
            BackdropError::Window(e) => write!(f, "Failed to create window: {}", e),
            BackdropError::Surface(e) => write!(f, "Failed to acquire drawing surface: {}", e),
            BackdropError::Present(e) => write!(f, "Failed to present frame: {}", e),
        }
    }
}

impl std::error::Error for BackdropError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BackdropError::EventLoop(e) => Some(e),
            BackdropError::Window(e) => Some(e),
            BackdropError::Surface(e) | BackdropError::Present(e) => Some(e),
        }
    }
}

impl From<winit::error::EventLoopError> for BackdropError {
    fn from(e: winit::error::EventLoopError) -> Self {
        BackdropError::EventLoop(e)
    }
}

impl From<winit::error::OsError> for BackdropError {
    fn from(e: winit::error::OsError) -> Self {
        BackdropError::Window(e)
    }
}

/// Errors that can occur while loading `settings.toml`.
#[derive(Debug)]
pub enum SettingsError {
    /// Failed to read the file from disk.
    Io(std::io::Error),
    /// The file is not valid settings TOML.
    Parse(toml::de::Error),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::Io(e) => write!(f, "Failed to read settings file: {}", e),
            SettingsError::Parse(e) => write!(f, "Failed to parse settings file: {}", e),
        }
    }
}

impl std::error::Error for SettingsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SettingsError::Io(e) => Some(e),
            SettingsError::Parse(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for SettingsError {
    fn from(e: std::io::Error) -> Self {
        SettingsError::Io(e)
    }
}

impl From<toml::de::Error> for SettingsError {
    fn from(e: toml::de::Error) -> Self {
        SettingsError::Parse(e)
    }
}
