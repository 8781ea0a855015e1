//! Theme-driven colors for dots and connector lines.

use crate::theme::{Theme, ThemeSheet};
use std::fmt;
use std::str::FromStr;

pub const DOT_TOKEN: &str = "--particle-dot";
pub const LINE_TOKEN: &str = "--particle-line";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Packs into the `0RGB` layout used by the window surface.
    pub fn to_u32(self) -> u32 {
        (u32::from(self.r) << 16) | (u32::from(self.g) << 8) | u32::from(self.b)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseRgbError(String);

impl fmt::Display for ParseRgbError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "expected an \"r,g,b\" triplet, got {:?}", self.0)
    }
}

impl std::error::Error for ParseRgbError {}

impl FromStr for Rgb {
    type Err = ParseRgbError;

    /// Parses the `"r,g,b"` form theme tokens use, e.g. `"110, 168, 254"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseRgbError(s.to_string());
        let mut channels = s.split(',').map(|part| part.trim().parse::<u8>());

        let r = channels.next().ok_or_else(err)?.map_err(|_| err())?;
        let g = channels.next().ok_or_else(err)?.map_err(|_| err())?;
        let b = channels.next().ok_or_else(err)?.map_err(|_| err())?;
        if channels.next().is_some() {
            return Err(err());
        }
        Ok(Self { r, g, b })
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.r, self.g, self.b)
    }
}

/// A color plus the opacity it is painted with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub rgb: Rgb,
    pub alpha: f64,
}

impl Rgba {
    pub fn new(rgb: Rgb, alpha: f64) -> Self {
        Self {
            rgb,
            alpha: alpha.clamp(0.0, 1.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub dot: Rgb,
    pub line: Rgb,
}

impl Palette {
    pub const DEFAULT_DOT: Rgb = Rgb::new(110, 168, 254);
    pub const DEFAULT_LINE: Rgb = Rgb::new(150, 170, 200);
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            dot: Self::DEFAULT_DOT,
            line: Self::DEFAULT_LINE,
        }
    }
}

/// Source of named color tokens.
pub trait PaletteProvider {
    /// Raw token value, or `None` when the active theme does not define it.
    fn resolve(&self, token: &str) -> Option<String>;

    /// Called with the identifier carried by a theme-change signal.
    fn apply_theme(&mut self, _theme: Theme) {}

    /// Re-reads both tokens into `palette`. Entries whose token is missing,
    /// blank or malformed keep their previous value. Returns whether anything
    /// changed.
    fn refresh(&self, palette: &mut Palette) -> bool {
        let before = *palette;
        if let Some(dot) = self.lookup(DOT_TOKEN) {
            palette.dot = dot;
        }
        if let Some(line) = self.lookup(LINE_TOKEN) {
            palette.line = line;
        }
        *palette != before
    }

    fn lookup(&self, token: &str) -> Option<Rgb> {
        let raw = self.resolve(token)?;
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        match raw.parse() {
            Ok(rgb) => Some(rgb),
            Err(e) => {
                log::warn!("ignoring theme token {}: {}", token, e);
                None
            }
        }
    }
}

/// Reads tokens from the stylesheet of whichever theme is active.
pub struct ThemePalette {
    sheet: ThemeSheet,
    active: Theme,
}

impl ThemePalette {
    pub fn new(sheet: ThemeSheet, active: Theme) -> Self {
        Self { sheet, active }
    }

    pub fn active(&self) -> Theme {
        self.active
    }
}

impl PaletteProvider for ThemePalette {
    fn resolve(&self, token: &str) -> Option<String> {
        self.sheet.token(self.active, token).map(str::to_string)
    }

    fn apply_theme(&mut self, theme: Theme) {
        self.active = theme;
    }
}

/// Fixed token values, independent of any theme.
#[derive(Debug, Clone, Default)]
pub struct FixedPalette {
    pub dot: Option<String>,
    pub line: Option<String>,
}

impl FixedPalette {
    pub fn new(dot: impl Into<String>, line: impl Into<String>) -> Self {
        Self {
            dot: Some(dot.into()),
            line: Some(line.into()),
        }
    }

    /// A provider that resolves nothing, so palettes keep their values.
    pub fn empty() -> Self {
        Self::default()
    }
}

impl PaletteProvider for FixedPalette {
    fn resolve(&self, token: &str) -> Option<String> {
        match token {
            DOT_TOKEN => self.dot.clone(),
            LINE_TOKEN => self.line.clone(),
            _ => None,
        }
    }
}
