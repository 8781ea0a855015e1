//! Light/dark themes, their token stylesheets, and the controller that
//! decides which one is active.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub const BACKGROUND_TOKEN: &str = "--bg";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Theme::Light => write!(f, "light"),
            Theme::Dark => write!(f, "dark"),
        }
    }
}

impl From<winit::window::Theme> for Theme {
    fn from(theme: winit::window::Theme) -> Self {
        match theme {
            winit::window::Theme::Light => Theme::Light,
            winit::window::Theme::Dark => Theme::Dark,
        }
    }
}

/// Signal emitted every time a theme is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemeChange {
    pub theme: Theme,
}

pub type TokenMap = BTreeMap<String, String>;

/// Token values per theme, keyed by token name (`--particle-dot`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeSheet {
    pub dark: TokenMap,
    pub light: TokenMap,
}

impl ThemeSheet {
    pub fn tokens(&self, theme: Theme) -> &TokenMap {
        match theme {
            Theme::Dark => &self.dark,
            Theme::Light => &self.light,
        }
    }

    pub fn token(&self, theme: Theme, name: &str) -> Option<&str> {
        self.tokens(theme).get(name).map(String::as_str)
    }
}

fn token_map(entries: &[(&str, &str)]) -> TokenMap {
    entries
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

impl Default for ThemeSheet {
    fn default() -> Self {
        Self {
            dark: token_map(&[
                ("--particle-dot", "110,168,254"),
                ("--particle-line", "150,170,200"),
                (BACKGROUND_TOKEN, "11,15,25"),
            ]),
            light: token_map(&[
                ("--particle-dot", "37,99,235"),
                ("--particle-line", "71,85,105"),
                (BACKGROUND_TOKEN, "246,248,252"),
            ]),
        }
    }
}

/// Picks the active theme from a stored preference and the system scheme.
///
/// A stored preference always wins. System scheme changes only apply while
/// nothing is stored; toggling stores the new choice.
#[derive(Debug, Clone)]
pub struct ThemeController {
    stored: Option<Theme>,
    active: Theme,
}

impl ThemeController {
    pub fn new(stored: Option<Theme>, system: Theme) -> Self {
        Self {
            stored,
            active: stored.unwrap_or(system),
        }
    }

    pub fn active(&self) -> Theme {
        self.active
    }

    pub fn stored(&self) -> Option<Theme> {
        self.stored
    }

    /// The signal for the initial theme, emitted once at startup.
    pub fn initial(&self) -> ThemeChange {
        ThemeChange { theme: self.active }
    }

    pub fn toggle(&mut self) -> ThemeChange {
        let next = self.active.toggled();
        self.stored = Some(next);
        self.apply(next)
    }

    pub fn system_changed(&mut self, system: Theme) -> Option<ThemeChange> {
        if self.stored.is_some() {
            return None;
        }
        Some(self.apply(system))
    }

    fn apply(&mut self, theme: Theme) -> ThemeChange {
        self.active = theme;
        log::debug!("theme applied: {}", theme);
        ThemeChange { theme }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stored_preference_wins() {
        let controller = ThemeController::new(Some(Theme::Light), Theme::Dark);
        assert_eq!(controller.active(), Theme::Light);

        let controller = ThemeController::new(None, Theme::Dark);
        assert_eq!(controller.active(), Theme::Dark);
    }

    #[test]
    fn test_system_change_ignored_once_stored() {
        let mut controller = ThemeController::new(None, Theme::Dark);
        assert_eq!(
            controller.system_changed(Theme::Light),
            Some(ThemeChange { theme: Theme::Light })
        );

        let change = controller.toggle();
        assert_eq!(change.theme, Theme::Dark);
        assert_eq!(controller.stored(), Some(Theme::Dark));
        assert_eq!(controller.system_changed(Theme::Light), None);
        assert_eq!(controller.active(), Theme::Dark);
    }

    #[test]
    fn test_default_sheet_defines_particle_tokens() {
        let sheet = ThemeSheet::default();
        for theme in [Theme::Dark, Theme::Light] {
            assert!(sheet.token(theme, "--particle-dot").is_some());
            assert!(sheet.token(theme, "--particle-line").is_some());
            assert!(sheet.token(theme, BACKGROUND_TOKEN).is_some());
        }
        assert_eq!(sheet.token(Theme::Dark, "--missing"), None);
    }

    #[test]
    fn test_sheet_from_toml() {
        let sheet: ThemeSheet = toml::from_str(
            r#"
            [light]
            "--particle-dot" = "1,2,3"
            "#,
        )
        .unwrap();
        assert_eq!(sheet.token(Theme::Light, "--particle-dot"), Some("1,2,3"));
        // Tables left out of the file keep their defaults.
        assert!(sheet.token(Theme::Dark, "--particle-dot").is_some());
    }
}
