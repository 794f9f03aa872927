use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::Error;
use crate::hotkeys::{HotkeyBinding, default_bindings};
use crate::overlay::geometry::{Insets, Rect, Size};
use crate::overlay::resolver::{RetryPolicy, WindowMatch};
use crate::overlay::surface::SurfacePolicy;
use crate::validate::validate_url;

pub const DEFAULT_CHAT_URL: &str = "https://botrix.live/embed/chat";
pub const DEFAULT_TITLE: &str = "Chat Overlay";

/// Overlay configuration, read from a camelCase JSON file.
/// Missing fields fall back to their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OverlaySettings {
    pub url: String,
    /// Host window title; also what the resolver matches on.
    pub title: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub min_width: f64,
    pub min_height: f64,
    /// Size restored by the reset-size command.
    pub default_width: f64,
    pub default_height: f64,
    pub opacity: f64,
    pub startup_style_delay_ms: u64,
    pub resolve_attempts: u32,
    pub resolve_interval_ms: u64,
    pub surface_policy: SurfacePolicy,
    /// Enable click-through automatically once the chat surface is active.
    pub click_through_on_surface: bool,
    /// Height of the control strip above the chat surface.
    pub chrome_height: f64,
    pub hotkeys: Vec<HotkeyBinding>,
    pub debug: bool,
}

impl Default for OverlaySettings {
    fn default() -> Self {
        Self {
            url: DEFAULT_CHAT_URL.to_string(),
            title: DEFAULT_TITLE.to_string(),
            x: 40.0,
            y: 40.0,
            width: 400.0,
            height: 600.0,
            min_width: 250.0,
            min_height: 180.0,
            default_width: 400.0,
            default_height: 600.0,
            opacity: 1.0,
            startup_style_delay_ms: 1000,
            resolve_attempts: 10,
            resolve_interval_ms: 500,
            surface_policy: SurfacePolicy::Immediate,
            click_through_on_surface: false,
            chrome_height: 28.0,
            hotkeys: default_bindings(),
            debug: false,
        }
    }
}

impl OverlaySettings {
    /// `<config dir>/chatlay/settings.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("chatlay").join("settings.json"))
    }

    /// Loads settings from `path`, or defaults when the file does not exist.
    pub fn load(path: &Path) -> Result<Self, Error> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Configuration(format!("{}: {}", path.display(), e)))?;
        serde_json::from_str(&content)
            .map_err(|e| Error::Configuration(format!("{}: {}", path.display(), e)))
    }

    /// Checks everything that must hold before a window is created and
    /// returns the parsed chat URL.
    pub fn validate(&self) -> Result<Url, Error> {
        let url = validate_url(&self.url)?;

        let dims = [
            ("width", self.width),
            ("height", self.height),
            ("minWidth", self.min_width),
            ("minHeight", self.min_height),
            ("defaultWidth", self.default_width),
            ("defaultHeight", self.default_height),
        ];
        for (name, value) in dims {
            if !value.is_finite() || value <= 0.0 {
                return Err(Error::InvalidGeometry(format!(
                    "{} must be a positive number, got {}",
                    name, value
                )));
            }
        }
        if !self.x.is_finite() || !self.y.is_finite() {
            return Err(Error::InvalidGeometry("position must be finite".into()));
        }
        if self.width < self.min_width || self.height < self.min_height {
            return Err(Error::InvalidGeometry(format!(
                "size {}x{} is below the minimum {}x{}",
                self.width, self.height, self.min_width, self.min_height
            )));
        }
        if self.default_width < self.min_width || self.default_height < self.min_height {
            return Err(Error::InvalidGeometry(format!(
                "default size {}x{} is below the minimum {}x{}",
                self.default_width, self.default_height, self.min_width, self.min_height
            )));
        }
        if !self.chrome_height.is_finite() || self.chrome_height < 0.0 {
            return Err(Error::InvalidGeometry(format!(
                "chromeHeight must not be negative, got {}",
                self.chrome_height
            )));
        }
        // Alpha 0 would make the layered window invisible.
        if !(self.opacity > 0.0 && self.opacity <= 1.0) {
            return Err(Error::Configuration(format!(
                "opacity must be within (0.0, 1.0], got {}",
                self.opacity
            )));
        }
        if self.resolve_attempts == 0 {
            return Err(Error::Configuration(
                "resolveAttempts must be at least 1".into(),
            ));
        }
        if self.title.trim().is_empty() {
            return Err(Error::Configuration("title must not be empty".into()));
        }

        Ok(url)
    }

    pub fn initial_rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    pub fn min_size(&self) -> Size {
        Size::new(self.min_width, self.min_height)
    }

    pub fn default_size(&self) -> Size {
        Size::new(self.default_width, self.default_height)
    }

    pub fn surface_insets(&self) -> Insets {
        Insets::top(self.chrome_height)
    }

    pub fn startup_delay(&self) -> Duration {
        Duration::from_millis(self.startup_style_delay_ms)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.resolve_attempts,
            retry_interval: Duration::from_millis(self.resolve_interval_ms),
        }
    }

    pub fn window_match(&self) -> WindowMatch {
        WindowMatch::title_contains(self.title.clone())
    }
}
