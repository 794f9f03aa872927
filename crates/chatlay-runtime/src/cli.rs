use std::path::PathBuf;

use chatlay_core::{Error, OverlaySettings, SurfacePolicy};
use clap::{ArgAction, Parser};

#[derive(Parser, Debug)]
#[command(
    name = "chatlay",
    version,
    about = "Frameless, always-on-top chat overlay with click-through"
)]
pub struct Cli {
    /// Chat page to embed. Defaults to the configured URL.
    pub url: Option<String>,

    /// Settings file. Defaults to `<config dir>/chatlay/settings.json`.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[arg(long, allow_negative_numbers = true)]
    pub x: Option<f64>,
    #[arg(long, allow_negative_numbers = true)]
    pub y: Option<f64>,
    #[arg(long)]
    pub width: Option<f64>,
    #[arg(long)]
    pub height: Option<f64>,
    #[arg(long)]
    pub min_width: Option<f64>,
    #[arg(long)]
    pub min_height: Option<f64>,

    /// Window opacity, above 0.0 and at most 1.0.
    #[arg(long)]
    pub opacity: Option<f64>,

    /// Don't load the chat page until asked to (tray, hotkey or chrome button).
    #[arg(long, action = ArgAction::SetTrue)]
    pub defer_surface: bool,

    /// Switch to click-through as soon as the chat page is up.
    #[arg(long, action = ArgAction::SetTrue)]
    pub click_through_on_surface: bool,

    #[arg(long, action = ArgAction::SetTrue)]
    pub debug: bool,
}

impl Cli {
    /// Reads the settings file and layers the command-line flags on top.
    pub fn load_settings(&self) -> Result<OverlaySettings, Error> {
        let settings = match &self.config {
            Some(path) => OverlaySettings::load(path)?,
            None => match OverlaySettings::default_path() {
                Some(path) => OverlaySettings::load(&path)?,
                None => OverlaySettings::default(),
            },
        };
        Ok(self.apply(settings))
    }

    pub fn apply(&self, mut settings: OverlaySettings) -> OverlaySettings {
        if let Some(url) = &self.url {
            settings.url = url.clone();
        }
        let overrides = [
            (self.x, &mut settings.x),
            (self.y, &mut settings.y),
            (self.width, &mut settings.width),
            (self.height, &mut settings.height),
            (self.min_width, &mut settings.min_width),
            (self.min_height, &mut settings.min_height),
            (self.opacity, &mut settings.opacity),
        ];
        for (value, field) in overrides {
            if let Some(value) = value {
                *field = value;
            }
        }
        if self.defer_surface {
            settings.surface_policy = SurfacePolicy::Deferred;
        }
        settings.click_through_on_surface |= self.click_through_on_surface;
        settings.debug |= self.debug;
        settings
    }
}
