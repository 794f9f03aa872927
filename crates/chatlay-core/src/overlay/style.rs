//! Click-through / opaque state machine for the host window.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::Error;
use crate::overlay::geometry::InputMode;
use crate::overlay::platform::{ExStyle, WindowHandle, WindowStyler};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum StyleState {
    /// No handle has been styled yet.
    Unstyled,
    Opaque,
    ClickThrough,
}

pub struct StyleMachine {
    styler: Arc<dyn WindowStyler>,
    handle: Option<WindowHandle>,
    state: StyleState,
    alpha: u8,
}

pub fn opacity_to_alpha(opacity: f64) -> u8 {
    (opacity.clamp(0.0, 1.0) * 255.0).round() as u8
}

impl StyleMachine {
    pub fn new(styler: Arc<dyn WindowStyler>, opacity: f64) -> Self {
        Self {
            styler,
            handle: None,
            state: StyleState::Unstyled,
            alpha: opacity_to_alpha(opacity),
        }
    }

    pub fn state(&self) -> StyleState {
        self.state
    }

    pub fn handle(&self) -> Option<WindowHandle> {
        self.handle
    }

    pub fn styler(&self) -> Arc<dyn WindowStyler> {
        self.styler.clone()
    }

    pub fn click_through(&self) -> bool {
        self.state == StyleState::ClickThrough
    }

    pub fn input_mode(&self) -> InputMode {
        if self.click_through() {
            InputMode::PassThrough
        } else {
            InputMode::Interactive
        }
    }

    /// Styles a freshly resolved handle.
    ///
    /// From `Unstyled` this is the automatic transition to `Opaque`. After a
    /// re-resolve the current state is re-applied to the new handle instead.
    pub fn attach(&mut self, handle: WindowHandle) -> Result<StyleState, Error> {
        let target = match self.state {
            StyleState::Unstyled => StyleState::Opaque,
            styled => styled,
        };
        self.apply(handle, target)?;
        self.handle = Some(handle);
        self.state = target;
        info!(target: "chatlay::style", ?handle, state = ?target, "overlay styled");
        Ok(target)
    }

    pub fn enable_click_through(&mut self) -> Result<StyleState, Error> {
        self.transition(StyleState::ClickThrough)
    }

    pub fn disable_click_through(&mut self) -> Result<StyleState, Error> {
        self.transition(StyleState::Opaque)
    }

    /// Flips `ClickThrough` and `Opaque`. A no-op while nothing is styled.
    pub fn toggle(&mut self) -> Result<StyleState, Error> {
        match self.state {
            StyleState::Opaque => self.transition(StyleState::ClickThrough),
            StyleState::ClickThrough => self.transition(StyleState::Opaque),
            StyleState::Unstyled => {
                info!(target: "chatlay::style", "click-through unavailable, window not styled yet");
                Ok(StyleState::Unstyled)
            }
        }
    }

    /// Idempotent; safe to call whenever another window may have taken topmost.
    pub fn reassert_topmost(&self) -> Result<(), Error> {
        match self.handle {
            Some(handle) => self.styler.set_always_on_top(handle),
            None => Ok(()),
        }
    }

    fn transition(&mut self, target: StyleState) -> Result<StyleState, Error> {
        let Some(handle) = self.handle else {
            info!(target: "chatlay::style", ?target, "no window handle resolved, ignoring");
            return Ok(self.state);
        };
        if !self.styler.is_window(handle) {
            // Styling resumes once the resolver has found the window again.
            self.handle = None;
            return Err(Error::StaleHandle(handle.0));
        }
        if self.state == target {
            self.styler.set_always_on_top(handle)?;
            return Ok(target);
        }

        self.apply(handle, target)?;
        self.state = target;
        info!(
            target: "chatlay::style",
            click_through = self.click_through(),
            "click-through {}",
            if self.click_through() { "enabled" } else { "disabled" }
        );
        Ok(target)
    }

    fn apply(&self, handle: WindowHandle, target: StyleState) -> Result<(), Error> {
        let current = self.styler.get_extended_style(handle)?;
        let mut style = current | ExStyle::LAYERED | ExStyle::TOOLWINDOW;
        style.set(ExStyle::TRANSPARENT, target == StyleState::ClickThrough);

        if style == current {
            self.finish(handle)?;
        } else {
            self.styler.set_extended_style(handle, style)?;
            if let Err(e) = self.finish(handle) {
                // Leave the window in the state the machine still reports.
                if let Err(restore) = self.styler.set_extended_style(handle, current) {
                    warn!(target: "chatlay::style", ?handle, "failed to restore style: {}", restore);
                }
                return Err(e);
            }
        }
        debug!(target: "chatlay::style", ?handle, style = style.bits(), "style applied");
        Ok(())
    }

    fn finish(&self, handle: WindowHandle) -> Result<(), Error> {
        // A layered window stays invisible until its attributes are set.
        self.styler.set_layered_alpha(handle, self.alpha)?;
        self.styler.set_always_on_top(handle)
    }
}
