//! Embedded web rendering surface bookkeeping.
//!
//! The surface itself is an external collaborator behind [`SurfaceBackend`].
//! [`EmbeddedSurface`] only tracks its lifecycle and derives its rectangle
//! from the host window rectangle.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use url::Url;

use crate::Error;
use crate::overlay::geometry::{Insets, Rect};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceHandle(pub u64);

/// Rendering collaborator: paints `url` into a rectangle.
pub trait SurfaceBackend: Send {
    fn create(&mut self, url: &Url, rect: Rect) -> Result<SurfaceHandle, Error>;
    fn resize(&mut self, handle: SurfaceHandle, rect: Rect) -> Result<(), Error>;
    fn destroy(&mut self, handle: SurfaceHandle) -> Result<(), Error>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SurfaceState {
    Uncreated,
    Creating,
    Active,
    Destroyed,
}

/// When the surface is created relative to the host window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SurfacePolicy {
    /// Create as soon as the host window exists, sized to it.
    #[default]
    Immediate,
    /// Wait for an explicit start-surface command.
    Deferred,
}

#[derive(Debug)]
pub struct EmbeddedSurface {
    url: Url,
    insets: Insets,
    rect: Option<Rect>,
    state: SurfaceState,
    handle: Option<SurfaceHandle>,
}

impl EmbeddedSurface {
    pub fn new(url: Url, insets: Insets) -> Self {
        Self {
            url,
            insets,
            rect: None,
            state: SurfaceState::Uncreated,
            handle: None,
        }
    }

    pub fn state(&self) -> SurfaceState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == SurfaceState::Active
    }

    /// Rectangle last pushed to the surface, if it was ever created.
    pub fn rect(&self) -> Option<Rect> {
        self.rect
    }

    /// Rectangle the surface should occupy for a given host rectangle.
    pub fn target_rect(&self, host: Rect) -> Rect {
        self.insets.apply(host)
    }

    /// Creates the surface unless it already exists. On failure the surface
    /// returns to `Uncreated` so a later start request can retry.
    pub fn create<B: SurfaceBackend>(&mut self, backend: &mut B, host: Rect) -> Result<(), Error> {
        match self.state {
            SurfaceState::Creating | SurfaceState::Active => return Ok(()),
            SurfaceState::Destroyed => {
                return Err(Error::Surface("surface already destroyed".into()));
            }
            SurfaceState::Uncreated => {}
        }

        let rect = self.target_rect(host);
        self.state = SurfaceState::Creating;
        match backend.create(&self.url, rect) {
            Ok(handle) => {
                self.handle = Some(handle);
                self.rect = Some(rect);
                self.state = SurfaceState::Active;
                info!(target: "chatlay::surface", url = %self.url, ?rect, "surface active");
                Ok(())
            }
            Err(e) => {
                self.state = SurfaceState::Uncreated;
                Err(e)
            }
        }
    }

    /// Pushes the rectangle derived from `host` when the surface is active.
    pub fn sync<B: SurfaceBackend>(&mut self, backend: &mut B, host: Rect) -> Result<(), Error> {
        let Some(handle) = self.handle.filter(|_| self.is_active()) else {
            return Ok(());
        };
        let rect = self.target_rect(host);
        if self.rect == Some(rect) {
            return Ok(());
        }
        backend.resize(handle, rect)?;
        self.rect = Some(rect);
        Ok(())
    }

    /// Idempotent, including for a surface that was never created.
    pub fn destroy<B: SurfaceBackend>(&mut self, backend: &mut B) {
        if self.state == SurfaceState::Destroyed {
            return;
        }
        if let Some(handle) = self.handle.take() {
            if let Err(e) = backend.destroy(handle) {
                warn!(target: "chatlay::surface", "failed to destroy surface: {}", e);
            }
        }
        self.state = SurfaceState::Destroyed;
    }
}
