//! Tauri-backed host window and chat surface.
//!
//! The host is a frameless, transparent, always-on-top window with two child
//! webviews: the local control chrome along the top edge and the remote chat
//! page below it. Child webviews are positioned relative to the host, so the
//! surface offset is the constant top-left of the inset.

use std::collections::HashMap;

use tauri::webview::WebviewBuilder;
use tauri::window::WindowBuilder;
use tauri::{
    AppHandle, LogicalPosition, LogicalSize, Manager, Runtime, Webview, WebviewUrl, Window, Wry,
};
use tracing::debug;
use url::Url;

use crate::Error;
use crate::overlay::geometry::{Insets, Rect};
use crate::overlay::session::HostWindow;
use crate::overlay::surface::{SurfaceBackend, SurfaceHandle};
use crate::settings::OverlaySettings;

pub const HOST_LABEL: &str = "overlay";
pub const CHROME_LABEL: &str = "chrome";
pub const SURFACE_LABEL: &str = "chat";

pub struct TauriHost<R: Runtime = Wry> {
    window: Window<R>,
    chrome: Webview<R>,
    chrome_height: f64,
}

impl<R: Runtime> TauriHost<R> {
    pub fn create<M: Manager<R>>(
        manager: &M,
        settings: &OverlaySettings,
        rect: Rect,
    ) -> Result<Self, Error> {
        let window = WindowBuilder::new(manager, HOST_LABEL)
            .title(&settings.title)
            .inner_size(rect.width, rect.height)
            .position(rect.x, rect.y)
            .decorations(false)
            .transparent(true)
            .always_on_top(true)
            .skip_taskbar(true)
            .resizable(false)
            .shadow(false)
            .build()
            .map_err(|e| Error::WindowCreation(e.to_string()))?;

        let chrome = WebviewBuilder::new(CHROME_LABEL, WebviewUrl::App("index.html".into()))
            .transparent(true);
        let chrome = match window.add_child(
            chrome,
            LogicalPosition::new(0.0, 0.0),
            LogicalSize::new(rect.width, settings.chrome_height),
        ) {
            Ok(chrome) => chrome,
            Err(e) => {
                // Don't leave a half-built overlay on screen.
                let _ = window.destroy();
                return Err(Error::WindowCreation(e.to_string()));
            }
        };

        Ok(Self {
            window,
            chrome,
            chrome_height: settings.chrome_height,
        })
    }
}

impl<R: Runtime> HostWindow for TauriHost<R> {
    fn set_rect(&mut self, rect: Rect) -> Result<(), Error> {
        self.window.set_position(LogicalPosition::new(rect.x, rect.y))?;
        self.window.set_size(LogicalSize::new(rect.width, rect.height))?;
        self.chrome.set_size(LogicalSize::new(rect.width, self.chrome_height))?;
        Ok(())
    }

    fn close(&mut self) -> Result<(), Error> {
        self.window.destroy()?;
        Ok(())
    }
}

/// Hosts the chat page as a child webview of the overlay window.
pub struct TauriSurface<R: Runtime = Wry> {
    app: AppHandle<R>,
    insets: Insets,
    webviews: HashMap<SurfaceHandle, Webview<R>>,
    next_id: u64,
}

impl<R: Runtime> TauriSurface<R> {
    pub fn new(app: AppHandle<R>, insets: Insets) -> Self {
        Self {
            app,
            insets,
            webviews: HashMap::new(),
            next_id: 1,
        }
    }

    fn offset(&self) -> LogicalPosition<f64> {
        LogicalPosition::new(self.insets.left, self.insets.top)
    }

    fn webview(&self, handle: SurfaceHandle) -> Result<&Webview<R>, Error> {
        self.webviews
            .get(&handle)
            .ok_or_else(|| Error::Surface(format!("unknown surface {:?}", handle)))
    }
}

impl<R: Runtime> SurfaceBackend for TauriSurface<R> {
    fn create(&mut self, url: &Url, rect: Rect) -> Result<SurfaceHandle, Error> {
        let window = self
            .app
            .get_window(HOST_LABEL)
            .ok_or_else(|| Error::SurfaceCreation("overlay window does not exist".into()))?;

        let handle = SurfaceHandle(self.next_id);
        let label = format!("{}-{}", SURFACE_LABEL, handle.0);
        let builder =
            WebviewBuilder::new(&label, WebviewUrl::External(url.clone())).transparent(true);

        let webview = window
            .add_child(builder, self.offset(), LogicalSize::new(rect.width, rect.height))
            .map_err(|e| Error::SurfaceCreation(e.to_string()))?;
        debug!(target: "chatlay::surface", %label, %url, "chat webview created");

        self.next_id += 1;
        self.webviews.insert(handle, webview);
        Ok(handle)
    }

    fn resize(&mut self, handle: SurfaceHandle, rect: Rect) -> Result<(), Error> {
        let webview = self.webview(handle)?;
        webview
            .set_position(self.offset())
            .map_err(|e| Error::Surface(e.to_string()))?;
        webview
            .set_size(LogicalSize::new(rect.width, rect.height))
            .map_err(|e| Error::Surface(e.to_string()))?;
        Ok(())
    }

    fn destroy(&mut self, handle: SurfaceHandle) -> Result<(), Error> {
        let webview = self
            .webviews
            .remove(&handle)
            .ok_or_else(|| Error::Surface(format!("unknown surface {:?}", handle)))?;
        webview.close().map_err(|e| Error::Surface(e.to_string()))
    }
}
