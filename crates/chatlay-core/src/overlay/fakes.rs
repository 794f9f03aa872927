//! In-memory collaborators for exercising the overlay state machines.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use url::Url;

use crate::Error;
use crate::overlay::geometry::Rect;
use crate::overlay::platform::{ExStyle, WindowHandle, WindowStyler};
use crate::overlay::resolver::WindowMatch;
use crate::overlay::session::HostWindow;
use crate::overlay::surface::{SurfaceBackend, SurfaceHandle};

#[derive(Debug, Clone)]
struct FakeWindow {
    title: String,
    style: ExStyle,
    alpha: Option<u8>,
}

#[derive(Default)]
struct StylerState {
    windows: HashMap<WindowHandle, FakeWindow>,
    fail_styling: bool,
    fail_topmost: bool,
    find_calls: u32,
    topmost_calls: u32,
}

#[derive(Default)]
pub struct FakeStyler {
    state: Mutex<StylerState>,
}

impl FakeStyler {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_window(title: &str, handle: WindowHandle) -> Arc<Self> {
        let styler = Self::new();
        styler.add_window(title, handle);
        styler
    }

    pub fn add_window(&self, title: &str, handle: WindowHandle) {
        self.state.lock().unwrap().windows.insert(
            handle,
            FakeWindow {
                title: title.to_string(),
                style: ExStyle::empty(),
                alpha: None,
            },
        );
    }

    pub fn remove_window(&self, handle: WindowHandle) {
        self.state.lock().unwrap().windows.remove(&handle);
    }

    pub fn fail_styling(&self, fail: bool) {
        self.state.lock().unwrap().fail_styling = fail;
    }

    pub fn fail_topmost(&self, fail: bool) {
        self.state.lock().unwrap().fail_topmost = fail;
    }

    pub fn style(&self, handle: WindowHandle) -> ExStyle {
        self.state.lock().unwrap().windows[&handle].style
    }

    pub fn alpha(&self, handle: WindowHandle) -> Option<u8> {
        self.state.lock().unwrap().windows[&handle].alpha
    }

    pub fn find_calls(&self) -> u32 {
        self.state.lock().unwrap().find_calls
    }

    pub fn topmost_calls(&self) -> u32 {
        self.state.lock().unwrap().topmost_calls
    }
}

impl WindowStyler for FakeStyler {
    fn find_window(&self, criteria: &WindowMatch) -> Option<WindowHandle> {
        let mut state = self.state.lock().unwrap();
        state.find_calls += 1;
        state
            .windows
            .iter()
            .find(|(_, w)| criteria.matches(&w.title))
            .map(|(handle, _)| *handle)
    }

    fn is_window(&self, handle: WindowHandle) -> bool {
        self.state.lock().unwrap().windows.contains_key(&handle)
    }

    fn get_extended_style(&self, handle: WindowHandle) -> Result<ExStyle, Error> {
        let state = self.state.lock().unwrap();
        state
            .windows
            .get(&handle)
            .map(|w| w.style)
            .ok_or(Error::StaleHandle(handle.0))
    }

    fn set_extended_style(&self, handle: WindowHandle, style: ExStyle) -> Result<(), Error> {
        let mut state = self.state.lock().unwrap();
        if state.fail_styling {
            return Err(Error::StyleApplication("access denied".into()));
        }
        let window = state
            .windows
            .get_mut(&handle)
            .ok_or(Error::StaleHandle(handle.0))?;
        window.style = style;
        Ok(())
    }

    fn set_always_on_top(&self, handle: WindowHandle) -> Result<(), Error> {
        let mut state = self.state.lock().unwrap();
        state.topmost_calls += 1;
        if state.fail_topmost {
            return Err(Error::StyleApplication("SetWindowPos denied".into()));
        }
        let window = state
            .windows
            .get_mut(&handle)
            .ok_or(Error::StaleHandle(handle.0))?;
        window.style |= ExStyle::TOPMOST;
        Ok(())
    }

    fn set_layered_alpha(&self, handle: WindowHandle, alpha: u8) -> Result<(), Error> {
        let mut state = self.state.lock().unwrap();
        let window = state
            .windows
            .get_mut(&handle)
            .ok_or(Error::StaleHandle(handle.0))?;
        window.alpha = Some(alpha);
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct HostLog {
    pub rects: Vec<Rect>,
    pub closed: u32,
    pub fail_set_rect: bool,
}

/// Host window that records every geometry push.
#[derive(Clone, Default)]
pub struct FakeHost {
    pub log: Arc<Mutex<HostLog>>,
}

impl HostWindow for FakeHost {
    fn set_rect(&mut self, rect: Rect) -> Result<(), Error> {
        let mut log = self.log.lock().unwrap();
        if log.fail_set_rect {
            return Err(Error::IoError(std::io::Error::other("window is gone")));
        }
        log.rects.push(rect);
        Ok(())
    }

    fn close(&mut self) -> Result<(), Error> {
        self.log.lock().unwrap().closed += 1;
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct SurfaceLog {
    pub created: Vec<(String, Rect)>,
    pub resized: Vec<Rect>,
    pub destroyed: u32,
    pub fail_create: bool,
}

#[derive(Clone, Default)]
pub struct FakeSurface {
    pub log: Arc<Mutex<SurfaceLog>>,
}

impl FakeSurface {
    pub fn failing() -> Self {
        let surface = Self::default();
        surface.log.lock().unwrap().fail_create = true;
        surface
    }
}

impl SurfaceBackend for FakeSurface {
    fn create(&mut self, url: &Url, rect: Rect) -> Result<SurfaceHandle, Error> {
        let mut log = self.log.lock().unwrap();
        if log.fail_create {
            return Err(Error::SurfaceCreation("webview runtime unavailable".into()));
        }
        log.created.push((url.to_string(), rect));
        Ok(SurfaceHandle(log.created.len() as u64))
    }

    fn resize(&mut self, _handle: SurfaceHandle, rect: Rect) -> Result<(), Error> {
        self.log.lock().unwrap().resized.push(rect);
        Ok(())
    }

    fn destroy(&mut self, _handle: SurfaceHandle) -> Result<(), Error> {
        self.log.lock().unwrap().destroyed += 1;
        Ok(())
    }
}
