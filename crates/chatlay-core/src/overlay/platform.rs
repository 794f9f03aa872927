//! Platform-specific window styling
//!
//! The style state machine only talks to [`WindowStyler`]. On Windows the
//! styler manipulates extended window style bits directly through Win32; on
//! other targets it maps the same bits onto Tauri's window API so the overlay
//! keeps working with reduced fidelity (no layered alpha).

use std::fmt;
use std::sync::Arc;

use bitflags::bitflags;
use tauri::{AppHandle, Runtime};

use crate::Error;
use crate::overlay::resolver::WindowMatch;

bitflags! {
    /// Extended window style bits, valued as their Win32 `WS_EX_*` counterparts.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ExStyle: u32 {
        const TOPMOST = 0x0000_0008;
        const TRANSPARENT = 0x0000_0020;
        const TOOLWINDOW = 0x0000_0080;
        const LAYERED = 0x0008_0000;
    }
}

/// Opaque OS-level window reference.
///
/// A lookup result, never owned: it may go stale when the window is recreated.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowHandle(pub isize);

impl fmt::Debug for WindowHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WindowHandle({:#x})", self.0)
    }
}

/// Minimal capability surface needed to discover and restyle a window.
pub trait WindowStyler: Send + Sync {
    fn find_window(&self, criteria: &WindowMatch) -> Option<WindowHandle>;
    fn is_window(&self, handle: WindowHandle) -> bool;
    fn get_extended_style(&self, handle: WindowHandle) -> Result<ExStyle, Error>;
    fn set_extended_style(&self, handle: WindowHandle, style: ExStyle) -> Result<(), Error>;
    fn set_always_on_top(&self, handle: WindowHandle) -> Result<(), Error>;
    fn set_layered_alpha(&self, handle: WindowHandle, alpha: u8) -> Result<(), Error>;
}

/// Styler for the current target.
#[cfg(target_os = "windows")]
pub fn platform_styler<R: Runtime>(_app: &AppHandle<R>) -> Arc<dyn WindowStyler> {
    Arc::new(win32::Win32Styler::new())
}

/// Styler for the current target.
#[cfg(not(target_os = "windows"))]
pub fn platform_styler<R: Runtime>(app: &AppHandle<R>) -> Arc<dyn WindowStyler> {
    Arc::new(fallback::TauriStyler::new(app.clone()))
}

#[cfg(target_os = "windows")]
mod win32 {
    use std::ffi::c_void;

    use tracing::trace;
    use windows::Win32::Foundation::{BOOL, COLORREF, HWND, LPARAM, SetLastError, WIN32_ERROR};
    use windows::Win32::System::Threading::GetCurrentProcessId;
    use windows::Win32::UI::WindowsAndMessaging::{
        EnumWindows, GWL_EXSTYLE, GetWindowLongPtrW, GetWindowTextLengthW, GetWindowTextW,
        GetWindowThreadProcessId, HWND_TOPMOST, IsWindow, IsWindowVisible, LWA_ALPHA,
        SWP_NOACTIVATE, SWP_NOMOVE, SWP_NOSIZE, SetLayeredWindowAttributes, SetWindowLongPtrW,
        SetWindowPos,
    };

    use super::{ExStyle, WindowHandle, WindowStyler};
    use crate::Error;
    use crate::overlay::resolver::WindowMatch;

    pub struct Win32Styler {
        process_id: u32,
    }

    impl Win32Styler {
        pub fn new() -> Self {
            Self {
                process_id: unsafe { GetCurrentProcessId() },
            }
        }
    }

    fn hwnd(handle: WindowHandle) -> HWND {
        HWND(handle.0 as *mut c_void)
    }

    struct Search<'a> {
        criteria: &'a WindowMatch,
        process_id: u32,
        found: Option<HWND>,
    }

    unsafe extern "system" fn visit(hwnd: HWND, lparam: LPARAM) -> BOOL {
        // SAFETY: lparam carries a pointer to the Search living on find_window's stack
        // for the whole EnumWindows call.
        let search = unsafe { &mut *(lparam.0 as *mut Search) };

        unsafe {
            if !IsWindowVisible(hwnd).as_bool() {
                return true.into();
            }

            if search.criteria.own_process_only {
                let mut pid = 0u32;
                GetWindowThreadProcessId(hwnd, Some(&mut pid as *mut u32));
                if pid != search.process_id {
                    return true.into();
                }
            }

            let len = GetWindowTextLengthW(hwnd);
            if len <= 0 {
                return true.into();
            }
            let mut buf = vec![0u16; len as usize + 1];
            let read = GetWindowTextW(hwnd, &mut buf);
            let title = String::from_utf16_lossy(&buf[..read as usize]);

            if search.criteria.matches(&title) {
                search.found = Some(hwnd);
                return false.into();
            }
        }

        true.into()
    }

    impl WindowStyler for Win32Styler {
        fn find_window(&self, criteria: &WindowMatch) -> Option<WindowHandle> {
            let mut search = Search {
                criteria,
                process_id: self.process_id,
                found: None,
            };
            unsafe {
                // Stopping the enumeration early reports an error; the result is in `search`.
                let _ = EnumWindows(Some(visit), LPARAM(&mut search as *mut Search as isize));
            }
            search.found.map(|hwnd| WindowHandle(hwnd.0 as isize))
        }

        fn is_window(&self, handle: WindowHandle) -> bool {
            unsafe { IsWindow(Some(hwnd(handle))).as_bool() }
        }

        fn get_extended_style(&self, handle: WindowHandle) -> Result<ExStyle, Error> {
            if !self.is_window(handle) {
                return Err(Error::StaleHandle(handle.0));
            }
            let bits = unsafe { GetWindowLongPtrW(hwnd(handle), GWL_EXSTYLE) };
            Ok(ExStyle::from_bits_retain(bits as u32))
        }

        fn set_extended_style(&self, handle: WindowHandle, style: ExStyle) -> Result<(), Error> {
            unsafe {
                SetLastError(WIN32_ERROR(0));
                let previous = SetWindowLongPtrW(hwnd(handle), GWL_EXSTYLE, style.bits() as isize);
                if previous == 0 {
                    // Zero is also a legitimate previous value; only a set last-error is a failure.
                    let err = std::io::Error::last_os_error();
                    if err.raw_os_error() != Some(0) {
                        return Err(Error::StyleApplication(format!(
                            "SetWindowLongPtrW failed: {}",
                            err
                        )));
                    }
                }
            }
            trace!(target: "chatlay::platform", ?handle, style = style.bits(), "extended style set");
            Ok(())
        }

        fn set_always_on_top(&self, handle: WindowHandle) -> Result<(), Error> {
            unsafe {
                SetWindowPos(
                    hwnd(handle),
                    Some(HWND_TOPMOST),
                    0,
                    0,
                    0,
                    0,
                    SWP_NOMOVE | SWP_NOSIZE | SWP_NOACTIVATE,
                )
            }
            .map_err(|e| Error::StyleApplication(format!("SetWindowPos failed: {}", e)))
        }

        fn set_layered_alpha(&self, handle: WindowHandle, alpha: u8) -> Result<(), Error> {
            unsafe { SetLayeredWindowAttributes(hwnd(handle), COLORREF(0), alpha, LWA_ALPHA) }
                .map_err(|e| {
                    Error::StyleApplication(format!("SetLayeredWindowAttributes failed: {}", e))
                })
        }
    }
}

#[cfg(not(target_os = "windows"))]
mod fallback {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use tauri::{AppHandle, Manager, Runtime, Window};
    use tracing::debug;

    use super::{ExStyle, WindowHandle, WindowStyler};
    use crate::Error;
    use crate::overlay::resolver::WindowMatch;

    struct Tracked {
        label: String,
        style: ExStyle,
    }

    /// Emulates extended style bits on top of Tauri's window API.
    pub struct TauriStyler<R: Runtime> {
        app: AppHandle<R>,
        tracked: Mutex<HashMap<WindowHandle, Tracked>>,
    }

    impl<R: Runtime> TauriStyler<R> {
        pub fn new(app: AppHandle<R>) -> Self {
            Self {
                app,
                tracked: Mutex::new(HashMap::new()),
            }
        }

        fn with_tracked<T>(
            &self,
            handle: WindowHandle,
            f: impl FnOnce(&mut Tracked, &Window<R>) -> Result<T, Error>,
        ) -> Result<T, Error> {
            let mut tracked = self
                .tracked
                .lock()
                .map_err(|e| Error::StyleApplication(e.to_string()))?;
            let entry = tracked
                .get_mut(&handle)
                .ok_or(Error::StaleHandle(handle.0))?;
            let window = self
                .app
                .get_window(&entry.label)
                .ok_or(Error::StaleHandle(handle.0))?;
            f(entry, &window)
        }
    }

    impl<R: Runtime> WindowStyler for TauriStyler<R> {
        fn find_window(&self, criteria: &WindowMatch) -> Option<WindowHandle> {
            let (label, _) = self.app.windows().into_iter().find(|(_, window)| {
                window.is_visible().unwrap_or(false)
                    && window
                        .title()
                        .map(|title| criteria.matches(&title))
                        .unwrap_or(false)
            })?;

            let mut tracked = self.tracked.lock().ok()?;
            if let Some((handle, _)) = tracked.iter().find(|(_, t)| t.label == label) {
                return Some(*handle);
            }
            let handle = WindowHandle(tracked.len() as isize + 1);
            tracked.insert(
                handle,
                Tracked {
                    label,
                    style: ExStyle::empty(),
                },
            );
            Some(handle)
        }

        fn is_window(&self, handle: WindowHandle) -> bool {
            self.with_tracked(handle, |_, _| Ok(())).is_ok()
        }

        fn get_extended_style(&self, handle: WindowHandle) -> Result<ExStyle, Error> {
            self.with_tracked(handle, |tracked, _| Ok(tracked.style))
        }

        fn set_extended_style(&self, handle: WindowHandle, style: ExStyle) -> Result<(), Error> {
            self.with_tracked(handle, |tracked, window| {
                window
                    .set_ignore_cursor_events(style.contains(ExStyle::TRANSPARENT))
                    .map_err(|e| Error::StyleApplication(e.to_string()))?;
                window
                    .set_skip_taskbar(style.contains(ExStyle::TOOLWINDOW))
                    .map_err(|e| Error::StyleApplication(e.to_string()))?;
                tracked.style = style;
                Ok(())
            })
        }

        fn set_always_on_top(&self, handle: WindowHandle) -> Result<(), Error> {
            self.with_tracked(handle, |tracked, window| {
                window
                    .set_always_on_top(true)
                    .map_err(|e| Error::StyleApplication(e.to_string()))?;
                tracked.style |= ExStyle::TOPMOST;
                Ok(())
            })
        }

        fn set_layered_alpha(&self, handle: WindowHandle, alpha: u8) -> Result<(), Error> {
            debug!(target: "chatlay::platform", ?handle, alpha, "layered alpha is not supported here");
            Ok(())
        }
    }
}
