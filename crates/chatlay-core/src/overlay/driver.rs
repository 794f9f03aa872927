//! Runs overlay commands against the managed session.
//!
//! Whatever the input source (chrome IPC, global shortcut, tray menu), the
//! command is queued onto the main thread and executed there, so the session
//! is only ever mutated from the UI event loop.

use std::sync::Mutex;

use tauri::{AppHandle, Emitter, Manager};
use tracing::{info, warn};

use crate::Error;
use crate::overlay::platform::platform_styler;
use crate::overlay::session::{Effect, OverlayCommand, OverlaySession, StylingPass};
use crate::overlay::tauri_host::{TauriHost, TauriSurface};
use crate::settings::OverlaySettings;

pub const STATUS_EVENT: &str = "chatlay://status";
pub const SURFACE_FAILED_EVENT: &str = "chatlay://surface-failed";

pub type TauriSession = OverlaySession<TauriHost, TauriSurface>;

pub struct OverlayState(pub Mutex<TauriSession>);

/// Creates the host window, activates the session and schedules the initial
/// styling pass. Must run on the main thread (e.g. from the app's setup hook).
pub fn start(app: &AppHandle, settings: OverlaySettings) -> Result<(), Error> {
    log_controls(&settings);

    let styler = platform_styler(app);
    let backend = TauriSurface::new(app.clone(), settings.surface_insets());
    let mut session = OverlaySession::initialize(settings, styler, backend, |settings, rect| {
        TauriHost::create(app, settings, rect)
    })?;

    let activation = session.activate();
    app.manage(OverlayState(Mutex::new(session)));

    if let Some(activation) = activation {
        spawn_styling(app, activation.styling);
        follow_up(app, activation.surface);
    }
    Ok(())
}

/// Queues `command` for execution on the main thread.
pub fn dispatch(app: &AppHandle, command: OverlayCommand) -> Result<(), Error> {
    let handle = app.clone();
    app.run_on_main_thread(move || {
        match with_session(&handle, |session| session.dispatch(command)) {
            Ok(effect) => follow_up(&handle, effect),
            Err(e) => warn!(target: "chatlay::driver", ?command, "command failed: {}", e),
        }
    })?;
    Ok(())
}

pub fn with_session<T>(
    app: &AppHandle,
    f: impl FnOnce(&mut TauriSession) -> T,
) -> Result<T, Error> {
    let state = app
        .try_state::<OverlayState>()
        .ok_or_else(|| Error::SessionUnavailable("not started".into()))?;
    let mut session = state
        .0
        .lock()
        .map_err(|e| Error::SessionUnavailable(e.to_string()))?;
    Ok(f(&mut session))
}

/// Drives a styling pass on the async runtime and hands the result back to
/// the main thread.
pub fn spawn_styling(app: &AppHandle, pass: StylingPass) {
    let app = app.clone();
    tauri::async_runtime::spawn(async move {
        let StylingPass { generation, future } = pass;
        let resolution = future.await;

        let handle = app.clone();
        let queued = app.run_on_main_thread(move || {
            match with_session(&handle, |session| session.on_resolved(generation, resolution)) {
                Ok(effect) => follow_up(&handle, effect),
                Err(e) => warn!(target: "chatlay::driver", "styling result dropped: {}", e),
            }
        });
        if let Err(e) = queued {
            warn!(target: "chatlay::driver", "failed to deliver styling result: {}", e);
        }
    });
}

fn follow_up(app: &AppHandle, effect: Effect) {
    match effect {
        Effect::None | Effect::Geometry(_) => {}
        Effect::Style(_) | Effect::SurfaceStarted => emit_status(app),
        Effect::NeedsResolve => match with_session(app, |session| session.restyle()) {
            Ok(Some(pass)) => spawn_styling(app, pass),
            Ok(None) => {}
            Err(e) => warn!(target: "chatlay::driver", "cannot re-resolve overlay window: {}", e),
        },
        Effect::SurfaceFailed(reason) => {
            if let Err(e) = app.emit(SURFACE_FAILED_EVENT, reason) {
                warn!(target: "chatlay::driver", "failed to report surface failure: {}", e);
            }
            emit_status(app);
        }
        Effect::Closed => {
            info!(target: "chatlay::driver", "overlay closed, exiting");
            app.exit(0);
        }
    }
}

fn log_controls(settings: &OverlaySettings) {
    info!(target: "chatlay::driver", url = %settings.url, "starting chat overlay");
    for binding in &settings.hotkeys {
        info!(target: "chatlay::driver", "  {:<28} {:?}", binding.shortcut, binding.action);
    }
    info!(target: "chatlay::driver", "  {:<28} Close", "Escape (chrome focused)");
    info!(target: "chatlay::driver", "  drag the top strip to move, the corner grip to resize");
}

fn emit_status(app: &AppHandle) {
    let status = match with_session(app, |session| session.window()) {
        Ok(status) => status,
        Err(_) => return,
    };
    if let Err(e) = app.emit(STATUS_EVENT, status) {
        warn!(target: "chatlay::driver", "failed to emit overlay status: {}", e);
    }
}
