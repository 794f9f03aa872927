pub mod cli;
mod tray;

use std::sync::{Arc, Mutex};

use chatlay_core::overlay::driver::{self, SURFACE_FAILED_EVENT};
use chatlay_core::overlay::tauri_host::HOST_LABEL;
use chatlay_core::{HotkeyBinding, OverlayCommand, OverlaySettings};
use tauri::{AppHandle, Listener, Manager, RunEvent, WindowEvent};
use tauri_plugin_dialog::{DialogExt, MessageDialogKind};
use tauri_plugin_global_shortcut::{GlobalShortcutExt, ShortcutState};
use tracing::{error, info, warn};

/// Runs the overlay until it closes and returns the process exit code.
///
/// `settings` must already be validated.
pub fn run(settings: OverlaySettings) -> i32 {
    // Setup runs inside the event loop and cannot fail the build, so the
    // exit code of a failed start is carried out of band.
    let setup_failure: Arc<Mutex<Option<i32>>> = Arc::new(Mutex::new(None));
    let failure = setup_failure.clone();

    let app = tauri::Builder::default()
        .plugin(tauri_plugin_global_shortcut::Builder::new().build())
        .plugin(tauri_plugin_dialog::init())
        .plugin(chatlay_core::init())
        .setup(move |app| {
            let hotkeys = settings.hotkeys.clone();
            // Listen first: an immediate surface failure is reported during start.
            report_surface_failures(app.handle());
            if let Err(e) = driver::start(app.handle(), settings) {
                error!("failed to start overlay: {}", e);
                if let Ok(mut code) = failure.lock() {
                    *code = Some(e.exit_code());
                }
                app.handle().exit(e.exit_code());
                return Ok(());
            }

            if let Err(e) = tray::setup_tray(app) {
                warn!("failed to create tray icon: {}", e);
            }
            register_hotkeys(app.handle(), &hotkeys);
            Ok(())
        })
        .on_window_event(|window, event| {
            // Route the OS close button through the session so it tears down
            // the surface and pending lookups first.
            if let WindowEvent::CloseRequested { api, .. } = event {
                if window.label() == HOST_LABEL {
                    api.prevent_close();
                    if let Err(e) = driver::dispatch(window.app_handle(), OverlayCommand::Close) {
                        warn!("failed to close overlay: {}", e);
                    }
                }
            }
        })
        .build(tauri::generate_context!());

    let app = match app {
        Ok(app) => app,
        Err(e) => {
            error!("failed to build application: {}", e);
            return 3;
        }
    };

    let code = app.run_return(|_app, event| {
        if let RunEvent::Exit = event {
            info!("chat overlay exited");
        }
    });
    match setup_failure.lock().ok().and_then(|failure| *failure) {
        Some(failure) => failure,
        None => code,
    }
}

fn register_hotkeys(app: &AppHandle, bindings: &[HotkeyBinding]) {
    for binding in bindings {
        let action = binding.action;
        let registered = app
            .global_shortcut()
            .on_shortcut(binding.shortcut.as_str(), move |app, _shortcut, event| {
                if event.state != ShortcutState::Pressed {
                    return;
                }
                if let Err(e) = driver::dispatch(app, action.command()) {
                    warn!(?action, "hotkey failed: {}", e);
                }
            });
        match registered {
            Ok(()) => info!(shortcut = %binding.shortcut, ?action, "hotkey registered"),
            // Another application may own the chord; the chrome and tray still work.
            Err(e) => warn!(shortcut = %binding.shortcut, "failed to register hotkey: {}", e),
        }
    }
}

fn report_surface_failures(app: &AppHandle) {
    let handle = app.clone();
    app.listen(SURFACE_FAILED_EVENT, move |event| {
        let reason = serde_json::from_str::<String>(event.payload())
            .unwrap_or_else(|_| event.payload().to_string());
        handle
            .dialog()
            .message(format!(
                "The chat page could not be loaded:\n\n{}\n\nThe overlay stays open without it.",
                reason
            ))
            .title("Chat unavailable")
            .kind(MessageDialogKind::Error)
            .show(|_| {});
    });
}
