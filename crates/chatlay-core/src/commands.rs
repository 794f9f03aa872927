use tauri::{AppHandle, State, command};

use crate::overlay::driver::{self, OverlayState};
use crate::overlay::geometry::Point;
use crate::overlay::session::OverlayCommand;
use crate::overlay::window::OverlayWindow;

fn run(app: &AppHandle, command: OverlayCommand) -> Result<(), String> {
    driver::dispatch(app, command).map_err(|e| e.to_string())
}

#[command]
pub fn overlay_toggle_click_through(app: AppHandle) -> Result<(), String> {
    run(&app, OverlayCommand::ToggleClickThrough)
}

#[command]
pub fn overlay_set_click_through(app: AppHandle, enabled: bool) -> Result<(), String> {
    let command = if enabled {
        OverlayCommand::EnableClickThrough
    } else {
        OverlayCommand::DisableClickThrough
    };
    run(&app, command)
}

#[command]
pub fn overlay_close(app: AppHandle) -> Result<(), String> {
    run(&app, OverlayCommand::Close)
}

/// Pointer coordinates are in screen space so the delta survives the
/// window moving underneath the cursor.
#[command]
pub fn overlay_move_start(app: AppHandle, x: f64, y: f64) -> Result<(), String> {
    run(&app, OverlayCommand::MoveStart(Point::new(x, y)))
}

#[command]
pub fn overlay_move_drag(app: AppHandle, x: f64, y: f64) -> Result<(), String> {
    run(&app, OverlayCommand::MoveDrag(Point::new(x, y)))
}

#[command]
pub fn overlay_resize_start(app: AppHandle, x: f64, y: f64) -> Result<(), String> {
    run(&app, OverlayCommand::ResizeStart(Point::new(x, y)))
}

#[command]
pub fn overlay_resize_drag(app: AppHandle, x: f64, y: f64) -> Result<(), String> {
    run(&app, OverlayCommand::ResizeDrag(Point::new(x, y)))
}

#[command]
pub fn overlay_drag_end(app: AppHandle) -> Result<(), String> {
    run(&app, OverlayCommand::DragEnd)
}

#[command]
pub fn overlay_reset_size(app: AppHandle) -> Result<(), String> {
    run(&app, OverlayCommand::ResetSize)
}

#[command]
pub fn overlay_start_surface(app: AppHandle) -> Result<(), String> {
    run(&app, OverlayCommand::StartSurface)
}

#[command]
pub fn overlay_status(state: State<'_, OverlayState>) -> Result<OverlayWindow, String> {
    let session = state.0.lock().map_err(|e| e.to_string())?;
    Ok(session.window())
}
