use chatlay_core::OverlayCommand;
use chatlay_core::overlay::driver;
use tauri::{
    App, AppHandle,
    image::Image,
    menu::{MenuBuilder, MenuItemBuilder, PredefinedMenuItem},
    tray::{MouseButton, MouseButtonState, TrayIconBuilder, TrayIconEvent},
};
use tracing::warn;

const TRAY_ICON: &[u8] = include_bytes!("../icons/32x32.png");

pub fn setup_tray(app: &App) -> Result<(), Box<dyn std::error::Error>> {
    let toggle = MenuItemBuilder::with_id("toggle_click_through", "Toggle click-through")
        .build(app)?;
    let reset = MenuItemBuilder::with_id("reset_size", "Reset size").build(app)?;
    let start = MenuItemBuilder::with_id("start_surface", "Start chat").build(app)?;
    let separator = PredefinedMenuItem::separator(app)?;
    let quit = MenuItemBuilder::with_id("quit", "Quit").build(app)?;

    let menu = MenuBuilder::new(app)
        .item(&toggle)
        .item(&reset)
        .item(&start)
        .item(&separator)
        .item(&quit)
        .build()?;

    let icon = Image::from_bytes(TRAY_ICON)?;

    let _tray = TrayIconBuilder::new()
        .icon(icon)
        .menu(&menu)
        .show_menu_on_left_click(false)
        .tooltip("Chat Overlay")
        .on_menu_event(|app, event| {
            if let Some(command) = menu_command(event.id.as_ref()) {
                run(app, command);
            }
        })
        .on_tray_icon_event(|tray, event| {
            // Left click is the way back out of click-through.
            if let TrayIconEvent::Click {
                button: MouseButton::Left,
                button_state: MouseButtonState::Up,
                ..
            } = event
            {
                run(tray.app_handle(), OverlayCommand::ToggleClickThrough);
            }
        })
        .build(app)?;

    Ok(())
}

fn menu_command(id: &str) -> Option<OverlayCommand> {
    match id {
        "toggle_click_through" => Some(OverlayCommand::ToggleClickThrough),
        "reset_size" => Some(OverlayCommand::ResetSize),
        "start_surface" => Some(OverlayCommand::StartSurface),
        "quit" => Some(OverlayCommand::Close),
        _ => None,
    }
}

fn run(app: &AppHandle, command: OverlayCommand) {
    if let Err(e) = driver::dispatch(app, command) {
        warn!(?command, "tray action failed: {}", e);
    }
}
