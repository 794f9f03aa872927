pub mod commands;
pub mod error;
pub mod hotkeys;
pub mod logging;
pub mod overlay;
pub mod settings;
pub mod validate;

pub use error::*;
pub use hotkeys::*;
pub use overlay::*;
pub use settings::*;

use tauri::{
    Wry,
    plugin::{Builder, TauriPlugin},
};

/// The IPC surface used by the overlay chrome. The session itself is created
/// by [`overlay::driver::start`] once the app is set up.
pub fn init() -> TauriPlugin<Wry> {
    Builder::<Wry, ()>::new("chatlay")
        .invoke_handler(tauri::generate_handler![
            commands::overlay_toggle_click_through,
            commands::overlay_set_click_through,
            commands::overlay_close,
            commands::overlay_move_start,
            commands::overlay_move_drag,
            commands::overlay_resize_start,
            commands::overlay_resize_drag,
            commands::overlay_drag_end,
            commands::overlay_reset_size,
            commands::overlay_start_surface,
            commands::overlay_status
        ])
        .build()
}
