const COMMANDS: &[&str] = &[
    "overlay_toggle_click_through",
    "overlay_set_click_through",
    "overlay_close",
    "overlay_move_start",
    "overlay_move_drag",
    "overlay_resize_start",
    "overlay_resize_drag",
    "overlay_drag_end",
    "overlay_reset_size",
    "overlay_start_surface",
    "overlay_status",
];

fn main() {
    tauri_plugin::Builder::new(COMMANDS).build();
}
