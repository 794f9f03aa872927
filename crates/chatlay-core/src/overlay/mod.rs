pub mod driver;
pub mod geometry;
pub mod platform;
pub mod resolver;
pub mod session;
pub mod style;
pub mod surface;
pub mod tauri_host;
pub mod window;

#[cfg(test)]
mod fakes;

pub use geometry::{Insets, Point, Rect, Size};
pub use session::{Effect, Lifecycle, OverlayCommand, OverlaySession};
pub use style::StyleState;
pub use surface::{SurfacePolicy, SurfaceState};
pub use window::*;
