use serde::Serialize;

use crate::overlay::geometry::Rect;
use crate::overlay::session::Lifecycle;
use crate::overlay::style::StyleState;
use crate::overlay::surface::SurfaceState;

/// Point-in-time view of the host window and its surface, as reported to the chrome.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OverlayWindow {
    pub rect: Rect,
    pub opacity: f64,
    pub click_through: bool,
    pub always_on_top: bool,
    pub lifecycle: Lifecycle,
    pub style: StyleState,
    pub surface: SurfaceState,
    pub surface_rect: Option<Rect>,
}
