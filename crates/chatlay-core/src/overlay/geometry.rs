//! Host window geometry and pointer-driven move/resize.
//!
//! All coordinates are logical screen pixels with a top-left origin, the same
//! space the chrome reports pointer positions in (`screenX`/`screenY`).

use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    fn delta_from(self, anchor: Point) -> (f64, f64) {
        (self.x - anchor.x, self.y - anchor.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn with_origin(self, origin: Point) -> Self {
        Self {
            x: origin.x,
            y: origin.y,
            ..self
        }
    }

    pub fn with_size(self, size: Size) -> Self {
        Self {
            width: size.width,
            height: size.height,
            ..self
        }
    }
}

/// Inset applied to the host rectangle to obtain the embedded surface rectangle.
///
/// The top inset leaves room for the control chrome strip.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Insets {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Insets {
    pub fn top(top: f64) -> Self {
        Self {
            top,
            ..Self::default()
        }
    }

    /// Never produces a negative extent, so a tiny host still yields a valid rect.
    pub fn apply(&self, rect: Rect) -> Rect {
        Rect {
            x: rect.x + self.left,
            y: rect.y + self.top,
            width: (rect.width - self.left - self.right).max(0.0),
            height: (rect.height - self.top - self.bottom).max(0.0),
        }
    }
}

/// Whether the host window currently accepts pointer input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Interactive,
    PassThrough,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragKind {
    Move,
    Resize,
}

/// Pointer anchor plus the window geometry captured when a drag started.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSession {
    pub kind: DragKind,
    pub anchor: Point,
    pub origin: Point,
    pub size: Size,
}

/// Owns the host window rectangle.
///
/// Every mutating operation returns the new rectangle when geometry actually
/// changed; the caller is responsible for pushing it to the host window and
/// the embedded surface.
#[derive(Debug, Clone)]
pub struct GeometryController {
    rect: Rect,
    min_size: Size,
    drag: Option<DragSession>,
}

impl GeometryController {
    pub fn new(rect: Rect, min_size: Size) -> Self {
        Self {
            rect,
            min_size,
            drag: None,
        }
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn drag(&self) -> Option<&DragSession> {
        self.drag.as_ref()
    }

    pub fn begin_move(&mut self, pointer: Point, mode: InputMode) -> bool {
        self.begin(DragKind::Move, pointer, mode)
    }

    pub fn begin_resize(&mut self, pointer: Point, mode: InputMode) -> bool {
        self.begin(DragKind::Resize, pointer, mode)
    }

    fn begin(&mut self, kind: DragKind, pointer: Point, mode: InputMode) -> bool {
        if mode == InputMode::PassThrough {
            debug!(target: "chatlay::geometry", ?kind, "drag ignored while click-through");
            return false;
        }
        self.drag = Some(DragSession {
            kind,
            anchor: pointer,
            origin: self.rect.origin(),
            size: self.rect.size(),
        });
        true
    }

    pub fn on_move_drag(&mut self, pointer: Point, mode: InputMode) -> Option<Rect> {
        let drag = self.active_drag(DragKind::Move, mode)?;
        let (dx, dy) = pointer.delta_from(drag.anchor);
        let origin = Point::new(drag.origin.x + dx, drag.origin.y + dy);
        self.set_rect(self.rect.with_origin(origin))
    }

    pub fn on_resize_drag(&mut self, pointer: Point, mode: InputMode) -> Option<Rect> {
        let drag = self.active_drag(DragKind::Resize, mode)?;
        let (dx, dy) = pointer.delta_from(drag.anchor);
        let size = self.clamp(Size::new(drag.size.width + dx, drag.size.height + dy));
        self.set_rect(self.rect.with_size(size))
    }

    /// Puts back a rect the host window refused, without reporting a change.
    pub fn restore(&mut self, rect: Rect) {
        self.rect = rect;
    }

    /// Discards the current drag session, if any.
    pub fn end_drag(&mut self) {
        self.drag = None;
    }

    /// Sets the size to exactly `size`, keeping the origin.
    pub fn reset_size(&mut self, size: Size) -> Option<Rect> {
        self.drag = None;
        self.set_rect(self.rect.with_size(size))
    }

    fn active_drag(&self, kind: DragKind, mode: InputMode) -> Option<DragSession> {
        if mode == InputMode::PassThrough {
            return None;
        }
        self.drag.filter(|drag| drag.kind == kind)
    }

    fn clamp(&self, size: Size) -> Size {
        Size::new(
            size.width.max(self.min_size.width),
            size.height.max(self.min_size.height),
        )
    }

    fn set_rect(&mut self, rect: Rect) -> Option<Rect> {
        if rect == self.rect {
            return None;
        }
        debug!(target: "chatlay::geometry", ?rect, "geometry changed");
        self.rect = rect;
        Some(rect)
    }
}
