use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Height of the band at the top of a window where tab drops are handled by
/// the tab strip itself.
pub const TAB_STRIP_HEIGHT: f64 = 80.0;

/// Stable identity of a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WindowId(Uuid);

impl WindowId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for WindowId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A point in screen coordinates (origin bottom-left, y grows upward).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A rectangle in screen coordinates; `(x, y)` is the bottom-left corner.
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

    /// Half-open containment: the left and bottom edges are inside, the
    /// right and top edges are not.
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x
            && point.x < self.x + self.width
            && point.y >= self.y
            && point.y < self.y + self.height
    }

    /// The tab strip band across the top of this frame.
    pub fn tab_strip(&self) -> Rect {
        let height = TAB_STRIP_HEIGHT.min(self.height);
        Rect::new(self.x, self.y + self.height - height, self.width, height)
    }

    /// A frame of the same size whose top edge sits at `point`, centered
    /// horizontally on it.
    pub fn centered_below(&self, point: Point) -> Rect {
        Rect::new(
            point.x - self.width / 2.0,
            point.y - self.height,
            self.width,
            self.height,
        )
    }
}
