use serde::{Deserialize, Serialize};

/// On-screen rectangle of the target application, in absolute screen pixels.
///
/// Serialized as `{x, y, width, height, title}`; this is also the layout of the
/// persisted region file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub title: String,
}

impl Region {
    /// Mapping and capture are only defined for a non-empty rectangle.
    pub fn is_ready(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    pub fn area(&self) -> i64 {
        self.width as i64 * self.height as i64
    }
}

/// Geometry of a window, already translated to root (screen) coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowGeometry {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl WindowGeometry {
    /// Negative root offsets come from decoration insets; their magnitude
    /// shifts the rectangle inward past the titlebar and border.
    pub fn content_origin(&self) -> (i32, i32) {
        let x = if self.x < 0 { -self.x } else { self.x };
        let y = if self.y < 0 { -self.y } else { self.y };
        (x, y)
    }
}

/// One node of the platform window hierarchy.
#[derive(Debug, Clone, Default)]
pub struct WindowNode {
    pub title: Option<String>,
    /// `None` when the platform could not report geometry for this window.
    pub geometry: Option<WindowGeometry>,
    pub children: Vec<WindowNode>,
}

impl WindowNode {
    pub fn root(children: Vec<WindowNode>) -> Self {
        Self {
            title: None,
            geometry: None,
            children,
        }
    }

    pub fn leaf(title: &str, geometry: WindowGeometry) -> Self {
        Self {
            title: Some(title.to_string()),
            geometry: Some(geometry),
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<WindowNode>) -> Self {
        self.children = children;
        self
    }
}
