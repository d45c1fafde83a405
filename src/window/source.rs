use crate::errors::{TinderError, TinderResult};
use crate::window::types::{WindowGeometry, WindowNode};

/// Access to the platform window hierarchy.
pub trait WindowSource {
    fn window_tree(&self) -> TinderResult<WindowNode>;
}

/// Window enumeration through `xcap`. The platform list is flat, so every
/// top-level window becomes a direct child of a synthetic root.
///
/// xcap reports absolute desktop coordinates, and the locator reads negative
/// offsets as decoration insets (see [`WindowGeometry::content_origin`]). A
/// window on a monitor left of or above the primary one therefore resolves
/// to the mirrored position; keep the game window on a monitor with
/// non-negative coordinates.
pub struct XcapWindowSource;

impl WindowSource for XcapWindowSource {
    fn window_tree(&self) -> TinderResult<WindowNode> {
        let windows = xcap::Window::all()
            .map_err(|e| TinderError::WindowNotFound(format!("failed to enumerate windows: {e}")))?;

        let children = windows
            .iter()
            .map(|w| {
                let geometry = if w.is_minimized() {
                    None
                } else {
                    Some(WindowGeometry {
                        x: w.x(),
                        y: w.y(),
                        width: w.width() as i32,
                        height: w.height() as i32,
                    })
                };
                WindowNode {
                    title: Some(w.title().to_string()),
                    geometry,
                    children: Vec::new(),
                }
            })
            .collect::<Vec<_>>();

        tracing::debug!(count = children.len(), "enumerated top-level windows");
        Ok(WindowNode::root(children))
    }
}
