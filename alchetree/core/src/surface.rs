//! Render Surface Abstraction
//!
//! The engine is surface-agnostic: it doesn't know or care whether reveals
//! land on an SVG canvas, a terminal, or a test recorder. Surfaces are pure
//! renderers: they draw exactly what they are told and hold no business
//! logic.
//!
//! The surface is exclusively owned by the currently active run: it is
//! cleared at the start of every visualize call, and the playback driver's
//! mutual-exclusion rule guarantees two runs never write to it concurrently.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::RenderError;
use crate::messages::NotifyLevel;
use crate::tree::PositionedNode;

/// A drawing target for positioned nodes and links
///
/// Implementations must be cheap to call: the playback driver invokes draw
/// methods from its scheduling task while holding the animation-state lock.
pub trait RenderSurface: Send + Sync {
    /// Usable canvas size in pixels (width, height)
    fn canvas_size(&self) -> (f64, f64);

    /// Remove everything previously drawn
    fn clear(&self);

    /// Draw one node at its laid-out position
    ///
    /// # Errors
    ///
    /// Returns [`RenderError`] if the surface cannot draw; the caller decides
    /// the blast radius (the visualizer catches this at its entry point).
    fn draw_node(&self, node: &PositionedNode) -> Result<(), RenderError>;

    /// Draw the link between a parent and child node
    ///
    /// Both endpoints are guaranteed to have been drawn already.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError`] if the surface cannot draw.
    fn draw_link(&self, source: &PositionedNode, target: &PositionedNode)
        -> Result<(), RenderError>;

    /// Show an inline message in place of the tree (placeholder or error)
    fn show_message(&self, message: &str);

    /// Show a transient notification outside the drawing area
    fn notify(&self, level: NotifyLevel, message: &str);
}

// ============================================================================
// Recording Surface
// ============================================================================

/// One recorded surface operation
#[derive(Clone, Debug, PartialEq)]
pub enum SurfaceOp {
    /// The surface was cleared
    Clear,
    /// A node was drawn (by name)
    Node(String),
    /// A link was drawn (source name, target name)
    Link(String, String),
    /// An inline message was shown
    Message(String),
    /// A notification was raised
    Notice(NotifyLevel, String),
}

/// An in-memory surface that records every operation
///
/// Used by the integration tests and the headless demo. Draw failures can be
/// injected with [`RecordingSurface::fail_draws`] to exercise the render
/// error path.
pub struct RecordingSurface {
    canvas: (f64, f64),
    ops: Mutex<Vec<SurfaceOp>>,
    fail_draws: AtomicBool,
}

impl RecordingSurface {
    /// Create a recorder with the default canvas size
    #[must_use]
    pub fn new() -> Self {
        Self::with_canvas(1200.0, 500.0)
    }

    /// Create a recorder reporting a specific canvas size
    #[must_use]
    pub fn with_canvas(width: f64, height: f64) -> Self {
        Self {
            canvas: (width, height),
            ops: Mutex::new(Vec::new()),
            fail_draws: AtomicBool::new(false),
        }
    }

    /// Make every subsequent draw call fail (or succeed again)
    pub fn fail_draws(&self, fail: bool) {
        self.fail_draws.store(fail, Ordering::SeqCst);
    }

    /// Snapshot of all recorded operations, in order
    #[must_use]
    pub fn ops(&self) -> Vec<SurfaceOp> {
        self.ops.lock().clone()
    }

    /// Names of drawn nodes, in draw order
    #[must_use]
    pub fn drawn_nodes(&self) -> Vec<String> {
        self.ops
            .lock()
            .iter()
            .filter_map(|op| match op {
                SurfaceOp::Node(name) => Some(name.clone()),
                _ => None,
            })
            .collect()
    }

    /// Drawn links as (source, target) name pairs, in draw order
    #[must_use]
    pub fn drawn_links(&self) -> Vec<(String, String)> {
        self.ops
            .lock()
            .iter()
            .filter_map(|op| match op {
                SurfaceOp::Link(s, t) => Some((s.clone(), t.clone())),
                _ => None,
            })
            .collect()
    }

    /// All raised notifications
    #[must_use]
    pub fn notices(&self) -> Vec<(NotifyLevel, String)> {
        self.ops
            .lock()
            .iter()
            .filter_map(|op| match op {
                SurfaceOp::Notice(level, msg) => Some((*level, msg.clone())),
                _ => None,
            })
            .collect()
    }

    /// Drop all recorded operations
    pub fn reset(&self) {
        self.ops.lock().clear();
    }
}

impl Default for RecordingSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderSurface for RecordingSurface {
    fn canvas_size(&self) -> (f64, f64) {
        self.canvas
    }

    fn clear(&self) {
        self.ops.lock().push(SurfaceOp::Clear);
    }

    fn draw_node(&self, node: &PositionedNode) -> Result<(), RenderError> {
        if self.fail_draws.load(Ordering::SeqCst) {
            return Err(RenderError::new(format!("injected failure for {}", node.name)));
        }
        self.ops.lock().push(SurfaceOp::Node(node.name.clone()));
        Ok(())
    }

    fn draw_link(
        &self,
        source: &PositionedNode,
        target: &PositionedNode,
    ) -> Result<(), RenderError> {
        if self.fail_draws.load(Ordering::SeqCst) {
            return Err(RenderError::new(format!(
                "injected failure for {} -> {}",
                source.name, target.name
            )));
        }
        self.ops
            .lock()
            .push(SurfaceOp::Link(source.name.clone(), target.name.clone()));
        Ok(())
    }

    fn show_message(&self, message: &str) {
        self.ops.lock().push(SurfaceOp::Message(message.to_string()));
    }

    fn notify(&self, level: NotifyLevel, message: &str) {
        self.ops
            .lock()
            .push(SurfaceOp::Notice(level, message.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{IngredientNode, PositionedTree};

    fn sample_node() -> PositionedTree {
        PositionedTree::from_ingredient_tree(&IngredientNode::named("Brick"))
    }

    #[test]
    fn test_recording_order() {
        let surface = RecordingSurface::new();
        let tree = sample_node();
        let node = tree.node(tree.root());

        surface.clear();
        surface.draw_node(node).unwrap();
        surface.show_message("done");

        assert_eq!(
            surface.ops(),
            vec![
                SurfaceOp::Clear,
                SurfaceOp::Node("Brick".to_string()),
                SurfaceOp::Message("done".to_string()),
            ]
        );
    }

    #[test]
    fn test_injected_draw_failure() {
        let surface = RecordingSurface::new();
        let tree = sample_node();
        let node = tree.node(tree.root());

        surface.fail_draws(true);
        assert!(surface.draw_node(node).is_err());
        assert!(surface.drawn_nodes().is_empty());

        surface.fail_draws(false);
        assert!(surface.draw_node(node).is_ok());
        assert_eq!(surface.drawn_nodes(), vec!["Brick"]);
    }

    #[test]
    fn test_notices_are_collected() {
        let surface = RecordingSurface::new();
        surface.notify(NotifyLevel::Error, "backend down");
        let notices = surface.notices();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].0, NotifyLevel::Error);
    }
}
