//! The rendering-surface capability the layout core is driven through.
//!
//! The core never touches a document directly. Lookups, measurement, node
//! creation and presentation changes all go through an implementation of
//! [`RenderSurface`] that the caller injects into the session.

pub mod memory;

use std::fmt::Debug;

pub trait RenderSurface {
    /// Opaque handle to a node owned by the surface.
    type Node: Copy + Eq + Debug;

    /// Current rendered height of `node` in pixels.
    fn measure_height(&self, node: Self::Node) -> f64;

    /// Allocates a new, unattached structural node.
    fn create_container_node(&mut self, tag: &str, attributes: &[(&str, &str)]) -> Self::Node;

    /// Attaches `child` as the last child of `parent`. A child that is already
    /// attached somewhere is moved, never duplicated.
    fn append_child(&mut self, parent: Self::Node, child: Self::Node);

    fn child_count(&self, node: Self::Node) -> usize;

    fn set_visible(&mut self, node: Self::Node, visible: bool);

    fn set_style(&mut self, node: Self::Node, property: &str, value: &str);

    fn query_one(&self, selector: &str) -> Option<Self::Node>;

    /// All attached nodes matching `selector`, in document order.
    fn query_all(&self, selector: &str) -> Vec<Self::Node>;

    /// Detaches `node` and discards it together with its subtree.
    fn remove_node(&mut self, node: Self::Node);

    fn container_width(&self, node: Self::Node) -> f64;

    fn scroll_offset(&self) -> f64;

    fn set_scroll_offset(&mut self, offset: f64);
}
