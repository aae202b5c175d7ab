use std::fmt::Debug;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::surface::RenderSurface;

/// An element under layout together with the height it was measured at.
///
/// The height is captured once, while the element is hidden and before it
/// is moved into a column, and is never refreshed afterwards.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct TrackedItem<N> {
    pub element: N,
    pub cached_height: f64,
}

/// Ordered set of tracked items. Insertion order is placement order.
#[derive(Debug, Clone)]
pub struct ItemRegistry<N> {
    items: Vec<TrackedItem<N>>,
}

impl<N> Default for ItemRegistry<N> {
    fn default() -> Self { Self { items: Vec::new() } }
}

impl<N: Copy + Debug> ItemRegistry<N> {
    pub fn new() -> Self { Self::default() }

    /// Hides `element` and measures it. The item is not added to the registry.
    pub fn register<S>(surface: &mut S, element: N) -> TrackedItem<N>
    where S: RenderSurface<Node = N> + ?Sized {
        surface.set_visible(element, false);
        let measured = surface.measure_height(element);
        let cached_height = if measured.is_finite() && measured >= 0.0 {
            measured
        } else {
            warn!(?element, measured, "unusable element height, treating as zero");
            0.0
        };
        TrackedItem { element, cached_height }
    }

    pub fn push(&mut self, item: TrackedItem<N>) { self.items.push(item); }

    /// Forgets every item. Elements stay wherever they were last appended.
    pub fn clear(&mut self) { self.items.clear(); }

    pub fn all(&self) -> &[TrackedItem<N>] { &self.items }

    pub fn len(&self) -> usize { self.items.len() }

    pub fn is_empty(&self) -> bool { self.items.is_empty() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::memory::InMemorySurface;

    #[test]
    fn register_hides_and_measures() {
        let mut surface = InMemorySurface::new();
        let root = surface.root();
        let block = surface.add_block(root, "div", &[], 100.0, 42.0);

        let item = ItemRegistry::register(&mut surface, block);

        assert_eq!(item, TrackedItem { element: block, cached_height: 42.0 });
        assert!(!surface.is_visible(block));
    }

    #[test]
    fn register_zeroes_unusable_heights() {
        let mut surface = InMemorySurface::new();
        let root = surface.root();
        let negative = surface.add_block(root, "div", &[], 100.0, -5.0);
        let nan = surface.add_block(root, "div", &[], 100.0, f64::NAN);

        assert_eq!(ItemRegistry::register(&mut surface, negative).cached_height, 0.0);
        assert_eq!(ItemRegistry::register(&mut surface, nan).cached_height, 0.0);
    }

    #[test]
    fn keeps_insertion_order_and_clears() {
        let mut registry = ItemRegistry::new();
        for (element, height) in [(3u32, 1.0), (1, 2.0), (2, 3.0)] {
            registry.push(TrackedItem { element, cached_height: height });
        }
        let order: Vec<u32> = registry.all().iter().map(|item| item.element).collect();
        assert_eq!(order, vec![3, 1, 2]);

        registry.clear();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
    }
}
