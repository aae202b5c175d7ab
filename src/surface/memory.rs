//! A headless document tree implementing [`RenderSurface`].
//!
//! Nodes carry a fixed box size instead of running a real layout pass, which
//! is all the masonry core needs: item heights are measured once and the
//! container width drives the column count.

use slotmap::{SlotMap, new_key_type};

use super::RenderSurface;
use crate::common::collections::HashMap;

new_key_type! {
    pub struct NodeId;
}

#[derive(Debug, Clone, Default)]
struct Node {
    tag: String,
    attributes: HashMap<String, String>,
    styles: HashMap<String, String>,
    visible: bool,
    width: f64,
    height: f64,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    fn new(tag: &str) -> Self {
        Node {
            tag: tag.to_ascii_lowercase(),
            visible: true,
            ..Default::default()
        }
    }

    fn has_class(&self, class: &str) -> bool {
        self.attributes
            .get("class")
            .is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
    }
}

/// One compound selector such as `div.card#main`.
#[derive(Debug, Default, PartialEq)]
struct Compound<'a> {
    tag: Option<&'a str>,
    id: Option<&'a str>,
    classes: Vec<&'a str>,
}

impl<'a> Compound<'a> {
    fn parse(source: &'a str) -> Option<Self> {
        let mut compound = Compound::default();
        let mut rest = source;
        let tag_end = rest.find(['#', '.']).unwrap_or(rest.len());
        if tag_end > 0 {
            let tag = &rest[..tag_end];
            if tag != "*" {
                compound.tag = Some(tag);
            }
        }
        rest = &rest[tag_end..];
        while let Some(marker) = rest.chars().next() {
            let body = &rest[1..];
            let end = body.find(['#', '.']).unwrap_or(body.len());
            let name = &body[..end];
            if name.is_empty() {
                return None;
            }
            match marker {
                '#' => compound.id = Some(name),
                _ => compound.classes.push(name),
            }
            rest = &body[end..];
        }
        Some(compound)
    }

    fn matches(&self, node: &Node) -> bool {
        if let Some(tag) = self.tag {
            if !node.tag.eq_ignore_ascii_case(tag) {
                return false;
            }
        }
        if let Some(id) = self.id {
            if node.attributes.get("id").map(String::as_str) != Some(id) {
                return false;
            }
        }
        self.classes.iter().all(|class| node.has_class(class))
    }
}

/// Descendant-combinator chain, e.g. `#grid .item`.
#[derive(Debug)]
struct Selector<'a> {
    compounds: Vec<Compound<'a>>,
}

impl<'a> Selector<'a> {
    fn parse(source: &'a str) -> Option<Self> {
        let compounds = source
            .split_whitespace()
            .map(Compound::parse)
            .collect::<Option<Vec<_>>>()?;
        if compounds.is_empty() {
            return None;
        }
        Some(Selector { compounds })
    }
}

#[derive(Debug, Clone)]
pub struct InMemorySurface {
    nodes: SlotMap<NodeId, Node>,
    root: NodeId,
    scroll_offset: f64,
}

impl Default for InMemorySurface {
    fn default() -> Self { Self::new() }
}

impl InMemorySurface {
    pub fn new() -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(Node::new("body"));
        Self { nodes, root, scroll_offset: 0.0 }
    }

    /// The document root. Only nodes below it are visible to lookups.
    pub fn root(&self) -> NodeId { self.root }

    pub fn create_element(&mut self, tag: &str, attributes: &[(&str, &str)]) -> NodeId {
        let mut node = Node::new(tag);
        for (key, value) in attributes {
            node.attributes.insert((*key).to_string(), (*value).to_string());
        }
        self.nodes.insert(node)
    }

    /// Creates an element sized `width` x `height` and appends it to `parent`.
    pub fn add_block(
        &mut self,
        parent: NodeId,
        tag: &str,
        attributes: &[(&str, &str)],
        width: f64,
        height: f64,
    ) -> NodeId {
        let node = self.create_element(tag, attributes);
        self.set_size(node, width, height);
        self.append_child(parent, node);
        node
    }

    pub fn set_size(&mut self, node: NodeId, width: f64, height: f64) {
        if let Some(data) = self.nodes.get_mut(node) {
            data.width = width;
            data.height = height;
        }
    }

    pub fn set_width(&mut self, node: NodeId, width: f64) {
        if let Some(data) = self.nodes.get_mut(node) {
            data.width = width;
        }
    }

    pub fn contains(&self, node: NodeId) -> bool { self.nodes.contains_key(node) }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> { self.nodes.get(node)?.parent }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.nodes.get(node).map(|data| data.children.as_slice()).unwrap_or(&[])
    }

    pub fn is_visible(&self, node: NodeId) -> bool {
        self.nodes.get(node).is_some_and(|data| data.visible)
    }

    pub fn style(&self, node: NodeId, property: &str) -> Option<&str> {
        self.nodes.get(node)?.styles.get(property).map(String::as_str)
    }

    pub fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.nodes.get(node)?.attributes.get(name).map(String::as_str)
    }

    pub fn is_attached(&self, node: NodeId) -> bool {
        let mut cursor = Some(node);
        while let Some(current) = cursor {
            if current == self.root {
                return true;
            }
            cursor = self.nodes.get(current).and_then(|data| data.parent);
        }
        false
    }

    fn is_ancestor_or_self(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut cursor = Some(node);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.nodes.get(current).and_then(|data| data.parent);
        }
        false
    }

    fn detach(&mut self, node: NodeId) {
        let Some(parent) = self.nodes.get_mut(node).and_then(|data| data.parent.take()) else {
            return;
        };
        if let Some(parent) = self.nodes.get_mut(parent) {
            parent.children.retain(|&child| child != node);
        }
    }

    fn preorder(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![self.root];
        while let Some(node) = stack.pop() {
            order.push(node);
            if let Some(data) = self.nodes.get(node) {
                stack.extend(data.children.iter().rev().copied());
            }
        }
        order
    }

    fn matches(&self, node: NodeId, selector: &Selector<'_>) -> bool {
        let Some((last, ancestors)) = selector.compounds.split_last() else {
            return false;
        };
        if !self.nodes.get(node).is_some_and(|data| last.matches(data)) {
            return false;
        }
        let mut cursor = self.nodes.get(node).and_then(|data| data.parent);
        for compound in ancestors.iter().rev() {
            loop {
                let Some(current) = cursor else {
                    return false;
                };
                let data = &self.nodes[current];
                cursor = data.parent;
                if compound.matches(data) {
                    break;
                }
            }
        }
        true
    }
}

impl RenderSurface for InMemorySurface {
    type Node = NodeId;

    fn measure_height(&self, node: NodeId) -> f64 {
        self.nodes.get(node).map(|data| data.height).unwrap_or(0.0)
    }

    fn create_container_node(&mut self, tag: &str, attributes: &[(&str, &str)]) -> NodeId {
        self.create_element(tag, attributes)
    }

    fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if !self.contains(parent) || !self.contains(child) || child == self.root {
            return;
        }
        // Appending an ancestor under its own descendant would create a cycle.
        if self.is_ancestor_or_self(child, parent) {
            return;
        }
        self.detach(child);
        self.nodes[child].parent = Some(parent);
        self.nodes[parent].children.push(child);
    }

    fn child_count(&self, node: NodeId) -> usize { self.children(node).len() }

    fn set_visible(&mut self, node: NodeId, visible: bool) {
        if let Some(data) = self.nodes.get_mut(node) {
            data.visible = visible;
        }
    }

    fn set_style(&mut self, node: NodeId, property: &str, value: &str) {
        if let Some(data) = self.nodes.get_mut(node) {
            data.styles.insert(property.to_string(), value.to_string());
        }
    }

    fn query_one(&self, selector: &str) -> Option<NodeId> { self.query_all(selector).into_iter().next() }

    fn query_all(&self, selector: &str) -> Vec<NodeId> {
        let Some(selector) = Selector::parse(selector) else {
            return Vec::new();
        };
        self.preorder().into_iter().filter(|&node| self.matches(node, &selector)).collect()
    }

    fn remove_node(&mut self, node: NodeId) {
        if node == self.root || !self.contains(node) {
            return;
        }
        self.detach(node);
        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            if let Some(data) = self.nodes.remove(current) {
                stack.extend(data.children);
            }
        }
    }

    fn container_width(&self, node: NodeId) -> f64 {
        self.nodes.get(node).map(|data| data.width).unwrap_or(0.0)
    }

    fn scroll_offset(&self) -> f64 { self.scroll_offset }

    fn set_scroll_offset(&mut self, offset: f64) { self.scroll_offset = offset; }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn document() -> (InMemorySurface, NodeId, Vec<NodeId>) {
        let mut surface = InMemorySurface::new();
        let root = surface.root();
        let grid = surface.add_block(root, "section", &[("id", "grid")], 640.0, 0.0);
        let items = (0..3)
            .map(|i| {
                let class = if i == 1 { "item wide" } else { "item" };
                surface.add_block(grid, "div", &[("class", class)], 100.0, 10.0 * (i + 1) as f64)
            })
            .collect();
        (surface, grid, items)
    }

    #[test]
    fn parses_compound_selectors() {
        assert_eq!(
            Compound::parse("div.item.wide#main"),
            Some(Compound {
                tag: Some("div"),
                id: Some("main"),
                classes: vec!["item", "wide"],
            })
        );
        assert_eq!(Compound::parse(".a."), None);
    }

    #[test]
    fn queries_by_id_class_and_tag() {
        let (surface, grid, items) = document();
        assert_eq!(surface.query_one("#grid"), Some(grid));
        assert_eq!(surface.query_all(".item"), items);
        assert_eq!(surface.query_all("div.wide"), vec![items[1]]);
        assert_eq!(surface.query_all("#grid .item").len(), 3);
        assert_eq!(surface.query_all("span"), Vec::<NodeId>::new());
        assert_eq!(surface.query_one("#missing"), None);
    }

    #[test]
    fn detached_nodes_are_not_found_by_queries() {
        let (mut surface, _, _) = document();
        let loose = surface.create_element("div", &[("class", "item")]);
        assert!(!surface.is_attached(loose));
        assert_eq!(surface.query_all(".item").len(), 3);
    }

    #[test]
    fn append_moves_instead_of_duplicating() {
        let (mut surface, grid, items) = document();
        let column = surface.create_element("div", &[]);
        surface.append_child(column, items[0]);
        surface.append_child(column, items[0]);
        assert_eq!(surface.children(column), &[items[0]]);
        assert_eq!(surface.children(grid), &[items[1], items[2]]);
        assert_eq!(surface.parent(items[0]), Some(column));
    }

    #[test]
    fn append_refuses_cycles() {
        let (mut surface, grid, items) = document();
        surface.append_child(items[0], grid);
        assert_eq!(surface.parent(grid), Some(surface.root()));
    }

    #[test]
    fn remove_discards_subtree() {
        let (mut surface, grid, items) = document();
        surface.remove_node(grid);
        assert!(!surface.contains(grid));
        assert!(items.iter().all(|&item| !surface.contains(item)));
        assert_eq!(surface.child_count(surface.root()), 0);
    }

    #[test]
    fn measures_and_styles_nodes() {
        let (mut surface, grid, items) = document();
        assert_eq!(surface.measure_height(items[2]), 30.0);
        assert_eq!(surface.container_width(grid), 640.0);
        surface.set_style(grid, "display", "flex");
        assert_eq!(surface.style(grid, "display"), Some("flex"));
        surface.set_visible(items[0], false);
        assert!(!surface.is_visible(items[0]));
    }
}
