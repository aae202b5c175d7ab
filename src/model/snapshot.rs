//! Serializable view of a layout session, used for debugging output and by
//! the `flex-masonry` binary.

use ascii_tree::Tree;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Uninitialized,
    Calculated,
    Committed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemData {
    /// Position of the item in the registry.
    pub index: usize,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnData {
    pub index: usize,
    pub height: f64,
    pub items: Vec<ItemData>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutSnapshot {
    pub phase: Phase,
    pub item_count: usize,
    pub columns: Vec<ColumnData>,
}

impl LayoutSnapshot {
    pub fn draw_tree(&self) -> String {
        let title = format!(
            "masonry ({:?}, {} columns, {} items)",
            self.phase,
            self.columns.len(),
            self.item_count
        );
        let columns = self
            .columns
            .iter()
            .map(|column| {
                let label = format!("column {} [h={}]", column.index, column.height);
                let items = column
                    .items
                    .iter()
                    .map(|item| format!("item {} [h={}]", item.index, item.height))
                    .collect::<Vec<_>>();
                if items.is_empty() {
                    Tree::Leaf(vec![label])
                } else {
                    Tree::Node(label, vec![Tree::Leaf(items)])
                }
            })
            .collect();
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = ascii_tree::write_tree(&mut out, &Tree::Node(title, columns));
        out
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn snapshot() -> LayoutSnapshot {
        LayoutSnapshot {
            phase: Phase::Committed,
            item_count: 2,
            columns: vec![
                ColumnData {
                    index: 0,
                    height: 50.0,
                    items: vec![
                        ItemData { index: 0, height: 20.0 },
                        ItemData { index: 1, height: 30.0 },
                    ],
                },
                ColumnData { index: 1, height: 0.0, items: vec![] },
            ],
        }
    }

    #[test]
    fn draw_tree_lists_columns_and_items() {
        let tree = snapshot().draw_tree();
        assert!(tree.contains("masonry (Committed, 2 columns, 2 items)"), "{tree}");
        assert!(tree.contains("column 0 [h=50]"), "{tree}");
        assert!(tree.contains("item 1 [h=30]"), "{tree}");
        assert!(tree.contains("column 1 [h=0]"), "{tree}");
    }

    #[test]
    fn serializes_phase_in_snake_case() {
        let json = serde_json::to_value(snapshot()).unwrap();
        assert_eq!(json["phase"], "committed");
        assert_eq!(json["columns"][0]["items"][1]["height"], 30.0);
        let back: LayoutSnapshot = serde_json::from_value(json).unwrap();
        assert_eq!(back, snapshot());
    }
}
