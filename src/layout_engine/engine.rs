//! Column-count derivation and greedy shortest-column placement.
//!
//! Nothing here touches a rendering surface, so a full assignment can be
//! computed (and tested) from cached item heights alone.

use serde::{Deserialize, Serialize};
use tracing::trace;

use super::registry::TrackedItem;
use crate::error::{MasonryError, Result};

/// Number of columns of `column_width` (separated by `horizontal_gap`) that
/// fit into `container_width`.
///
/// One column is taken off the width before dividing by the column step and
/// the result is rounded up, so a container slightly wider than N columns
/// yields N + 1. The raw value can be zero or negative for narrow containers;
/// see [`column_count_strict`] and [`compute_column_count`] for the two ways
/// of dealing with that.
fn raw_column_count(container_width: f64, column_width: f64, horizontal_gap: f64) -> f64 {
    ((container_width - column_width) / (column_width + horizontal_gap)).ceil()
}

/// Upper bound on the derived column count. Wider containers are capped.
pub const MAX_COLUMNS: usize = 1024;

fn capped(raw: f64) -> usize {
    if raw > MAX_COLUMNS as f64 {
        tracing::warn!(raw, max = MAX_COLUMNS, "column count capped");
        return MAX_COLUMNS;
    }
    raw as usize
}

/// Derived column count, clamped to `1..=MAX_COLUMNS`. Non-finite widths
/// yield a single column.
pub fn compute_column_count(container_width: f64, column_width: f64, horizontal_gap: f64) -> usize {
    let raw = raw_column_count(container_width, column_width, horizontal_gap);
    if !raw.is_finite() || raw < 1.0 {
        tracing::warn!(
            container_width,
            column_width,
            horizontal_gap,
            "no usable column count for container; clamping to one"
        );
        return 1;
    }
    capped(raw)
}

/// Like [`compute_column_count`] but surfaces a degenerate count instead of
/// clamping it. Finite counts above [`MAX_COLUMNS`] are still capped.
pub fn column_count_strict(
    container_width: f64,
    column_width: f64,
    horizontal_gap: f64,
) -> Result<usize> {
    let raw = raw_column_count(container_width, column_width, horizontal_gap);
    if !raw.is_finite() || raw < 1.0 {
        return Err(MasonryError::DegenerateColumnCount { container_width, column_width });
    }
    Ok(capped(raw))
}

/// Index of the shortest column, lowest index on ties.
fn shortest_column(column_heights: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (index, &height) in column_heights.iter().enumerate() {
        match best {
            Some((_, lowest)) if height >= lowest => {}
            _ => best = Some((index, height)),
        }
    }
    best.map(|(index, _)| index)
}

/// Assigns an item of `height` to the currently shortest column and grows
/// that column by `height`. Returns `None` only when there are no columns.
pub fn place_item(height: f64, column_heights: &mut [f64]) -> Option<usize> {
    let index = shortest_column(column_heights)?;
    column_heights[index] += height;
    trace!(index, height, column_height = column_heights[index], "placed item");
    Some(index)
}

/// Result of replaying a sequence of items through [`place_item`].
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ColumnPlan {
    /// Accumulated cached height per column.
    pub column_heights: Vec<f64>,
    /// Registry indices of the items assigned to each column, top to bottom.
    pub assignments: Vec<Vec<usize>>,
}

impl ColumnPlan {
    pub fn empty(columns: usize) -> Self {
        Self {
            column_heights: vec![0.0; columns],
            assignments: vec![Vec::new(); columns],
        }
    }

    pub fn columns(&self) -> usize { self.column_heights.len() }

    pub fn item_count(&self) -> usize { self.assignments.iter().map(Vec::len).sum() }

    /// Column holding the item at registry position `item`.
    pub fn column_of(&self, item: usize) -> Option<usize> {
        self.assignments.iter().position(|column| column.contains(&item))
    }

    /// Drops every recorded item but keeps the accumulated heights, so later
    /// placements still account for what is already on screen.
    pub fn forget_items(&mut self) {
        for column in &mut self.assignments {
            column.clear();
        }
    }

    /// Places one more item and records it under `item`.
    pub fn push(&mut self, item: usize, height: f64) -> Option<usize> {
        let column = place_item(height, &mut self.column_heights)?;
        self.assignments[column].push(item);
        Some(column)
    }
}

/// Replays `items` in order over `columns` empty columns.
pub fn plan_columns<N>(items: &[TrackedItem<N>], columns: usize) -> ColumnPlan {
    let mut plan = ColumnPlan::empty(columns);
    for (index, item) in items.iter().enumerate() {
        plan.push(index, item.cached_height);
    }
    plan
}
