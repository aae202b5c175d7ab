//! The layout session drives calc -> commit cycles against a rendering surface.
//!
//! A full recompute replays every tracked item over freshly allocated column
//! containers (`calc`) and then attaches those containers to the layout
//! container in one go (`layout`). Incremental appends reuse the live columns
//! of the last commit and never move items that are already placed.


use tracing::{debug, instrument, trace};

use super::engine::{ColumnPlan, compute_column_count, plan_columns};
use super::registry::{ItemRegistry, TrackedItem};
use crate::common::config::{Items, MasonryOptions, MasonrySettings, Target};
use crate::error::{MasonryError, Result};
use crate::model::snapshot::{ColumnData, ItemData, LayoutSnapshot, Phase};
use crate::surface::RenderSurface;

pub const COLUMN_CLASS: &str = "masonry-column";

fn create_column<S: RenderSurface + ?Sized>(surface: &mut S, vertical_gap: f64) -> S::Node {
    let column = surface.create_container_node("div", &[("class", COLUMN_CLASS)]);
    let gap = format!("{vertical_gap}px");
    surface.set_style(column, "display", "flex");
    surface.set_style(column, "flex-direction", "column");
    surface.set_style(column, "gap", &gap);
    column
}

/// Column assignment plus the column containers realising it.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutState<N> {
    pub plan: ColumnPlan,
    pub column_containers: Vec<N>,
}

impl<N> LayoutState<N> {
    pub fn columns(&self) -> usize { self.plan.columns() }

    pub fn column_heights(&self) -> &[f64] { &self.plan.column_heights }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionState<N> {
    Uninitialized,
    /// Columns are staged in detached containers.
    Calculated(LayoutState<N>),
    /// Columns are attached to the layout container.
    Committed(LayoutState<N>),
}

impl<N> SessionState<N> {
    pub fn layout_state(&self) -> Option<&LayoutState<N>> {
        match self {
            SessionState::Uninitialized => None,
            SessionState::Calculated(state) | SessionState::Committed(state) => Some(state),
        }
    }

    pub fn phase(&self) -> Phase {
        match self {
            SessionState::Uninitialized => Phase::Uninitialized,
            SessionState::Calculated(_) => Phase::Calculated,
            SessionState::Committed(_) => Phase::Committed,
        }
    }
}

pub struct Masonry<S: RenderSurface> {
    surface: S,
    container: S::Node,
    container_selector: Option<String>,
    items_selector: Option<String>,
    registry: ItemRegistry<S::Node>,
    settings: MasonrySettings,
    state: SessionState<S::Node>,
    /// Column containers from earlier commits that still hold children.
    stale_columns: Vec<S::Node>,
}

impl<S: RenderSurface> Masonry<S> {
    /// Resolves the container and items, hides and measures every item, and
    /// applies the container styling. Runs a full layout when `auto_exec` is set.
    pub fn new(mut surface: S, options: MasonryOptions<S::Node>) -> Result<Self> {
        let MasonryOptions { container, items, settings } = options;
        settings.validate()?;

        let (container, container_selector) = match container {
            Target::ByHandle(node) => (node, None),
            Target::ByLookup(selector) => match surface.query_one(&selector) {
                Some(node) => (node, Some(selector)),
                None => {
                    return Err(MasonryError::Resolution { what: "container", selector });
                }
            },
        };

        let (elements, items_selector) = match items {
            Items::ByHandle(elements) => (elements, None),
            Items::ByLookup(selector) => {
                let elements = surface.query_all(&selector);
                if elements.is_empty() {
                    return Err(MasonryError::Resolution { what: "items", selector });
                }
                (elements, Some(selector))
            }
        };

        let mut registry = ItemRegistry::new();
        for element in elements {
            registry.push(ItemRegistry::register(&mut surface, element));
        }

        let mut masonry = Masonry {
            surface,
            container,
            container_selector,
            items_selector,
            registry,
            settings,
            state: SessionState::Uninitialized,
            stale_columns: Vec::new(),
        };
        masonry.init_style();
        debug!(items = masonry.registry.len(), "masonry session created");

        if masonry.settings.auto_exec {
            masonry.exec()?;
        }
        Ok(masonry)
    }

    fn init_style(&mut self) {
        let gap = format!("{}px", self.settings.gap.horizontal());
        let container = self.container;
        self.surface.set_style(container, "display", "flex");
        self.surface.set_style(container, "align-items", "flex-start");
        self.surface.set_style(container, "justify-content", "center");
        self.surface.set_style(container, "gap", &gap);
    }

    /// Column count for the current container width.
    pub fn compute_columns(&self) -> usize {
        compute_column_count(
            self.surface.container_width(self.container),
            self.settings.column_width,
            self.settings.gap.horizontal(),
        )
    }

    /// Full calc + commit cycle, keeping the page scroll offset in place when
    /// `fix_scroll_offset` is set.
    #[instrument(level = "debug", skip(self))]
    pub fn exec(&mut self) -> Result<()> {
        let scroll = self.settings.fix_scroll_offset.then(|| self.surface.scroll_offset());
        self.calc();
        self.layout()?;
        if let Some(offset) = scroll {
            self.surface.set_scroll_offset(offset);
        }
        Ok(())
    }

    /// Replays every tracked item over freshly staged, detached columns.
    pub fn calc(&mut self) -> &LayoutState<S::Node> {
        let columns = self.compute_columns();
        let plan = plan_columns(self.registry.all(), columns);
        debug!(columns, items = self.registry.len(), "calculated column plan");

        // Previous columns, attached or only staged, are swept at the next commit.
        match std::mem::replace(&mut self.state, SessionState::Uninitialized) {
            SessionState::Uninitialized => {}
            SessionState::Calculated(previous) | SessionState::Committed(previous) => {
                self.stale_columns.extend(previous.column_containers);
            }
        }

        let vertical_gap = self.settings.gap.vertical();
        let column_containers: Vec<S::Node> =
            (0..columns).map(|_| create_column(&mut self.surface, vertical_gap)).collect();
        for (column, assigned) in plan.assignments.iter().enumerate() {
            for &index in assigned {
                let element = self.registry.all()[index].element;
                self.surface.append_child(column_containers[column], element);
                self.surface.set_visible(element, true);
            }
        }

        self.state = SessionState::Calculated(LayoutState { plan, column_containers });
        let SessionState::Calculated(state) = &self.state else { unreachable!() };
        state
    }

    /// Attaches the staged columns to the container and removes every column
    /// container left without children.
    pub fn layout(&mut self) -> Result<()> {
        let state = match std::mem::replace(&mut self.state, SessionState::Uninitialized) {
            SessionState::Uninitialized => {
                return Err(MasonryError::Precondition("no layout computed yet"));
            }
            SessionState::Calculated(state) => {
                for &column in &state.column_containers {
                    self.surface.append_child(self.container, column);
                }
                state
            }
            SessionState::Committed(state) => state,
        };

        let mut removed = 0;
        let stale = std::mem::take(&mut self.stale_columns);
        for column in stale {
            if self.surface.child_count(column) == 0 {
                self.surface.remove_node(column);
                removed += 1;
            } else {
                self.stale_columns.push(column);
            }
        }
        for &column in &state.column_containers {
            if self.surface.child_count(column) == 0 {
                self.surface.remove_node(column);
                removed += 1;
            }
        }
        debug!(columns = state.columns(), removed, "committed layout");

        self.state = SessionState::Committed(state);
        Ok(())
    }

    /// Places a single new element against the live columns of the last
    /// commit. Returns the column it landed in.
    pub fn append_element(&mut self, element: S::Node) -> Result<usize> {
        let SessionState::Committed(state) = &mut self.state else {
            return Err(MasonryError::Precondition("layout has not been committed yet"));
        };
        let item = ItemRegistry::register(&mut self.surface, element);
        let column = state
            .plan
            .push(self.registry.len(), item.cached_height)
            .ok_or(MasonryError::Precondition("no columns to place into"))?;

        // Columns left empty at commit were removed from the surface.
        if self.surface.child_count(state.column_containers[column]) == 0 {
            let fresh = create_column(&mut self.surface, self.settings.gap.vertical());
            self.surface.append_child(self.container, fresh);
            state.column_containers[column] = fresh;
        }

        self.surface.append_child(state.column_containers[column], element);
        self.surface.set_visible(element, true);
        trace!(?element, column, height = item.cached_height, "appended element");
        self.registry.push(item);
        Ok(column)
    }

    /// Appends the elements matched by the original items selector beyond the
    /// ones already tracked. Returns how many were appended.
    pub fn append(&mut self) -> Result<usize> {
        let Some(selector) = self.items_selector.as_deref() else {
            return Ok(0);
        };
        let found = self.surface.query_all(selector);
        let fresh = found.len().saturating_sub(self.registry.len());
        if fresh == 0 {
            return Ok(0);
        }
        let appended = found[found.len() - fresh..].to_vec();
        self.append_elements(appended)
    }

    /// Appends `elements` in order.
    pub fn append_elements<I>(&mut self, elements: I) -> Result<usize>
    where I: IntoIterator<Item = S::Node> {
        let mut count = 0;
        for element in elements {
            self.append_element(element)?;
            count += 1;
        }
        if count > 0 {
            debug!(count, items = self.registry.len(), "appended elements");
        }
        Ok(count)
    }

    /// Appends every element matching `selector` that is not tracked yet.
    pub fn append_selector(&mut self, selector: &str) -> Result<usize> {
        let found = self.surface.query_all(selector);
        let untracked: Vec<S::Node> = found
            .into_iter()
            .filter(|node| !self.registry.all().iter().any(|item| item.element == *node))
            .collect();
        self.append_elements(untracked)
    }

    /// Re-resolves the container selector and switches to the match, if any.
    /// Returns whether the container binding changed.
    pub fn refresh_container(&mut self) -> bool {
        let Some(selector) = self.container_selector.as_deref() else {
            return false;
        };
        match self.surface.query_one(selector) {
            Some(node) if node != self.container => {
                debug!(?node, "container replaced");
                self.container = node;
                true
            }
            _ => false,
        }
    }

    /// Stops tracking every item without touching the surface. Live column
    /// heights are kept, so later appends still stack below what is shown.
    pub fn clear(&mut self) {
        self.registry.clear();
        if let SessionState::Calculated(state) | SessionState::Committed(state) = &mut self.state {
            state.plan.forget_items();
        }
    }

    pub fn items(&self) -> &[TrackedItem<S::Node>] { self.registry.all() }

    pub fn state(&self) -> &SessionState<S::Node> { &self.state }

    pub fn columns(&self) -> usize { self.state.layout_state().map_or(0, LayoutState::columns) }

    pub fn column_heights(&self) -> &[f64] {
        self.state.layout_state().map(LayoutState::column_heights).unwrap_or(&[])
    }

    pub fn settings(&self) -> &MasonrySettings { &self.settings }

    pub fn container(&self) -> S::Node { self.container }

    pub fn surface(&self) -> &S { &self.surface }

    pub fn surface_mut(&mut self) -> &mut S { &mut self.surface }

    pub fn into_surface(self) -> S { self.surface }

    pub fn snapshot(&self) -> LayoutSnapshot {
        let columns = self
            .state
            .layout_state()
            .map(|state| {
                state
                    .plan
                    .assignments
                    .iter()
                    .zip(&state.plan.column_heights)
                    .enumerate()
                    .map(|(index, (assigned, &height))| ColumnData {
                        index,
                        height,
                        items: assigned
                            .iter()
                            .map(|&item| ItemData {
                                index: item,
                                height: self.registry.all().get(item).map_or(0.0, |i| i.cached_height),
                            })
                            .collect(),
                    })
                    .collect()
            })
            .unwrap_or_default();
        LayoutSnapshot {
            phase: self.state.phase(),
            item_count: self.registry.len(),
            columns,
        }
    }

    pub fn draw_tree(&self) -> String { self.snapshot().draw_tree() }
}
