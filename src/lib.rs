//! Masonry-style column layout for variable-height blocks.
//!
//! Items are distributed greedily across a fixed number of vertical columns
//! derived from the container width. Everything that touches an actual
//! document goes through the [`RenderSurface`] capability, so the layout core
//! can run against a browser bridge, a native toolkit, or the
//! [`InMemorySurface`] used by the tests and the `flex-masonry` binary.

pub mod common;
pub mod error;
pub mod layout_engine;
pub mod model;
pub mod surface;

pub use common::config::{Gap, Items, MasonryOptions, MasonrySettings, Target};
pub use error::{MasonryError, Result};
pub use layout_engine::{
    COLUMN_CLASS, ColumnPlan, ItemRegistry, LayoutState, MAX_COLUMNS, Masonry, SessionState,
    TrackedItem, column_count_strict, compute_column_count, place_item, plan_columns,
};
pub use model::snapshot::{LayoutSnapshot, Phase};
pub use surface::RenderSurface;
pub use surface::memory::{InMemorySurface, NodeId};
