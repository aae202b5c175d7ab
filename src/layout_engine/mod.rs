mod engine;
mod registry;
mod session;

pub use engine::{
    ColumnPlan, MAX_COLUMNS, column_count_strict, compute_column_count, place_item, plan_columns,
};
pub use registry::{ItemRegistry, TrackedItem};
pub use session::{COLUMN_CLASS, LayoutState, Masonry, SessionState};
