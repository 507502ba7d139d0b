#![forbid(unsafe_code)]

//! gridflow Layout
//!
//! Live resize and reflow for widgets placed on a column/row grid.
//!
//! # Key Components
//!
//! - [`ResizeController`] - Per-widget gesture state machine
//! - [`ReflowSolver`] - Push/compress resolution of sibling collisions
//! - [`OccupiedSpaceIndex`] - Per-frame copy of a container's footprints
//! - [`redistribute`] - Fill-width sharing inside auto-layout rows
//! - [`ResizeConfig`] - Grid width, mobile mode, and solver budgets
//!
//! # Role in gridflow
//! `gridflow-layout` turns pointer deltas into grid rectangles. It reads a
//! `WidgetTree` snapshot each frame, decides what the resizing widget may
//! occupy and where its siblings go, and emits the side effects a host
//! needs to render the gesture and commit its result.
//!
//! # How it fits in the system
//! Inputs and tree types come from `gridflow-core`. The host feeds
//! [`ResizeEvent`](gridflow_core::ResizeEvent)s to a controller, dispatches
//! the returned [`ReflowAction`]s in order, and applies the final
//! [`ResizeCommit`] to its tree.

pub mod collision;
pub mod config;
pub mod fill;
pub mod grid;
pub mod handle;
pub mod occupied;
pub mod reflow;
pub mod resize;

pub use collision::{find_overlap, first_collision, is_occupied};
pub use config::{ConfigError, ResizeConfig};
pub use fill::{
    FillRedistribution, LayerMember, LayerSlot, fill_widgets_length, layer_members, redistribute,
};
pub use grid::{
    MinMaxPixels, PixelOffset, PixelSize, cell_to_pixel_delta, min_max_dimensions_in_pixels,
    pixel_to_cell_delta, widget_pixel_size,
};
pub use handle::{
    AnchorResolution, DimensionUpdate, DragContext, DragFrame, EdgePolicy, drag_frame,
    edge_policy, handle_available, resolve_anchor,
};
pub use occupied::{AxisReflow, OccupiedSpace, OccupiedSpaceIndex, ReflowError};
pub use reflow::{
    DEFAULT_MAX_REFLOW_PASSES, DEFAULT_MAX_SWEEP_STEPS, MovementLimit, MovementLimitMap,
    ReflowRequest, ReflowResult, ReflowSolver, ReflowedSpace, ReflowedSpaceMap,
};
pub use resize::{
    ReflowAction, ResizeCommit, ResizeController, ResizeNoopReason, ResizeOutcome, ResizePhase,
    ResizeTransition,
};
