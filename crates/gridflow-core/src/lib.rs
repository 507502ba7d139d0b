#![forbid(unsafe_code)]

//! Core: grid geometry, the widget-tree snapshot, and gesture input types.
//!
//! # Role in gridflow
//! `gridflow-core` is the data layer. It owns the authoritative picture of
//! the canvas (which widgets exist, where they sit on the grid, how their
//! auto-layout rows are composed) and the pointer events a resize gesture is
//! made of.
//!
//! # Primary responsibilities
//! - **GridRect / GridSpacing**: grid-unit rectangles and pixel factors.
//! - **WidgetTree**: immutable-per-frame snapshot advanced by explicit commits.
//! - **ResizeEvent**: canonical handle-down / drag / up / cancel inputs.
//!
//! # How it fits in the system
//! The resize engine (`gridflow-layout`) reads a `WidgetTree` every frame and
//! produces a `TreeCommit` when a gesture ends; only the host applies it.

pub mod event;
pub mod geometry;
pub mod logging;
pub mod widget;

pub use event::{CancelReason, ReflowDirection, ResizeEvent, ResizeHandle};
pub use geometry::{
    DEFAULT_GRID_COLUMNS, DEFAULT_GRID_ROW_HEIGHT, GeometryError, GridRect, GridSpacing,
    MAX_GRID_ROWS,
};
pub use widget::{
    DimensionMap, FlexLayer, HandleSet, LayerAlignment, LayerChild, ResponsiveBehavior,
    SizeLimits, TreeCommit, TreeError, WidgetId, WidgetSnapshot, WidgetTree, layer_index_of,
};

// Re-export tracing macros at crate root for ergonomic use.
#[cfg(feature = "tracing")]
pub use logging::{debug, debug_span, trace, warn};
