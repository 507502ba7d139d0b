#![forbid(unsafe_code)]

//! Occupied-space index for one container.
//!
//! The index is a per-frame copy of the siblings that share a parent with the
//! resizing widget, each tagged with how it may respond to a push on each
//! axis. The solver works against these copies only; the tree itself is never
//! touched during a gesture.

use std::fmt;

use gridflow_core::{DimensionMap, GeometryError, GridRect, WidgetId, WidgetSnapshot, WidgetTree};
use serde::{Deserialize, Serialize};

/// How a sibling reacts to being pushed along one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AxisReflow {
    /// Immovable; any collision on this axis blocks the resize.
    Pinned,
    /// Translated away from the pusher, cascading into its own neighbours.
    Push,
    /// Shrinks its near edge, never below its minimum.
    Compress,
}

/// One sibling's footprint plus its reflow policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OccupiedSpace {
    pub id: WidgetId,
    pub rect: GridRect,
    pub min_columns: i32,
    pub min_rows: i32,
    pub horizontal: AxisReflow,
    pub vertical: AxisReflow,
}

impl OccupiedSpace {
    /// A freely pushable space with the smallest legal minimums.
    #[must_use]
    pub fn free(id: WidgetId, rect: GridRect) -> Self {
        Self {
            id,
            rect,
            min_columns: 1,
            min_rows: 1,
            horizontal: AxisReflow::Push,
            vertical: AxisReflow::Push,
        }
    }

    /// Derive the space for `widget` inside `container`.
    fn from_widget(widget: &WidgetSnapshot, container: &WidgetSnapshot, map: DimensionMap) -> Self {
        let auto_layout = !container.flex_layers.is_empty();
        let horizontal = if widget.pinned {
            AxisReflow::Pinned
        } else if auto_layout && widget.is_fill() {
            AxisReflow::Compress
        } else if auto_layout {
            AxisReflow::Pinned
        } else {
            AxisReflow::Push
        };
        let vertical = if widget.pinned {
            AxisReflow::Pinned
        } else {
            AxisReflow::Push
        };
        Self {
            id: widget.id,
            rect: widget.rect_for(map),
            min_columns: widget.limits.min_columns,
            min_rows: widget.limits.min_rows,
            horizontal,
            vertical,
        }
    }
}

/// Siblings of a resizing widget, in ID order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OccupiedSpaceIndex {
    container: WidgetId,
    columns: i32,
    canvas_rows: i32,
    spaces: Vec<OccupiedSpace>,
}

impl OccupiedSpaceIndex {
    /// Build from explicit spaces. Spaces are kept sorted by ID.
    pub fn from_spaces(
        container: WidgetId,
        columns: i32,
        spaces: impl IntoIterator<Item = OccupiedSpace>,
    ) -> Self {
        let mut spaces: Vec<_> = spaces.into_iter().collect();
        spaces.sort_by_key(|space| space.id);
        Self {
            container,
            columns,
            canvas_rows: 0,
            spaces,
        }
    }

    /// Index the children of `container`, leaving out `exclude`.
    pub fn for_container(
        tree: &WidgetTree,
        container: WidgetId,
        exclude: Option<WidgetId>,
        map: DimensionMap,
    ) -> Result<Self, ReflowError> {
        let parent = tree
            .get(container)
            .ok_or(ReflowError::ContainerNotFound { container })?;
        let mut spaces = Vec::new();
        for child in tree.children_of(container) {
            if Some(child.id) == exclude {
                continue;
            }
            let space = OccupiedSpace::from_widget(child, parent, map);
            space.rect.validate().map_err(|source| ReflowError::Geometry {
                widget: child.id,
                source,
            })?;
            spaces.push(space);
        }
        Ok(Self {
            container,
            columns: parent.columns,
            canvas_rows: parent.canvas_rows,
            spaces,
        })
    }

    /// Index the siblings of a resizing widget.
    pub fn for_resizing(
        tree: &WidgetTree,
        widget: WidgetId,
        map: DimensionMap,
    ) -> Result<Self, ReflowError> {
        let snapshot = tree
            .get(widget)
            .ok_or(ReflowError::WidgetNotFound { widget })?;
        let container = snapshot
            .parent
            .ok_or(ReflowError::Detached { widget })?;
        Self::for_container(tree, container, Some(widget), map)
    }

    /// Set the committed content height of the container.
    #[must_use]
    pub fn with_canvas_rows(mut self, rows: i32) -> Self {
        self.canvas_rows = rows;
        self
    }

    #[must_use]
    pub fn container(&self) -> WidgetId {
        self.container
    }

    /// Columns between the container walls.
    #[must_use]
    pub fn columns(&self) -> i32 {
        self.columns
    }

    /// Committed content height of the container.
    #[must_use]
    pub fn canvas_rows(&self) -> i32 {
        self.canvas_rows
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.spaces.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.spaces.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &OccupiedSpace> {
        self.spaces.iter()
    }

    #[must_use]
    pub fn get(&self, id: WidgetId) -> Option<&OccupiedSpace> {
        self.spaces
            .binary_search_by_key(&id, |space| space.id)
            .ok()
            .map(|index| &self.spaces[index])
    }

    /// Largest bottom edge among the indexed spaces.
    #[must_use]
    pub fn bottom_most_row(&self) -> i32 {
        self.spaces
            .iter()
            .map(|space| space.rect.bottom)
            .max()
            .unwrap_or(0)
    }
}

/// Failures while preparing a reflow frame.
#[derive(Debug, Clone, PartialEq)]
pub enum ReflowError {
    /// The resizing widget is no longer in the tree.
    WidgetNotFound { widget: WidgetId },
    /// The widget's parent is no longer in the tree.
    ContainerNotFound { container: WidgetId },
    /// The widget has no parent container to reflow within.
    Detached { widget: WidgetId },
    /// A sibling had an unusable rectangle.
    Geometry {
        widget: WidgetId,
        source: GeometryError,
    },
}

impl fmt::Display for ReflowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WidgetNotFound { widget } => write!(f, "resizing widget {widget} not found"),
            Self::ContainerNotFound { container } => {
                write!(f, "container {container} not found")
            }
            Self::Detached { widget } => write!(f, "widget {widget} has no parent container"),
            Self::Geometry { widget, source } => write!(f, "sibling {widget}: {source}"),
        }
    }
}

impl std::error::Error for ReflowError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Geometry { source, .. } => Some(source),
            _ => None,
        }
    }
}
