#![forbid(unsafe_code)]

//! Authoritative widget-tree snapshot.
//!
//! The tree is an explicit value: callers read it for a frame and advance it
//! with [`WidgetTree::apply_commit`]. Nothing in the resize engine mutates it
//! in place while a gesture is in flight.

use std::collections::BTreeMap;
use std::fmt;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::geometry::{DEFAULT_GRID_COLUMNS, GeometryError, GridRect, GridSpacing};

/// Stable identifier for widgets.
///
/// `0` is reserved/invalid so IDs are always non-zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WidgetId(u64);

impl WidgetId {
    /// Create a new widget ID, rejecting 0.
    pub fn new(raw: u64) -> Result<Self, TreeError> {
        if raw == 0 {
            return Err(TreeError::ZeroWidgetId);
        }
        Ok(Self(raw))
    }

    /// Get the raw numeric value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for WidgetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "w{}", self.0)
    }
}

/// How a widget sizes itself inside an auto-layout row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponsiveBehavior {
    /// Keeps its declared column span.
    #[default]
    Hug,
    /// Stretches to share the row's remaining columns.
    Fill,
}

/// Alignment of a member inside a flex layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerAlignment {
    #[default]
    Start,
    Center,
    End,
}

/// Which set of position fields is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DimensionMap {
    #[default]
    Desktop,
    Mobile,
}

impl DimensionMap {
    /// Persisted field names as `[left, right, top, bottom]`.
    #[must_use]
    pub const fn field_names(self) -> [&'static str; 4] {
        match self {
            Self::Desktop => ["leftColumn", "rightColumn", "topRow", "bottomRow"],
            Self::Mobile => [
                "mobileLeftColumn",
                "mobileRightColumn",
                "mobileTopRow",
                "mobileBottomRow",
            ],
        }
    }
}

bitflags! {
    /// Resize handles a widget exposes.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct HandleSet: u8 {
        const LEFT = 1 << 0;
        const RIGHT = 1 << 1;
        const BOTTOM = 1 << 2;
        const BOTTOM_LEFT = 1 << 3;
        const BOTTOM_RIGHT = 1 << 4;
    }
}

impl Default for HandleSet {
    fn default() -> Self {
        Self::all()
    }
}

/// Declared size bounds in grid units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SizeLimits {
    pub min_columns: i32,
    pub max_columns: Option<i32>,
    pub min_rows: i32,
    pub max_rows: Option<i32>,
}

impl SizeLimits {
    /// Validate limits for a given widget.
    pub fn validate(self, widget: WidgetId) -> Result<(), TreeError> {
        if self.min_columns < 1 || self.min_rows < 1 {
            return Err(TreeError::InvalidLimits {
                widget,
                axis: if self.min_columns < 1 { "width" } else { "height" },
            });
        }
        if let Some(max_columns) = self.max_columns
            && max_columns < self.min_columns
        {
            return Err(TreeError::InvalidLimits {
                widget,
                axis: "width",
            });
        }
        if let Some(max_rows) = self.max_rows
            && max_rows < self.min_rows
        {
            return Err(TreeError::InvalidLimits {
                widget,
                axis: "height",
            });
        }
        Ok(())
    }
}

impl Default for SizeLimits {
    fn default() -> Self {
        Self {
            min_columns: 1,
            max_columns: None,
            min_rows: 1,
            max_rows: None,
        }
    }
}

/// One member reference inside a [`FlexLayer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerChild {
    pub id: WidgetId,
    #[serde(default)]
    pub align: LayerAlignment,
}

/// Ordered group of widgets sharing one auto-layout row.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FlexLayer {
    pub children: Vec<LayerChild>,
}

impl FlexLayer {
    /// Build a layer from `(id, alignment)` pairs.
    pub fn new(children: impl IntoIterator<Item = (WidgetId, LayerAlignment)>) -> Self {
        Self {
            children: children
                .into_iter()
                .map(|(id, align)| LayerChild { id, align })
                .collect(),
        }
    }

    /// Whether `id` is a member.
    #[must_use]
    pub fn contains(&self, id: WidgetId) -> bool {
        self.children.iter().any(|child| child.id == id)
    }

    /// Member entry for `id`.
    #[must_use]
    pub fn child(&self, id: WidgetId) -> Option<&LayerChild> {
        self.children.iter().find(|child| child.id == id)
    }
}

/// Index of the layer containing `widget`, if any.
#[must_use]
pub fn layer_index_of(layers: &[FlexLayer], widget: WidgetId) -> Option<usize> {
    layers.iter().position(|layer| layer.contains(widget))
}

/// One widget as seen by the editor canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WidgetSnapshot {
    pub id: WidgetId,
    #[serde(default)]
    pub parent: Option<WidgetId>,
    #[serde(default)]
    pub widget_type: String,
    /// Desktop position.
    pub rect: GridRect,
    /// Mobile position; falls back to `rect` when absent.
    #[serde(default)]
    pub mobile_rect: Option<GridRect>,
    pub parent_column_space: f64,
    pub parent_row_space: f64,
    #[serde(default)]
    pub responsive_behavior: ResponsiveBehavior,
    #[serde(default)]
    pub limits: SizeLimits,
    #[serde(default)]
    pub handles: HandleSet,
    #[serde(default)]
    pub resize_disabled: bool,
    /// Pinned widgets never move or resize as a side effect of a sibling.
    #[serde(default)]
    pub pinned: bool,
    /// Auto-layout rows for container widgets. Empty for free-position
    /// canvases.
    #[serde(default)]
    pub flex_layers: Vec<FlexLayer>,
    /// Columns available to children of this widget.
    #[serde(default = "default_columns")]
    pub columns: i32,
    /// Bottom-most row occupied by children; grows, never shrinks.
    #[serde(default)]
    pub canvas_rows: i32,
}

fn default_columns() -> i32 {
    DEFAULT_GRID_COLUMNS
}

impl WidgetSnapshot {
    /// Create a widget with default spacing and behavior.
    pub fn new(id: WidgetId, rect: GridRect) -> Self {
        Self {
            id,
            parent: None,
            widget_type: String::new(),
            rect,
            mobile_rect: None,
            parent_column_space: 1.0,
            parent_row_space: crate::geometry::DEFAULT_GRID_ROW_HEIGHT,
            responsive_behavior: ResponsiveBehavior::Hug,
            limits: SizeLimits::default(),
            handles: HandleSet::all(),
            resize_disabled: false,
            pinned: false,
            flex_layers: Vec::new(),
            columns: DEFAULT_GRID_COLUMNS,
            canvas_rows: 0,
        }
    }

    /// Set the parent container.
    #[must_use]
    pub fn parent(mut self, parent: WidgetId) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Set the widget type tag.
    #[must_use]
    pub fn widget_type(mut self, widget_type: impl Into<String>) -> Self {
        self.widget_type = widget_type.into();
        self
    }

    /// Set the pixel spacing of the parent grid.
    #[must_use]
    pub fn spacing(mut self, column: f64, row: f64) -> Self {
        self.parent_column_space = column;
        self.parent_row_space = row;
        self
    }

    /// Mark the widget as a fill member.
    #[must_use]
    pub fn fill(mut self) -> Self {
        self.responsive_behavior = ResponsiveBehavior::Fill;
        self
    }

    /// Set size limits.
    #[must_use]
    pub fn limits(mut self, limits: SizeLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Restrict the exposed resize handles.
    #[must_use]
    pub fn handles(mut self, handles: HandleSet) -> Self {
        self.handles = handles;
        self
    }

    /// Pin the widget in place.
    #[must_use]
    pub fn pinned(mut self) -> Self {
        self.pinned = true;
        self
    }

    /// Set the mobile position.
    #[must_use]
    pub fn mobile_rect(mut self, rect: GridRect) -> Self {
        self.mobile_rect = Some(rect);
        self
    }

    /// Set the grid columns available to children.
    #[must_use]
    pub fn columns(mut self, columns: i32) -> Self {
        self.columns = columns;
        self
    }

    /// Set the tracked content height.
    #[must_use]
    pub fn canvas_rows(mut self, rows: i32) -> Self {
        self.canvas_rows = rows;
        self
    }

    /// Attach auto-layout rows.
    #[must_use]
    pub fn flex_layers(mut self, layers: Vec<FlexLayer>) -> Self {
        self.flex_layers = layers;
        self
    }

    /// Position under the given dimension map.
    #[must_use]
    pub fn rect_for(&self, map: DimensionMap) -> GridRect {
        match map {
            DimensionMap::Desktop => self.rect,
            DimensionMap::Mobile => self.mobile_rect.unwrap_or(self.rect),
        }
    }

    /// Validated spacing of the parent grid.
    pub fn grid_spacing(&self) -> Result<GridSpacing, GeometryError> {
        GridSpacing::new(self.parent_column_space, self.parent_row_space)
    }

    /// Whether the widget stretches inside its layer.
    #[must_use]
    pub fn is_fill(&self) -> bool {
        self.responsive_behavior == ResponsiveBehavior::Fill
    }

    fn set_rect(&mut self, map: DimensionMap, rect: GridRect) {
        match map {
            DimensionMap::Desktop => self.rect = rect,
            DimensionMap::Mobile => self.mobile_rect = Some(rect),
        }
    }
}

/// Final positions to write back after a gesture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeCommit {
    pub dimension_map: DimensionMap,
    /// New rectangles, the resized widget first.
    pub updates: Vec<(WidgetId, GridRect)>,
    /// Container whose content height may grow.
    pub container: Option<WidgetId>,
    pub canvas_rows: Option<i32>,
}

/// The authoritative set of widgets on a canvas.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WidgetTree {
    widgets: BTreeMap<WidgetId, WidgetSnapshot>,
}

impl WidgetTree {
    /// Build and validate a tree from a flat widget list.
    pub fn from_widgets(
        widgets: impl IntoIterator<Item = WidgetSnapshot>,
    ) -> Result<Self, TreeError> {
        let mut map = BTreeMap::new();
        for widget in widgets {
            let id = widget.id;
            if map.insert(id, widget).is_some() {
                return Err(TreeError::DuplicateWidget { widget: id });
            }
        }
        let tree = Self { widgets: map };
        tree.validate()?;
        Ok(tree)
    }

    fn validate(&self) -> Result<(), TreeError> {
        self.widgets
            .values()
            .try_for_each(|widget| self.check_widget(widget))
    }

    /// Validate one widget against the widgets already in the tree.
    fn check_widget(&self, widget: &WidgetSnapshot) -> Result<(), TreeError> {
        if let Some(parent) = widget.parent {
            if parent == widget.id {
                return Err(TreeError::SelfParent { widget: widget.id });
            }
            if !self.widgets.contains_key(&parent) {
                return Err(TreeError::MissingParent {
                    widget: widget.id,
                    parent,
                });
            }
        }
        let geometry = |source| TreeError::Geometry {
            widget: widget.id,
            source,
        };
        widget.rect.validate().map_err(geometry)?;
        if let Some(mobile) = widget.mobile_rect {
            mobile.validate().map_err(geometry)?;
        }
        widget.limits.validate(widget.id)
    }

    /// Lookup a widget by ID.
    #[must_use]
    pub fn get(&self, id: WidgetId) -> Option<&WidgetSnapshot> {
        self.widgets.get(&id)
    }

    /// Whether the widget exists.
    #[must_use]
    pub fn contains(&self, id: WidgetId) -> bool {
        self.widgets.contains_key(&id)
    }

    /// Number of widgets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    /// Whether the tree is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }

    /// All widgets in ID order.
    pub fn widgets(&self) -> impl Iterator<Item = &WidgetSnapshot> {
        self.widgets.values()
    }

    /// Direct children of `container` in ID order.
    pub fn children_of(&self, container: WidgetId) -> impl Iterator<Item = &WidgetSnapshot> {
        self.widgets
            .values()
            .filter(move |widget| widget.parent == Some(container))
    }

    /// The flex layer of the widget's parent that contains it.
    #[must_use]
    pub fn layer_of(&self, widget: WidgetId) -> Option<&FlexLayer> {
        let parent = self.get(widget)?.parent?;
        let layers = &self.get(parent)?.flex_layers;
        layer_index_of(layers, widget).map(|index| &layers[index])
    }

    /// Insert or replace a widget.
    pub fn upsert(&mut self, widget: WidgetSnapshot) -> Result<(), TreeError> {
        self.check_widget(&widget)?;
        let _ = self.widgets.insert(widget.id, widget);
        Ok(())
    }

    /// Remove a widget and its descendants, dropping it from its parent's
    /// layers. Returns the removed IDs.
    pub fn remove(&mut self, id: WidgetId) -> Result<Vec<WidgetId>, TreeError> {
        let Some(widget) = self.widgets.get(&id) else {
            return Err(TreeError::UnknownWidget { widget: id });
        };
        if let Some(parent) = widget.parent
            && let Some(parent) = self.widgets.get_mut(&parent)
        {
            for layer in &mut parent.flex_layers {
                layer.children.retain(|child| child.id != id);
            }
            parent.flex_layers.retain(|layer| !layer.children.is_empty());
        }

        let mut removed = Vec::new();
        let mut pending = vec![id];
        while let Some(next) = pending.pop() {
            if self.widgets.remove(&next).is_some() {
                removed.push(next);
                pending.extend(self.children_of(next).map(|child| child.id));
            }
        }
        crate::debug!(
            target: "gridflow.tree",
            widget = %id,
            removed = removed.len(),
            "widget removed"
        );
        Ok(removed)
    }

    /// Grow the tracked content height of `container`. Never shrinks.
    pub fn extend_canvas_rows(&mut self, container: WidgetId, rows: i32) -> Result<bool, TreeError> {
        let Some(widget) = self.widgets.get_mut(&container) else {
            return Err(TreeError::UnknownWidget { widget: container });
        };
        if rows > widget.canvas_rows {
            widget.canvas_rows = rows;
            return Ok(true);
        }
        Ok(false)
    }

    /// Write a gesture's final positions back to the tree.
    ///
    /// All rectangles are validated before anything is written, so a failed
    /// commit leaves the tree untouched.
    pub fn apply_commit(&mut self, commit: &TreeCommit) -> Result<(), TreeError> {
        for (id, rect) in &commit.updates {
            if !self.widgets.contains_key(id) {
                return Err(TreeError::UnknownWidget { widget: *id });
            }
            rect.validate().map_err(|source| TreeError::Geometry {
                widget: *id,
                source,
            })?;
        }
        if let Some(container) = commit.container
            && !self.widgets.contains_key(&container)
        {
            return Err(TreeError::UnknownWidget { widget: container });
        }

        for (id, rect) in &commit.updates {
            if let Some(widget) = self.widgets.get_mut(id) {
                widget.set_rect(commit.dimension_map, *rect);
            }
        }
        if let (Some(container), Some(rows)) = (commit.container, commit.canvas_rows) {
            let _ = self.extend_canvas_rows(container, rows)?;
        }
        crate::debug!(
            target: "gridflow.tree",
            updates = commit.updates.len(),
            map = ?commit.dimension_map,
            "commit applied"
        );
        Ok(())
    }
}

/// Widget tree construction and mutation failures.
#[derive(Debug, Clone, PartialEq)]
pub enum TreeError {
    ZeroWidgetId,
    DuplicateWidget {
        widget: WidgetId,
    },
    UnknownWidget {
        widget: WidgetId,
    },
    MissingParent {
        widget: WidgetId,
        parent: WidgetId,
    },
    SelfParent {
        widget: WidgetId,
    },
    InvalidLimits {
        widget: WidgetId,
        axis: &'static str,
    },
    Geometry {
        widget: WidgetId,
        source: GeometryError,
    },
}

impl fmt::Display for TreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroWidgetId => write!(f, "widget id 0 is invalid"),
            Self::DuplicateWidget { widget } => write!(f, "duplicate widget id {widget}"),
            Self::UnknownWidget { widget } => write!(f, "widget {widget} not found"),
            Self::MissingParent { widget, parent } => {
                write!(f, "widget {widget} references missing parent {parent}")
            }
            Self::SelfParent { widget } => write!(f, "widget {widget} is its own parent"),
            Self::InvalidLimits { widget, axis } => {
                write!(f, "widget {widget} has invalid {axis} limits")
            }
            Self::Geometry { widget, source } => write!(f, "widget {widget}: {source}"),
        }
    }
}

impl std::error::Error for TreeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        if let Self::Geometry { source, .. } = self {
            return Some(source);
        }
        None
    }
}
