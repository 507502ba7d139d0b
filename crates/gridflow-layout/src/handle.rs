#![forbid(unsafe_code)]

//! Resize handles: availability, anchoring, and the edge-policy table.
//!
//! Which grid edges a handle moves depends on the side of the frame it sits
//! on and the anchor of the widget inside its row:
//!
//! | side  | anchor | left edge | right edge | width  | x follows |
//! |-------|--------|-----------|------------|--------|-----------|
//! | right | start  |     -     |   `+d`     | `+d`   |    no     |
//! | right | center |   `-d`    |   `+d`     | `+2d`  |    no     |
//! | right | end    |   `-d`    |     -      | `+d`   |    no     |
//! | left  | start  |     -     |   `-d`     | `-d`   |    no     |
//! | left  | center |   `+d`    |   `-d`     | `-2d`  |    no     |
//! | left  | end    |   `+d`    |     -      | `-d`   |   yes     |
//!
//! where `d` is the pointer delta. The bottom edge always moves by the
//! vertical delta.

use gridflow_core::{
    DimensionMap, GridRect, GridSpacing, LayerAlignment, MAX_GRID_ROWS, ReflowDirection,
    ResizeHandle, SizeLimits, WidgetId, WidgetSnapshot, WidgetTree,
};
use serde::{Deserialize, Serialize};

use crate::grid::{MinMaxPixels, PixelSize, cell_to_pixel_delta, pixel_to_cell_delta};

/// Edge coefficients for one `(side, anchor)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgePolicy {
    /// Multiplier applied to the cell delta for the left edge.
    pub left: i32,
    /// Multiplier applied to the cell delta for the right edge.
    pub right: i32,
    /// The visual x offset tracks the pointer.
    pub x_follows_pointer: bool,
    /// The presentation layer should apply the x/y offset.
    pub reflect_position: bool,
}

impl EdgePolicy {
    /// Width change per unit of pointer delta.
    #[must_use]
    pub const fn width_factor(&self) -> i32 {
        self.right - self.left
    }
}

/// Look up the edge policy for a handle side and anchor.
#[must_use]
pub const fn edge_policy(left_side: bool, anchor: LayerAlignment) -> EdgePolicy {
    let (left, right, x_follows_pointer, reflect_position) = match (left_side, anchor) {
        (false, LayerAlignment::Start) => (0, 1, false, false),
        (false, LayerAlignment::Center) => (-1, 1, false, true),
        (false, LayerAlignment::End) => (-1, 0, false, false),
        (true, LayerAlignment::Start) => (0, -1, false, false),
        (true, LayerAlignment::Center) => (1, -1, false, true),
        (true, LayerAlignment::End) => (1, 0, true, false),
    };
    EdgePolicy {
        left,
        right,
        x_follows_pointer,
        reflect_position,
    }
}

/// Whether `handle` may start a resize of `widget`.
///
/// The left handle is hidden at column 0, the right handle is hidden when
/// the widget is pressed against the right wall without starting at column
/// 0, and fill widgets cannot be resized from a corner.
#[must_use]
pub fn handle_available(
    widget: &WidgetSnapshot,
    handle: ResizeHandle,
    map: DimensionMap,
    grid_columns: i32,
) -> bool {
    if widget.resize_disabled || !widget.handles.contains(handle.flag()) {
        return false;
    }
    let rect = widget.rect_for(map);
    match handle {
        ResizeHandle::Left => rect.left != 0,
        ResizeHandle::Right => !(rect.left != 0 && rect.right == grid_columns),
        ResizeHandle::Bottom => true,
        ResizeHandle::BottomLeft | ResizeHandle::BottomRight => !widget.is_fill(),
    }
}

/// Where a widget is anchored within its row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnchorResolution {
    /// `None` for widgets outside any auto-layout row.
    pub alignment: Option<LayerAlignment>,
    /// The widget's row has at least one fill member.
    pub has_fill_child: bool,
}

impl AnchorResolution {
    /// Effective anchor for a handle. Free widgets move the dragged edge.
    #[must_use]
    pub fn anchor_for(&self, handle: ResizeHandle) -> LayerAlignment {
        match self.alignment {
            Some(alignment) => alignment,
            None if handle.is_left_side() => LayerAlignment::End,
            None => LayerAlignment::Start,
        }
    }
}

/// Resolve the anchor of `widget` from its row.
///
/// Rows with a fill member anchor by position: widgets starting past the
/// middle of the canvas grow leftward, all others rightward. Otherwise the
/// widget's own row alignment applies.
#[must_use]
pub fn resolve_anchor(
    tree: &WidgetTree,
    widget: WidgetId,
    map: DimensionMap,
    grid_columns: i32,
) -> AnchorResolution {
    let Some(layer) = tree.layer_of(widget) else {
        return AnchorResolution {
            alignment: None,
            has_fill_child: false,
        };
    };
    let has_fill_child = layer
        .children
        .iter()
        .any(|child| tree.get(child.id).is_some_and(WidgetSnapshot::is_fill));

    let alignment = if has_fill_child {
        let left = tree.get(widget).map_or(0, |w| w.rect_for(map).left);
        if left > grid_columns / 2 {
            LayerAlignment::End
        } else {
            LayerAlignment::Start
        }
    } else {
        layer
            .child(widget)
            .map_or(LayerAlignment::Start, |child| child.align)
    };
    AnchorResolution {
        alignment: Some(alignment),
        has_fill_child,
    }
}

/// Per-frame visual state of the resizing widget.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DimensionUpdate {
    pub width: f64,
    pub height: f64,
    pub x: f64,
    pub y: f64,
    pub direction: ReflowDirection,
    pub reflect_dimension: bool,
    pub reflect_position: bool,
    /// Jump to this state without easing.
    pub reset: bool,
}

impl DimensionUpdate {
    /// Snap back to the authoritative size.
    #[must_use]
    pub fn reset_to(size: PixelSize) -> Self {
        Self {
            width: size.width,
            height: size.height,
            x: 0.0,
            y: 0.0,
            direction: ReflowDirection::Unset,
            reflect_dimension: true,
            reflect_position: true,
            reset: true,
        }
    }
}

impl Default for DimensionUpdate {
    fn default() -> Self {
        Self::reset_to(PixelSize::default())
    }
}

/// Everything about the widget that stays fixed during one gesture.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DragContext {
    pub handle: ResizeHandle,
    pub anchor: LayerAlignment,
    /// Committed rectangle at gesture start.
    pub origin: GridRect,
    /// Committed pixel size at gesture start.
    pub base: PixelSize,
    pub spacing: GridSpacing,
    pub pixel_limits: MinMaxPixels,
    pub limits: SizeLimits,
    /// Fill widgets have no declared maximum width.
    pub fill: bool,
    /// Columns between the container walls.
    pub walls: i32,
}

impl DragContext {
    #[must_use]
    pub fn policy(&self) -> EdgePolicy {
        edge_policy(self.handle.is_left_side(), self.anchor)
    }
}

/// Candidate rectangle and visual state for one pointer position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DragFrame {
    pub rect: GridRect,
    pub dimensions: DimensionUpdate,
    /// The pointer asked for a size outside the limits or walls.
    pub clamped: bool,
}

/// Turn cumulative pointer deltas into a candidate.
///
/// Deltas that would take the widget below its minimum land exactly on the
/// minimum; deltas past the maximum or a wall land on the limit.
#[must_use]
pub fn drag_frame(ctx: &DragContext, previous: &DimensionUpdate, dx: f64, dy: f64) -> DragFrame {
    let dx = if dx.is_finite() { dx } else { 0.0 };
    let dy = if dy.is_finite() { dy } else { 0.0 };
    let mut rect = ctx.origin;
    let mut clamped = false;
    let mut dimensions = DimensionUpdate {
        direction: ctx.handle.direction(),
        reflect_dimension: true,
        reset: false,
        ..*previous
    };

    if ctx.handle.affects_width() {
        let policy = ctx.policy();
        let factor = f64::from(policy.width_factor());
        let column = ctx.spacing.column();

        let mut dx = dx;
        let wanted = ctx.base.width + factor * dx;
        let allowed = ctx.pixel_limits.clamp_width(wanted);
        if allowed != wanted {
            dx = (allowed - ctx.base.width) / factor;
            clamped = true;
        }

        let max_columns = if ctx.fill { None } else { ctx.limits.max_columns };
        let origin = ctx.origin;
        let width_factor = i64::from(policy.width_factor());
        let mut range = CellRange::ANY;
        range.require(
            width_factor,
            i64::from(origin.columns()) - i64::from(ctx.limits.min_columns),
        );
        if let Some(max) = max_columns {
            range.require(-width_factor, i64::from(max) - i64::from(origin.columns()));
        }
        range.require(i64::from(policy.left), i64::from(origin.left));
        range.require(
            -i64::from(policy.right),
            i64::from(ctx.walls) - i64::from(origin.right),
        );
        let requested = pixel_to_cell_delta(dx, column);
        let cells = range.toward_zero(requested);
        if cells != requested {
            dx = cell_to_pixel_delta(cells, column);
            clamped = true;
        }

        rect.left = ctx.origin.left + policy.left * cells;
        rect.right = ctx.origin.right + policy.right * cells;
        dimensions.width = ctx.base.width + factor * dx;
        dimensions.x = if policy.x_follows_pointer { dx } else { 0.0 };
        dimensions.reflect_position = policy.reflect_position;
    }

    if ctx.handle.affects_height() {
        let row = ctx.spacing.row();
        let mut dy = dy;
        let wanted = ctx.base.height + dy;
        let allowed = ctx.pixel_limits.clamp_height(wanted);
        if allowed != wanted {
            dy = allowed - ctx.base.height;
            clamped = true;
        }

        let origin = ctx.origin;
        let mut range = CellRange::ANY;
        range.require(1, i64::from(origin.rows()) - i64::from(ctx.limits.min_rows));
        if let Some(max) = ctx.limits.max_rows {
            range.require(-1, i64::from(max) - i64::from(origin.rows()));
        }
        range.require(-1, i64::from(MAX_GRID_ROWS) - i64::from(origin.bottom));
        let requested = pixel_to_cell_delta(dy, row);
        let cells = range.toward_zero(requested);
        if cells != requested {
            dy = cell_to_pixel_delta(cells, row);
            clamped = true;
        }

        rect.bottom = ctx.origin.bottom + cells;
        dimensions.height = ctx.base.height + dy;
        if !ctx.handle.affects_width() {
            dimensions.reflect_position = true;
        }
    }

    DragFrame {
        rect,
        dimensions,
        clamped,
    }
}

/// Cell deltas satisfying a set of linear edge constraints.
#[derive(Debug, Clone, Copy)]
struct CellRange {
    lo: i64,
    hi: i64,
}

impl CellRange {
    const ANY: Self = Self {
        lo: i32::MIN as i64,
        hi: i32::MAX as i64,
    };

    /// Intersect with `{c : a * c + b >= 0}`.
    fn require(&mut self, a: i64, b: i64) {
        match a.signum() {
            1 => self.lo = self.lo.max(-b.div_euclid(a)),
            -1 => self.hi = self.hi.min(b.div_euclid(-a)),
            _ if b < 0 => {
                self.lo = i64::MAX;
                self.hi = i64::MIN;
            }
            _ => {}
        }
    }

    /// The delta closest to `requested` on the way back to zero that lies
    /// in the range. Zero is always accepted.
    fn toward_zero(&self, requested: i32) -> i32 {
        let wanted = i64::from(requested);
        let cells = match wanted.signum() {
            1 => wanted.min(self.hi),
            -1 => wanted.max(self.lo),
            _ => 0,
        };
        if cells.signum() != wanted.signum() || cells < self.lo || cells > self.hi {
            return 0;
        }
        i32::try_from(cells).unwrap_or(0)
    }
}
