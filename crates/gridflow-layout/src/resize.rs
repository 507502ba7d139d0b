#![forbid(unsafe_code)]

//! Resize gesture controller.
//!
//! [`ResizeController`] owns one widget's gesture lifecycle:
//!
//! ```text
//! Idle --HandleDown--> Dragging --HandleUp--> (Committed | Released) --> Idle
//!                         |
//!                         +--Cancel / widget removed--> Cancelled --> Idle
//! ```
//!
//! Every call returns a [`ResizeTransition`] naming the phase change, the
//! outcome, and the side effects the host must dispatch, in order. The
//! controller never writes to the tree; the host applies the commit.

use gridflow_core::{
    CancelReason, DimensionMap, FlexLayer, GridRect, LayerAlignment, ResizeEvent, ResizeHandle,
    TreeCommit, WidgetId, WidgetTree,
};
use serde::{Deserialize, Serialize};

use crate::config::ResizeConfig;
use crate::fill::{FillRedistribution, fill_widgets_length, layer_members, redistribute};
use crate::grid::{
    PixelOffset, PixelSize, cell_to_pixel_delta, min_max_dimensions_in_pixels, widget_pixel_size,
};
use crate::handle::{
    DimensionUpdate, DragContext, drag_frame, handle_available, resolve_anchor,
};
use crate::occupied::OccupiedSpaceIndex;
use crate::reflow::{
    MovementLimit, ReflowRequest, ReflowResult, ReflowSolver, ReflowedSpaceMap,
};

/// Gesture phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResizePhase {
    Idle,
    Dragging,
}

/// Why an input produced no state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResizeNoopReason {
    IdleWithoutActiveDrag,
    ActiveDragAlreadyInProgress,
    /// The event names a different widget.
    TargetMismatch,
    UnknownWidget,
    HandleUnavailable,
    /// The widget has no container or unusable spacing.
    InvalidGeometry,
}

/// Side effect for the host to dispatch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ReflowAction {
    /// Toggle pointer events on the widget interior.
    SetPointerEvents { enabled: bool },
    /// Reflow tracking started for `widget`.
    StartReflow { widget: WidgetId },
    /// Transient pixel overrides for displaced siblings.
    ReflowMove { moves: ReflowedSpaceMap },
    /// Grow the container's content height now.
    UpdateBottomRow { container: WidgetId, rows: i32 },
    /// Clear all transient reflow state.
    StopReflow,
    /// Write the gesture's result back to the tree.
    Commit { commit: ResizeCommit },
}

/// Final result of a gesture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResizeCommit {
    pub widget: WidgetId,
    pub container: WidgetId,
    pub dimension_map: DimensionMap,
    /// Final pixel size.
    pub size: PixelSize,
    /// Pixel offset of the top-left corner from the origin.
    pub offset: PixelOffset,
    /// Final grid rectangle.
    pub rect: GridRect,
    /// Final rectangles of displaced siblings, in ID order.
    pub reflowed: Vec<(WidgetId, GridRect)>,
    /// Container content height after the gesture.
    pub canvas_rows: i32,
}

impl ResizeCommit {
    /// Tree update writing the widget and its displaced siblings.
    #[must_use]
    pub fn to_tree_commit(&self) -> TreeCommit {
        let mut updates = Vec::with_capacity(self.reflowed.len() + 1);
        updates.push((self.widget, self.rect));
        updates.extend(self.reflowed.iter().copied());
        TreeCommit {
            dimension_map: self.dimension_map,
            updates,
            container: Some(self.container),
            canvas_rows: Some(self.canvas_rows),
        }
    }
}

/// What one controller call did.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ResizeOutcome {
    Started {
        handle: ResizeHandle,
        anchor: LayerAlignment,
    },
    Updated {
        rect: GridRect,
        limit: MovementLimit,
        /// The pointer asked for more than the limits allow.
        clamped: bool,
    },
    Committed {
        rect: GridRect,
    },
    /// Pointer released without any accepted movement.
    Released,
    Cancelled {
        reason: CancelReason,
    },
    DimensionsReset,
    Noop {
        reason: ResizeNoopReason,
    },
}

/// Deterministic record of one controller step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResizeTransition {
    pub transition_id: u64,
    pub from: ResizePhase,
    pub to: ResizePhase,
    pub outcome: ResizeOutcome,
    pub actions: Vec<ReflowAction>,
}

impl ResizeTransition {
    /// The commit carried by this transition, if any.
    #[must_use]
    pub fn commit(&self) -> Option<&ResizeCommit> {
        self.actions.iter().find_map(|action| match action {
            ReflowAction::Commit { commit } => Some(commit),
            _ => None,
        })
    }

    #[must_use]
    pub fn is_noop(&self) -> bool {
        matches!(self.outcome, ResizeOutcome::Noop { .. })
    }
}

#[derive(Debug, Clone)]
struct DragSession {
    context: DragContext,
    container: WidgetId,
    fill_layer: bool,
    /// Last rectangle the solver accepted.
    accepted: GridRect,
    moved: bool,
    tracked_rows: i32,
    reflowed: Vec<(WidgetId, GridRect)>,
}

/// Resize gesture state machine for one widget.
#[derive(Debug, Clone)]
pub struct ResizeController {
    widget: WidgetId,
    config: ResizeConfig,
    solver: ReflowSolver,
    session: Option<DragSession>,
    dimensions: DimensionUpdate,
    authoritative: Option<PixelSize>,
    transition_counter: u64,
}

impl ResizeController {
    #[must_use]
    pub fn new(widget: WidgetId, config: ResizeConfig) -> Self {
        let solver = config.to_solver();
        Self {
            widget,
            config,
            solver,
            session: None,
            dimensions: DimensionUpdate::default(),
            authoritative: None,
            transition_counter: 0,
        }
    }

    #[must_use]
    pub fn widget(&self) -> WidgetId {
        self.widget
    }

    #[must_use]
    pub fn config(&self) -> &ResizeConfig {
        &self.config
    }

    #[must_use]
    pub fn phase(&self) -> ResizePhase {
        if self.session.is_some() {
            ResizePhase::Dragging
        } else {
            ResizePhase::Idle
        }
    }

    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.session.is_some()
    }

    /// Current visual state.
    #[must_use]
    pub fn dimensions(&self) -> &DimensionUpdate {
        &self.dimensions
    }

    /// Last accepted rectangle of the active gesture.
    #[must_use]
    pub fn accepted_rect(&self) -> Option<GridRect> {
        self.session.as_ref().map(|session| session.accepted)
    }

    /// Sibling rectangles displaced by the active gesture. Empty when idle.
    #[must_use]
    pub fn pending_reflow(&self) -> &[(WidgetId, GridRect)] {
        match &self.session {
            Some(session) => &session.reflowed,
            None => &[],
        }
    }

    /// Apply one pointer-level input.
    pub fn apply_event(&mut self, tree: &WidgetTree, event: &ResizeEvent) -> ResizeTransition {
        if self.session.is_some() && !tree.contains(self.widget) {
            return self.cancel(CancelReason::WidgetRemoved);
        }
        match (*event, self.session.is_some()) {
            (ResizeEvent::HandleDown { widget, handle }, false) => self.start(tree, widget, handle),
            (ResizeEvent::HandleDown { .. }, true) => {
                self.noop(ResizeNoopReason::ActiveDragAlreadyInProgress)
            }
            (ResizeEvent::Drag { x, y }, true) => self.drag(tree, x, y),
            (ResizeEvent::HandleUp, true) => self.finish(),
            (ResizeEvent::Cancel { reason }, true) => self.cancel(reason),
            (_, false) => self.noop(ResizeNoopReason::IdleWithoutActiveDrag),
        }
    }

    /// React to a new authoritative tree outside of pointer input.
    ///
    /// Cancels the gesture if the widget disappeared, and resets the visual
    /// state if the widget's committed size changed.
    pub fn sync_tree(&mut self, tree: &WidgetTree) -> Option<ResizeTransition> {
        let Some(widget) = tree.get(self.widget) else {
            if self.session.is_some() {
                return Some(self.cancel(CancelReason::WidgetRemoved));
            }
            return None;
        };
        let size = widget_pixel_size(widget, self.config.dimension_map());
        if self.authoritative == Some(size) {
            return None;
        }
        self.authoritative = Some(size);
        self.dimensions = DimensionUpdate {
            direction: self.dimensions.direction,
            ..DimensionUpdate::reset_to(size)
        };
        let from = self.phase();
        Some(self.transition(from, ResizeOutcome::DimensionsReset, Vec::new()))
    }

    /// Abort the active gesture without a commit.
    pub fn force_cancel(&mut self) -> Option<ResizeTransition> {
        if self.session.is_none() {
            return None;
        }
        Some(self.cancel(CancelReason::Programmatic))
    }

    fn start(&mut self, tree: &WidgetTree, widget_id: WidgetId, handle: ResizeHandle) -> ResizeTransition {
        if widget_id != self.widget {
            return self.noop(ResizeNoopReason::TargetMismatch);
        }
        let Some(widget) = tree.get(widget_id) else {
            return self.noop(ResizeNoopReason::UnknownWidget);
        };
        let map = self.config.dimension_map();
        if !handle_available(widget, handle, map, self.config.grid_columns) {
            return self.noop(ResizeNoopReason::HandleUnavailable);
        }
        let Some(container) = widget.parent.and_then(|parent| tree.get(parent)) else {
            return self.noop(ResizeNoopReason::InvalidGeometry);
        };
        let spacing = match widget.grid_spacing() {
            Ok(spacing) => spacing,
            Err(err) => {
                tracing::debug!(
                    target: "gridflow.resize",
                    widget = %widget_id,
                    error = %err,
                    "resize refused"
                );
                return self.noop(ResizeNoopReason::InvalidGeometry);
            }
        };
        let index = match OccupiedSpaceIndex::for_resizing(tree, widget_id, map) {
            Ok(index) => index,
            Err(err) => {
                tracing::debug!(
                    target: "gridflow.resize",
                    widget = %widget_id,
                    error = %err,
                    "resize refused"
                );
                return self.noop(ResizeNoopReason::InvalidGeometry);
            }
        };

        let origin = widget.rect_for(map);
        let base = widget_pixel_size(widget, map);
        let fill_share = if widget.is_fill() {
            tree.layer_of(widget_id).and_then(|layer| {
                let members = layer_members(tree, layer, widget_id, origin, map);
                fill_widgets_length(container.columns, &members)
            })
        } else {
            None
        };
        let resolution = resolve_anchor(tree, widget_id, map, self.config.grid_columns);
        let anchor = resolution.anchor_for(handle);
        let context = DragContext {
            handle,
            anchor,
            origin,
            base,
            spacing,
            pixel_limits: min_max_dimensions_in_pixels(widget, fill_share),
            limits: widget.limits,
            fill: widget.is_fill(),
            walls: container.columns,
        };

        self.session = Some(DragSession {
            context,
            container: container.id,
            fill_layer: resolution.has_fill_child,
            accepted: origin,
            moved: false,
            tracked_rows: container
                .canvas_rows
                .max(index.bottom_most_row())
                .max(origin.bottom),
            reflowed: Vec::new(),
        });
        self.authoritative = Some(base);
        self.dimensions = DimensionUpdate {
            direction: handle.direction(),
            ..DimensionUpdate::reset_to(base)
        };

        tracing::debug!(
            target: "gridflow.resize",
            widget = %widget_id,
            handle = ?handle,
            anchor = ?anchor,
            origin = %origin,
            "resize started"
        );

        self.transition(
            ResizePhase::Idle,
            ResizeOutcome::Started { handle, anchor },
            vec![
                ReflowAction::SetPointerEvents { enabled: false },
                ReflowAction::StartReflow { widget: widget_id },
            ],
        )
    }

    fn drag(&mut self, tree: &WidgetTree, x: f64, y: f64) -> ResizeTransition {
        let map = self.config.dimension_map();
        let index = match OccupiedSpaceIndex::for_resizing(tree, self.widget, map) {
            Ok(index) => index,
            Err(err) => {
                tracing::warn!(
                    target: "gridflow.resize",
                    widget = %self.widget,
                    error = %err,
                    "reflow index unavailable, cancelling resize"
                );
                return self.cancel(CancelReason::WidgetRemoved);
            }
        };
        let Some(mut session) = self.session.take() else {
            return self.noop(ResizeNoopReason::IdleWithoutActiveDrag);
        };

        let ctx = session.context;
        let frame = drag_frame(&ctx, &self.dimensions, x, y);
        let request = ReflowRequest::new(self.widget, ctx.origin, frame.rect, ctx.handle.direction())
            .coupled(ctx.handle.is_corner() && ctx.anchor == LayerAlignment::Center)
            .min_size(ctx.limits.min_columns, ctx.limits.min_rows);
        let mut result = self.solver.solve(&index, &request);
        let mut limit = result.limit(self.widget);
        let mut fill_packed = false;

        if session.fill_layer
            && map == DimensionMap::Desktop
            && let Some(layer) = tree.layer_of(self.widget)
        {
            let mut fill = self.redistribute_layer(tree, layer, &index, &ctx, result.resolved);
            if !fill.can_horizontal_move() {
                tracing::debug!(
                    target: "gridflow.reflow",
                    widget = %self.widget,
                    fill_columns = ?fill.fill_columns,
                    held = %session.accepted,
                    "fill members at minimum, horizontal movement frozen"
                );
                let held = ReflowRequest {
                    candidate: frame.rect.with_horizontal(&session.accepted),
                    ..request
                };
                result = self.solver.solve(&index, &held);
                limit = MovementLimit {
                    can_horizontal_move: false,
                    ..result.limit(self.widget)
                };
                fill = self.redistribute_layer(tree, layer, &index, &ctx, result.resolved);
            }
            if fill.can_horizontal_move() {
                place_layer(&mut result, &index, self.widget, &fill);
                fill_packed = true;
            }
        }

        let resolved = result.resolved;
        let moves = result.reflowed_space_map(&index, ctx.spacing);
        let mut dimensions = frame.dimensions;
        if resolved.left != frame.rect.left || resolved.right != frame.rect.right {
            dimensions.width = cell_to_pixel_delta(resolved.columns(), ctx.spacing.column());
            dimensions.x = if ctx.policy().x_follows_pointer || fill_packed {
                cell_to_pixel_delta(resolved.left - ctx.origin.left, ctx.spacing.column())
            } else {
                0.0
            };
        }
        if resolved.bottom != frame.rect.bottom {
            dimensions.height = cell_to_pixel_delta(resolved.rows(), ctx.spacing.row());
        }

        session.moved |= resolved != session.accepted;
        session.accepted = resolved;
        session.reflowed = result.reflowed_sorted();

        let mut actions = vec![ReflowAction::ReflowMove { moves }];
        if result.bottom_most_row > session.tracked_rows {
            session.tracked_rows = result.bottom_most_row;
            actions.push(ReflowAction::UpdateBottomRow {
                container: session.container,
                rows: result.bottom_most_row,
            });
        }

        tracing::trace!(
            target: "gridflow.resize",
            widget = %self.widget,
            x,
            y,
            rect = %resolved,
            can_horizontal_move = limit.can_horizontal_move,
            can_vertical_move = limit.can_vertical_move,
            clamped = frame.clamped,
            "resize frame"
        );

        self.session = Some(session);
        self.dimensions = dimensions;
        self.transition(
            ResizePhase::Dragging,
            ResizeOutcome::Updated {
                rect: resolved,
                limit,
                clamped: frame.clamped,
            },
            actions,
        )
    }

    /// Redistribute the widget's row with the widget held at `resolved`.
    ///
    /// The resizing widget keeps its in-flight width even when it is a fill
    /// member itself.
    fn redistribute_layer(
        &self,
        tree: &WidgetTree,
        layer: &FlexLayer,
        index: &OccupiedSpaceIndex,
        ctx: &DragContext,
        resolved: GridRect,
    ) -> FillRedistribution {
        let mut members = layer_members(tree, layer, self.widget, resolved, DimensionMap::Desktop);
        for member in &mut members {
            if member.id == self.widget {
                member.fill = false;
            }
        }
        redistribute(
            &members,
            index.columns(),
            ctx.spacing.column(),
            self.config.enforce_fill_minimum,
        )
    }

    fn finish(&mut self) -> ResizeTransition {
        let Some(session) = self.session.take() else {
            return self.noop(ResizeNoopReason::IdleWithoutActiveDrag);
        };
        let mut actions = vec![
            ReflowAction::SetPointerEvents { enabled: true },
            ReflowAction::StopReflow,
        ];

        let outcome = if session.moved {
            let commit = self.build_commit(&session);
            tracing::debug!(
                target: "gridflow.resize",
                widget = %self.widget,
                rect = %commit.rect,
                width = commit.size.width,
                height = commit.size.height,
                reflowed = commit.reflowed.len(),
                "resize committed"
            );
            let rect = commit.rect;
            actions.push(ReflowAction::Commit { commit });
            ResizeOutcome::Committed { rect }
        } else {
            tracing::debug!(
                target: "gridflow.resize",
                widget = %self.widget,
                "resize released without movement"
            );
            self.dimensions = DimensionUpdate::reset_to(session.context.base);
            ResizeOutcome::Released
        };
        self.transition(ResizePhase::Dragging, outcome, actions)
    }

    fn build_commit(&self, session: &DragSession) -> ResizeCommit {
        let ctx = &session.context;
        let origin = ctx.origin;
        let accepted = session.accepted;
        let column = ctx.spacing.column();
        let row = ctx.spacing.row();
        let d_left = accepted.left - origin.left;
        let d_right = accepted.right - origin.right;
        let d_top = accepted.top - origin.top;
        let d_bottom = accepted.bottom - origin.bottom;

        ResizeCommit {
            widget: self.widget,
            container: session.container,
            dimension_map: self.config.dimension_map(),
            size: PixelSize {
                width: ctx.base.width + cell_to_pixel_delta(d_right - d_left, column),
                height: ctx.base.height + cell_to_pixel_delta(d_bottom - d_top, row),
            },
            offset: PixelOffset {
                x: cell_to_pixel_delta(d_left, column),
                y: cell_to_pixel_delta(d_top, row),
            },
            rect: accepted,
            reflowed: session.reflowed.clone(),
            canvas_rows: session.tracked_rows,
        }
    }

    fn cancel(&mut self, reason: CancelReason) -> ResizeTransition {
        let Some(session) = self.session.take() else {
            return self.noop(ResizeNoopReason::IdleWithoutActiveDrag);
        };
        self.dimensions = DimensionUpdate::reset_to(session.context.base);
        if reason == CancelReason::WidgetRemoved {
            tracing::warn!(
                target: "gridflow.resize",
                widget = %self.widget,
                "widget removed mid-resize, gesture cancelled"
            );
        } else {
            tracing::debug!(
                target: "gridflow.resize",
                widget = %self.widget,
                reason = ?reason,
                "resize cancelled"
            );
        }
        self.transition(
            ResizePhase::Dragging,
            ResizeOutcome::Cancelled { reason },
            vec![
                ReflowAction::SetPointerEvents { enabled: true },
                ReflowAction::StopReflow,
            ],
        )
    }

    fn noop(&mut self, reason: ResizeNoopReason) -> ResizeTransition {
        let from = self.phase();
        self.transition(from, ResizeOutcome::Noop { reason }, Vec::new())
    }

    fn transition(
        &mut self,
        from: ResizePhase,
        outcome: ResizeOutcome,
        actions: Vec<ReflowAction>,
    ) -> ResizeTransition {
        self.transition_counter = self.transition_counter.saturating_add(1);
        ResizeTransition {
            transition_id: self.transition_counter,
            from,
            to: self.phase(),
            outcome,
            actions,
        }
    }
}

/// Move every row member onto its redistributed slot.
///
/// Members keep the vertical span the solver gave them, so the bottom-most
/// row is unchanged. Members whose final rectangle equals their committed
/// one drop out of the reflowed set.
fn place_layer(
    result: &mut ReflowResult,
    index: &OccupiedSpaceIndex,
    widget: WidgetId,
    fill: &FillRedistribution,
) {
    for slot in &fill.slots {
        if slot.id == widget {
            result.resolved = slot.place(result.resolved);
            continue;
        }
        let Some(committed) = index.get(slot.id).map(|space| space.rect) else {
            continue;
        };
        let current = result.reflowed.get(&slot.id).copied().unwrap_or(committed);
        let placed = slot.place(current);
        if placed == committed {
            result.reflowed.remove(&slot.id);
        } else {
            result.reflowed.insert(slot.id, placed);
        }
    }
}
