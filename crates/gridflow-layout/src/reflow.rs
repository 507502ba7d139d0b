#![forbid(unsafe_code)]

//! Collision-aware reflow solver.
//!
//! Given the committed origin of a resizing widget and a candidate rectangle
//! for the current frame, the solver finds the furthest legal rectangle on the
//! way to the candidate and the sibling displacements that make it legal.
//!
//! # Algorithm
//!
//! Every frame is solved from the authoritative sibling positions, so the
//! result depends only on `(origin, candidate)` and never on earlier frames.
//!
//! 1. The candidate is projected onto the axes the direction may change,
//!    clamped to the container walls and the deepest row, and rejected
//!    outright if it is below the widget's minimum size.
//! 2. The target is resolved in two phases: the new horizontal span (at the
//!    origin rows) pushes siblings sideways, then the full rectangle pushes
//!    siblings downward. Each push is resolved with a breadth-first cascade:
//!    `Pinned` siblings block, `Compress` siblings shrink their near edge down
//!    to their minimum, `Push` siblings translate and push their own
//!    neighbours.
//! 3. If the target cannot be resolved, the edges advance one grid unit at a
//!    time from the start and the last resolvable step is kept.
//!
//! Axes are swept independently (horizontal first) unless the request is
//! coupled, in which case both axes advance together and stop together.

use std::collections::VecDeque;

use gridflow_core::{GridRect, GridSpacing, MAX_GRID_ROWS, ReflowDirection, WidgetId};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::grid::cell_to_pixel_delta;
use crate::occupied::{AxisReflow, OccupiedSpace, OccupiedSpaceIndex};

/// Default cap on incremental sweep steps per axis.
pub const DEFAULT_MAX_SWEEP_STEPS: u32 = 256;

/// Default cap on sibling displacements per resolution attempt.
pub const DEFAULT_MAX_REFLOW_PASSES: u32 = 1024;

/// Working sibling positions keyed by widget.
type Layout = FxHashMap<WidgetId, GridRect>;

/// Whether a widget may keep moving on each axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementLimit {
    pub can_horizontal_move: bool,
    pub can_vertical_move: bool,
}

impl MovementLimit {
    /// Both axes free.
    pub const FREE: Self = Self {
        can_horizontal_move: true,
        can_vertical_move: true,
    };

    /// Both axes blocked.
    pub const BLOCKED: Self = Self {
        can_horizontal_move: false,
        can_vertical_move: false,
    };
}

impl Default for MovementLimit {
    fn default() -> Self {
        Self::FREE
    }
}

/// Movement limits for the resizing widget and every displaced sibling.
pub type MovementLimitMap = FxHashMap<WidgetId, MovementLimit>;

/// Pixel overrides for a displaced widget. Absent fields are unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ReflowedSpace {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    /// Horizontal offset from the committed position.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    /// Vertical offset from the committed position.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
}

impl ReflowedSpace {
    /// Overrides that turn `from` into `to`.
    #[must_use]
    pub fn between(from: &GridRect, to: &GridRect, spacing: GridSpacing) -> Self {
        let column = spacing.column();
        let row = spacing.row();
        Self {
            width: (to.columns() != from.columns())
                .then(|| cell_to_pixel_delta(to.columns(), column)),
            height: (to.rows() != from.rows()).then(|| cell_to_pixel_delta(to.rows(), row)),
            x: (to.left != from.left).then(|| cell_to_pixel_delta(to.left - from.left, column)),
            y: (to.top != from.top).then(|| cell_to_pixel_delta(to.top - from.top, row)),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.width.is_none() && self.height.is_none() && self.x.is_none() && self.y.is_none()
    }
}

/// Pixel overrides per displaced widget, dispatched once per frame.
pub type ReflowedSpaceMap = FxHashMap<WidgetId, ReflowedSpace>;

/// One frame's input to the solver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReflowRequest {
    pub widget: WidgetId,
    /// Committed rectangle at gesture start.
    pub origin: GridRect,
    /// Rectangle the pointer asks for this frame.
    pub candidate: GridRect,
    pub direction: ReflowDirection,
    /// Advance both axes together (centered corner resize).
    pub coupled: bool,
    pub min_columns: i32,
    pub min_rows: i32,
}

impl ReflowRequest {
    /// Request with minimum sizes of one unit and independent axes.
    #[must_use]
    pub fn new(
        widget: WidgetId,
        origin: GridRect,
        candidate: GridRect,
        direction: ReflowDirection,
    ) -> Self {
        Self {
            widget,
            origin,
            candidate,
            direction,
            coupled: false,
            min_columns: 1,
            min_rows: 1,
        }
    }

    #[must_use]
    pub fn coupled(mut self, coupled: bool) -> Self {
        self.coupled = coupled;
        self
    }

    #[must_use]
    pub fn min_size(mut self, columns: i32, rows: i32) -> Self {
        self.min_columns = columns;
        self.min_rows = rows;
        self
    }
}

/// Solver output for one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReflowResult {
    /// Furthest legal rectangle for the resizing widget.
    pub resolved: GridRect,
    /// Largest bottom edge across the resizing widget and its siblings.
    pub bottom_most_row: i32,
    pub movement_limits: MovementLimitMap,
    /// New rectangles of siblings that moved or shrank.
    pub reflowed: FxHashMap<WidgetId, GridRect>,
}

impl ReflowResult {
    /// Movement limit for `widget`; widgets the frame did not touch are free.
    #[must_use]
    pub fn limit(&self, widget: WidgetId) -> MovementLimit {
        self.movement_limits
            .get(&widget)
            .copied()
            .unwrap_or_default()
    }

    /// Displaced siblings in ID order.
    #[must_use]
    pub fn reflowed_sorted(&self) -> Vec<(WidgetId, GridRect)> {
        let mut out: Vec<_> = self.reflowed.iter().map(|(id, rect)| (*id, *rect)).collect();
        out.sort_by_key(|(id, _)| *id);
        out
    }

    /// Pixel overrides for each displaced sibling.
    #[must_use]
    pub fn reflowed_space_map(
        &self,
        index: &OccupiedSpaceIndex,
        spacing: GridSpacing,
    ) -> ReflowedSpaceMap {
        self.reflowed
            .iter()
            .filter_map(|(id, rect)| {
                let original = index.get(*id)?.rect;
                Some((*id, ReflowedSpace::between(&original, rect, spacing)))
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    Horizontal,
    Vertical,
}

/// Incremental push/compress solver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReflowSolver {
    max_sweep_steps: u32,
    max_reflow_passes: u32,
}

impl Default for ReflowSolver {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SWEEP_STEPS, DEFAULT_MAX_REFLOW_PASSES)
    }
}

impl ReflowSolver {
    #[must_use]
    pub const fn new(max_sweep_steps: u32, max_reflow_passes: u32) -> Self {
        Self {
            max_sweep_steps,
            max_reflow_passes,
        }
    }

    /// Solve one frame.
    #[must_use]
    pub fn solve(&self, index: &OccupiedSpaceIndex, request: &ReflowRequest) -> ReflowResult {
        let _span = tracing::debug_span!(
            "reflow.solve",
            widget = %request.widget,
            direction = ?request.direction,
            siblings = index.len(),
        )
        .entered();

        let base: Layout = index.iter().map(|space| (space.id, space.rect)).collect();
        let origin = request.origin;

        let Some(candidate) = admissible_candidate(index, request) else {
            tracing::trace!(
                target: "gridflow.reflow",
                widget = %request.widget,
                candidate = %request.candidate,
                "candidate below minimum size"
            );
            return self.finish(index, request, origin, &base, MovementLimit::BLOCKED);
        };

        let horizontal = request.direction.is_horizontal();
        let vertical = request.direction.is_vertical();

        let (resolved, layout, limit) = if request.coupled && horizontal && vertical {
            let (rect, layout) = self.sweep(index, request, origin, candidate, base.clone());
            let reached = rect == candidate;
            let limit = MovementLimit {
                can_horizontal_move: reached,
                can_vertical_move: reached,
            };
            (rect, layout, limit)
        } else {
            let h_target = origin.with_horizontal(&candidate);
            let (h_rect, h_layout) = self.sweep(index, request, origin, h_target, base.clone());
            let v_target = h_rect.with_vertical(&candidate);
            let (rect, layout) = self.sweep(index, request, h_rect, v_target, h_layout);
            let limit = MovementLimit {
                can_horizontal_move: h_rect == h_target,
                can_vertical_move: rect == v_target,
            };
            (rect, layout, limit)
        };

        self.finish(index, request, resolved, &layout, limit)
    }

    fn finish(
        &self,
        index: &OccupiedSpaceIndex,
        request: &ReflowRequest,
        resolved: GridRect,
        layout: &Layout,
        limit: MovementLimit,
    ) -> ReflowResult {
        let mut movement_limits = MovementLimitMap::default();
        movement_limits.insert(request.widget, limit);
        let mut reflowed = FxHashMap::default();
        let mut bottom_most_row = resolved.bottom;

        for space in index.iter() {
            let rect = layout.get(&space.id).copied().unwrap_or(space.rect);
            bottom_most_row = bottom_most_row.max(rect.bottom);
            if rect != space.rect {
                reflowed.insert(space.id, rect);
                movement_limits.insert(space.id, sibling_limit(space, &rect, index.columns()));
            }
        }

        tracing::trace!(
            target: "gridflow.reflow",
            widget = %request.widget,
            resolved = %resolved,
            can_horizontal_move = limit.can_horizontal_move,
            can_vertical_move = limit.can_vertical_move,
            reflowed = reflowed.len(),
            bottom_most_row,
            "reflow frame solved"
        );

        ReflowResult {
            resolved,
            bottom_most_row,
            movement_limits,
            reflowed,
        }
    }

    /// Advance from `start` toward `target`, returning the furthest
    /// resolvable rectangle and its sibling layout.
    fn sweep(
        &self,
        index: &OccupiedSpaceIndex,
        request: &ReflowRequest,
        start: GridRect,
        target: GridRect,
        start_layout: Layout,
    ) -> (GridRect, Layout) {
        if start == target {
            return (start, start_layout);
        }
        if let Some(layout) = self.resolve(index, request, target) {
            return (target, layout);
        }

        let steps = [
            target.left - start.left,
            target.right - start.right,
            target.top - start.top,
            target.bottom - start.bottom,
        ]
        .into_iter()
        .map(i32::abs)
        .max()
        .unwrap_or(0);
        let cap = i32::try_from(self.max_sweep_steps).unwrap_or(i32::MAX);
        let last = if steps <= cap { steps - 1 } else { cap };

        let mut best = (start, start_layout);
        for step in 1..=last {
            let rect = GridRect::new(
                step_toward(start.left, target.left, step),
                step_toward(start.top, target.top, step),
                step_toward(start.right, target.right, step),
                step_toward(start.bottom, target.bottom, step),
            );
            match self.resolve(index, request, rect) {
                Some(layout) => best = (rect, layout),
                None => break,
            }
        }
        best
    }

    /// Resolve every collision caused by placing the widget at `rect`.
    fn resolve(
        &self,
        index: &OccupiedSpaceIndex,
        request: &ReflowRequest,
        rect: GridRect,
    ) -> Option<Layout> {
        let base: Layout = index.iter().map(|space| (space.id, space.rect)).collect();
        let sideways = request.origin.with_horizontal(&rect);
        let layout = self.push_axis(index, request, Axis::Horizontal, sideways, base)?;
        self.push_axis(index, request, Axis::Vertical, rect, layout)
    }

    fn push_axis(
        &self,
        index: &OccupiedSpaceIndex,
        request: &ReflowRequest,
        axis: Axis,
        mover: GridRect,
        mut layout: Layout,
    ) -> Option<Layout> {
        let mut queue = VecDeque::new();
        queue.push_back((request.widget, mover, None::<i32>));
        let mut passes = 0u32;

        while let Some((pusher, pusher_rect, inherited)) = queue.pop_front() {
            for space in index.iter() {
                if space.id == pusher {
                    continue;
                }
                let Some(current) = layout.get(&space.id).copied() else {
                    continue;
                };
                if !pusher_rect.overlaps(&current) {
                    continue;
                }
                passes += 1;
                if passes > self.max_reflow_passes {
                    return None;
                }
                let sign = match inherited {
                    Some(sign) => sign,
                    None => side_of(axis, &request.origin, &space.rect)?,
                };
                let (next, moved) = displace(axis, space, current, &pusher_rect, sign, index.columns())?;
                layout.insert(space.id, next);
                if moved {
                    queue.push_back((space.id, next, Some(sign)));
                }
            }
        }
        Some(layout)
    }
}

/// Project, clamp, and size-check the requested candidate.
fn admissible_candidate(index: &OccupiedSpaceIndex, request: &ReflowRequest) -> Option<GridRect> {
    let origin = request.origin;
    let mut candidate = request.candidate;
    if !request.direction.is_horizontal() {
        candidate = candidate.with_horizontal(&origin);
    }
    if !request.direction.is_vertical() {
        candidate = candidate.with_vertical(&origin);
    }
    candidate.left = candidate.left.max(0);
    candidate.right = candidate.right.min(index.columns());
    candidate.top = candidate.top.max(0);
    candidate.bottom = candidate.bottom.min(MAX_GRID_ROWS);

    if candidate.columns() < request.min_columns || candidate.rows() < request.min_rows {
        return None;
    }
    Some(candidate)
}

fn step_toward(from: i32, to: i32, step: i32) -> i32 {
    if to >= from {
        from.saturating_add(step).min(to)
    } else {
        from.saturating_sub(step).max(to)
    }
}

/// Which way a sibling is pushed: `+1` if it starts past the origin's far
/// edge, `-1` if before the near edge. Siblings sharing the origin's span
/// cannot be pushed on this axis.
fn side_of(axis: Axis, origin: &GridRect, sibling: &GridRect) -> Option<i32> {
    let (near, far, s_near, s_far) = match axis {
        Axis::Horizontal => (origin.left, origin.right, sibling.left, sibling.right),
        Axis::Vertical => (origin.top, origin.bottom, sibling.top, sibling.bottom),
    };
    if s_near >= far {
        Some(1)
    } else if s_far <= near {
        Some(-1)
    } else {
        None
    }
}

fn displace(
    axis: Axis,
    space: &OccupiedSpace,
    current: GridRect,
    pusher: &GridRect,
    sign: i32,
    columns: i32,
) -> Option<(GridRect, bool)> {
    let forward = sign > 0;
    let overlap = match (axis, forward) {
        (Axis::Horizontal, true) => pusher.right - current.left,
        (Axis::Horizontal, false) => current.right - pusher.left,
        (Axis::Vertical, true) => pusher.bottom - current.top,
        (Axis::Vertical, false) => current.bottom - pusher.top,
    };
    if overlap <= 0 {
        return Some((current, false));
    }

    let policy = match axis {
        Axis::Horizontal => space.horizontal,
        Axis::Vertical => space.vertical,
    };
    match policy {
        AxisReflow::Pinned => None,
        AxisReflow::Compress => {
            let (extent, min) = match axis {
                Axis::Horizontal => (current.columns(), space.min_columns),
                Axis::Vertical => (current.rows(), space.min_rows),
            };
            if extent - overlap < min {
                return None;
            }
            let mut next = current;
            match (axis, forward) {
                (Axis::Horizontal, true) => next.left += overlap,
                (Axis::Horizontal, false) => next.right -= overlap,
                (Axis::Vertical, true) => next.top += overlap,
                (Axis::Vertical, false) => next.bottom -= overlap,
            }
            Some((next, false))
        }
        AxisReflow::Push => {
            let next = match axis {
                Axis::Horizontal => current.translate(sign * overlap, 0),
                Axis::Vertical => current.translate(0, sign * overlap),
            };
            if next.left < 0 || next.right > columns || next.top < 0 {
                return None;
            }
            Some((next, true))
        }
    }
}

fn sibling_limit(space: &OccupiedSpace, rect: &GridRect, columns: i32) -> MovementLimit {
    MovementLimit {
        can_horizontal_move: match space.horizontal {
            AxisReflow::Pinned => false,
            AxisReflow::Compress => rect.columns() > space.min_columns,
            AxisReflow::Push => rect.left > 0 && rect.right < columns,
        },
        can_vertical_move: match space.vertical {
            AxisReflow::Pinned => false,
            AxisReflow::Compress => rect.rows() > space.min_rows,
            AxisReflow::Push => true,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::find_overlap;

    fn id(raw: u64) -> WidgetId {
        WidgetId::new(raw).expect("test ID must be non-zero")
    }

    const A: u64 = 2;

    fn index(columns: i32, spaces: impl IntoIterator<Item = OccupiedSpace>) -> OccupiedSpaceIndex {
        OccupiedSpaceIndex::from_spaces(id(1), columns, spaces)
    }

    fn pinned(raw: u64, rect: GridRect) -> OccupiedSpace {
        OccupiedSpace {
            horizontal: AxisReflow::Pinned,
            vertical: AxisReflow::Pinned,
            ..OccupiedSpace::free(id(raw), rect)
        }
    }

    fn grow_right(origin: GridRect, columns: i32) -> ReflowRequest {
        let candidate = GridRect {
            right: origin.right + columns,
            ..origin
        };
        ReflowRequest::new(id(A), origin, candidate, ReflowDirection::Right)
    }

    fn assert_no_overlap(result: &ReflowResult, index: &OccupiedSpaceIndex) {
        let mut rects = vec![(id(A), result.resolved)];
        for space in index.iter() {
            rects.push((
                space.id,
                result.reflowed.get(&space.id).copied().unwrap_or(space.rect),
            ));
        }
        assert_eq!(find_overlap(&rects), None, "layout overlaps: {rects:?}");
    }

    #[test]
    fn push_right_shifts_free_sibling() {
        let index = index(64, [OccupiedSpace::free(id(3), GridRect::new(4, 0, 8, 4))]);
        let request = grow_right(GridRect::new(0, 0, 4, 4), 4);
        let result = ReflowSolver::default().solve(&index, &request);

        assert_eq!(result.resolved, GridRect::new(0, 0, 8, 4));
        assert_eq!(result.reflowed.get(&id(3)), Some(&GridRect::new(8, 0, 12, 4)));
        assert!(result.limit(id(A)).can_horizontal_move);
        assert_no_overlap(&result, &index);
    }

    #[test]
    fn pinned_sibling_blocks() {
        let index = index(64, [pinned(3, GridRect::new(4, 0, 8, 4))]);
        let request = grow_right(GridRect::new(0, 0, 4, 4), 3);
        let result = ReflowSolver::default().solve(&index, &request);

        assert_eq!(result.resolved, GridRect::new(0, 0, 4, 4));
        assert!(result.reflowed.is_empty());
        assert!(!result.limit(id(A)).can_horizontal_move);
        assert!(result.limit(id(A)).can_vertical_move);
    }

    #[test]
    fn sweep_stops_at_last_legal_step() {
        // B can only travel two columns before hitting the right wall.
        let index = index(10, [OccupiedSpace::free(id(3), GridRect::new(4, 0, 8, 4))]);
        let request = grow_right(GridRect::new(0, 0, 4, 4), 5);
        let result = ReflowSolver::default().solve(&index, &request);

        assert_eq!(result.resolved, GridRect::new(0, 0, 6, 4));
        assert_eq!(result.reflowed.get(&id(3)), Some(&GridRect::new(6, 0, 10, 4)));
        assert!(!result.limit(id(A)).can_horizontal_move);
        assert!(!result.limit(id(3)).can_horizontal_move);
        assert_no_overlap(&result, &index);
    }

    #[test]
    fn pushes_cascade_through_neighbours() {
        let index = index(
            64,
            [
                OccupiedSpace::free(id(3), GridRect::new(4, 0, 8, 4)),
                OccupiedSpace::free(id(4), GridRect::new(8, 2, 12, 6)),
                OccupiedSpace::free(id(5), GridRect::new(20, 0, 24, 4)),
            ],
        );
        let request = grow_right(GridRect::new(0, 0, 4, 4), 2);
        let result = ReflowSolver::default().solve(&index, &request);

        assert_eq!(result.reflowed.get(&id(3)), Some(&GridRect::new(6, 0, 10, 4)));
        assert_eq!(result.reflowed.get(&id(4)), Some(&GridRect::new(10, 2, 14, 6)));
        assert!(!result.reflowed.contains_key(&id(5)));
        assert_no_overlap(&result, &index);
    }

    #[test]
    fn compress_stops_at_minimum() {
        let fill = OccupiedSpace {
            min_columns: 2,
            horizontal: AxisReflow::Compress,
            ..OccupiedSpace::free(id(3), GridRect::new(4, 0, 12, 4))
        };
        let index = index(12, [fill]);
        let solver = ReflowSolver::default();

        let result = solver.solve(&index, &grow_right(GridRect::new(0, 0, 4, 4), 4));
        assert_eq!(result.resolved, GridRect::new(0, 0, 8, 4));
        assert_eq!(result.reflowed.get(&id(3)), Some(&GridRect::new(8, 0, 12, 4)));

        let result = solver.solve(&index, &grow_right(GridRect::new(0, 0, 4, 4), 7));
        assert_eq!(result.resolved, GridRect::new(0, 0, 10, 4));
        assert_eq!(result.reflowed.get(&id(3)), Some(&GridRect::new(10, 0, 12, 4)));
        assert!(!result.limit(id(A)).can_horizontal_move);
        assert!(!result.limit(id(3)).can_horizontal_move);
    }

    #[test]
    fn left_edge_pushes_leftward() {
        let index = index(64, [OccupiedSpace::free(id(3), GridRect::new(2, 0, 6, 4))]);
        let origin = GridRect::new(8, 0, 12, 4);
        let request = ReflowRequest::new(
            id(A),
            origin,
            GridRect::new(5, 0, 12, 4),
            ReflowDirection::Left,
        );
        let result = ReflowSolver::default().solve(&index, &request);
        assert_eq!(result.resolved, GridRect::new(5, 0, 12, 4));
        assert_eq!(result.reflowed.get(&id(3)), Some(&GridRect::new(1, 0, 5, 4)));
    }

    #[test]
    fn bottom_pushes_down_and_tracks_bottom_row() {
        let index = index(64, [OccupiedSpace::free(id(3), GridRect::new(1, 10, 5, 14))]);
        let origin = GridRect::new(0, 0, 4, 10);
        let request = ReflowRequest::new(
            id(A),
            origin,
            GridRect::new(0, 0, 4, 15),
            ReflowDirection::Bottom,
        );
        let result = ReflowSolver::default().solve(&index, &request);
        assert_eq!(result.resolved, GridRect::new(0, 0, 4, 15));
        assert_eq!(result.reflowed.get(&id(3)), Some(&GridRect::new(1, 15, 5, 19)));
        assert_eq!(result.bottom_most_row, 19);
        assert!(result.limit(id(A)).can_vertical_move);
    }

    #[test]
    fn uncoupled_corner_moves_free_axis() {
        let index = index(64, [pinned(3, GridRect::new(4, 0, 8, 4))]);
        let origin = GridRect::new(0, 0, 4, 4);
        let request = ReflowRequest::new(
            id(A),
            origin,
            GridRect::new(0, 0, 6, 8),
            ReflowDirection::BottomRight,
        );
        let result = ReflowSolver::default().solve(&index, &request);
        assert_eq!(result.resolved, GridRect::new(0, 0, 4, 8));
        let limit = result.limit(id(A));
        assert!(!limit.can_horizontal_move);
        assert!(limit.can_vertical_move);
    }

    #[test]
    fn coupled_corner_applies_stricter_axis() {
        let index = index(64, [pinned(3, GridRect::new(6, 0, 8, 4))]);
        let origin = GridRect::new(2, 0, 4, 4);
        let request = ReflowRequest::new(
            id(A),
            origin,
            GridRect::new(0, 0, 7, 8),
            ReflowDirection::BottomRight,
        )
        .coupled(true);
        let result = ReflowSolver::default().solve(&index, &request);
        // Two steps fit before the right edge meets the pinned sibling.
        assert_eq!(result.resolved, GridRect::new(0, 0, 6, 6));
        assert_eq!(result.limit(id(A)), MovementLimit::BLOCKED);
    }

    #[test]
    fn below_minimum_is_rejected() {
        let index = index(64, Vec::<OccupiedSpace>::new());
        let origin = GridRect::new(0, 0, 4, 4);
        let request = ReflowRequest::new(
            id(A),
            origin,
            GridRect::new(0, 0, 1, 4),
            ReflowDirection::Right,
        )
        .min_size(2, 1);
        let result = ReflowSolver::default().solve(&index, &request);
        assert_eq!(result.resolved, origin);
        assert_eq!(result.limit(id(A)), MovementLimit::BLOCKED);
    }

    #[test]
    fn candidate_is_clamped_to_walls() {
        let index = index(16, Vec::<OccupiedSpace>::new());
        let request = grow_right(GridRect::new(10, 0, 14, 4), 10);
        let result = ReflowSolver::default().solve(&index, &request);
        assert_eq!(result.resolved, GridRect::new(10, 0, 16, 4));
    }

    #[test]
    fn unrequested_axis_is_ignored() {
        let index = index(64, Vec::<OccupiedSpace>::new());
        let origin = GridRect::new(0, 0, 4, 4);
        let request = ReflowRequest::new(
            id(A),
            origin,
            GridRect::new(0, 0, 6, 9),
            ReflowDirection::Right,
        );
        let result = ReflowSolver::default().solve(&index, &request);
        assert_eq!(result.resolved, GridRect::new(0, 0, 6, 4));
    }

    #[test]
    fn solving_is_deterministic() {
        let index = index(
            32,
            [
                OccupiedSpace::free(id(3), GridRect::new(4, 0, 8, 4)),
                OccupiedSpace::free(id(4), GridRect::new(8, 0, 12, 4)),
                pinned(5, GridRect::new(20, 0, 22, 4)),
            ],
        );
        let request = grow_right(GridRect::new(0, 0, 4, 4), 12);
        let solver = ReflowSolver::default();
        let first = solver.solve(&index, &request);
        let second = solver.solve(&index, &request);
        assert_eq!(first, second);
        assert_eq!(first.reflowed_sorted(), second.reflowed_sorted());
        assert_no_overlap(&first, &index);
    }

    #[test]
    fn pass_budget_blocks_runaway_cascades() {
        let spaces = (0..8).map(|n| {
            let left = 4 + n * 2;
            OccupiedSpace::free(id(3 + n as u64), GridRect::new(left, 0, left + 2, 4))
        });
        let index = index(64, spaces);
        let request = grow_right(GridRect::new(0, 0, 4, 4), 1);
        let tight = ReflowSolver::new(16, 3).solve(&index, &request);
        assert_eq!(tight.resolved, GridRect::new(0, 0, 4, 4));
        let roomy = ReflowSolver::default().solve(&index, &request);
        assert_eq!(roomy.resolved, GridRect::new(0, 0, 5, 4));
        assert_eq!(roomy.reflowed.len(), 8);
    }

    #[test]
    fn reflowed_space_reports_pixel_overrides() {
        let index = index(64, [OccupiedSpace::free(id(3), GridRect::new(4, 0, 8, 4))]);
        let request = grow_right(GridRect::new(0, 0, 4, 4), 4);
        let result = ReflowSolver::default().solve(&index, &request);
        let spacing = GridSpacing::new(10.0, 10.0).expect("spacing");
        let map = result.reflowed_space_map(&index, spacing);
        let moved = map.get(&id(3)).expect("moved sibling");
        assert_eq!(moved.x, Some(40.0));
        assert_eq!(moved.width, None);
        assert_eq!(moved.y, None);
        assert!(!moved.is_empty());
    }
}
