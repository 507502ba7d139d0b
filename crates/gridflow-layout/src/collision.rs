#![forbid(unsafe_code)]

//! Rectangle collision queries against an occupied-space index.

use gridflow_core::{GridRect, WidgetId};

use crate::occupied::{OccupiedSpace, OccupiedSpaceIndex};

/// Whether `candidate` overlaps any indexed space other than `exclude`.
///
/// Spaces that only touch the candidate along an edge do not count.
#[must_use]
pub fn is_occupied(candidate: &GridRect, exclude: WidgetId, index: &OccupiedSpaceIndex) -> bool {
    first_collision(candidate, exclude, index).is_some()
}

/// The lowest-ID space overlapping `candidate`, skipping `exclude`.
#[must_use]
pub fn first_collision<'a>(
    candidate: &GridRect,
    exclude: WidgetId,
    index: &'a OccupiedSpaceIndex,
) -> Option<&'a OccupiedSpace> {
    index
        .iter()
        .find(|space| space.id != exclude && candidate.overlaps(&space.rect))
}

/// First pair of overlapping rectangles in `rects`, if any.
///
/// Quadratic; meant for layout sanity checks, not the per-frame path.
#[must_use]
pub fn find_overlap(rects: &[(WidgetId, GridRect)]) -> Option<(WidgetId, WidgetId)> {
    for (i, (a_id, a)) in rects.iter().enumerate() {
        for (b_id, b) in &rects[i + 1..] {
            if a.overlaps(b) {
                return Some((*a_id, *b_id));
            }
        }
    }
    None
}
