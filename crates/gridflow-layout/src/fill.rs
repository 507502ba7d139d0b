#![forbid(unsafe_code)]

//! Fill-width redistribution inside one auto-layout row.
//!
//! Fixed-width members keep their column span; the columns left over are
//! split evenly across the `Fill` members. When a member of the row is
//! resized, the fill members absorb the change so the row always spans the
//! container exactly.
//!
//! Whole columns are handed out left to right: with `r` columns left over
//! after an even split, the first `r` fill members get one extra column.
//! Members are then packed from column 0 in row order.

use gridflow_core::{DimensionMap, FlexLayer, GridRect, WidgetId, WidgetTree};
use serde::{Deserialize, Serialize};

use crate::grid::cell_to_pixel_delta;
use crate::reflow::{ReflowedSpace, ReflowedSpaceMap};

/// One member of an auto-layout row as seen by the redistribution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayerMember {
    pub id: WidgetId,
    /// Committed left edge.
    pub left: i32,
    /// Column span, using the in-flight rectangle for the resizing widget.
    pub columns: i32,
    pub fill: bool,
    pub min_columns: i32,
}

impl LayerMember {
    #[must_use]
    pub fn fixed(id: WidgetId, columns: i32) -> Self {
        Self {
            id,
            left: 0,
            columns,
            fill: false,
            min_columns: 1,
        }
    }

    #[must_use]
    pub fn fill(id: WidgetId, columns: i32, min_columns: i32) -> Self {
        Self {
            id,
            left: 0,
            columns,
            fill: true,
            min_columns,
        }
    }

    /// Place the member's committed left edge at `left`.
    #[must_use]
    pub fn at(mut self, left: i32) -> Self {
        self.left = left;
        self
    }
}

/// Horizontal span a member occupies after redistribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerSlot {
    pub id: WidgetId,
    pub left: i32,
    pub right: i32,
}

impl LayerSlot {
    #[must_use]
    pub const fn columns(&self) -> i32 {
        self.right - self.left
    }

    /// `rect` moved onto this slot's horizontal span.
    #[must_use]
    pub const fn place(&self, rect: GridRect) -> GridRect {
        GridRect::new(self.left, rect.top, self.right, rect.bottom)
    }
}

/// Outcome of redistributing one row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FillRedistribution {
    /// Columns given to each fill member; `None` when the row has none.
    pub fill_columns: Option<f64>,
    /// Packed spans of every member in row order. Empty when the row has no
    /// fill members or the split is infeasible.
    pub slots: Vec<LayerSlot>,
    /// Pixel overrides for members whose span changes.
    pub corrections: ReflowedSpaceMap,
    /// Whether every fill member keeps at least one column and, when
    /// enforced, its minimum.
    pub feasible: bool,
}

impl FillRedistribution {
    /// Whether the resizing widget may keep its new width.
    #[must_use]
    pub fn can_horizontal_move(&self) -> bool {
        self.feasible
    }

    /// Slot assigned to `id`.
    #[must_use]
    pub fn slot(&self, id: WidgetId) -> Option<&LayerSlot> {
        self.slots.iter().find(|slot| slot.id == id)
    }
}

/// Columns each fill member receives, or `None` if the row has no fill
/// members.
#[must_use]
pub fn fill_widgets_length(available_columns: i32, members: &[LayerMember]) -> Option<f64> {
    let fill_count = members.iter().filter(|member| member.fill).count();
    if fill_count == 0 {
        return None;
    }
    let fixed: i64 = members
        .iter()
        .filter(|member| !member.fill)
        .map(|member| i64::from(member.columns))
        .sum();
    let remaining = i64::from(available_columns) - fixed;
    Some(remaining as f64 / fill_count as f64)
}

/// Split the row's remaining columns across its fill members.
///
/// `enforce_minimum` rejects layouts that would squeeze a fill member below
/// its declared minimum.
#[must_use]
pub fn redistribute(
    members: &[LayerMember],
    available_columns: i32,
    column_space: f64,
    enforce_minimum: bool,
) -> FillRedistribution {
    let Some(fill_columns) = fill_widgets_length(available_columns, members) else {
        return FillRedistribution {
            fill_columns: None,
            slots: Vec::new(),
            corrections: ReflowedSpaceMap::default(),
            feasible: true,
        };
    };

    let shares = fill_shares(available_columns, members);
    let feasible = members
        .iter()
        .filter(|member| member.fill)
        .zip(&shares)
        .all(|(member, &share)| share >= 1 && (!enforce_minimum || share >= member.min_columns));
    if !feasible {
        return FillRedistribution {
            fill_columns: Some(fill_columns),
            slots: Vec::new(),
            corrections: ReflowedSpaceMap::default(),
            feasible,
        };
    }

    let mut slots = Vec::with_capacity(members.len());
    let mut shares = shares.into_iter();
    let mut cursor = 0;
    for member in members {
        let columns = if member.fill {
            shares.next().unwrap_or(member.columns)
        } else {
            member.columns
        };
        slots.push(LayerSlot {
            id: member.id,
            left: cursor,
            right: cursor + columns,
        });
        cursor += columns;
    }

    let corrections = members
        .iter()
        .zip(&slots)
        .filter_map(|(member, slot)| {
            let space = ReflowedSpace {
                width: (slot.columns() != member.columns)
                    .then(|| cell_to_pixel_delta(slot.columns(), column_space)),
                x: (slot.left != member.left)
                    .then(|| cell_to_pixel_delta(slot.left - member.left, column_space)),
                ..ReflowedSpace::default()
            };
            (!space.is_empty()).then_some((member.id, space))
        })
        .collect();

    FillRedistribution {
        fill_columns: Some(fill_columns),
        slots,
        corrections,
        feasible,
    }
}

/// Whole-column share of each fill member, in row order.
fn fill_shares(available_columns: i32, members: &[LayerMember]) -> Vec<i32> {
    let count = members.iter().filter(|member| member.fill).count();
    let fixed: i64 = members
        .iter()
        .filter(|member| !member.fill)
        .map(|member| i64::from(member.columns))
        .sum();
    let remaining = i64::from(available_columns) - fixed;
    let count = i64::try_from(count).unwrap_or(i64::MAX).max(1);
    let base = remaining.div_euclid(count);
    let extra = remaining.rem_euclid(count);
    (0..count)
        .map(|index| {
            let share = base + i64::from(index < extra);
            i32::try_from(share).unwrap_or(0)
        })
        .collect()
}

/// Collect the members of `layer`, substituting `resized` for `resizing`.
///
/// Members missing from the tree are skipped.
#[must_use]
pub fn layer_members(
    tree: &WidgetTree,
    layer: &FlexLayer,
    resizing: WidgetId,
    resized: GridRect,
    map: DimensionMap,
) -> Vec<LayerMember> {
    layer
        .children
        .iter()
        .filter_map(|child| {
            let widget = tree.get(child.id)?;
            let committed = widget.rect_for(map);
            let rect = if child.id == resizing {
                resized
            } else {
                committed
            };
            Some(LayerMember {
                id: child.id,
                left: committed.left,
                columns: rect.columns(),
                fill: widget.is_fill(),
                min_columns: widget.limits.min_columns,
            })
        })
        .collect()
}
