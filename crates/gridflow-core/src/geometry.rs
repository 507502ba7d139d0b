#![forbid(unsafe_code)]

//! Grid geometry primitives.
//!
//! Canvas positions are expressed in whole grid units. A [`GridRect`] stores
//! its four edges directly (`right` and `bottom` are exclusive), which matches
//! how widgets persist their `leftColumn/rightColumn/topRow/bottomRow` fields.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Number of columns spanning a full-width canvas.
pub const DEFAULT_GRID_COLUMNS: i32 = 64;

/// Height of one canvas row in pixels.
pub const DEFAULT_GRID_ROW_HEIGHT: f64 = 10.0;

/// Deepest row a widget edge may reach. Keeps edge arithmetic far from
/// `i32` overflow.
pub const MAX_GRID_ROWS: i32 = 1 << 20;

/// A rectangle on the canvas grid, in grid units.
///
/// Valid rectangles satisfy `right > left` and `bottom > top`; constructors
/// that can fail return [`GeometryError::Inverted`] instead of producing an
/// empty rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct GridRect {
    /// Left edge (inclusive column).
    pub left: i32,
    /// Top edge (inclusive row).
    pub top: i32,
    /// Right edge (exclusive column).
    pub right: i32,
    /// Bottom edge (exclusive row).
    pub bottom: i32,
}

impl GridRect {
    /// Create a rectangle from its edges without validation.
    #[inline]
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Create a rectangle, rejecting zero or negative extents.
    pub fn try_new(left: i32, top: i32, right: i32, bottom: i32) -> Result<Self, GeometryError> {
        let rect = Self::new(left, top, right, bottom);
        rect.validate()?;
        Ok(rect)
    }

    /// Check the `right > left && bottom > top` invariant.
    pub fn validate(&self) -> Result<(), GeometryError> {
        if self.right <= self.left || self.bottom <= self.top {
            return Err(GeometryError::Inverted { rect: *self });
        }
        Ok(())
    }

    /// Width in columns.
    #[inline]
    pub const fn columns(&self) -> i32 {
        self.right - self.left
    }

    /// Height in rows.
    #[inline]
    pub const fn rows(&self) -> i32 {
        self.bottom - self.top
    }

    /// Area in cells.
    #[inline]
    pub const fn area(&self) -> i64 {
        self.columns() as i64 * self.rows() as i64
    }

    /// Whether the rectangle has zero or negative area.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.right <= self.left || self.bottom <= self.top
    }

    /// Whether the two rectangles share a region of non-zero area.
    ///
    /// Edge-touching rectangles do not overlap.
    #[inline]
    pub const fn overlaps(&self, other: &GridRect) -> bool {
        let cols_overlap = self.left < other.right && other.left < self.right;
        let rows_overlap = self.top < other.bottom && other.top < self.bottom;
        cols_overlap && rows_overlap
    }

    /// Compute the intersection with another rectangle, returning `None` if
    /// they do not overlap.
    #[inline]
    pub fn intersection(&self, other: &GridRect) -> Option<GridRect> {
        let left = self.left.max(other.left);
        let top = self.top.max(other.top);
        let right = self.right.min(other.right);
        let bottom = self.bottom.min(other.bottom);

        if left < right && top < bottom {
            Some(GridRect::new(left, top, right, bottom))
        } else {
            None
        }
    }

    /// Smallest rectangle containing both.
    pub fn union(&self, other: &GridRect) -> GridRect {
        GridRect::new(
            self.left.min(other.left),
            self.top.min(other.top),
            self.right.max(other.right),
            self.bottom.max(other.bottom),
        )
    }

    /// Shift the rectangle by whole grid units.
    #[inline]
    #[must_use]
    pub const fn translate(&self, columns: i32, rows: i32) -> GridRect {
        GridRect::new(
            self.left + columns,
            self.top + rows,
            self.right + columns,
            self.bottom + rows,
        )
    }

    /// Copy of `self` with the horizontal span of `other`.
    #[inline]
    #[must_use]
    pub const fn with_horizontal(&self, other: &GridRect) -> GridRect {
        GridRect::new(other.left, self.top, other.right, self.bottom)
    }

    /// Copy of `self` with the vertical span of `other`.
    #[inline]
    #[must_use]
    pub const fn with_vertical(&self, other: &GridRect) -> GridRect {
        GridRect::new(self.left, other.top, self.right, other.bottom)
    }

    /// Whether the rectangle lies inside `[0, columns]` horizontally and
    /// below row 0 vertically.
    #[inline]
    pub const fn within_columns(&self, columns: i32) -> bool {
        self.left >= 0 && self.right <= columns && self.top >= 0
    }
}

impl fmt::Display for GridRect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}..{} x {}..{}]",
            self.left, self.right, self.top, self.bottom
        )
    }
}

/// Pixels-per-grid-unit conversion factors owned by a parent container.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridSpacing {
    column: f64,
    row: f64,
}

impl GridSpacing {
    /// Create spacing factors, rejecting non-finite or non-positive values.
    pub fn new(column: f64, row: f64) -> Result<Self, GeometryError> {
        if !column.is_finite() || column <= 0.0 {
            return Err(GeometryError::InvalidSpacing {
                axis: "column",
                value: column,
            });
        }
        if !row.is_finite() || row <= 0.0 {
            return Err(GeometryError::InvalidSpacing {
                axis: "row",
                value: row,
            });
        }
        Ok(Self { column, row })
    }

    /// Pixels per column.
    #[must_use]
    pub const fn column(&self) -> f64 {
        self.column
    }

    /// Pixels per row.
    #[must_use]
    pub const fn row(&self) -> f64 {
        self.row
    }
}

impl Default for GridSpacing {
    fn default() -> Self {
        Self {
            column: 1.0,
            row: DEFAULT_GRID_ROW_HEIGHT,
        }
    }
}

/// Geometry construction failures.
#[derive(Debug, Clone, PartialEq)]
pub enum GeometryError {
    /// A rectangle had `right <= left` or `bottom <= top`.
    Inverted { rect: GridRect },
    /// Spacing factor was zero, negative, or not finite.
    InvalidSpacing { axis: &'static str, value: f64 },
}

impl fmt::Display for GeometryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inverted { rect } => write!(f, "rectangle {rect} has no area"),
            Self::InvalidSpacing { axis, value } => {
                write!(f, "{axis} spacing must be finite and > 0 (got {value})")
            }
        }
    }
}

impl std::error::Error for GeometryError {}
