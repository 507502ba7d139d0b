#![forbid(unsafe_code)]

//! Pixel/grid conversions and pixel size limits.
//!
//! Conversions snap to whole grid units with round-half-away-from-zero, so
//! `pixel_to_cell_delta(cell_to_pixel_delta(n, s), s) == n` holds for every
//! integer `n` and positive spacing `s`. Repeated drag frames therefore never
//! drift.

use gridflow_core::{DimensionMap, WidgetSnapshot};
use serde::{Deserialize, Serialize};

/// Convert a pixel delta into whole grid units.
///
/// Returns `0` for non-finite input or non-positive spacing.
#[must_use]
pub fn pixel_to_cell_delta(pixels: f64, spacing: f64) -> i32 {
    if !pixels.is_finite() || !spacing.is_finite() || spacing <= 0.0 {
        return 0;
    }
    let cells = (pixels / spacing).round();
    if cells >= f64::from(i32::MAX) {
        return i32::MAX;
    }
    if cells <= f64::from(i32::MIN) {
        return i32::MIN;
    }
    cells as i32
}

/// Convert whole grid units into a pixel delta.
#[inline]
#[must_use]
pub fn cell_to_pixel_delta(cells: i32, spacing: f64) -> f64 {
    f64::from(cells) * spacing
}

/// Pixel size of a widget.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PixelSize {
    pub width: f64,
    pub height: f64,
}

/// Pixel offset of a widget from its committed origin.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PixelOffset {
    pub x: f64,
    pub y: f64,
}

/// Current pixel size of a widget under the given dimension map.
#[must_use]
pub fn widget_pixel_size(widget: &WidgetSnapshot, map: DimensionMap) -> PixelSize {
    let rect = widget.rect_for(map);
    PixelSize {
        width: cell_to_pixel_delta(rect.columns(), widget.parent_column_space),
        height: cell_to_pixel_delta(rect.rows(), widget.parent_row_space),
    }
}

/// Minimum and maximum pixel dimensions of a widget.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MinMaxPixels {
    pub min_width: f64,
    pub max_width: Option<f64>,
    pub min_height: f64,
    pub max_height: Option<f64>,
}

impl MinMaxPixels {
    /// Clamp a width to the limits. The minimum wins if limits conflict.
    #[must_use]
    pub fn clamp_width(&self, width: f64) -> f64 {
        let capped = self.max_width.map_or(width, |max| width.min(max));
        capped.max(self.min_width)
    }

    /// Clamp a height to the limits. The minimum wins if limits conflict.
    #[must_use]
    pub fn clamp_height(&self, height: f64) -> f64 {
        let capped = self.max_height.map_or(height, |max| height.min(max));
        capped.max(self.min_height)
    }
}

/// Derive pixel limits from a widget's declared grid-unit limits.
///
/// `Fill` widgets ignore a declared maximum width. Their maximum is instead
/// `fill_share`, the columns each fill member of the widget's row receives
/// (see [`fill_widgets_length`](crate::fill::fill_widgets_length)); a fill
/// widget outside any row is bounded only by the container walls.
#[must_use]
pub fn min_max_dimensions_in_pixels(
    widget: &WidgetSnapshot,
    fill_share: Option<f64>,
) -> MinMaxPixels {
    let column = widget.parent_column_space;
    let row = widget.parent_row_space;
    let limits = widget.limits;
    let min_width = cell_to_pixel_delta(limits.min_columns, column);

    let max_width = if widget.is_fill() {
        fill_share.map(|share| (share * column).max(min_width))
    } else {
        limits
            .max_columns
            .map(|columns| cell_to_pixel_delta(columns, column))
    };

    MinMaxPixels {
        min_width,
        max_width,
        min_height: cell_to_pixel_delta(limits.min_rows, row),
        max_height: limits.max_rows.map(|rows| cell_to_pixel_delta(rows, row)),
    }
}
