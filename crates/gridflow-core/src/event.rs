#![forbid(unsafe_code)]

//! Canonical resize-gesture input types.
//!
//! Drag handles report cumulative pixel deltas measured from the pointer-down
//! position, never per-frame increments, so replaying the last event alone
//! reproduces the frame.

use serde::{Deserialize, Serialize};

use crate::widget::{HandleSet, WidgetId};

/// Edge or corner being moved by a resize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReflowDirection {
    Left,
    Right,
    Bottom,
    BottomLeft,
    BottomRight,
    #[default]
    Unset,
}

impl ReflowDirection {
    /// Whether horizontal bounds may change.
    #[must_use]
    pub const fn is_horizontal(self) -> bool {
        matches!(
            self,
            Self::Left | Self::Right | Self::BottomLeft | Self::BottomRight
        )
    }

    /// Whether vertical bounds may change.
    #[must_use]
    pub const fn is_vertical(self) -> bool {
        matches!(self, Self::Bottom | Self::BottomLeft | Self::BottomRight)
    }

    /// Corner directions couple both axes.
    #[must_use]
    pub const fn is_corner(self) -> bool {
        matches!(self, Self::BottomLeft | Self::BottomRight)
    }
}

/// A grab handle on the widget's resize frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResizeHandle {
    Left,
    Right,
    Bottom,
    BottomLeft,
    BottomRight,
}

impl ResizeHandle {
    /// All handles in rendering order.
    pub const ALL: [Self; 5] = [
        Self::Left,
        Self::Right,
        Self::Bottom,
        Self::BottomRight,
        Self::BottomLeft,
    ];

    /// Reflow direction driven by this handle.
    #[must_use]
    pub const fn direction(self) -> ReflowDirection {
        match self {
            Self::Left => ReflowDirection::Left,
            Self::Right => ReflowDirection::Right,
            Self::Bottom => ReflowDirection::Bottom,
            Self::BottomLeft => ReflowDirection::BottomLeft,
            Self::BottomRight => ReflowDirection::BottomRight,
        }
    }

    /// Flag for this handle in a [`HandleSet`].
    #[must_use]
    pub const fn flag(self) -> HandleSet {
        match self {
            Self::Left => HandleSet::LEFT,
            Self::Right => HandleSet::RIGHT,
            Self::Bottom => HandleSet::BOTTOM,
            Self::BottomLeft => HandleSet::BOTTOM_LEFT,
            Self::BottomRight => HandleSet::BOTTOM_RIGHT,
        }
    }

    /// Corner handles change the width as well as the height.
    #[must_use]
    pub const fn is_corner(self) -> bool {
        matches!(self, Self::BottomLeft | Self::BottomRight)
    }

    /// Whether dragging this handle changes the width.
    #[must_use]
    pub const fn affects_width(self) -> bool {
        !matches!(self, Self::Bottom)
    }

    /// Whether dragging this handle changes the height.
    #[must_use]
    pub const fn affects_height(self) -> bool {
        matches!(self, Self::Bottom | Self::BottomLeft | Self::BottomRight)
    }

    /// Whether the handle sits on the left side of the frame.
    #[must_use]
    pub const fn is_left_side(self) -> bool {
        matches!(self, Self::Left | Self::BottomLeft)
    }
}

/// Why an in-flight gesture was abandoned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CancelReason {
    /// The widget disappeared from the authoritative tree.
    WidgetRemoved,
    /// The pointer capture was lost (blur, escape, focus change).
    PointerCaptureLost,
    /// Host code aborted the gesture.
    Programmatic,
}

/// One pointer-level input for the resize controller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResizeEvent {
    /// Pointer pressed on a handle.
    HandleDown {
        widget: WidgetId,
        handle: ResizeHandle,
    },
    /// Pointer moved; `x`/`y` are cumulative pixels since the press.
    Drag { x: f64, y: f64 },
    /// Pointer released.
    HandleUp,
    /// The gesture must be abandoned without a commit.
    Cancel { reason: CancelReason },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handle_axes() {
        assert!(ResizeHandle::Left.affects_width());
        assert!(!ResizeHandle::Left.affects_height());
        assert!(ResizeHandle::Bottom.affects_height());
        assert!(!ResizeHandle::Bottom.affects_width());
        assert!(ResizeHandle::BottomLeft.affects_width());
        assert!(ResizeHandle::BottomLeft.affects_height());
        assert!(ResizeHandle::BottomLeft.is_left_side());
        assert!(!ResizeHandle::BottomRight.is_left_side());
    }

    #[test]
    fn direction_axes() {
        assert!(ReflowDirection::Left.is_horizontal());
        assert!(!ReflowDirection::Left.is_vertical());
        assert!(ReflowDirection::Bottom.is_vertical());
        assert!(ReflowDirection::BottomRight.is_corner());
        assert!(!ReflowDirection::Unset.is_horizontal());
        assert!(!ReflowDirection::Unset.is_vertical());
    }

    #[test]
    fn handle_flags_are_distinct() {
        let mut seen = HandleSet::empty();
        for handle in ResizeHandle::ALL {
            assert!(!seen.contains(handle.flag()));
            seen |= handle.flag();
        }
        assert_eq!(seen, HandleSet::all());
    }

    #[test]
    fn event_serializes_with_kind_tag() {
        let event = ResizeEvent::Drag { x: 12.0, y: -3.5 };
        let json = serde_json::to_string(&event).expect("serialize");
        assert!(json.contains("\"kind\":\"drag\""));
        let back: ResizeEvent = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, event);
    }
}
