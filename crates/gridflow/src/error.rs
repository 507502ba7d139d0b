#![forbid(unsafe_code)]

//! gridflow error model and local recovery.
//!
//! Every failure the engine can report is recovered locally: the host never
//! has to abort an interaction. [`Error::degradation`] names the recovery
//! that keeps the canvas usable.

use std::fmt;

use gridflow_core::{GeometryError, TreeError};
use gridflow_layout::{ConfigError, ReflowError};

// ── Unified Error ───────────────────────────────────────────────────────

/// Top-level error type for gridflow hosts.
///
/// Each variant wraps a crate-specific error. Use [`Error::degradation`] to
/// determine the appropriate recovery action.
#[derive(Debug)]
pub enum Error {
    /// Invalid rectangle or spacing.
    Geometry(GeometryError),
    /// Tree construction or commit failure.
    Tree(TreeError),
    /// A reflow frame could not be prepared.
    Reflow(ReflowError),
    /// Configuration could not be loaded or validated.
    Config(ConfigError),
}

/// Standard result type for gridflow APIs.
pub type Result<T> = std::result::Result<T, Error>;

// ── Local Recovery ──────────────────────────────────────────────────────

/// What the host should do when an error occurs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryAction {
    /// Clamp the candidate to the nearest legal rectangle and continue.
    ClampCandidate,
    /// Keep the last accepted position on the affected axis for this frame.
    FreezeAxis,
    /// End the gesture without a commit.
    CancelGesture,
    /// Ignore the offending configuration and run with defaults.
    UseDefaults,
}

impl Error {
    /// Determine the local recovery for this error.
    pub fn degradation(&self) -> RecoveryAction {
        match self {
            Self::Geometry(GeometryError::Inverted { .. }) => RecoveryAction::ClampCandidate,
            Self::Geometry(GeometryError::InvalidSpacing { .. }) => RecoveryAction::CancelGesture,

            Self::Tree(TreeError::InvalidLimits { .. }) => RecoveryAction::ClampCandidate,
            Self::Tree(TreeError::Geometry { .. }) => RecoveryAction::ClampCandidate,
            Self::Tree(
                TreeError::ZeroWidgetId
                | TreeError::DuplicateWidget { .. }
                | TreeError::UnknownWidget { .. }
                | TreeError::MissingParent { .. }
                | TreeError::SelfParent { .. },
            ) => RecoveryAction::CancelGesture,

            // A sibling with a broken footprint cannot be pushed.
            Self::Reflow(ReflowError::Geometry { .. }) => RecoveryAction::FreezeAxis,
            Self::Reflow(
                ReflowError::WidgetNotFound { .. }
                | ReflowError::ContainerNotFound { .. }
                | ReflowError::Detached { .. },
            ) => RecoveryAction::CancelGesture,

            Self::Config(_) => RecoveryAction::UseDefaults,
        }
    }

    /// Error type label for tracing fields.
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::Geometry(_) => "geometry",
            Self::Tree(_) => "tree",
            Self::Reflow(_) => "reflow",
            Self::Config(_) => "config",
        }
    }

    /// Whether the active gesture has to end because of this error.
    pub fn ends_gesture(&self) -> bool {
        matches!(self.degradation(), RecoveryAction::CancelGesture)
    }
}

// ── Display ─────────────────────────────────────────────────────────────

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Geometry(err) => write!(f, "geometry: {err}"),
            Self::Tree(err) => write!(f, "tree: {err}"),
            Self::Reflow(err) => write!(f, "reflow: {err}"),
            Self::Config(err) => write!(f, "config: {err}"),
        }
    }
}

impl fmt::Display for RecoveryAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ClampCandidate => write!(f, "clamp_candidate"),
            Self::FreezeAxis => write!(f, "freeze_axis"),
            Self::CancelGesture => write!(f, "cancel_gesture"),
            Self::UseDefaults => write!(f, "use_defaults"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Geometry(err) => Some(err),
            Self::Tree(err) => Some(err),
            Self::Reflow(err) => Some(err),
            Self::Config(err) => Some(err),
        }
    }
}

// ── From conversions ────────────────────────────────────────────────────

impl From<GeometryError> for Error {
    fn from(err: GeometryError) -> Self {
        Self::Geometry(err)
    }
}

impl From<TreeError> for Error {
    fn from(err: TreeError) -> Self {
        Self::Tree(err)
    }
}

impl From<ReflowError> for Error {
    fn from(err: ReflowError) -> Self {
        Self::Reflow(err)
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}
