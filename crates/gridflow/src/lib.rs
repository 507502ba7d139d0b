#![forbid(unsafe_code)]

//! gridflow public facade crate.
//!
//! This crate provides the stable surface area for hosts embedding the
//! resize engine. It re-exports the common types from the internal crates,
//! offers a prelude, and unifies their errors.
//!
//! ```rust,ignore
//! use gridflow::prelude::*;
//!
//! let mut controller = ResizeController::new(widget, ResizeConfig::default());
//! let transition = controller.apply_event(&tree, &ResizeEvent::HandleDown { widget, handle });
//! for action in &transition.actions {
//!     host.dispatch(action);
//! }
//! ```

pub mod error;

pub use error::{Error, RecoveryAction, Result};

// --- Core re-exports -------------------------------------------------------

pub use gridflow_core::{
    CancelReason, DimensionMap, FlexLayer, GridRect, GridSpacing, HandleSet, LayerAlignment,
    ReflowDirection, ResizeEvent, ResizeHandle, ResponsiveBehavior, SizeLimits, TreeCommit,
    WidgetId, WidgetSnapshot, WidgetTree,
};

// --- Layout re-exports -----------------------------------------------------

pub use gridflow_layout::{
    DimensionUpdate, MovementLimit, PixelOffset, PixelSize, ReflowAction, ReflowedSpace,
    ReflowedSpaceMap, ResizeCommit, ResizeConfig, ResizeController, ResizeNoopReason,
    ResizeOutcome, ResizePhase, ResizeTransition,
};

/// Load and validate a TOML resize configuration.
#[cfg(feature = "config")]
pub fn load_config(path: impl AsRef<std::path::Path>) -> Result<ResizeConfig> {
    let config = ResizeConfig::from_toml_file(path)?;
    Ok(config.validated()?)
}

/// Load a TOML configuration, falling back to defaults when the file is
/// missing or invalid.
#[cfg(feature = "config")]
pub fn load_config_or_default(path: impl AsRef<std::path::Path>) -> ResizeConfig {
    load_config(path).unwrap_or_default()
}

/// Apply a finished gesture's commit to `tree`.
///
/// Returns `Ok(false)` when the transition carries no commit.
pub fn apply_transition(tree: &mut WidgetTree, transition: &ResizeTransition) -> Result<bool> {
    let Some(commit) = transition.commit() else {
        return Ok(false);
    };
    tree.apply_commit(&commit.to_tree_commit())?;
    Ok(true)
}

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        CancelReason, Error, GridRect, ReflowAction, ResizeConfig, ResizeController, ResizeEvent,
        ResizeHandle, ResizeOutcome, ResizeTransition, Result, WidgetId, WidgetSnapshot,
        WidgetTree, apply_transition,
    };

    pub use crate::{core, layout};
}

pub use gridflow_core as core;
pub use gridflow_layout as layout;
