#![forbid(unsafe_code)]

//! Tunables for the resize engine.
//!
//! [`ResizeConfig`] can be loaded from TOML or JSON when the `config` feature
//! is enabled:
//!
//! ```toml
//! # gridflow.toml
//! grid_columns = 64
//! mobile = false
//! max_sweep_steps = 256
//! max_reflow_passes = 1024
//! enforce_fill_minimum = true
//! ```
//!
//! ```rust,ignore
//! let config = ResizeConfig::from_toml_file("gridflow.toml")?;
//! ```
//!
//! `ResizeConfig::default()` matches the canvas defaults, so a missing file
//! and an empty file behave the same.

#[cfg(feature = "config")]
use std::path::Path;

use gridflow_core::{DEFAULT_GRID_COLUMNS, DimensionMap};
use serde::{Deserialize, Serialize};

use crate::reflow::{DEFAULT_MAX_REFLOW_PASSES, DEFAULT_MAX_SWEEP_STEPS, ReflowSolver};

/// Resize engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResizeConfig {
    /// Columns of a full-width canvas. Drives the left/right anchor split
    /// and right-wall handle visibility.
    pub grid_columns: i32,

    /// Read and write the mobile position fields.
    pub mobile: bool,

    /// Upper bound on one-unit steps when sweeping toward a blocked
    /// candidate.
    pub max_sweep_steps: u32,

    /// Upper bound on sibling displacements per resolution attempt.
    pub max_reflow_passes: u32,

    /// Refuse layouts that squeeze a fill member below its minimum width.
    pub enforce_fill_minimum: bool,
}

impl Default for ResizeConfig {
    fn default() -> Self {
        Self {
            grid_columns: DEFAULT_GRID_COLUMNS,
            mobile: false,
            max_sweep_steps: DEFAULT_MAX_SWEEP_STEPS,
            max_reflow_passes: DEFAULT_MAX_REFLOW_PASSES,
            enforce_fill_minimum: true,
        }
    }
}

impl ResizeConfig {
    /// Load from a TOML string.
    #[cfg(feature = "config")]
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(ConfigError::Toml)
    }

    /// Load from a TOML file on disk.
    #[cfg(feature = "config")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    #[cfg(feature = "config")]
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(s).map_err(ConfigError::Json)
    }

    /// Load from a JSON file on disk.
    #[cfg(feature = "config")]
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_json_str(&content)
    }

    /// Validate all parameters.
    ///
    /// Returns a list of validation errors. An empty list means the config
    /// is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.grid_columns <= 0 {
            errors.push(format!(
                "grid_columns must be > 0, got {}",
                self.grid_columns
            ));
        }
        if self.max_sweep_steps == 0 {
            errors.push("max_sweep_steps must be > 0".into());
        }
        if self.max_reflow_passes == 0 {
            errors.push("max_reflow_passes must be > 0".into());
        }
        errors
    }

    /// Fail with [`ConfigError::Validation`] unless the config is valid.
    pub fn validated(self) -> Result<Self, ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    /// Active position fields.
    #[must_use]
    pub fn dimension_map(&self) -> DimensionMap {
        if self.mobile {
            DimensionMap::Mobile
        } else {
            DimensionMap::Desktop
        }
    }

    /// Solver with this config's budgets.
    #[must_use]
    pub fn to_solver(&self) -> ReflowSolver {
        ReflowSolver::new(self.max_sweep_steps, self.max_reflow_passes)
    }
}

/// Errors that can occur when loading a resize configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// I/O error reading a file.
    Io(std::io::Error),
    /// TOML parse error.
    #[cfg(feature = "config")]
    Toml(toml::de::Error),
    /// JSON parse error.
    #[cfg(feature = "config")]
    Json(serde_json::Error),
    /// Validation errors.
    Validation(Vec<String>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            #[cfg(feature = "config")]
            Self::Toml(e) => write!(f, "TOML parse error: {e}"),
            #[cfg(feature = "config")]
            Self::Json(e) => write!(f, "JSON parse error: {e}"),
            Self::Validation(errors) => {
                write!(f, "validation errors: {}", errors.join("; "))
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            #[cfg(feature = "config")]
            Self::Toml(e) => Some(e),
            #[cfg(feature = "config")]
            Self::Json(e) => Some(e),
            Self::Validation(_) => None,
        }
    }
}
