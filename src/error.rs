//! Domain error types for kiln.

use thiserror::Error;

/// Errors raised by descriptor validation, configuration resolution, and
/// build-context preparation. All of these are fatal to the current build
/// step; degraded-but-continuable paths are logged as warnings instead.
#[derive(Debug, Error)]
pub enum KilnError {
    /// Malformed or contradictory descriptor input.
    #[error("validation error: {0}")]
    Validation(String),

    /// A referenced file, catalog entry, or platform entry is missing or
    /// unusable.
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("'{tool}' is not installed, please install the '{package}' package")]
    ToolNotInstalled { tool: String, package: String },

    #[error("command '{command}' failed: {output}")]
    ToolFailed { command: String, output: String },

    /// The broker ran but reported a non-success compose state.
    #[error("cannot create content set: '{reason}'")]
    ComposeFailed { reason: String },

    #[error("http error: {0}")]
    Http(String),

    #[error("unexpected error: {0}")]
    Unexpected(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
