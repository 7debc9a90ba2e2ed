//! Engine Error Taxonomy
//!
//! Error types for the visualization engine. The guiding rule is that each
//! failure class has a fixed blast radius:
//!
//! - Malformed input degrades to placeholder nodes inside the normalizer and
//!   never crosses the tree-build boundary as an error.
//! - Layout failures are auto-repaired in place and only logged.
//! - Remote stream failures demote the run to local playback and surface as
//!   a non-fatal advisory.
//! - Render failures are caught at the `visualize` entry point and replaced
//!   with an inline error on the surface.
//! - Backend call failures become transient notifications and leave prior
//!   visualization state untouched.

use thiserror::Error;

/// A failure reported by a render surface while drawing.
///
/// Surfaces return this from `draw_node`/`draw_link`; the visualizer catches
/// it at the `visualize` boundary and never lets it reach the host.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("render failure: {0}")]
pub struct RenderError(pub String);

impl RenderError {
    /// Create a render error from any displayable cause
    pub fn new(cause: impl Into<String>) -> Self {
        Self(cause.into())
    }
}

/// Top-level engine error
#[derive(Debug, Error)]
pub enum VizError {
    /// The search backend rejected or failed a request
    #[error("backend request failed: {0}")]
    Backend(String),

    /// The remote reveal stream timed out, errored, or closed unexpectedly
    #[error("remote stream failure: {0}")]
    RemoteStream(String),

    /// A surface draw call failed
    #[error(transparent)]
    Render(#[from] RenderError),

    /// A tree index outside the current result set was requested
    #[error("no tree at index {index} (result set has {count})")]
    TreeIndex {
        /// Requested index
        index: usize,
        /// Number of trees in the current result set
        count: usize,
    },

    /// No search result is loaded yet
    #[error("no search result loaded; run a search before visualizing")]
    NoResult,

    /// Configuration could not be loaded or validated
    #[error("configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
}
