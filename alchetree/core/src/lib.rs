//! Alchetree Core - Headless Recipe-Tree Visualization Engine
//!
//! This crate renders and animates crafting-recipe derivation trees returned
//! by an external graph-search backend. It is completely independent of any
//! UI framework: surfaces are pure renderers behind the [`RenderSurface`]
//! trait, and the engine can run headless for testing and automation.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                        Render Surfaces                           │
//! │   ┌─────────┐   ┌──────────┐   ┌───────────────────────────────┐ │
//! │   │   SVG   │   │ Terminal │   │   Recording / Headless        │ │
//! │   └────┬────┘   └────┬─────┘   └──────────────┬────────────────┘ │
//! │        └─────────────┴────────────────────────┘                  │
//! │                      RenderSurface (draw_node / draw_link)       │
//! └──────────────────────────────┬───────────────────────────────────┘
//! ┌──────────────────────────────┼───────────────────────────────────┐
//! │                       VISUALIZER CORE                            │
//! │  ┌──────────┐  ┌───────────┐  ┌────────┐  ┌──────────┐          │
//! │  │Normalizer│─▶│ Validator │─▶│ Layout │─▶│ Sequence │          │
//! │  └──────────┘  └───────────┘  └────────┘  └────┬─────┘          │
//! │                                                 ▼                │
//! │  ┌──────────────┐   local / remote   ┌──────────────────┐       │
//! │  │ SearchBackend│                    │ Playback Driver  │◀──────┼─ StreamConnector
//! │  └──────────────┘                    └──────────────────┘       │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Key Types
//!
//! - [`Visualizer`]: the orchestration entry point owning the pipeline
//! - [`IngredientNode`] / [`PositionedTree`]: canonical tree shapes
//! - [`Algorithm`] / [`build_sequence`]: deterministic reveal ordering
//! - [`PlaybackSession`] / [`AnimationState`]: timed, cancellable playback
//! - [`StreamConnector`] / [`StreamMessage`]: the optional remote stream
//! - [`SearchBackend`]: the seam to the external search service
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use alchetree_core::{
//!     Algorithm, EngineConfig, FixtureBackend, RecordingSurface, Visualizer,
//! };
//!
//! #[tokio::main]
//! async fn main() {
//!     let surface = Arc::new(RecordingSurface::new());
//!     let mut viz = Visualizer::new(
//!         FixtureBackend::new(),
//!         surface.clone(),
//!         EngineConfig::default(),
//!     );
//!
//!     viz.run_search("Brick", Algorithm::Bfs, 1).await;
//!     viz.visualize(0, true).unwrap();
//!
//!     while viz.is_animating() {
//!         tokio::time::sleep(std::time::Duration::from_millis(50)).await;
//!     }
//!     println!("revealed {} nodes", viz.rendered_nodes().len());
//! }
//! ```
//!
//! # Module Overview
//!
//! - [`tree`]: raw ingestion, normalization, hierarchy validation
//! - [`layout`]: top-down tree layout with coordinate repair
//! - [`sequence`]: per-algorithm reveal order construction
//! - [`playback`]: the timed reveal scheduler and its state machine
//! - [`stream`]: the optional remote reveal stream
//! - [`surface`]: the render-surface seam and the recording surface
//! - [`backend`]: the search backend seam (HTTP and fixture)
//! - [`visualizer`]: the orchestration core
//! - [`catalog`], [`config`], [`messages`], [`error`]: supporting types

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod backend;
pub mod catalog;
pub mod config;
pub mod error;
pub mod layout;
pub mod messages;
pub mod playback;
pub mod sequence;
pub mod stream;
pub mod surface;
pub mod tree;
pub mod visualizer;

// Re-exports for convenience
pub use backend::{FixtureBackend, HttpSearchBackend, SearchBackend};
pub use catalog::{is_base_element, ElementData, ElementRecipe, BASE_ELEMENTS};
pub use config::{ConfigError, EngineConfig, EngineToml, RemoteConfig};
pub use error::{RenderError, VizError};
pub use layout::{LayoutConfig, LayoutEngine, LayoutSummary};
pub use messages::{NotifyLevel, RevealEvent, StreamLink, StreamMessage, StreamNode};
pub use playback::{
    AnimationState, PlaybackConfig, PlaybackPhase, PlaybackSession, RevealSource, RunId,
};
pub use sequence::{build_sequence, Algorithm};
pub use stream::{ChannelConnector, StreamConnector};
#[cfg(feature = "websocket")]
pub use stream::WebSocketConnector;
pub use surface::{RecordingSurface, RenderSurface, SurfaceOp};
pub use tree::{
    HierarchyValidator, IngredientNode, NodeId, PositionedNode, PositionedTree, RawPathNode,
    RawSearchResult, RawTreeNode, RepairReport, TreeNormalizer,
};
pub use visualizer::Visualizer;
