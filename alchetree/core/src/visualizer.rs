//! Visualizer - The Orchestration Core
//!
//! The Visualizer owns the full pipeline for one render surface: it runs
//! searches through the backend seam, normalizes results, lays out the
//! selected tree, and drives (or cancels) the playback session. It is
//! UI-agnostic: the surrounding shell calls the methods here and renders
//! whatever the [`RenderSurface`] receives.
//!
//! # Failure Containment
//!
//! - Backend call failures become transient notifications; the prior
//!   visualization state is untouched.
//! - Render failures are caught at the `visualize` entry point: the surface
//!   is cleared and replaced with a visible inline error. Nothing propagates
//!   to the host application.
//! - Remote stream trouble is the playback driver's business; it surfaces
//!   here only as the read-only advisory.

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::backend::SearchBackend;
use crate::catalog::ElementData;
use crate::config::EngineConfig;
use crate::error::{RenderError, VizError};
use crate::layout::LayoutEngine;
use crate::messages::NotifyLevel;
use crate::playback::{AnimationState, PlaybackPhase, PlaybackSession, RevealSource};
use crate::sequence::Algorithm;
use crate::stream::StreamConnector;
use crate::surface::RenderSurface;
use crate::tree::{IngredientNode, NodeId, PositionedTree, TreeNormalizer};

/// The currently displayed tree
struct CurrentTree {
    positioned: Arc<PositionedTree>,
    index: usize,
}

/// Orchestrates search, normalization, layout, and playback for one surface
pub struct Visualizer<B: SearchBackend> {
    config: EngineConfig,
    backend: Arc<B>,
    surface: Arc<dyn RenderSurface>,
    connector: Option<Arc<dyn StreamConnector>>,
    normalizer: TreeNormalizer,
    layout: LayoutEngine,
    catalog: Vec<ElementData>,
    trees: Vec<IngredientNode>,
    last_target: String,
    last_algorithm: Algorithm,
    current: Option<CurrentTree>,
    session: Option<PlaybackSession>,
    state: Arc<RwLock<AnimationState>>,
}

impl<B: SearchBackend + 'static> Visualizer<B> {
    /// Create a visualizer for a backend and surface
    pub fn new(backend: B, surface: Arc<dyn RenderSurface>, config: EngineConfig) -> Self {
        let layout = LayoutEngine::with_config(config.layout);
        Self {
            config,
            backend: Arc::new(backend),
            surface,
            connector: None,
            normalizer: TreeNormalizer::new(),
            layout,
            catalog: Vec::new(),
            trees: Vec::new(),
            last_target: String::new(),
            last_algorithm: Algorithm::Bfs,
            current: None,
            session: None,
            state: Arc::new(RwLock::new(AnimationState::new())),
        }
    }

    /// Attach a remote stream connector
    ///
    /// Only consulted when `remote.enabled` is set in the configuration.
    #[must_use]
    pub fn with_connector(mut self, connector: Arc<dyn StreamConnector>) -> Self {
        self.connector = Some(connector);
        self
    }

    // ========================================================================
    // Backend operations
    // ========================================================================

    /// Load (or reload) the element catalog
    ///
    /// Returns the catalog size. On failure a transient error notification is
    /// raised and the previously loaded catalog is kept.
    pub async fn load_element_catalog(&mut self) -> usize {
        match self.backend.load_catalog().await {
            Ok(elements) => {
                tracing::info!(count = elements.len(), backend = self.backend.name(), "catalog loaded");
                self.catalog = elements;
            }
            Err(error) => {
                tracing::warn!(%error, "catalog load failed");
                let error = VizError::Backend(format!("catalog load: {error}"));
                self.surface.notify(NotifyLevel::Error, &error.to_string());
            }
        }
        self.catalog.len()
    }

    /// The currently loaded catalog
    #[must_use]
    pub fn catalog(&self) -> &[ElementData] {
        &self.catalog
    }

    /// Search for up to `count` derivations of `target`
    ///
    /// On success the result set is replaced (cancelling any active
    /// animation) and the number of normalized trees is returned. On failure
    /// a transient error notification is raised, the prior result set and
    /// visualization are left untouched, and 0 is returned.
    pub async fn run_search(&mut self, target: &str, algorithm: Algorithm, count: usize) -> usize {
        if target.is_empty() {
            self.surface
                .notify(NotifyLevel::Error, "Please enter a target element");
            return 0;
        }

        match self.backend.run_search(target, algorithm, count).await {
            Ok(raw) => {
                let trees = self.normalizer.normalize(&raw, target);
                tracing::info!(
                    target_element = target,
                    %algorithm,
                    trees = trees.len(),
                    visited = raw.nodes_visited,
                    "search finished"
                );
                // The old result set dies with its animation.
                self.cancel_animation();
                self.current = None;
                self.trees = trees;
                self.last_target = target.to_string();
                self.last_algorithm = algorithm;
                self.trees.len()
            }
            Err(error) => {
                tracing::warn!(%error, target_element = target, "search failed");
                let error = VizError::Backend(format!("search for {target}: {error}"));
                self.surface.notify(NotifyLevel::Error, &error.to_string());
                0
            }
        }
    }

    /// Trees from the last successful search
    #[must_use]
    pub fn trees(&self) -> &[IngredientNode] {
        &self.trees
    }

    // ========================================================================
    // Visualization
    // ========================================================================

    /// Display one tree from the current result set
    ///
    /// Clears the surface, cancels any active run, resets the animation
    /// state, lays the tree out, and either draws it fully (`animate =
    /// false`) or starts the reveal animation.
    ///
    /// # Errors
    ///
    /// Returns [`VizError::NoResult`] / [`VizError::TreeIndex`] for requests
    /// outside the current result set. Render failures never propagate: the
    /// surface is cleared and shows an inline error instead.
    pub fn visualize(&mut self, index: usize, animate: bool) -> Result<(), VizError> {
        if self.trees.is_empty() {
            return Err(VizError::NoResult);
        }
        if index >= self.trees.len() {
            return Err(VizError::TreeIndex {
                index,
                count: self.trees.len(),
            });
        }

        // Tree switch: tear down the previous run entirely.
        self.cancel_animation();
        self.state.write().reset();
        self.surface.clear();

        let mut positioned = PositionedTree::from_ingredient_tree(&self.trees[index]);
        let summary = self.layout.layout(&mut positioned, self.surface.canvas_size());
        tracing::debug!(
            index,
            nodes = positioned.len(),
            pre_repairs = summary.pre_repair.total(),
            post_repairs = summary.post_repair.total(),
            repaired_coordinates = summary.repaired_coordinates,
            "tree laid out"
        );
        self.current = Some(CurrentTree {
            positioned: Arc::new(positioned),
            index,
        });

        if animate {
            self.start_animation();
        } else if let Err(error) = self.draw_static() {
            tracing::error!(%error, "static render failed");
            self.surface.clear();
            self.surface
                .show_message(&format!("Failed to render tree: {error}"));
        }
        Ok(())
    }

    /// Draw the whole current tree at once, nodes first, then links.
    fn draw_static(&self) -> Result<(), RenderError> {
        let Some(current) = &self.current else {
            return Ok(());
        };
        let tree = &current.positioned;
        for node in tree.nodes() {
            self.surface.draw_node(node)?;
        }
        for (source, target) in tree.edges() {
            self.surface.draw_link(tree.node(source), tree.node(target))?;
        }

        // A fully drawn tree is fully "rendered" for the read-only state.
        let mut state = self.state.write();
        state.rendered_nodes = tree.ids().collect();
        state.rendered_links = tree.edges().into_iter().collect();
        state.progress_percent = 100.0;
        Ok(())
    }

    /// Start (or restart) the reveal animation for the current tree
    ///
    /// A no-op with a warning notification when nothing is visualized yet.
    pub fn start_animation(&mut self) {
        let Some(current) = &self.current else {
            self.surface
                .notify(NotifyLevel::Warning, "Nothing to animate - run a search first");
            return;
        };

        // At most one active run: the prior session dies first.
        let positioned = Arc::clone(&current.positioned);
        self.cancel_animation();
        self.surface.clear();

        let mut session = PlaybackSession::new(
            positioned,
            self.last_algorithm,
            self.last_target.clone(),
            self.config.playback,
            Arc::clone(&self.surface),
            Arc::clone(&self.state),
        );
        let connector = if self.config.remote.enabled {
            self.connector.clone()
        } else {
            None
        };
        session.start(connector);
        self.session = Some(session);
    }

    /// Cancel the active animation, clearing every pending reveal
    pub fn cancel_animation(&mut self) {
        if let Some(mut session) = self.session.take() {
            session.cancel();
        }
    }

    /// Set the playback speed multiplier (persists across runs)
    pub fn set_playback_speed(&self, speed: f64) {
        self.state.write().speed = self.config.playback.clamp_speed(speed);
    }

    // ========================================================================
    // Read-only state
    // ========================================================================

    /// Reveal progress of the current run, 0–100
    #[must_use]
    pub fn progress_percent(&self) -> f64 {
        self.state.read().progress_percent
    }

    /// Current non-fatal advisory, if any
    #[must_use]
    pub fn advisory(&self) -> Option<String> {
        self.state.read().advisory.clone()
    }

    /// Identities of currently rendered nodes
    #[must_use]
    pub fn rendered_nodes(&self) -> HashSet<NodeId> {
        self.state.read().rendered_nodes.clone()
    }

    /// Whether a reveal animation is actively running
    #[must_use]
    pub fn is_animating(&self) -> bool {
        self.state.read().phase == PlaybackPhase::Running
    }

    /// Lifecycle phase of the current (or last) run
    #[must_use]
    pub fn animation_phase(&self) -> PlaybackPhase {
        self.state.read().phase
    }

    /// Which side produced the current run's reveals
    #[must_use]
    pub fn active_source(&self) -> RevealSource {
        self.state.read().active_source
    }

    /// The positioned tree currently displayed, if any
    #[must_use]
    pub fn current_tree(&self) -> Option<Arc<PositionedTree>> {
        self.current.as_ref().map(|c| Arc::clone(&c.positioned))
    }

    /// Index of the displayed tree within the result set, if any
    #[must_use]
    pub fn current_index(&self) -> Option<usize> {
        self.current.as_ref().map(|c| c.index)
    }

    /// Shared animation state handle (for shells that poll)
    #[must_use]
    pub fn shared_state(&self) -> Arc<RwLock<AnimationState>> {
        Arc::clone(&self.state)
    }
}
