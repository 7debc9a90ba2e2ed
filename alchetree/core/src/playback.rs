//! Playback Driver
//!
//! Schedules reveal events over time for one tree + algorithm pair. A
//! [`PlaybackSession`] owns the whole run: the scheduler task, the shared
//! [`AnimationState`], and (when remote-driven) the stream receiver. It is
//! constructed fresh per run and disposed deterministically; there is no
//! ambient timer or socket state.
//!
//! # State machine
//!
//! `Idle → Running → (Completed | Cancelled)`. Starting a session while a
//! prior run is active fully cancels the prior run before anything new is
//! scheduled: at most one active run per tree, and the render surface has
//! exactly one writer.
//!
//! # Ordering and cancellation
//!
//! All reveals run on one logical timeline (a single spawned task); the only
//! suspension points are the per-event delays. Node reveals and their surface
//! draws happen in one critical section under the state lock, and
//! cancellation flips the phase under that same lock before aborting the
//! task, so no reveal can fire after `cancel` returns. Dropping the stream
//! receiver closes the remote channel.
//!
//! Links render only once both endpoints are rendered: retried after every
//! reveal and in one final reconciliation sweep over the tree's edges, which
//! also guarantees that at completion every non-root rendered node has at
//! least one rendered link.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::StreamExt;
use uuid::Uuid;

use crate::error::VizError;
use crate::messages::{NotifyLevel, RevealEvent, StreamMessage};
use crate::sequence::{build_sequence, Algorithm};
use crate::stream::StreamConnector;
use crate::surface::RenderSurface;
use crate::tree::{NodeId, PositionedTree};

// ============================================================================
// Configuration
// ============================================================================

/// Pacing configuration for the playback driver
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlaybackConfig {
    /// Base per-step delay for BFS playback
    pub bfs_step: Duration,
    /// Base per-step delay for DFS playback (paced more deliberately)
    pub dfs_step: Duration,
    /// Base per-step delay for bidirectional playback
    pub bidirectional_step: Duration,
    /// Lower bound for the playback speed multiplier
    pub min_speed: f64,
    /// Upper bound for the playback speed multiplier
    pub max_speed: f64,
    /// How long a remote connect attempt may take before local fallback
    pub remote_connect_timeout: Duration,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            bfs_step: Duration::from_millis(350),
            dfs_step: Duration::from_millis(600),
            bidirectional_step: Duration::from_millis(350),
            min_speed: 0.1,
            max_speed: 8.0,
            remote_connect_timeout: Duration::from_millis(3000),
        }
    }
}

impl PlaybackConfig {
    /// Base per-step delay for an algorithm
    #[must_use]
    pub fn step_for(&self, algorithm: Algorithm) -> Duration {
        match algorithm {
            Algorithm::Bfs => self.bfs_step,
            Algorithm::Dfs => self.dfs_step,
            Algorithm::Bidirectional => self.bidirectional_step,
        }
    }

    /// Clamp a requested speed multiplier into the configured bounds
    #[must_use]
    pub fn clamp_speed(&self, speed: f64) -> f64 {
        if !speed.is_finite() {
            return 1.0;
        }
        speed.clamp(self.min_speed, self.max_speed)
    }
}

// ============================================================================
// Animation State
// ============================================================================

/// Identifier of one playback run
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(Uuid);

impl RunId {
    /// Generate a fresh run id
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which side is producing reveal events
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RevealSource {
    /// Locally recomputed heuristic order
    #[default]
    Local,
    /// Backend-pushed event stream
    Remote,
}

/// Lifecycle phase of a playback run
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackPhase {
    /// No run scheduled yet
    #[default]
    Idle,
    /// Reveals are being scheduled
    Running,
    /// The full sequence was revealed
    Completed,
    /// The run was cancelled before completion
    Cancelled,
}

impl PlaybackPhase {
    /// Whether the run has ended (normally or not)
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

/// Shared, observable state of the current animation
#[derive(Clone, Debug)]
pub struct AnimationState {
    /// Identities of nodes currently rendered
    pub rendered_nodes: HashSet<NodeId>,
    /// Rendered links as (parent, child) identity pairs
    pub rendered_links: HashSet<(NodeId, NodeId)>,
    /// Reveal progress, 0–100
    pub progress_percent: f64,
    /// Whether a run is actively scheduling reveals
    pub is_running: bool,
    /// Which side is producing reveal events
    pub active_source: RevealSource,
    /// Lifecycle phase of the run
    pub phase: PlaybackPhase,
    /// Playback speed multiplier (persists across runs)
    pub speed: f64,
    /// Current non-fatal advisory, if any
    pub advisory: Option<String>,
}

impl AnimationState {
    /// Fresh idle state at normal speed
    #[must_use]
    pub fn new() -> Self {
        Self {
            rendered_nodes: HashSet::new(),
            rendered_links: HashSet::new(),
            progress_percent: 0.0,
            is_running: false,
            active_source: RevealSource::Local,
            phase: PlaybackPhase::Idle,
            speed: 1.0,
            advisory: None,
        }
    }

    /// Reset for a new run, keeping the user-chosen speed
    pub fn reset(&mut self) {
        let speed = self.speed;
        *self = Self::new();
        self.speed = speed;
    }
}

impl Default for AnimationState {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Playback Session
// ============================================================================

/// One playback run over one positioned tree
///
/// Owns the scheduler task handle; dropping the session cancels the run.
pub struct PlaybackSession {
    run_id: RunId,
    algorithm: Algorithm,
    target: String,
    tree: Arc<PositionedTree>,
    sequence: Arc<Vec<NodeId>>,
    config: PlaybackConfig,
    state: Arc<RwLock<AnimationState>>,
    surface: Arc<dyn RenderSurface>,
    handle: Option<JoinHandle<()>>,
}

impl PlaybackSession {
    /// Create a session for a tree; the reveal sequence is built immediately
    pub fn new(
        tree: Arc<PositionedTree>,
        algorithm: Algorithm,
        target: impl Into<String>,
        config: PlaybackConfig,
        surface: Arc<dyn RenderSurface>,
        state: Arc<RwLock<AnimationState>>,
    ) -> Self {
        let sequence = Arc::new(build_sequence(&tree, algorithm));
        Self {
            run_id: RunId::new(),
            algorithm,
            target: target.into(),
            tree,
            sequence,
            config,
            state,
            surface,
            handle: None,
        }
    }

    /// Identifier of this run
    #[must_use]
    pub fn run_id(&self) -> RunId {
        self.run_id
    }

    /// Algorithm whose order this run replays
    #[must_use]
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// The precomputed local reveal sequence
    #[must_use]
    pub fn sequence(&self) -> &[NodeId] {
        &self.sequence
    }

    /// Shared animation state handle
    #[must_use]
    pub fn shared_state(&self) -> Arc<RwLock<AnimationState>> {
        Arc::clone(&self.state)
    }

    /// Whether this run is still scheduling reveals
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.state.read().phase == PlaybackPhase::Running
    }

    /// Current progress, 0–100
    #[must_use]
    pub fn progress_percent(&self) -> f64 {
        self.state.read().progress_percent
    }

    /// Adjust playback speed; takes effect on subsequent steps
    pub fn set_speed(&self, speed: f64) {
        let clamped = self.config.clamp_speed(speed);
        self.state.write().speed = clamped;
        tracing::debug!(run = %self.run_id, speed = clamped, "playback speed set");
    }

    /// Start (or restart) playback
    ///
    /// A prior active run is fully cancelled before anything new is
    /// scheduled. The state is reset, then the driver attempts a
    /// bounded-time remote connection when a connector is supplied,
    /// falling back to local playback otherwise.
    pub fn start(&mut self, connector: Option<Arc<dyn StreamConnector>>) {
        self.cancel();

        {
            let mut state = self.state.write();
            state.reset();
            state.phase = PlaybackPhase::Running;
            state.is_running = true;
        }

        let driver = Driver {
            run_id: self.run_id,
            algorithm: self.algorithm,
            target: self.target.clone(),
            tree: Arc::clone(&self.tree),
            sequence: Arc::clone(&self.sequence),
            config: self.config,
            state: Arc::clone(&self.state),
            surface: Arc::clone(&self.surface),
        };
        tracing::debug!(
            run = %self.run_id,
            algorithm = %self.algorithm,
            nodes = self.sequence.len(),
            "playback started"
        );
        self.handle = Some(tokio::spawn(driver.run(connector)));
    }

    /// Cancel the run and clear every pending scheduled reveal
    ///
    /// Safe to call repeatedly; a completed run stays `Completed`.
    pub fn cancel(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };
        {
            let mut state = self.state.write();
            if !state.phase.is_terminal() {
                state.phase = PlaybackPhase::Cancelled;
                state.is_running = false;
            }
        }
        // Aborting the scheduler task clears pending sleeps and drops the
        // stream receiver, which closes any open remote channel.
        handle.abort();
        tracing::debug!(run = %self.run_id, "playback cancelled");
    }
}

impl Drop for PlaybackSession {
    fn drop(&mut self) {
        self.cancel();
    }
}

// ============================================================================
// Driver
// ============================================================================

/// How a remote-driven run ended
enum RemoteOutcome {
    /// The stream sent `complete`
    Completed,
    /// The stream errored or closed early; local playback takes over
    Failed(String),
    /// The run was cancelled mid-stream
    Interrupted,
}

/// The scheduler task body; all fields are cheap clones of session state
struct Driver {
    run_id: RunId,
    algorithm: Algorithm,
    target: String,
    tree: Arc<PositionedTree>,
    sequence: Arc<Vec<NodeId>>,
    config: PlaybackConfig,
    state: Arc<RwLock<AnimationState>>,
    surface: Arc<dyn RenderSurface>,
}

impl Driver {
    async fn run(self, connector: Option<Arc<dyn StreamConnector>>) {
        let mut remote_completed = false;

        if let Some(connector) = connector {
            match timeout(
                self.config.remote_connect_timeout,
                connector.connect(&self.target, self.algorithm),
            )
            .await
            {
                Ok(Ok(receiver)) => {
                    self.state.write().active_source = RevealSource::Remote;
                    tracing::debug!(run = %self.run_id, connector = connector.name(), "remote stream active");
                    match self.run_remote(receiver).await {
                        RemoteOutcome::Completed => remote_completed = true,
                        RemoteOutcome::Interrupted => return,
                        RemoteOutcome::Failed(reason) => {
                            // One-shot, irreversible handoff to local playback.
                            self.advise(VizError::RemoteStream(reason).to_string());
                            self.state.write().active_source = RevealSource::Local;
                        }
                    }
                }
                Ok(Err(error)) => {
                    self.advise(VizError::RemoteStream(error.to_string()).to_string());
                }
                Err(_elapsed) => {
                    self.advise(
                        VizError::RemoteStream(format!(
                            "connect timed out after {}ms",
                            self.config.remote_connect_timeout.as_millis()
                        ))
                        .to_string(),
                    );
                }
            }
        }

        if !remote_completed {
            if self.state.read().phase != PlaybackPhase::Running {
                return;
            }
            self.run_local().await;
        }

        self.finish();
    }

    /// Replay the locally computed sequence, skipping nodes a remote stream
    /// already revealed before fallback.
    async fn run_local(&self) {
        let total = self.sequence.len().max(1);
        for (index, &id) in self.sequence.iter().enumerate() {
            {
                let state = self.state.read();
                if state.phase != PlaybackPhase::Running {
                    return;
                }
                if state.rendered_nodes.contains(&id) {
                    drop(state);
                    self.set_local_progress(index + 1, total);
                    continue;
                }
            }

            tokio::time::sleep(self.step_delay()).await;

            if !self.reveal_node(id, index) {
                return;
            }
            self.flush_ready_links();
            self.set_local_progress(index + 1, total);
        }
    }

    /// Consume the remote stream, replaying backend-reported steps faithfully.
    async fn run_remote(&self, receiver: mpsc::Receiver<StreamMessage>) -> RemoteOutcome {
        let mut stream = ReceiverStream::new(receiver);
        let mut declared_total: Option<usize> = None;
        let mut received_steps = 0usize;
        let mut pending_links: Vec<(NodeId, NodeId)> = Vec::new();

        while let Some(message) = stream.next().await {
            if self.state.read().phase != PlaybackPhase::Running {
                return RemoteOutcome::Interrupted;
            }
            match message {
                StreamMessage::Metadata { algorithm, element } => {
                    tracing::trace!(run = %self.run_id, %algorithm, %element, "stream metadata");
                }
                StreamMessage::Steps { total_steps } => {
                    declared_total = Some(total_steps.max(1));
                }
                StreamMessage::Node { node, .. } => {
                    received_steps += 1;
                    if let Some(id) = self.resolve_unrendered(&node.name) {
                        if !self.reveal_node(id, received_steps - 1) {
                            return RemoteOutcome::Interrupted;
                        }
                        self.flush_pending_links(&mut pending_links);
                    } else {
                        tracing::trace!(run = %self.run_id, name = %node.name, "stream node has no unrendered match");
                    }
                    self.set_remote_progress(received_steps, declared_total);
                }
                StreamMessage::Link { link, .. } => {
                    received_steps += 1;
                    if let Some(edge) = self.resolve_edge(&link.source, &link.target) {
                        pending_links.push(edge);
                        self.flush_pending_links(&mut pending_links);
                    }
                    self.set_remote_progress(received_steps, declared_total);
                }
                StreamMessage::Error { message } => {
                    return RemoteOutcome::Failed(if message.is_empty() {
                        "backend reported an error".to_string()
                    } else {
                        message
                    });
                }
                StreamMessage::Complete { nodes_visited } => {
                    tracing::debug!(run = %self.run_id, nodes_visited, "stream complete");
                    return RemoteOutcome::Completed;
                }
            }
        }

        RemoteOutcome::Failed("stream closed before completion".to_string())
    }

    /// Reveal one node: state mutation and surface draw form one critical
    /// section under the state lock, so cancellation strictly orders against
    /// it. Returns `false` if the run is no longer running.
    fn reveal_node(&self, id: NodeId, sequence_index: usize) -> bool {
        let mut state = self.state.write();
        if state.phase != PlaybackPhase::Running {
            return false;
        }
        if !state.rendered_nodes.insert(id) {
            return true; // produced once, applied at most once
        }
        let event = RevealEvent::Node { id, sequence_index };
        tracing::trace!(run = %self.run_id, ?event, name = %self.tree.node(id).name, "reveal");
        if let Err(error) = self.surface.draw_node(self.tree.node(id)) {
            tracing::warn!(run = %self.run_id, %error, "node draw failed mid-animation");
        }
        true
    }

    /// Draw every tree edge whose endpoints are rendered but whose link is
    /// not. Used after each local reveal and as the final reconciliation
    /// sweep.
    fn flush_ready_links(&self) {
        let mut state = self.state.write();
        if state.phase != PlaybackPhase::Running {
            return;
        }
        for (source, target) in self.tree.edges() {
            if state.rendered_nodes.contains(&source)
                && state.rendered_nodes.contains(&target)
                && !state.rendered_links.contains(&(source, target))
            {
                self.draw_link(&mut state, source, target);
            }
        }
    }

    /// Draw queued remote links whose endpoints have both been rendered.
    fn flush_pending_links(&self, pending: &mut Vec<(NodeId, NodeId)>) {
        let mut state = self.state.write();
        if state.phase != PlaybackPhase::Running {
            return;
        }
        pending.retain(|&(source, target)| {
            if state.rendered_links.contains(&(source, target)) {
                return false;
            }
            if state.rendered_nodes.contains(&source) && state.rendered_nodes.contains(&target) {
                self.draw_link(&mut state, source, target);
                return false;
            }
            true
        });
    }

    fn draw_link(&self, state: &mut AnimationState, source: NodeId, target: NodeId) {
        let event = RevealEvent::Link {
            source,
            target,
            sequence_index: state.rendered_nodes.len() + state.rendered_links.len(),
        };
        tracing::trace!(run = %self.run_id, ?event, "reveal");
        if let Err(error) = self
            .surface
            .draw_link(self.tree.node(source), self.tree.node(target))
        {
            tracing::warn!(run = %self.run_id, %error, "link draw failed mid-animation");
        }
        state.rendered_links.insert((source, target));
    }

    /// First arena-order node with this name that is not yet rendered.
    fn resolve_unrendered(&self, name: &str) -> Option<NodeId> {
        let state = self.state.read();
        self.tree
            .nodes()
            .find(|n| n.name == name && !state.rendered_nodes.contains(&n.id))
            .map(|n| n.id)
    }

    /// First tree edge matching the named endpoints with no rendered link.
    fn resolve_edge(&self, source: &str, target: &str) -> Option<(NodeId, NodeId)> {
        let state = self.state.read();
        self.tree.edges().into_iter().find(|&(s, t)| {
            self.tree.node(s).name == source
                && self.tree.node(t).name == target
                && !state.rendered_links.contains(&(s, t))
        })
    }

    fn step_delay(&self) -> Duration {
        let speed = {
            let state = self.state.read();
            self.config.clamp_speed(state.speed)
        };
        let base = self.config.step_for(self.algorithm);
        Duration::from_secs_f64(base.as_secs_f64() / speed)
    }

    fn set_local_progress(&self, consumed: usize, total: usize) {
        let mut state = self.state.write();
        if state.phase == PlaybackPhase::Running {
            state.progress_percent = (consumed as f64 / total as f64 * 100.0).min(100.0);
        }
    }

    fn set_remote_progress(&self, received: usize, declared_total: Option<usize>) {
        if let Some(total) = declared_total {
            let mut state = self.state.write();
            if state.phase == PlaybackPhase::Running {
                state.progress_percent = (received as f64 / total as f64 * 100.0).min(100.0);
            }
        }
    }

    /// Record a non-fatal advisory and tell the surface about it.
    fn advise(&self, message: String) {
        tracing::warn!(run = %self.run_id, %message, "playback advisory");
        self.surface.notify(NotifyLevel::Warning, &message);
        self.state.write().advisory = Some(message);
    }

    /// Final reconciliation sweep, then mark the run complete.
    fn finish(&self) {
        self.flush_ready_links();
        let mut state = self.state.write();
        if state.phase == PlaybackPhase::Running {
            state.phase = PlaybackPhase::Completed;
            state.is_running = false;
            state.progress_percent = 100.0;
            tracing::debug!(
                run = %self.run_id,
                nodes = state.rendered_nodes.len(),
                links = state.rendered_links.len(),
                "playback completed"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::RecordingSurface;
    use crate::tree::IngredientNode;

    fn brick_tree() -> Arc<PositionedTree> {
        let mut water = IngredientNode::named("Water");
        water.is_base_element = true;
        let mut earth = IngredientNode::named("Earth");
        earth.is_base_element = true;
        let mut fire = IngredientNode::named("Fire");
        fire.is_base_element = true;
        let mut mud = IngredientNode::named("Mud");
        mud.children = vec![water, earth];
        let mut brick = IngredientNode::named("Brick");
        brick.children = vec![mud, fire];
        Arc::new(PositionedTree::from_ingredient_tree(&brick))
    }

    fn fast_config() -> PlaybackConfig {
        PlaybackConfig {
            bfs_step: Duration::from_millis(5),
            dfs_step: Duration::from_millis(5),
            bidirectional_step: Duration::from_millis(5),
            remote_connect_timeout: Duration::from_millis(50),
            ..PlaybackConfig::default()
        }
    }

    fn session(
        tree: Arc<PositionedTree>,
        surface: Arc<RecordingSurface>,
    ) -> PlaybackSession {
        PlaybackSession::new(
            tree,
            Algorithm::Bfs,
            "Brick",
            fast_config(),
            surface,
            Arc::new(RwLock::new(AnimationState::new())),
        )
    }

    async fn wait_terminal(state: &Arc<RwLock<AnimationState>>) {
        for _ in 0..400 {
            if state.read().phase.is_terminal() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("playback did not reach a terminal phase");
    }

    #[test]
    fn test_config_step_and_clamp() {
        let config = PlaybackConfig::default();
        assert!(config.step_for(Algorithm::Dfs) > config.step_for(Algorithm::Bfs));
        assert_eq!(
            config.step_for(Algorithm::Bfs),
            config.step_for(Algorithm::Bidirectional)
        );
        assert_eq!(config.clamp_speed(0.0), config.min_speed);
        assert_eq!(config.clamp_speed(100.0), config.max_speed);
        assert_eq!(config.clamp_speed(f64::NAN), 1.0);
    }

    #[test]
    fn test_state_reset_keeps_speed() {
        let mut state = AnimationState::new();
        state.speed = 2.5;
        state.rendered_nodes.insert(NodeId(0));
        state.phase = PlaybackPhase::Completed;
        state.reset();
        assert_eq!(state.speed, 2.5);
        assert!(state.rendered_nodes.is_empty());
        assert_eq!(state.phase, PlaybackPhase::Idle);
    }

    #[tokio::test]
    async fn test_local_run_completes_with_all_reveals() {
        let surface = Arc::new(RecordingSurface::new());
        let tree = brick_tree();
        let mut session = session(Arc::clone(&tree), Arc::clone(&surface));
        let state = session.shared_state();

        session.start(None);
        wait_terminal(&state).await;

        let snapshot = state.read();
        assert_eq!(snapshot.phase, PlaybackPhase::Completed);
        assert_eq!(snapshot.active_source, RevealSource::Local);
        assert_eq!(snapshot.progress_percent, 100.0);
        assert_eq!(snapshot.rendered_nodes.len(), tree.len());
        // Every non-root rendered node has its parent link rendered.
        assert_eq!(snapshot.rendered_links.len(), tree.len() - 1);
        drop(snapshot);

        assert_eq!(surface.drawn_nodes(), vec!["Brick", "Mud", "Fire", "Water", "Earth"]);
    }

    #[tokio::test]
    async fn test_links_only_after_both_endpoints() {
        let surface = Arc::new(RecordingSurface::new());
        let tree = brick_tree();
        let mut session = session(Arc::clone(&tree), Arc::clone(&surface));
        let state = session.shared_state();

        session.start(None);
        wait_terminal(&state).await;

        // Replay the surface log: any link must follow both endpoint nodes.
        let mut visible = HashSet::new();
        for op in surface.ops() {
            match op {
                crate::surface::SurfaceOp::Node(name) => {
                    visible.insert(name);
                }
                crate::surface::SurfaceOp::Link(source, target) => {
                    assert!(visible.contains(&source), "link before source {source}");
                    assert!(visible.contains(&target), "link before target {target}");
                }
                _ => {}
            }
        }
    }

    #[tokio::test]
    async fn test_cancel_stops_pending_reveals() {
        let surface = Arc::new(RecordingSurface::new());
        let tree = brick_tree();
        let mut session = PlaybackSession::new(
            Arc::clone(&tree),
            Algorithm::Bfs,
            "Brick",
            PlaybackConfig {
                bfs_step: Duration::from_millis(40),
                ..fast_config()
            },
            surface.clone(),
            Arc::new(RwLock::new(AnimationState::new())),
        );
        let state = session.shared_state();

        session.start(None);
        tokio::time::sleep(Duration::from_millis(70)).await;
        session.cancel();

        assert_eq!(state.read().phase, PlaybackPhase::Cancelled);
        let drawn_at_cancel = surface.drawn_nodes().len();
        assert!(drawn_at_cancel < tree.len(), "run should not have finished");

        // No reveal may fire after cancellation.
        tokio::time::sleep(Duration::from_millis(120)).await;
        assert_eq!(surface.drawn_nodes().len(), drawn_at_cancel);
    }

    #[tokio::test]
    async fn test_restart_cancels_prior_run() {
        let surface = Arc::new(RecordingSurface::new());
        let tree = brick_tree();
        let mut session = PlaybackSession::new(
            Arc::clone(&tree),
            Algorithm::Bfs,
            "Brick",
            PlaybackConfig {
                bfs_step: Duration::from_millis(30),
                ..fast_config()
            },
            surface.clone(),
            Arc::new(RwLock::new(AnimationState::new())),
        );
        let state = session.shared_state();

        session.start(None);
        tokio::time::sleep(Duration::from_millis(45)).await;
        session.start(None); // restart mid-run
        wait_terminal(&state).await;

        let snapshot = state.read();
        assert_eq!(snapshot.phase, PlaybackPhase::Completed);
        assert_eq!(snapshot.rendered_nodes.len(), tree.len());
    }

    #[tokio::test]
    async fn test_speed_changes_take_effect() {
        let surface = Arc::new(RecordingSurface::new());
        let tree = brick_tree();
        let mut session = PlaybackSession::new(
            Arc::clone(&tree),
            Algorithm::Bfs,
            "Brick",
            PlaybackConfig {
                bfs_step: Duration::from_millis(100),
                ..fast_config()
            },
            surface.clone(),
            Arc::new(RwLock::new(AnimationState::new())),
        );
        let state = session.shared_state();

        session.set_speed(8.0); // 100ms base becomes 12.5ms per step
        session.start(None);
        wait_terminal(&state).await;
        assert_eq!(state.read().phase, PlaybackPhase::Completed);

        // Out-of-range requests are clamped.
        session.set_speed(1000.0);
        assert_eq!(state.read().speed, fast_config().max_speed);
    }

    #[tokio::test]
    async fn test_single_node_run() {
        let surface = Arc::new(RecordingSurface::new());
        let tree = Arc::new(PositionedTree::from_ingredient_tree(&IngredientNode::named(
            "Air",
        )));
        let mut session = session(Arc::clone(&tree), Arc::clone(&surface));
        let state = session.shared_state();

        session.start(None);
        wait_terminal(&state).await;

        let snapshot = state.read();
        assert_eq!(snapshot.phase, PlaybackPhase::Completed);
        assert_eq!(snapshot.rendered_nodes.len(), 1);
        assert!(snapshot.rendered_links.is_empty());
    }
}
