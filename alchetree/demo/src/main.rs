//! Alchetree Demo - Headless Visualization Run
//!
//! Drives the full engine pipeline against the built-in fixture recipe set
//! and logs every reveal as it happens. Useful for eyeballing reveal orders
//! and pacing without a UI or a live backend.
//!
//! # Usage
//!
//! ```bash
//! # Animate the Brick derivation breadth-first
//! alchetree-demo --target Brick
//!
//! # Depth-first, double speed
//! alchetree-demo --target House --algorithm dfs --speed 2.0
//!
//! # Draw the finished tree without animating
//! alchetree-demo --target Metal --no-animate
//!
//! # Verbose logging
//! RUST_LOG=debug alchetree-demo --target Brick
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use alchetree_core::{
    Algorithm, EngineConfig, FixtureBackend, NotifyLevel, PositionedNode, RenderError,
    RenderSurface, Visualizer,
};

/// Headless demo driver for the alchetree visualization engine
#[derive(Parser, Debug)]
#[command(name = "alchetree-demo")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Target element to derive
    #[arg(short = 't', long, default_value = "Brick")]
    target: String,

    /// Search algorithm (bfs, dfs, bidirectional)
    #[arg(short = 'a', long, default_value = "bfs")]
    algorithm: String,

    /// Playback speed multiplier
    #[arg(short = 's', long, default_value_t = 1.0)]
    speed: f64,

    /// Number of derivations to request
    #[arg(short = 'c', long, default_value_t = 1)]
    count: usize,

    /// Draw the finished tree immediately instead of animating
    #[arg(long)]
    no_animate: bool,

    /// Configuration file path (defaults to the XDG location)
    #[arg(long, env = "ALCHETREE_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'l', long, default_value = "info")]
    log_level: String,
}

/// Surface that logs every draw call
struct LoggingSurface;

impl RenderSurface for LoggingSurface {
    fn canvas_size(&self) -> (f64, f64) {
        (1200.0, 500.0)
    }

    fn clear(&self) {
        info!("surface cleared");
    }

    fn draw_node(&self, node: &PositionedNode) -> Result<(), RenderError> {
        info!(
            name = %node.name,
            x = node.x.round(),
            y = node.y.round(),
            depth = node.depth,
            base = node.is_base_element,
            "node"
        );
        Ok(())
    }

    fn draw_link(
        &self,
        source: &PositionedNode,
        target: &PositionedNode,
    ) -> Result<(), RenderError> {
        info!(source = %source.name, target = %target.name, "link");
        Ok(())
    }

    fn show_message(&self, message: &str) {
        info!(%message, "surface message");
    }

    fn notify(&self, level: NotifyLevel, message: &str) {
        info!(?level, %message, "notification");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level);

    let config = match &args.config {
        Some(path) => EngineConfig::load_from_path(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => EngineConfig::load().context("loading default config")?,
    };

    let algorithm = Algorithm::parse(&args.algorithm);
    let surface = Arc::new(LoggingSurface);
    let mut viz = Visualizer::new(FixtureBackend::new(), surface, config);
    viz.set_playback_speed(args.speed);

    let catalog_size = viz.load_element_catalog().await;
    info!(catalog_size, "fixture catalog ready");

    let found = viz.run_search(&args.target, algorithm, args.count).await;
    anyhow::ensure!(found > 0, "no derivation found for {}", args.target);
    info!(target = %args.target, %algorithm, trees = found, "search finished");

    viz.visualize(0, !args.no_animate)
        .context("visualization failed")?;

    while viz.is_animating() {
        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    let tree = viz.current_tree().context("no tree displayed")?;
    info!(
        nodes = tree.len(),
        rendered = viz.rendered_nodes().len(),
        progress = viz.progress_percent(),
        source = ?viz.active_source(),
        phase = ?viz.animation_phase(),
        "run finished"
    );
    if let Some(advisory) = viz.advisory() {
        info!(%advisory, "advisory");
    }

    Ok(())
}

fn init_logging(level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("alchetree_core={level},alchetree_demo={level}")));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
