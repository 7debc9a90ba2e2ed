//! Search Backend Trait
//!
//! One trait seam for everything the engine consumes from the outside: the
//! element catalog and per-target search results. Implementations handle the
//! transport details (REST routes, fixtures); the engine only ever sees
//! [`RawSearchResult`]s.

use async_trait::async_trait;

use crate::catalog::ElementData;
use crate::sequence::Algorithm;
use crate::tree::RawSearchResult;

/// Recipe-search backend
///
/// Implement this trait to plug in a different search service. All methods
/// are fallible the same way: an `Err` is reported to the user as a
/// transient notification and never disturbs existing visualization state.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Backend name for logs and notifications
    fn name(&self) -> &str;

    /// Check if the backend is healthy and reachable
    async fn health_check(&self) -> bool;

    /// Load the full element catalog
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be fetched or decoded.
    async fn load_catalog(&self) -> anyhow::Result<Vec<ElementData>>;

    /// Run a search for up to `count` derivations of `target`
    ///
    /// The result may be path-shaped or tree-shaped; the normalizer accepts
    /// both.
    ///
    /// # Errors
    ///
    /// Returns an error if the search request fails or the response cannot
    /// be decoded.
    async fn run_search(
        &self,
        target: &str,
        algorithm: Algorithm,
        count: usize,
    ) -> anyhow::Result<RawSearchResult>;
}
